use crossterm::event::KeyCode;

use crate::core::power_monitor::SamplingMode;

/// Events that can occur in the monitor TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Switch the collector's sampling mode
    SetMode(SamplingMode),
    /// No action
    None,
}

impl MonitorEvent {
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => MonitorEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
            KeyCode::Char('p') => MonitorEvent::SetMode(SamplingMode::Performance),
            KeyCode::Char('b') => MonitorEvent::SetMode(SamplingMode::Balanced),
            KeyCode::Char('e') => MonitorEvent::SetMode(SamplingMode::Eco),
            _ => MonitorEvent::None,
        }
    }
}
