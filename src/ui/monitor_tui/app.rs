use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::power_monitor::{
    ChannelNotifier, CollectorConfig, MetricsSnapshot, PowerCollector, SamplingMode,
    SharedSnapshot, SystemCommandRunner, DEFAULT_COMMAND_TIMEOUT,
};

use super::event_handler::MonitorEvent;
use super::render::render_ui;

/// How long to wait for a key press before checking for new data
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Monitor application state
pub struct MonitorApp {
    pub shared: SharedSnapshot,
    /// Copy of the shared snapshot taken at the last refresh
    pub view: MetricsSnapshot,
    pub should_quit: bool,
    pub show_help: bool,
}

impl MonitorApp {
    pub fn new(shared: SharedSnapshot) -> Self {
        let view = shared.snapshot();
        Self {
            shared,
            view,
            should_quit: false,
            show_help: false,
        }
    }

    /// Take a consistent copy of the shared snapshot for drawing
    pub fn refresh(&mut self) {
        self.view = self.shared.snapshot();
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Quit => self.should_quit = true,
            MonitorEvent::ToggleHelp => self.show_help = !self.show_help,
            MonitorEvent::SetMode(mode) => {
                self.shared.set_mode(mode);
                self.refresh();
            }
            MonitorEvent::None => {}
        }
    }
}

/// Configuration for the monitor app
#[derive(Debug, Clone)]
pub struct MonitorAppConfig {
    pub mode: SamplingMode,
    pub command_timeout: Duration,
    pub collector: CollectorConfig,
}

impl Default for MonitorAppConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::default(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            collector: CollectorConfig::default(),
        }
    }
}

/// Run the monitor TUI application
pub fn run_monitor_app(config: MonitorAppConfig) -> Result<()> {
    let shared = SharedSnapshot::with_mode(config.mode);
    let (notifier, updates) = ChannelNotifier::new();

    let collector = PowerCollector::with_config(
        SystemCommandRunner::with_timeout(config.command_timeout),
        shared.clone(),
        notifier,
        config.collector,
    )
    .spawn()
    .context("Failed to start power collector")?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = MonitorApp::new(shared);
    let result = event_loop(&mut terminal, &mut app, &updates);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    // The collector thread may be inside a command; it exits on its own
    collector.stop();

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut MonitorApp,
    updates: &Receiver<()>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render_ui(frame, &*app))?;

        if event::poll(INPUT_POLL).context("Event poll failed")? {
            if let Event::Key(key) = event::read().context("Event read failed")? {
                if key.kind == KeyEventKind::Press {
                    app.handle_event(MonitorEvent::from_key(key.code));
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        if updates.try_recv().is_ok() {
            app.refresh();
        }
    }
}
