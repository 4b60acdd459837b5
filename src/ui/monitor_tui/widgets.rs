use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Color for the battery charge level
pub fn battery_color(percent: u8) -> Color {
    match percent {
        p if p > 50 => Color::Green,
        p if p > 20 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Color for battery temperature
pub fn temp_color(celsius: f64) -> Color {
    if celsius < 40.0 {
        Color::Green
    } else {
        Color::Red
    }
}

/// Green while current flows into the battery, yellow while draining it
pub fn power_color(charging_flow: bool) -> Color {
    if charging_flow {
        Color::Green
    } else {
        Color::Yellow
    }
}

/// Battery charge gauge
pub fn battery_gauge<'a>(percent: u8, label: String) -> Gauge<'a> {
    Gauge::default()
        .gauge_style(
            Style::default()
                .fg(battery_color(percent))
                .bg(Color::Black),
        )
        .ratio((percent as f64 / 100.0).clamp(0.0, 1.0))
        .label(label)
}

/// Small titled card showing one value and its unit
pub fn metric_card<'a>(title: &'a str, value: String, unit: &'a str, color: Color) -> Paragraph<'a> {
    let line = Line::from(vec![
        Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(unit, Style::default().fg(Color::Gray)),
    ]);

    Paragraph::new(line).block(
        Block::default()
            .title(Span::styled(
                format!(" {} ", title),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL),
    )
}
