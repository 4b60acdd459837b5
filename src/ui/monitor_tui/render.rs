use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Sparkline},
};

use super::app::MonitorApp;
use super::widgets::{battery_gauge, metric_card, power_color, temp_color};
use crate::core::power_monitor::{MetricsSnapshot, PowerSource};
use crate::ui::formatters::{format_charger, format_last_update, format_status_line};

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &MonitorApp) {
    let area = frame.area();
    let snapshot = &app.view;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Battery
            Constraint::Length(3), // Metric cards
            Constraint::Length(7), // Health + charger
            Constraint::Min(5),    // Power history
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], snapshot);
    render_battery_section(frame, chunks[1], snapshot);
    render_metric_cards(frame, chunks[2], snapshot);
    render_side_panels(frame, chunks[3], snapshot);
    render_power_history(frame, chunks[4], snapshot);
    render_footer(frame, chunks[5], snapshot);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, snapshot: &MetricsSnapshot) {
    let source = match snapshot.power_source {
        PowerSource::AC => "⚡ AC Power",
        PowerSource::Battery => "🔋 Battery",
        PowerSource::Unknown => "? Unknown",
    };

    let title = format!(
        " Volt Monitor │ {} │ Mode: {} ({}s) ",
        source, snapshot.mode, snapshot.poll_interval_secs
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(block, area);
}

fn render_battery_section(frame: &mut Frame, area: Rect, snapshot: &MetricsSnapshot) {
    let block = Block::default().title(" Battery ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let label = format!("{}%", snapshot.battery_percent);
    frame.render_widget(battery_gauge(snapshot.battery_percent, label), rows[0]);

    if rows[1].height > 0 {
        let status = Paragraph::new(format_status_line(snapshot))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(status, rows[1]);
    }
}

fn render_metric_cards(frame: &mut Frame, area: Rect, snapshot: &MetricsSnapshot) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    frame.render_widget(
        metric_card(
            "POWER FLOW",
            format!("{:.2}", snapshot.power_watts),
            "W",
            power_color(snapshot.is_charging_flow()),
        ),
        cards[0],
    );
    frame.render_widget(
        metric_card("VOLTAGE", format!("{:.2}", snapshot.voltage), "V", Color::White),
        cards[1],
    );
    frame.render_widget(
        metric_card(
            "TEMP",
            format!("{:.1}", snapshot.temperature_celsius),
            "°C",
            temp_color(snapshot.temperature_celsius),
        ),
        cards[2],
    );
    frame.render_widget(
        metric_card(
            "CURRENT",
            snapshot.amperage_ma.unsigned_abs().to_string(),
            "mA",
            Color::White,
        ),
        cards[3],
    );
}

fn label_value<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn render_side_panels(frame: &mut Frame, area: Rect, snapshot: &MetricsSnapshot) {
    let charger = format_charger(snapshot);

    let constraints = if charger.is_some() {
        vec![Constraint::Percentage(50), Constraint::Percentage(50)]
    } else {
        vec![Constraint::Percentage(100)]
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let health = vec![
        label_value(
            "Capacity:   ",
            format!("{}%", snapshot.max_capacity_percent),
            Color::White,
        ),
        label_value("Cycles:     ", snapshot.cycle_count.to_string(), Color::White),
        label_value("Condition:  ", snapshot.condition.clone(), Color::Green),
        label_value(
            "Low Power:  ",
            if snapshot.low_power_mode { "On" } else { "Off" }.to_string(),
            if snapshot.low_power_mode {
                Color::Yellow
            } else {
                Color::White
            },
        ),
    ];

    let health_panel = Paragraph::new(health).block(
        Block::default()
            .title(Span::styled(
                " HEALTH INSIGHTS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(health_panel, chunks[0]);

    if let Some(details) = charger {
        let lines = vec![
            Line::from(Span::styled(
                format!("⚡ {}W", snapshot.charger_wattage),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(details, Style::default().fg(Color::Gray))),
        ];

        let charger_panel = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(
                    " CHARGER ATTACHED ",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(charger_panel, chunks[1]);
    }
}

fn render_power_history(frame: &mut Frame, area: Rect, snapshot: &MetricsSnapshot) {
    let history = &snapshot.power_history;
    let data = history.as_u64();

    // Only the most recent samples that fit in the panel
    let width = area.width.saturating_sub(2) as usize;
    let start = data.len().saturating_sub(width);

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(format!(
                    " Power Consumption Trend │ last {} samples │ peak {:.2} W ",
                    history.len(),
                    history.max()
                ))
                .borders(Borders::ALL),
        )
        .data(&data[start..])
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(sparkline, area);
}

fn render_footer(frame: &mut Frame, area: Rect, snapshot: &MetricsSnapshot) {
    let text = format!(
        " Last Update: {} │ Mode: {} │ p/b/e: mode │ ?: help │ q: quit ",
        format_last_update(snapshot.last_update),
        snapshot.mode
    );

    let footer = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 50, area);

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  p        Performance mode (0.5s)"),
        Line::from("  b        Balanced mode (2s)"),
        Line::from("  e        Eco mode (5s)"),
        Line::from("  ? / h    Toggle this help"),
        Line::from("  q / Esc  Quit"),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}

/// Rect centered in `area` using percentages of its size
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
