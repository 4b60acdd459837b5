use chrono::{DateTime, Local, Utc};
use colored::*;

use crate::core::power_monitor::{ChargingStatus, MetricsSnapshot};

/// Format a power value in watts (e.g. "12.34 W")
pub fn format_watts(watts: f64) -> String {
    format!("{:.2} W", watts)
}

/// Format a temperature with one decimal (e.g. "31.4 °C")
pub fn format_celsius(celsius: f64) -> String {
    format!("{:.1} °C", celsius)
}

/// Format the last update time in local time, or "never"
pub fn format_last_update(last_update: Option<DateTime<Utc>>) -> String {
    match last_update {
        Some(ts) => ts.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "never".to_string(),
    }
}

/// Status line shown under the battery percentage (e.g. "Charging • 2h 5m")
pub fn format_status_line(snapshot: &MetricsSnapshot) -> String {
    format!("{} • {}", snapshot.charging_status, snapshot.time_remaining)
}

/// Charger line (e.g. "65W • 20.0V / 3250mA"), only while a charger is attached
pub fn format_charger(snapshot: &MetricsSnapshot) -> Option<String> {
    snapshot.charger().map(|charger| {
        format!(
            "{}W • {:.1}V / {}mA",
            charger.wattage, charger.voltage, charger.current_ma
        )
    })
}

fn colored_percent(percent: u8) -> ColoredString {
    let text = format!("{}%", percent);
    match percent {
        p if p > 50 => text.green().bold(),
        p if p > 20 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

/// Multi-line report of a snapshot for terminal output
pub fn format_report(snapshot: &MetricsSnapshot) -> String {
    let mut lines = Vec::new();

    let status = match snapshot.charging_status {
        ChargingStatus::Charging | ChargingStatus::FullyCharged => {
            snapshot.charging_status.to_string().green()
        }
        ChargingStatus::Discharging => snapshot.charging_status.to_string().yellow(),
        _ => snapshot.charging_status.to_string().normal(),
    };

    lines.push(format!("{}", "BATTERY".cyan().bold()));
    lines.push(format!(
        "  {}  {} • {}",
        colored_percent(snapshot.battery_percent),
        status,
        snapshot.time_remaining
    ));
    lines.push(format!("  Source:      {}", snapshot.power_source));

    let power = format_watts(snapshot.power_watts);
    lines.push(String::new());
    lines.push(format!("{}", "POWER FLOW".cyan().bold()));
    lines.push(format!(
        "  Power:       {}",
        if snapshot.is_charging_flow() {
            power.green()
        } else {
            power.yellow()
        }
    ));
    lines.push(format!("  Voltage:     {:.2} V", snapshot.voltage));
    lines.push(format!("  Current:     {} mA", snapshot.amperage_ma.unsigned_abs()));

    let temp = format_celsius(snapshot.temperature_celsius);
    lines.push(format!(
        "  Temperature: {}",
        if snapshot.temperature_celsius < 40.0 {
            temp.green()
        } else {
            temp.red()
        }
    ));

    lines.push(String::new());
    lines.push(format!("{}", "HEALTH".cyan().bold()));
    lines.push(format!("  Capacity:    {}%", snapshot.max_capacity_percent));
    lines.push(format!("  Cycles:      {}", snapshot.cycle_count));
    lines.push(format!("  Condition:   {}", snapshot.condition));
    lines.push(format!(
        "  Low Power:   {}",
        if snapshot.low_power_mode { "On" } else { "Off" }
    ));

    if let Some(charger) = format_charger(snapshot) {
        lines.push(String::new());
        lines.push(format!("{}", "CHARGER ATTACHED".yellow().bold()));
        lines.push(format!("  {}", charger));
    }

    lines.push(String::new());
    lines.push(format!(
        "{}",
        format!(
            "Last Update: {} | Mode: {}",
            format_last_update(snapshot.last_update),
            snapshot.mode
        )
        .dimmed()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::power_monitor::{PowerSource, TimeRemaining};

    #[test]
    fn test_format_watts() {
        assert_eq!(format_watts(12.346), "12.35 W");
        assert_eq!(format_watts(0.0), "0.00 W");
    }

    #[test]
    fn test_format_celsius() {
        assert_eq!(format_celsius(31.35), "31.4 °C");
    }

    #[test]
    fn test_format_last_update_never() {
        assert_eq!(format_last_update(None), "never");
    }

    #[test]
    fn test_status_line() {
        let snapshot = MetricsSnapshot {
            charging_status: ChargingStatus::Charging,
            time_remaining: TimeRemaining::from_minutes(125),
            ..Default::default()
        };
        assert_eq!(format_status_line(&snapshot), "Charging • 2h 5m");
    }

    #[test]
    fn test_charger_hidden_when_disconnected() {
        let mut snapshot = MetricsSnapshot {
            charger_wattage: 65,
            adapter_voltage: 20.0,
            adapter_current_ma: 3250,
            ..Default::default()
        };
        assert_eq!(format_charger(&snapshot), None);

        snapshot.charger_connected = true;
        assert_eq!(
            format_charger(&snapshot).as_deref(),
            Some("65W • 20.0V / 3250mA")
        );
    }

    #[test]
    fn test_report_mentions_key_fields() {
        colored::control::set_override(false);
        let snapshot = MetricsSnapshot {
            power_source: PowerSource::Battery,
            battery_percent: 64,
            cycle_count: 312,
            condition: "Normal".to_string(),
            ..Default::default()
        };

        let report = format_report(&snapshot);
        assert!(report.contains("64%"));
        assert!(report.contains("Cycles:      312"));
        assert!(report.contains("Condition:   Normal"));
        assert!(report.contains("Mode: BALANCED"));
        assert!(!report.contains("CHARGER ATTACHED"));
    }
}
