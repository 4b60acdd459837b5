use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extract::{max_capacity_percent, BatteryReading, SlowReading};
use super::history::PowerHistory;
use super::mode::SamplingMode;

pub const DEFAULT_CONDITION: &str = "Checking...";

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PowerSource {
    AC,
    Battery,
    #[default]
    Unknown,
}

impl fmt::Display for PowerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerSource::AC => "AC Power",
            PowerSource::Battery => "Battery",
            PowerSource::Unknown => "Unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChargingStatus {
    Charging,
    Discharging,
    FullyCharged,
    Connected,
    #[default]
    Unknown,
}

impl ChargingStatus {
    /// Derive the status from the raw battery flags.
    ///
    /// Fully charged wins over charging, which wins over a plain external
    /// connection.
    pub fn derive(fully_charged: bool, is_charging: bool, external_power: bool) -> Self {
        if fully_charged {
            ChargingStatus::FullyCharged
        } else if is_charging {
            ChargingStatus::Charging
        } else if external_power {
            ChargingStatus::Connected
        } else {
            ChargingStatus::Discharging
        }
    }
}

impl fmt::Display for ChargingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChargingStatus::Charging => "Charging",
            ChargingStatus::Discharging => "Discharging",
            ChargingStatus::FullyCharged => "Fully Charged",
            ChargingStatus::Connected => "Connected",
            ChargingStatus::Unknown => "Unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeRemaining {
    #[default]
    Unknown,
    /// The battery controller has not settled on an estimate yet.
    Calculating,
    Remaining { hours: u64, minutes: u64 },
}

impl TimeRemaining {
    /// Raw minute value reported while the estimate is being computed.
    pub const CALCULATING_SENTINEL: u64 = 65535;

    pub fn from_minutes(minutes: u64) -> Self {
        if minutes == Self::CALCULATING_SENTINEL {
            TimeRemaining::Calculating
        } else {
            TimeRemaining::Remaining {
                hours: minutes / 60,
                minutes: minutes % 60,
            }
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Unknown => f.write_str("Unknown"),
            TimeRemaining::Calculating => f.write_str("Calculating"),
            TimeRemaining::Remaining { hours, minutes } => write!(f, "{}h {}m", hours, minutes),
        }
    }
}

/// Charger adapter values, only meaningful while a charger is connected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ChargerDetails {
    pub wattage: u32,
    pub voltage: f64,
    pub current_ma: u32,
}

/// Current power and battery state shared between the collector and readers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    pub power_source: PowerSource,
    pub battery_percent: u8,
    pub charging_status: ChargingStatus,
    pub time_remaining: TimeRemaining,
    pub cycle_count: u32,
    pub condition: String,
    pub max_capacity_percent: f64,
    pub charger_wattage: u32,
    pub adapter_voltage: f64,
    pub adapter_current_ma: u32,
    pub charger_connected: bool,
    pub low_power_mode: bool,
    pub temperature_celsius: f64,
    pub voltage: f64,
    pub amperage_ma: i64,
    pub power_watts: f64,
    pub power_history: PowerHistory,
    pub design_capacity: u64,
    pub current_capacity: u64,
    pub mode: SamplingMode,
    pub poll_interval_secs: f64,
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::with_mode(SamplingMode::default())
    }
}

impl MetricsSnapshot {
    pub fn with_mode(mode: SamplingMode) -> Self {
        Self {
            power_source: PowerSource::Unknown,
            battery_percent: 0,
            charging_status: ChargingStatus::Unknown,
            time_remaining: TimeRemaining::Unknown,
            cycle_count: 0,
            condition: DEFAULT_CONDITION.to_string(),
            max_capacity_percent: 100.0,
            charger_wattage: 0,
            adapter_voltage: 0.0,
            adapter_current_ma: 0,
            charger_connected: false,
            low_power_mode: false,
            temperature_celsius: 0.0,
            voltage: 0.0,
            amperage_ma: 0,
            power_watts: 0.0,
            power_history: PowerHistory::new(),
            design_capacity: 0,
            current_capacity: 0,
            mode,
            poll_interval_secs: mode.interval_secs(),
            last_update: None,
        }
    }

    /// Switch sampling mode; mode and interval always change together.
    pub fn set_mode(&mut self, mode: SamplingMode) {
        self.mode = mode;
        self.poll_interval_secs = mode.interval_secs();
    }

    /// Charger values, or `None` when no charger is attached.
    pub fn charger(&self) -> Option<ChargerDetails> {
        self.charger_connected.then_some(ChargerDetails {
            wattage: self.charger_wattage,
            voltage: self.adapter_voltage,
            current_ma: self.adapter_current_ma,
        })
    }

    /// True while current flows into the battery.
    pub fn is_charging_flow(&self) -> bool {
        self.amperage_ma >= 0
    }

    /// Merge a fast-path reading into the snapshot.
    ///
    /// Fields missing from the reading keep their previous values. A reading
    /// with no fields at all counts as a failed cycle: nothing changes, not
    /// even the power history or `last_update`. Returns whether the reading
    /// was applied.
    pub fn apply_reading(&mut self, reading: &BatteryReading, now: DateTime<Utc>) -> bool {
        if reading.is_empty() {
            return false;
        }

        if let Some(external) = reading.external_power {
            self.power_source = if external {
                PowerSource::AC
            } else {
                PowerSource::Battery
            };
            self.charger_connected = external;
        }

        if let Some(percent) = reading.battery_percent {
            self.battery_percent = percent;
        }

        if reading.has_status_flags() {
            self.charging_status = ChargingStatus::derive(
                reading.fully_charged.unwrap_or(false),
                reading.is_charging.unwrap_or(false),
                reading.external_power.unwrap_or(self.charger_connected),
            );
        }

        if let Some(time) = reading.time_remaining {
            self.time_remaining = time;
        }
        if let Some(celsius) = reading.temperature_celsius {
            self.temperature_celsius = celsius;
        }
        if let Some(volts) = reading.voltage {
            self.voltage = volts;
        }
        if let Some(amps) = reading.amperage_ma {
            self.amperage_ma = amps;
        }

        self.power_watts = round_to(
            self.voltage * self.amperage_ma.unsigned_abs() as f64 / 1000.0,
            2,
        );
        self.power_history.push(self.power_watts);

        if let Some(cycles) = reading.cycle_count {
            self.cycle_count = cycles;
        }
        if let Some(design) = reading.design_capacity {
            self.design_capacity = design;
        }
        if let Some(current) = reading.raw_max_capacity {
            self.current_capacity = current;
            if let Some(percent) = max_capacity_percent(current, self.design_capacity) {
                self.max_capacity_percent = percent;
            }
        }

        if let Some(adapter) = reading.adapter {
            if let Some(volts) = adapter.voltage {
                self.adapter_voltage = volts;
            }
            if let Some(current) = adapter.current_ma {
                self.adapter_current_ma = current;
            }
            if let Some(watts) = adapter.watts {
                self.charger_wattage = watts;
            }
        }

        self.last_update = Some(now);
        true
    }

    /// Merge a slow-path reading (condition and low power mode).
    pub fn apply_slow_reading(&mut self, reading: &SlowReading) {
        if let Some(condition) = &reading.condition {
            self.condition = condition.clone();
        }
        self.low_power_mode = reading.low_power_mode;
    }
}
