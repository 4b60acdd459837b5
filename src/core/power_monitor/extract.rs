//! Field extractors for power diagnostics text.
//!
//! Every extractor is a pure function from raw command output to an optional
//! typed value. `None` means the field was not found; callers leave the
//! previous value in place. Malformed input never panics.

use once_cell::sync::Lazy;
use regex::Regex;

use super::metrics::{round_to, TimeRemaining};

fn integer_key(key: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*=\s*(\d+)"#, key)).expect("static integer pattern")
}

fn signed_key(key: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*=\s*(-?\d+)"#, key)).expect("static signed pattern")
}

fn boolean_key(key: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*=\s*(Yes|No)\b"#, key)).expect("static boolean pattern")
}

fn adapter_key(key: &str) -> Regex {
    Regex::new(&format!(r#"[ ,{{]"?{}"?\s*[:=]\s*(\d+)"#, key)).expect("static adapter pattern")
}

static EXTERNAL_CONNECTED: Lazy<Regex> = Lazy::new(|| boolean_key("(?:AppleRaw)?ExternalConnected"));
static IS_CHARGING: Lazy<Regex> = Lazy::new(|| boolean_key("IsCharging"));
static FULLY_CHARGED: Lazy<Regex> = Lazy::new(|| boolean_key("FullyCharged"));

static CURRENT_CAPACITY: Lazy<Regex> = Lazy::new(|| integer_key("CurrentCapacity"));
static TIME_REMAINING: Lazy<Regex> = Lazy::new(|| integer_key("TimeRemaining"));
static TEMPERATURE: Lazy<Regex> = Lazy::new(|| integer_key("Temperature"));
static VOLTAGE: Lazy<Regex> = Lazy::new(|| integer_key("Voltage"));
static INSTANT_AMPERAGE: Lazy<Regex> = Lazy::new(|| signed_key("InstantAmperage"));
static AMPERAGE: Lazy<Regex> = Lazy::new(|| signed_key("Amperage"));
static CYCLE_COUNT: Lazy<Regex> = Lazy::new(|| integer_key("CycleCount"));
static DESIGN_CAPACITY: Lazy<Regex> = Lazy::new(|| integer_key("DesignCapacity"));
static RAW_MAX_CAPACITY: Lazy<Regex> = Lazy::new(|| integer_key("AppleRawMaxCapacity"));

// ioreg prints AppleRawAdapterDetails as an array of dictionaries: ({...})
static ADAPTER_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:AppleRaw)?AdapterDetails"\s*=\s*\(?\s*\{([^}]+)\}"#)
        .expect("static adapter block pattern")
});
static ADAPTER_VOLTAGE: Lazy<Regex> = Lazy::new(|| adapter_key("AdapterVoltage"));
static ADAPTER_CURRENT: Lazy<Regex> = Lazy::new(|| adapter_key("Current"));
static ADAPTER_WATTS: Lazy<Regex> = Lazy::new(|| adapter_key("Watts"));

static CONDITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Condition:\s*(\w+)").expect("static condition pattern"));
static LOW_POWER_MODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"lowpowermode\s+(\d)").expect("static low power pattern"));

/// Amperage readings at or above this value are two's-complement negatives.
const SIGNED_64_THRESHOLD: i128 = 1 << 63;
const UNSIGNED_64_RANGE: i128 = 1 << 64;

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)?.get(1).map(|m| m.as_str())
}

fn capture_u64(re: &Regex, text: &str) -> Option<u64> {
    capture(re, text)?.parse().ok()
}

fn capture_bool(re: &Regex, text: &str) -> Option<bool> {
    capture(re, text).map(|v| v == "Yes")
}

/// True when either external-connection key reports `Yes`.
///
/// Returns `Some(false)` only when at least one key is present and none is `Yes`.
pub fn external_power(text: &str) -> Option<bool> {
    let mut seen = false;
    for caps in EXTERNAL_CONNECTED.captures_iter(text) {
        if &caps[1] == "Yes" {
            return Some(true);
        }
        seen = true;
    }
    seen.then_some(false)
}

pub fn is_charging(text: &str) -> Option<bool> {
    capture_bool(&IS_CHARGING, text)
}

pub fn fully_charged(text: &str) -> Option<bool> {
    capture_bool(&FULLY_CHARGED, text)
}

/// Battery charge percentage, taken directly from `CurrentCapacity`.
pub fn battery_percent(text: &str) -> Option<u8> {
    capture_u64(&CURRENT_CAPACITY, text).map(|v| v.min(100) as u8)
}

pub fn time_remaining(text: &str) -> Option<TimeRemaining> {
    capture_u64(&TIME_REMAINING, text).map(TimeRemaining::from_minutes)
}

/// Convert a decikelvin reading to degrees Celsius.
pub fn decikelvin_to_celsius(raw: u64) -> f64 {
    raw as f64 / 10.0 - 273.15
}

pub fn temperature_celsius(text: &str) -> Option<f64> {
    capture_u64(&TEMPERATURE, text).map(decikelvin_to_celsius)
}

/// Battery voltage in volts.
pub fn voltage(text: &str) -> Option<f64> {
    capture_u64(&VOLTAGE, text).map(|mv| mv as f64 / 1000.0)
}

/// Reinterpret an unsigned 64-bit register value as signed.
///
/// Values that cannot be represented as a signed 64-bit integer after the
/// unwrap are rejected.
pub fn unwrap_amperage(raw: i128) -> Option<i64> {
    let value = if raw >= SIGNED_64_THRESHOLD {
        raw - UNSIGNED_64_RANGE
    } else {
        raw
    };
    i64::try_from(value).ok()
}

/// Battery current in mA; negative while discharging.
///
/// Prefers `InstantAmperage` and falls back to `Amperage`.
pub fn amperage(text: &str) -> Option<i64> {
    let raw = capture(&INSTANT_AMPERAGE, text).or_else(|| capture(&AMPERAGE, text))?;
    unwrap_amperage(raw.parse().ok()?)
}

pub fn cycle_count(text: &str) -> Option<u32> {
    capture_u64(&CYCLE_COUNT, text).and_then(|v| u32::try_from(v).ok())
}

pub fn design_capacity(text: &str) -> Option<u64> {
    capture_u64(&DESIGN_CAPACITY, text)
}

/// Present full-charge capacity in raw units (mAh).
pub fn raw_max_capacity(text: &str) -> Option<u64> {
    capture_u64(&RAW_MAX_CAPACITY, text)
}

/// Battery health as a percentage of design capacity, one decimal.
pub fn max_capacity_percent(current_capacity: u64, design_capacity: u64) -> Option<f64> {
    if design_capacity == 0 {
        return None;
    }
    Some(round_to(
        current_capacity as f64 / design_capacity as f64 * 100.0,
        1,
    ))
}

/// Charger values parsed from an adapter details block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdapterReading {
    pub voltage: Option<f64>,
    pub current_ma: Option<u32>,
    pub watts: Option<u32>,
}

/// Parse the inside of an adapter details dictionary.
///
/// Accepts both `Key=1` and `"Key"=1` / `Key:1` forms, with or without the
/// surrounding braces.
pub fn parse_adapter_block(block: &str) -> AdapterReading {
    let padded = format!(" {}", block);
    let int = |re: &Regex| capture_u64(re, &padded).and_then(|v| u32::try_from(v).ok());

    AdapterReading {
        voltage: capture_u64(&ADAPTER_VOLTAGE, &padded).map(|mv| mv as f64 / 1000.0),
        current_ma: int(&ADAPTER_CURRENT),
        watts: int(&ADAPTER_WATTS),
    }
}

/// Locate the adapter details block and parse it.
pub fn adapter_details(text: &str) -> Option<AdapterReading> {
    capture(&ADAPTER_BLOCK, text).map(parse_adapter_block)
}

/// Battery condition word from the power profile report, e.g. "Normal".
pub fn condition(text: &str) -> Option<String> {
    capture(&CONDITION, text).map(str::to_string)
}

/// Low power mode flag from the power settings report. Missing means off.
pub fn low_power_mode(text: &str) -> bool {
    capture(&LOW_POWER_MODE, text) == Some("1")
}

/// All fast-path fields found in one battery info report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryReading {
    pub external_power: Option<bool>,
    pub is_charging: Option<bool>,
    pub fully_charged: Option<bool>,
    pub battery_percent: Option<u8>,
    pub time_remaining: Option<TimeRemaining>,
    pub temperature_celsius: Option<f64>,
    pub voltage: Option<f64>,
    pub amperage_ma: Option<i64>,
    pub cycle_count: Option<u32>,
    pub design_capacity: Option<u64>,
    pub raw_max_capacity: Option<u64>,
    pub adapter: Option<AdapterReading>,
}

impl BatteryReading {
    pub fn parse(text: &str) -> Self {
        Self {
            external_power: external_power(text),
            is_charging: is_charging(text),
            fully_charged: fully_charged(text),
            battery_percent: battery_percent(text),
            time_remaining: time_remaining(text),
            temperature_celsius: temperature_celsius(text),
            voltage: voltage(text),
            amperage_ma: amperage(text),
            cycle_count: cycle_count(text),
            design_capacity: design_capacity(text),
            raw_max_capacity: raw_max_capacity(text),
            adapter: adapter_details(text),
        }
    }

    /// True when no field at all was found (failed or empty fetch).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_status_flags(&self) -> bool {
        self.external_power.is_some() || self.is_charging.is_some() || self.fully_charged.is_some()
    }
}

/// Slow-path fields from the power profile and power settings reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlowReading {
    pub condition: Option<String>,
    pub low_power_mode: bool,
}

impl SlowReading {
    pub fn parse(profile_text: &str, settings_text: &str) -> Self {
        Self {
            condition: condition(profile_text),
            low_power_mode: low_power_mode(settings_text),
        }
    }
}
