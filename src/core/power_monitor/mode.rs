//! Sampling mode presets.
//!
//! A mode picks how often the collector polls the battery. The active mode
//! lives inside the shared snapshot so a change is picked up the next time
//! the collector computes its sleep.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingMode {
    Performance,
    #[default]
    Balanced,
    Eco,
}

impl SamplingMode {
    pub const ALL: [SamplingMode; 3] = [
        SamplingMode::Performance,
        SamplingMode::Balanced,
        SamplingMode::Eco,
    ];

    /// Poll interval in seconds.
    pub fn interval_secs(self) -> f64 {
        match self {
            SamplingMode::Performance => 0.5,
            SamplingMode::Balanced => 2.0,
            SamplingMode::Eco => 5.0,
        }
    }

    pub fn poll_interval(self) -> Duration {
        Duration::from_secs_f64(self.interval_secs())
    }

    /// Parse a free-text selection.
    ///
    /// Anything containing "perf" is Performance, anything containing "eco"
    /// is Eco, everything else falls back to Balanced. Surrounding braces and
    /// quotes (as produced by stringified selection sets) are ignored.
    pub fn from_token(token: &str) -> Self {
        let raw = token
            .trim()
            .trim_matches(|c| matches!(c, '{' | '}' | '\'' | '"'))
            .to_lowercase();

        if raw.contains("perf") {
            SamplingMode::Performance
        } else if raw.contains("eco") {
            SamplingMode::Eco
        } else {
            SamplingMode::Balanced
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SamplingMode::Performance => "PERFORMANCE",
            SamplingMode::Balanced => "BALANCED",
            SamplingMode::Eco => "ECO",
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SamplingMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}
