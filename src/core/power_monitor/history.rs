use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const POWER_HISTORY_SIZE: usize = 100;

/// Fixed-size rolling window of power draw samples (for sparklines).
///
/// The buffer starts filled with zeros and always holds exactly
/// `capacity` samples; pushing evicts the oldest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerHistory {
    samples: VecDeque<f64>,
}

impl PowerHistory {
    pub fn new() -> Self {
        Self::with_capacity(POWER_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: std::iter::repeat(0.0).take(capacity).collect(),
        }
    }

    pub fn push(&mut self, watts: f64) {
        self.samples.pop_front();
        self.samples.push_back(watts);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn latest(&self) -> f64 {
        self.samples.back().copied().unwrap_or_default()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn max(&self) -> f64 {
        self.iter().fold(0.0, f64::max)
    }

    /// Convert samples to u64 for the sparkline widget.
    /// Scales values by 100 to keep the two decimals of precision.
    pub fn as_u64(&self) -> Vec<u64> {
        self.iter().map(|v| (v.max(0.0) * 100.0).round() as u64).collect()
    }
}

impl Default for PowerHistory {
    fn default() -> Self {
        Self::new()
    }
}
