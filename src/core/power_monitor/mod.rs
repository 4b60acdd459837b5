//! Power and battery monitoring core.
//!
//! This module samples the battery subsystem through OS diagnostic commands,
//! parses their output and keeps a shared snapshot of the current state plus
//! a rolling history of power draw.

mod collector;
mod command;
pub mod extract;
mod history;
mod metrics;
mod mode;
mod notifier;
mod state;

pub use collector::{
    CollectorConfig, CollectorHandle, PowerCollector, StopSignal, DEFAULT_SLOW_PATH_INTERVAL,
};
pub use command::{CommandRunner, DiagnosticCommand, SystemCommandRunner, DEFAULT_COMMAND_TIMEOUT};
pub use extract::{AdapterReading, BatteryReading, SlowReading};
pub use history::{PowerHistory, POWER_HISTORY_SIZE};
pub use metrics::{
    ChargerDetails, ChargingStatus, MetricsSnapshot, PowerSource, TimeRemaining, DEFAULT_CONDITION,
};
pub use mode::SamplingMode;
pub use notifier::{ChangeNotifier, ChannelNotifier, NoopNotifier};
pub use state::SharedSnapshot;
