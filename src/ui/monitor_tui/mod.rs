//! Battery and power dashboard.
//!
//! Draws the shared power snapshot with ratatui and redraws whenever the
//! collector finishes a cycle.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{run_monitor_app, MonitorApp, MonitorAppConfig};
pub use event_handler::MonitorEvent;
