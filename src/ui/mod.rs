// UI and formatting module

pub mod formatters;
pub mod monitor_tui;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_celsius, format_charger, format_last_update, format_report, format_status_line,
    format_watts,
};
