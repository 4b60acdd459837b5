// Voltmon Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, VoltError};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use self::core::config::Config;

// Initialize logging
pub fn init_logging() {
    init_logging_with(log::LevelFilter::Info);
}

/// Initialize logging with a custom default level (RUST_LOG still wins).
pub fn init_logging_with(default_level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
