// Command handlers module
pub mod config;
pub mod monitor;
pub mod status;
pub mod version;

// Re-exports for cleaner imports
pub use version::execute as version;
