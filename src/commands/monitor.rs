//! Power monitor command handler.
//!
//! Runs the collector and shows its snapshot either in the TUI dashboard
//! or as a stream of JSON lines.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::power_monitor::{
    ChannelNotifier, PowerCollector, SamplingMode, SharedSnapshot, SystemCommandRunner,
};
use crate::core::Config;
use crate::ui::monitor_tui::{run_monitor_app, MonitorAppConfig};

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let mode = resolve_mode(matches, &config);

    if matches.get_flag("json") {
        return run_json_output(mode, &config);
    }

    let app_config = MonitorAppConfig {
        mode,
        command_timeout: config.command_timeout(),
        collector: config.collector_config(),
    };

    run_monitor_app(app_config).context("Failed to run power monitor")
}

/// `--mode` wins over the configured default
pub(crate) fn resolve_mode(matches: &ArgMatches, config: &Config) -> SamplingMode {
    matches
        .get_one::<String>("mode")
        .map(|token| SamplingMode::from_token(token))
        .unwrap_or(config.default_mode)
}

/// Print one JSON snapshot per collector cycle until Ctrl+C
fn run_json_output(mode: SamplingMode, config: &Config) -> Result<()> {
    let shared = SharedSnapshot::with_mode(mode);
    let (notifier, updates) = ChannelNotifier::new();

    let collector = PowerCollector::with_config(
        SystemCommandRunner::with_timeout(config.command_timeout()),
        shared.clone(),
        notifier,
        config.collector_config(),
    )
    .spawn()
    .context("Failed to start power collector")?;

    let stop = collector.stop_signal();
    ctrlc::set_handler(move || {
        eprintln!("{}", "Stopping power monitor...".yellow());
        stop.stop();
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    // The channel closes once the collector thread exits and drops its notifier
    while updates.recv().is_ok() {
        let snapshot = shared.snapshot();
        println!("{}", serde_json::to_string(&snapshot)?);
    }

    collector.join()?;
    Ok(())
}
