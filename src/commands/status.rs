//! One-shot power status report.

use anyhow::Result;
use clap::ArgMatches;

use crate::core::power_monitor::{NoopNotifier, PowerCollector, SharedSnapshot, SystemCommandRunner};
use crate::core::Config;
use crate::ui::formatters::format_report;

/// Execute the status command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let shared = SharedSnapshot::with_mode(config.default_mode);

    // The first cycle always includes the slow path
    let mut collector = PowerCollector::with_config(
        SystemCommandRunner::with_timeout(config.command_timeout()),
        shared.clone(),
        NoopNotifier,
        config.collector_config(),
    );
    collector.run_cycle();

    let snapshot = shared.snapshot();
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", format_report(&snapshot));
    }

    Ok(())
}
