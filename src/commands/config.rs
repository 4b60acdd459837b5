use crate::core::power_monitor::SamplingMode;
use crate::core::Config;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("set-mode", sub_matches)) => set_mode(sub_matches),
        _ => {
            println!("Use 'voltmon config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::get_config_path()?;

    println!("{}", "Config file:".white());
    println!("{}", path.display().to_string().cyan().bold());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn set_mode(matches: &clap::ArgMatches) -> Result<()> {
    let token = matches
        .get_one::<String>("mode")
        .context("Mode argument is required")?;
    let mode = SamplingMode::from_token(token);

    let mut config = Config::load()?;
    config.set_default_mode(mode);
    config.save()?;

    println!(
        "{} {} ({}s)",
        "✓ Default mode set to:".green(),
        mode.label().bold(),
        mode.interval_secs()
    );

    Ok(())
}
