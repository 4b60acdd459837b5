use anyhow::Result;
use clap::{Arg, Command};

use voltmon::commands;

fn mode_arg() -> Arg {
    Arg::new("mode")
        .short('m')
        .long("mode")
        .value_name("MODE")
        .help("Sampling mode: perf (0.5s), balanced (2s) or eco (5s)")
}

fn json_arg(help: &'static str) -> Arg {
    Arg::new("json")
        .long("json")
        .help(help)
        .action(clap::ArgAction::SetTrue)
}

fn main() -> Result<()> {
    let matches = Command::new("voltmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Battery and power monitor for macOS")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("monitor")
                .about("Live battery and power dashboard")
                .arg(mode_arg())
                .arg(json_arg("Print one JSON snapshot per cycle instead of the dashboard")),
        )
        .subcommand(
            Command::new("status")
                .about("Collect once and print a power report")
                .arg(json_arg("Print the snapshot as JSON")),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change configuration (use 'voltmon config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the config file path and contents"))
                .subcommand(
                    Command::new("set-mode")
                        .about("Set the default sampling mode")
                        .arg(
                            Arg::new("mode")
                                .help("perf, balanced or eco")
                                .required(true)
                                .index(1),
                        ),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => {
            // Log lines would corrupt the dashboard, JSON mode keeps stderr for them
            if sub_matches.get_flag("json") {
                voltmon::init_logging();
            } else {
                voltmon::init_logging_with(log::LevelFilter::Warn);
            }
            commands::monitor::execute(sub_matches)?;
        }
        Some(("status", sub_matches)) => {
            voltmon::init_logging_with(log::LevelFilter::Warn);
            commands::status::execute(sub_matches)?;
        }
        Some(("config", sub_matches)) => {
            voltmon::init_logging_with(log::LevelFilter::Warn);
            commands::config::execute(sub_matches)?;
        }
        Some(("version", _)) => {
            commands::version()?;
        }
        _ => {
            println!("Welcome to voltmon!");
            println!("Use 'voltmon --help' for more information.");
        }
    }

    Ok(())
}
