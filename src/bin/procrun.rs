// src/bin/procrun.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use procrun::{
    cli::{self, Cli, help, logging},
    core::orchestrator::Orchestrator,
};

/// The main entry point of the `procrun` application. It parses the CLI into
/// a context, sets up logging, assembles the orchestrator from the
/// configuration file, and performs centralized error handling.
fn main() {
    if let Err(e) = run_cli(Cli::parse()) {
        // Fatal precondition errors land here; per-run failures are logged
        // inside the orchestration loop and never reach this boundary.
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let context = cli::parse_context(&cli.args);
    logging::init(&context)?;
    log::debug!("CLI context parsed: {}", context);

    let wants_help = context.has_value_for_key("help");
    let orchestrator = match cli::config_file_option().value(&context) {
        Some(path) => match Orchestrator::from_config_file(&path) {
            Ok(orchestrator) => Some(orchestrator),
            // Help must come up even when the named configuration is broken;
            // it just cannot list the options that configuration contributes.
            Err(e) if wants_help => {
                log::warn!("Ignoring configuration file error: {:#}", e);
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };

    // No configuration to run, or -help: usage and a clean exit.
    let Some(orchestrator) = orchestrator else {
        return help::print_usage(None, &context);
    };
    if wants_help {
        return help::print_usage(Some(&orchestrator), &context);
    }

    cli::check_global_options(&context)?;
    orchestrator.check_for_unknown_options(&context, &cli::global_option_definitions())?;
    orchestrator.run(context)
}
