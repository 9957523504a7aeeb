//! breeze CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use breeze_cli::cli::{Cli, Command, ConfigAction};
use breeze_cli::commands;
use breeze_cli::config::CliConfig;
use breeze_cli::error::CliResult;
use breeze_core::tracing::init_tracing;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    let verbosity = if cli.debug || config.debug { 2 } else { 0 };
    init_tracing(config.tracing(verbosity)?)?;

    let json = cli.json;
    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
            ConfigAction::Validate => commands::config::validate(&config),
        },
        Command::Whoami => commands::session::run(&config, |client| commands::info::whoami(client, json)),
        Command::Meetings { like, mine } => commands::session::run(&config, |client| {
            commands::meetings::list(client, like.as_deref(), mine, json)
        }),
        Command::Contents { sco_id } => commands::session::run(&config, |client| {
            commands::meetings::contents(client, &sco_id, json)
        }),
        Command::Quotas => commands::session::run(&config, |client| commands::info::quotas(client, json)),
        Command::Principals { group } => commands::session::run(&config, |client| {
            commands::info::principals(client, group.as_deref(), json)
        }),
    }
}
