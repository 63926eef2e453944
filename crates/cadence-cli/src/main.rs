use anyhow::Result;
use cadence_core::error::CoreError;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod vault;
mod views;

use commands::Context;
use vault::VaultStore;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: cli::Cli) -> Result<()> {
    let mut config = config::Config::new().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable configuration");
        config::Config::default()
    });
    if let Some(vault) = cli.vault {
        config.vault = vault;
    }
    if cli.strict {
        config.strict_rrule = true;
    }

    let today = match cli.today.as_deref() {
        Some(input) => Some(parser::parse_date(input, chrono::Local::now().date_naive())?),
        None => None,
    };
    let mut store = VaultStore::open(&config.vault)?;
    let ctx = Context::new(config, today);

    match cli.command {
        cli::Commands::List(command) => commands::list::list_tasks(&mut store, &ctx, command),
        cli::Commands::Materialize => commands::materialize::materialize(&mut store, &ctx),
        cli::Commands::Preview(command) => commands::preview::preview(&store, &ctx, command),
        cli::Commands::Done(command) => commands::done::done_task(&mut store, &ctx, command),
        cli::Commands::Skip(command) => commands::skip::skip_occurrence(&mut store, &ctx, command),
        cli::Commands::Reopen(command) => commands::done::reopen_task(&mut store, &ctx, command),
        cli::Commands::Move(command) => commands::reschedule::move_task(&mut store, &ctx, command),
        cli::Commands::Recur(command) => commands::recur::recur_task(&mut store, &ctx, command),
        cli::Commands::Uncur(command) => commands::uncur::uncur_task(&mut store, &ctx, command),
        cli::Commands::Watch(command) => commands::watch::watch(&mut store, &ctx, command).await,
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} Not found: {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousKey(keys) => {
                eprintln!("{}", "Error: Ambiguous task name.".style(error_style));
                eprintln!("Did you mean one of these?");
                for key in keys {
                    eprintln!("  {}", key.yellow());
                }
            }
            CoreError::NotAnOccurrence(date) => {
                eprintln!(
                    "{} {} is not an active occurrence of this task",
                    "Error:".style(error_style),
                    date.yellow()
                );
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
