use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, OutputFormat};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; -v raises the default level, RUST_LOG wins.
    let default_filter = match cli.verbose {
        0 => "orgcfg_cli=info,orgcfg_core=warn",
        1 => "orgcfg_cli=debug,orgcfg_core=info",
        _ => "orgcfg_cli=trace,orgcfg_core=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        None | Some(Commands::Show) => show::run(&cli).await,
        Some(Commands::Fields) => fields::run(&cli).await,
        Some(Commands::Apply {
            set,
            clear,
            enable,
            disable,
            yes,
            dry_run,
        }) => {
            apply::run(
                &cli,
                apply::ApplyArgs {
                    set: set.clone(),
                    clear: clear.clone(),
                    enable: enable.clone(),
                    disable: disable.clone(),
                    yes: *yes,
                    dry_run: *dry_run,
                },
            )
            .await
        }
        Some(Commands::Edit) => edit::run(&cli).await,
        Some(Commands::Config { action }) => config::run(&cli, action.clone()).await,
    };

    if let Err(e) = result {
        match (&e, cli.output) {
            (CommandError::Editor(inner), OutputFormat::Json) => {
                eprintln!("{}", inner.to_json());
            }
            (CommandError::Editor(orgcfg_core::EditorError::Validation(errors)), _) => {
                eprintln!("{}: validation failed", "Error".red().bold());
                for issue in errors.issues() {
                    eprintln!("  {} {}", "•".red(), issue);
                }
            }
            _ => eprintln!("{}: {}", "Error".red().bold(), e),
        }
        process::exit(1);
    }
}
