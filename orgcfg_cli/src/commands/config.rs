use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::{settings_store, CommandError, Result};
use crate::output::{format_output, OutputData};
use orgcfg_core::settings::{BackendSettings, ClientSettings};
use owo_colors::OwoColorize;

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::UseFile { path } => {
            let path = if path.is_absolute() {
                path
            } else {
                std::env::current_dir()?.join(path)
            };
            save_backend(cli, BackendSettings::File { path })
        }
        ConfigAction::UseHttp {
            base_url,
            organisation_id,
            token_env,
            timeout_secs,
        } => {
            if timeout_secs == 0 {
                return Err(CommandError::InvalidArgument(
                    "--timeout-secs must be greater than zero".to_string(),
                ));
            }
            save_backend(
                cli,
                BackendSettings::Http {
                    base_url,
                    organisation_id,
                    token_env,
                    timeout_secs,
                },
            )
        }
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let store = settings_store(cli);
    let settings = store.load()?;

    if cli.output == OutputFormat::Pretty {
        println!();
        println!("{}", "Client Settings".bold().cyan());
        println!("{}", "===============".cyan());
        println!();
        println!("Settings file: {}", store.path().display().dimmed());
        match &settings.backend {
            BackendSettings::File { path } => {
                println!("Backend:       {} {}", "file".green(), path.display());
            }
            BackendSettings::Http {
                base_url,
                organisation_id,
                token_env,
                timeout_secs,
            } => {
                let token_state = if std::env::var(token_env).is_ok() {
                    "set".green().to_string()
                } else {
                    "not set".yellow().to_string()
                };
                println!("Backend:       {} {}", "http".green(), base_url);
                println!("Organisation:  {}", organisation_id.cyan());
                println!("Token env:     {} ({})", token_env, token_state);
                println!("Timeout:       {}s", timeout_secs);
            }
        }
        println!();
        return Ok(());
    }

    let value = serde_json::to_value(&settings)?;
    format_output(&OutputData::ClientSettings(value), &cli.output)
}

fn save_backend(cli: &Cli, backend: BackendSettings) -> Result<()> {
    let store = settings_store(cli);
    let mut settings: ClientSettings = store.load().unwrap_or_default();
    settings.backend = backend;
    // Fail early on settings that cannot produce a backend.
    settings.build_backend()?;
    store.save(&settings)?;
    println!(
        "{} Settings written to {}",
        "Success!".green().bold(),
        store.path().display().cyan()
    );
    Ok(())
}
