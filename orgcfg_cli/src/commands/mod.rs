pub mod apply;
pub mod config;
pub mod edit;
pub mod fields;
pub mod show;

use crate::cli::Cli;
use orgcfg_core::settings::{ClientSettings, SettingsError, SettingsStore};
use orgcfg_core::SettingsBackend;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Editor(#[from] orgcfg_core::EditorError),

    #[error("Backend error: {0}")]
    Backend(#[from] orgcfg_core::BackendError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

pub fn settings_store(cli: &Cli) -> SettingsStore {
    match &cli.config {
        Some(path) => SettingsStore::new(path.clone()),
        None => SettingsStore::new_default(),
    }
}

pub fn load_settings(cli: &Cli) -> Result<ClientSettings> {
    Ok(settings_store(cli).load()?)
}

pub fn open_backend(cli: &Cli) -> Result<Box<dyn SettingsBackend>> {
    let settings = load_settings(cli)?;
    let backend = settings.build_backend()?;
    tracing::debug!(backend = %backend.describe(), "opened backend");
    Ok(backend)
}

/// `[y/N]` prompt on stdout. Anything but `y`/`yes` is a no.
pub fn confirm_prompt(prompt: &str) -> bool {
    print!("{} {} ", prompt.yellow(), "[y/N]".dimmed());
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn read_secret(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    // Use rpassword for hidden input; the value is kept as typed.
    match rpassword::read_password() {
        Ok(password) => Ok(password),
        Err(_) => {
            // Fallback to regular input if rpassword fails (e.g., in non-TTY)
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            Ok(strip_line_ending(&input).to_string())
        }
    }
}

/// Drop the trailing newline `read_line` leaves behind, nothing else.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
