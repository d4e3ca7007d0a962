//! Client settings: which backend the CLI talks to.
//!
//! Stored as TOML at `~/.config/orgcfg/config.toml` (Unix) or
//! `%APPDATA%/orgcfg/config.toml` (Windows).

use crate::backend::{FileBackend, HttpBackend, SettingsBackend};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "orgcfg";

fn default_token_env() -> String {
    "ORGCFG_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn config_base() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendSettings {
    /// Local JSON file standing in for the settings API.
    File { path: PathBuf },
    /// The organisation settings REST API.
    Http {
        base_url: String,
        organisation_id: String,
        /// Environment variable holding the bearer token.
        #[serde(default = "default_token_env")]
        token_env: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings::File {
            path: config_base().join("organisation.json"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    #[serde(default)]
    pub backend: BackendSettings,
}

impl ClientSettings {
    /// Build the configured backend. The HTTP token is read from the
    /// environment at this point, never from the settings file.
    pub fn build_backend(&self) -> Result<Box<dyn SettingsBackend>, BackendError> {
        match &self.backend {
            BackendSettings::File { path } => Ok(Box::new(FileBackend::new(path.clone()))),
            BackendSettings::Http {
                base_url,
                organisation_id,
                token_env,
                timeout_secs,
            } => {
                let token = std::env::var(token_env).ok().filter(|t| !t.is_empty());
                if token.is_none() {
                    tracing::warn!(env = %token_env, "no API token set; requests are unauthenticated");
                }
                let backend = HttpBackend::with_timeout(
                    base_url,
                    organisation_id,
                    token,
                    Duration::from_secs(*timeout_secs),
                )?;
                Ok(Box::new(backend))
            }
        }
    }
}

/// Errors from client settings storage.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new_default() -> Self {
        Self {
            path: config_base().join("config.toml"),
        }
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(&self) -> Result<ClientSettings, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => toml::from_str(&content).map_err(|e| SettingsError::Parse {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientSettings::default()),
            Err(e) => Err(SettingsError::Io(e.to_string())),
        }
    }

    pub fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }
        let content =
            toml::to_string_pretty(settings).map_err(|e| SettingsError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("config.toml"));
        let settings = store.load().unwrap();
        assert!(matches!(settings.backend, BackendSettings::File { .. }));
    }

    #[test]
    fn test_http_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested").join("config.toml"));
        let settings = ClientSettings {
            backend: BackendSettings::Http {
                base_url: "https://api.example.com/v1".into(),
                organisation_id: "org_1".into(),
                token_env: default_token_env(),
                timeout_secs: 10,
            },
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_parse_minimal_http_table() {
        let settings: ClientSettings = toml::from_str(
            r#"
            [backend]
            kind = "http"
            base_url = "https://api.example.com"
            organisation_id = "org_9"
            "#,
        )
        .unwrap();
        match settings.backend {
            BackendSettings::Http {
                token_env,
                timeout_secs,
                ..
            } => {
                assert_eq!(token_env, "ORGCFG_TOKEN");
                assert_eq!(timeout_secs, 30);
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend = [").unwrap();
        let err = SettingsStore::new(path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
