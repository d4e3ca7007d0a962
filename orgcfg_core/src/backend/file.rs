use super::{apply_payload, redacted, SettingsBackend};
use crate::config::Organisation;
use crate::error::BackendError;
use crate::payload::UpdatePayload;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A JSON file holding the unmasked organisation, standing in for the
/// settings API. Reads are redacted exactly like the server's responses.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Organisation, BackendError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NotFound(self.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, org: &Organisation) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let s = serde_json::to_string_pretty(org)?;
        std::fs::write(&self.path, s)?;

        // Owner read/write only; the file holds real secrets.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

#[async_trait]
impl SettingsBackend for FileBackend {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<Organisation, BackendError> {
        let org = self.read()?;
        debug!(path = %self.path.display(), org = %org.id, "read organisation");
        Ok(redacted(&org))
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<Organisation, BackendError> {
        let mut org = self.read()?;
        apply_payload(&mut org.integration_config, payload)?;
        self.write(&org)?;
        debug!(path = %self.path.display(), fields = payload.fields().len(), "applied update");
        Ok(redacted(&org))
    }
}
