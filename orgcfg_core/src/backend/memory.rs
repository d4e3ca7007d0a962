use super::{apply_payload, redacted, SettingsBackend};
use crate::config::Organisation;
use crate::error::BackendError;
use crate::payload::UpdatePayload;
use async_trait::async_trait;
use std::sync::Mutex;

/// A simple in-memory backend, mainly for testing.
///
/// Holds the unmasked organisation, serves the masked view and records every
/// payload it accepted.
pub struct MemoryBackend {
    org: Mutex<Organisation>,
    received: Mutex<Vec<UpdatePayload>>,
    reject_updates: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new(org: Organisation) -> Self {
        Self {
            org: Mutex::new(org),
            received: Mutex::new(Vec::new()),
            reject_updates: Mutex::new(None),
        }
    }

    /// Make every following update fail with `message`.
    pub fn reject_updates(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.reject_updates.lock() {
            *guard = Some(message.into());
        }
    }

    pub fn accept_updates(&self) {
        if let Ok(mut guard) = self.reject_updates.lock() {
            *guard = None;
        }
    }

    /// Payloads accepted so far, oldest first.
    pub fn received(&self) -> Vec<UpdatePayload> {
        self.received
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// The stored, unmasked organisation.
    pub fn stored(&self) -> Option<Organisation> {
        self.org.lock().ok().map(|o| o.clone())
    }

    fn lock_error<T>(e: std::sync::PoisonError<T>) -> BackendError {
        BackendError::Other(format!("lock poisoned: {}", e))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Organisation::default())
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    async fn fetch(&self) -> Result<Organisation, BackendError> {
        let org = self.org.lock().map_err(Self::lock_error)?;
        Ok(redacted(&org))
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<Organisation, BackendError> {
        if let Some(message) = self.reject_updates.lock().map_err(Self::lock_error)?.clone() {
            return Err(BackendError::Rejected {
                status: 500,
                message,
            });
        }

        let mut org = self.org.lock().map_err(Self::lock_error)?;
        let mut next = org.integration_config.clone();
        apply_payload(&mut next, payload)?;
        org.integration_config = next;

        self.received
            .lock()
            .map_err(Self::lock_error)?
            .push(payload.clone());
        Ok(redacted(&org))
    }
}
