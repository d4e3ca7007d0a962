//! The organisation settings API, seen from the editor.
//!
//! The editor never talks to the network directly. It goes through
//! [`SettingsBackend`], which has three implementations: an in-memory one
//! for tests and demos, a JSON file that stands in for the server, and the
//! real HTTP API.

mod file;
mod http;
mod memory;

pub use file::FileBackend;
pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::config::{IntegrationConfig, Organisation};
use crate::error::BackendError;
use crate::field::{FieldId, FieldKind};
use crate::mask::{is_masked, redact};
use crate::payload::UpdatePayload;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Short human-readable description of where settings live.
    fn describe(&self) -> String;

    /// Fetch the organisation with secrets masked.
    async fn fetch(&self) -> Result<Organisation, BackendError>;

    /// Apply a partial update and return the confirmed organisation.
    async fn update(&self, payload: &UpdatePayload) -> Result<Organisation, BackendError>;
}

/// Copy of `org` with every present secret replaced by its placeholder.
pub(crate) fn redacted(org: &Organisation) -> Organisation {
    let mut out = org.clone();
    for field in FieldId::ALL.iter().filter(|f| f.is_secret()) {
        if let Some(slot) = out.integration_config.text_slot(*field) {
            if let Some(secret) = slot.as_deref() {
                *slot = Some(redact(secret));
            }
        }
    }
    out
}

/// Server-side merge of a partial update into stored (unmasked) config.
///
/// Rejects placeholders outright, the way the API does, so a leaked mask
/// surfaces as an upstream rejection instead of a corrupted secret.
pub(crate) fn apply_payload(
    config: &mut IntegrationConfig,
    payload: &UpdatePayload,
) -> Result<(), BackendError> {
    for field in payload.fields() {
        let value = payload.get(field).cloned().unwrap_or(Value::Null);
        match (field.kind(), value) {
            (FieldKind::Flag, Value::Bool(b)) => {
                if let Some(slot) = config.flag_slot(field) {
                    *slot = b;
                }
            }
            (FieldKind::Text, Value::Null) => {
                if let Some(slot) = config.text_slot(field) {
                    *slot = None;
                }
            }
            (FieldKind::Text, Value::String(s)) => {
                if field.is_secret() && is_masked(Some(s.as_str())) {
                    return Err(BackendError::Rejected {
                        status: 422,
                        message: format!("{} looks like a masked placeholder", field),
                    });
                }
                if let Some(slot) = config.text_slot(field) {
                    *slot = if s.trim().is_empty() { None } else { Some(s) };
                }
            }
            (_, other) => {
                return Err(BackendError::Rejected {
                    status: 422,
                    message: format!("unexpected value for {}: {}", field, other),
                });
            }
        }
    }
    Ok(())
}
