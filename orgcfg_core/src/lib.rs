// src/lib.rs
//! Masked-secret reconciliation for organisation integration settings.
//!
//! The settings API returns stored secrets (SendGrid, Twilio, S3) as masked
//! placeholders. This crate lets an operator edit those settings and saves
//! only what they actually changed, without ever sending a placeholder back
//! or clobbering a secret the server holds.
pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod field;
pub mod mask;
pub mod payload;
pub mod settings;
pub mod state;
pub mod toggle;
pub mod touched;
pub mod validation;

pub use crate::backend::{FileBackend, HttpBackend, MemoryBackend, SettingsBackend};
pub use crate::config::{IntegrationConfig, Organisation, S3Storage, TwilioConfig};
pub use crate::editor::{ConfigEditor, FieldDisplay, SaveOutcome};
pub use crate::error::{BackendError, EditorError};
pub use crate::field::{FieldId, FieldKind};
pub use crate::mask::{is_masked, SecretState};
pub use crate::payload::{build_update_payload, UpdatePayload};
pub use crate::toggle::{Confirm, Integration, ToggleOutcome};
pub use crate::touched::TouchedFields;
