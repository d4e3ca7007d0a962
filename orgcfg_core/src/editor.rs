//! The config editor controller.
//!
//! Owns one editing session's state and is the only way to mutate it. Every
//! edit goes through a method here so the touched set, the toggles and the
//! cache of real values stay consistent with the config itself.

use crate::backend::SettingsBackend;
use crate::config::Organisation;
use crate::error::EditorError;
use crate::field::{FieldId, FieldKind};
use crate::mask::SecretState;
use crate::payload::{build_update_payload, UpdatePayload};
use crate::state::ConfigEditorState;
use crate::toggle::{self, Confirm, Integration, ToggleOutcome};
use crate::validation::{self, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Placeholder text rendered in an empty input backed by a masked secret.
pub const MASKED_HINT: &str = "Stored securely. Enter a new value to replace it";

/// What a form input for a field shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDisplay {
    pub field: FieldId,
    /// Text in the input. Empty for masked secrets.
    pub value: String,
    /// Greyed hint shown when `value` is empty.
    pub placeholder: Option<String>,
    pub state: SecretState,
    pub touched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// No field qualified for the payload; no request was sent.
    NothingToSave,
    Saved {
        fields: Vec<FieldId>,
        saved_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigEditor {
    organisation_id: String,
    organisation_name: String,
    state: ConfigEditorState,
}

impl ConfigEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_organisation(org: Organisation) -> Self {
        let mut editor = Self::new();
        editor.load(org);
        editor
    }

    /// Replace everything with fresh server data, discarding unsaved edits.
    pub fn load(&mut self, org: Organisation) {
        info!(org = %org.id, "loaded integration settings");
        self.organisation_id = org.id;
        self.organisation_name = org.name;
        self.state = ConfigEditorState::new(org.integration_config);
    }

    pub fn organisation_id(&self) -> &str {
        &self.organisation_id
    }

    pub fn organisation_name(&self) -> &str {
        &self.organisation_name
    }

    pub fn state(&self) -> &ConfigEditorState {
        &self.state
    }

    pub fn is_enabled(&self, integration: Integration) -> bool {
        self.state.toggles.get(integration)
    }

    /// True when at least one field has been edited since load or save.
    pub fn is_dirty(&self) -> bool {
        !self.state.touched.is_empty()
    }

    /// Edit a text field. Blank input clears it.
    pub fn set_text(&mut self, field: FieldId, value: Option<String>) -> Result<(), EditorError> {
        if field.kind() != FieldKind::Text {
            return Err(EditorError::FieldKind {
                field,
                actual: "flag",
            });
        }
        if let Some(integration) = Integration::governing(field) {
            if !self.state.toggles.get(integration) {
                return Err(EditorError::IntegrationDisabled { field, integration });
            }
        }

        // Secrets are stored exactly as typed; other text is trimmed.
        let value = value.filter(|v| !v.trim().is_empty()).map(|v| {
            if field.is_secret() {
                v
            } else {
                v.trim().to_string()
            }
        });
        self.state.touched.mark_touched(field);
        if let Some(slot) = self.state.config.text_slot(field) {
            *slot = value;
        }
        Ok(())
    }

    pub fn set_flag(&mut self, field: FieldId, value: bool) -> Result<(), EditorError> {
        if field == FieldId::S3Enabled {
            // The S3 flag is owned by the toggle so its fields get cached.
            return Err(EditorError::FieldKind {
                field,
                actual: "toggle",
            });
        }
        let slot = self.state.config.flag_slot(field).ok_or(EditorError::FieldKind {
            field,
            actual: "text",
        })?;
        *slot = value;
        self.state.touched.mark_touched(field);
        Ok(())
    }

    /// Flip an integration on or off, asking `confirm` where the
    /// integration needs it.
    pub fn set_enabled(
        &mut self,
        integration: Integration,
        enabled: bool,
        confirm: &mut dyn Confirm,
    ) -> ToggleOutcome {
        let outcome = toggle::set_enabled(&mut self.state, integration, enabled, confirm);
        info!(integration = %integration, enabled, ?outcome, "toggle");
        outcome
    }

    pub fn display(&self, field: FieldId) -> FieldDisplay {
        let touched = self.state.touched.is_touched(field);
        if field.kind() == FieldKind::Flag {
            let value = self.state.config.flag(field).unwrap_or_default();
            return FieldDisplay {
                field,
                value: value.to_string(),
                placeholder: None,
                state: SecretState::Real,
                touched,
            };
        }

        let current = self.state.config.text(field);
        let state = SecretState::classify(current);
        let (value, placeholder) = match state {
            SecretState::Masked => (String::new(), Some(MASKED_HINT.to_string())),
            SecretState::Absent => (String::new(), None),
            SecretState::Real => (current.unwrap_or_default().to_string(), None),
        };
        FieldDisplay {
            field,
            value,
            placeholder,
            state,
            touched,
        }
    }

    pub fn payload(&self) -> UpdatePayload {
        build_update_payload(&self.state.config, &self.state.touched)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate(&self.state)
    }

    /// Validate, send the minimal payload and reload from the confirmed
    /// resource.
    ///
    /// Validation failures block the request. On upstream failure the
    /// touched set is kept so the operator can retry.
    pub async fn save(
        &mut self,
        backend: &dyn SettingsBackend,
    ) -> Result<SaveOutcome, EditorError> {
        self.validate()?;

        let payload = self.payload();
        if payload.is_empty() {
            info!("nothing to save");
            return Ok(SaveOutcome::NothingToSave);
        }
        let fields = payload.fields();

        let confirmed = backend.update(&payload).await.map_err(|e| {
            warn!(error = %e, "save failed");
            EditorError::Backend(e)
        })?;

        info!(fields = fields.len(), backend = %backend.describe(), "saved integration settings");
        self.load(confirmed);
        Ok(SaveOutcome::Saved {
            fields,
            saved_at: Utc::now(),
        })
    }

    /// Discard local edits and load the latest server state.
    pub async fn reload(&mut self, backend: &dyn SettingsBackend) -> Result<(), EditorError> {
        let org = backend.fetch().await?;
        self.load(org);
        Ok(())
    }
}
