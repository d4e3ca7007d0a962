//! Enable/disable switches for the email, SMS and S3 integrations.
//!
//! Disabling an integration clears its governed fields, stashing any real
//! values first; enabling it puts the stashed values back. Masked
//! placeholders are never stashed, so a disable/enable cycle cannot write a
//! placeholder back as a secret.

use crate::field::FieldId;
use crate::state::ConfigEditorState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    Email,
    Sms,
    S3,
}

impl Integration {
    pub const ALL: &'static [Integration] = &[Integration::Email, Integration::Sms, Integration::S3];

    /// Fields a toggle clears and restores.
    pub fn governed_fields(self) -> &'static [FieldId] {
        match self {
            Integration::Email => &[FieldId::SendgridApiKey],
            Integration::Sms => &[
                FieldId::TwilioAccountSid,
                FieldId::TwilioAuthToken,
                FieldId::TwilioFromNumber,
            ],
            Integration::S3 => &[
                FieldId::S3AccessKeyId,
                FieldId::S3SecretAccessKey,
                FieldId::S3BucketName,
                FieldId::S3Region,
            ],
        }
    }

    /// Integration whose toggle governs `field`, if any.
    pub fn governing(field: FieldId) -> Option<Integration> {
        Integration::ALL
            .iter()
            .copied()
            .find(|i| i.governed_fields().contains(&field))
    }

    /// Prompt shown before disabling, for integrations that need one.
    pub fn disable_warning(self) -> Option<&'static str> {
        match self {
            Integration::S3 => Some(
                "Disabling S3 storage sends all future uploads to local storage. Continue?",
            ),
            Integration::Email | Integration::Sms => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Integration::Email => "email",
            Integration::Sms => "sms",
            Integration::S3 => "s3",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown integration '{0}' (expected email, sms or s3)")]
pub struct ParseIntegrationError(pub String);

impl FromStr for Integration {
    type Err = ParseIntegrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "sendgrid" => Ok(Integration::Email),
            "sms" | "twilio" => Ok(Integration::Sms),
            "s3" | "s3_storage" | "storage" => Ok(Integration::S3),
            _ => Err(ParseIntegrationError(s.to_string())),
        }
    }
}

/// Asks the operator to confirm a destructive toggle.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// State changed.
    Changed,
    /// Already in the requested state.
    Unchanged,
    /// Operator declined the confirmation; nothing changed.
    Declined,
}

pub(crate) fn set_enabled(
    state: &mut ConfigEditorState,
    integration: Integration,
    enabled: bool,
    confirm: &mut dyn Confirm,
) -> ToggleOutcome {
    if state.toggles.get(integration) == enabled {
        return ToggleOutcome::Unchanged;
    }
    if enabled {
        enable(state, integration);
    } else {
        if let Some(prompt) = integration.disable_warning() {
            if !confirm.confirm(prompt) {
                warn!(integration = %integration, "disable declined");
                return ToggleOutcome::Declined;
            }
        }
        disable(state, integration);
    }
    ToggleOutcome::Changed
}

fn enable(state: &mut ConfigEditorState, integration: Integration) {
    for &field in integration.governed_fields() {
        if let Some(original) = state.cached_originals.take(field) {
            if let Some(slot) = state.config.text_slot(field) {
                *slot = Some(original);
                state.touched.mark_touched(field);
                debug!(field = %field, "restored cached value");
            }
        }
    }
    if integration == Integration::S3 {
        state.config.s3.enabled = true;
        state.touched.mark_touched(FieldId::S3Enabled);
    }
    state.toggles.set(integration, true);
}

fn disable(state: &mut ConfigEditorState, integration: Integration) {
    for &field in integration.governed_fields() {
        let current = state.config.text(field).map(str::to_string);
        if state.cached_originals.cache(field, current.as_deref()) {
            debug!(field = %field, "cached value before clearing");
        }
        if let Some(slot) = state.config.text_slot(field) {
            *slot = None;
            state.touched.mark_touched(field);
        }
    }
    if integration == Integration::S3 {
        state.config.s3.enabled = false;
        state.touched.mark_touched(FieldId::S3Enabled);
    }
    state.toggles.set(integration, false);
}
