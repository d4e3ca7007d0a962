use crate::config::IntegrationConfig;
use crate::field::FieldId;
use crate::mask::SecretState;
use crate::toggle::Integration;
use crate::touched::TouchedFields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Enabled view state per integration, independent of the secret values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    pub email: bool,
    pub sms: bool,
    pub s3: bool,
}

impl Toggles {
    /// Initial view state for freshly loaded config.
    pub fn derive(config: &IntegrationConfig) -> Self {
        Self {
            email: config.sendgrid_api_key.is_some(),
            sms: config.twilio.any_present(),
            s3: config.s3.enabled,
        }
    }

    pub fn get(&self, integration: Integration) -> bool {
        match integration {
            Integration::Email => self.email,
            Integration::Sms => self.sms,
            Integration::S3 => self.s3,
        }
    }

    pub(crate) fn set(&mut self, integration: Integration, enabled: bool) {
        match integration {
            Integration::Email => self.email = enabled,
            Integration::Sms => self.sms = enabled,
            Integration::S3 => self.s3 = enabled,
        }
    }
}

/// Real values stashed by a disable toggle so the matching enable can put
/// them back. Masked placeholders are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedOriginals {
    values: BTreeMap<FieldId, String>,
}

impl CachedOriginals {
    /// Cache `value` if it is a real value. Returns whether it was cached.
    pub fn cache(&mut self, field: FieldId, value: Option<&str>) -> bool {
        match (SecretState::classify(value), value) {
            (SecretState::Real, Some(v)) => {
                self.values.insert(field, v.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn take(&mut self, field: FieldId) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.values.contains_key(&field)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything one editing session owns.
#[derive(Debug, Clone, Default)]
pub struct ConfigEditorState {
    pub(crate) config: IntegrationConfig,
    pub(crate) touched: TouchedFields,
    pub(crate) toggles: Toggles,
    pub(crate) cached_originals: CachedOriginals,
}

impl ConfigEditorState {
    pub fn new(config: IntegrationConfig) -> Self {
        Self {
            toggles: Toggles::derive(&config),
            config,
            touched: TouchedFields::new(),
            cached_originals: CachedOriginals::default(),
        }
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    pub fn touched(&self) -> &TouchedFields {
        &self.touched
    }

    pub fn toggles(&self) -> &Toggles {
        &self.toggles
    }

    pub fn cached_originals(&self) -> &CachedOriginals {
        &self.cached_originals
    }
}
