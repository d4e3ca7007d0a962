//! Typed organisation integration config.
//!
//! Every optional shape in the server response is resolved here, once, so
//! the rest of the crate reads plain fields instead of probing nested
//! optionals. Empty strings are normalised to `None`.

use crate::field::FieldId;
use serde::{Deserialize, Deserializer, Serialize};

/// Region sent when the operator clears the S3 region.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Organisation resource as returned by the settings API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub integration_config: IntegrationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub secondary_color: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub favicon_url: Option<String>,

    #[serde(default)]
    pub require_leave_approval: bool,
    #[serde(default)]
    pub allow_self_signup: bool,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub sendgrid_api_key: Option<String>,

    #[serde(flatten)]
    pub twilio: TwilioConfig,

    #[serde(default, rename = "s3_storage")]
    pub s3: S3Storage,
}

/// Twilio credentials. Flat on the wire, grouped here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default, rename = "twilio_account_sid", deserialize_with = "empty_as_none")]
    pub account_sid: Option<String>,
    #[serde(default, rename = "twilio_auth_token", deserialize_with = "empty_as_none")]
    pub auth_token: Option<String>,
    #[serde(default, rename = "twilio_from_number", deserialize_with = "empty_as_none")]
    pub from_number: Option<String>,
}

impl TwilioConfig {
    pub fn any_present(&self) -> bool {
        self.account_sid.is_some() || self.auth_token.is_some() || self.from_number.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Storage {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub access_key_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub bucket_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub region: Option<String>,
}

impl IntegrationConfig {
    /// Current value of a text field. Flag fields read as `None`.
    pub fn text(&self, field: FieldId) -> Option<&str> {
        match field {
            FieldId::PrimaryColor => self.primary_color.as_deref(),
            FieldId::SecondaryColor => self.secondary_color.as_deref(),
            FieldId::LogoUrl => self.logo_url.as_deref(),
            FieldId::FaviconUrl => self.favicon_url.as_deref(),
            FieldId::SendgridApiKey => self.sendgrid_api_key.as_deref(),
            FieldId::TwilioAccountSid => self.twilio.account_sid.as_deref(),
            FieldId::TwilioAuthToken => self.twilio.auth_token.as_deref(),
            FieldId::TwilioFromNumber => self.twilio.from_number.as_deref(),
            FieldId::S3AccessKeyId => self.s3.access_key_id.as_deref(),
            FieldId::S3SecretAccessKey => self.s3.secret_access_key.as_deref(),
            FieldId::S3BucketName => self.s3.bucket_name.as_deref(),
            FieldId::S3Region => self.s3.region.as_deref(),
            FieldId::RequireLeaveApproval | FieldId::AllowSelfSignup | FieldId::S3Enabled => None,
        }
    }

    /// Mutable slot behind a text field, `None` for flags.
    pub(crate) fn text_slot(&mut self, field: FieldId) -> Option<&mut Option<String>> {
        let slot = match field {
            FieldId::PrimaryColor => &mut self.primary_color,
            FieldId::SecondaryColor => &mut self.secondary_color,
            FieldId::LogoUrl => &mut self.logo_url,
            FieldId::FaviconUrl => &mut self.favicon_url,
            FieldId::SendgridApiKey => &mut self.sendgrid_api_key,
            FieldId::TwilioAccountSid => &mut self.twilio.account_sid,
            FieldId::TwilioAuthToken => &mut self.twilio.auth_token,
            FieldId::TwilioFromNumber => &mut self.twilio.from_number,
            FieldId::S3AccessKeyId => &mut self.s3.access_key_id,
            FieldId::S3SecretAccessKey => &mut self.s3.secret_access_key,
            FieldId::S3BucketName => &mut self.s3.bucket_name,
            FieldId::S3Region => &mut self.s3.region,
            FieldId::RequireLeaveApproval | FieldId::AllowSelfSignup | FieldId::S3Enabled => {
                return None
            }
        };
        Some(slot)
    }

    pub fn flag(&self, field: FieldId) -> Option<bool> {
        match field {
            FieldId::RequireLeaveApproval => Some(self.require_leave_approval),
            FieldId::AllowSelfSignup => Some(self.allow_self_signup),
            FieldId::S3Enabled => Some(self.s3.enabled),
            _ => None,
        }
    }

    pub(crate) fn flag_slot(&mut self, field: FieldId) -> Option<&mut bool> {
        match field {
            FieldId::RequireLeaveApproval => Some(&mut self.require_leave_approval),
            FieldId::AllowSelfSignup => Some(&mut self.allow_self_signup),
            FieldId::S3Enabled => Some(&mut self.s3.enabled),
            _ => None,
        }
    }
}

/// Treat `""` and `null` alike so presence checks never see an empty string.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_sections_default() {
        let org: Organisation = serde_json::from_value(json!({ "id": "org_1" })).unwrap();
        assert_eq!(org.integration_config, IntegrationConfig::default());
        assert!(!org.integration_config.s3.enabled);
    }

    #[test]
    fn test_parses_server_shape() {
        let org: Organisation = serde_json::from_value(json!({
            "id": "org_1",
            "name": "Acme",
            "integration_config": {
                "primary_color": "#112233",
                "sendgrid_api_key": "SG.a...wxyz",
                "twilio_account_sid": "AC12...7890",
                "twilio_from_number": "",
                "s3_storage": {
                    "enabled": true,
                    "bucket_name": "acme-uploads",
                    "region": null
                }
            }
        }))
        .unwrap();

        let cfg = &org.integration_config;
        assert_eq!(cfg.primary_color.as_deref(), Some("#112233"));
        assert_eq!(cfg.sendgrid_api_key.as_deref(), Some("SG.a...wxyz"));
        assert_eq!(cfg.twilio.account_sid.as_deref(), Some("AC12...7890"));
        assert_eq!(cfg.twilio.from_number, None);
        assert!(cfg.s3.enabled);
        assert_eq!(cfg.s3.bucket_name.as_deref(), Some("acme-uploads"));
        assert_eq!(cfg.s3.region, None);
    }

    #[test]
    fn test_text_accessor_matches_slots() {
        let mut cfg = IntegrationConfig::default();
        for field in FieldId::ALL {
            if let Some(slot) = cfg.text_slot(*field) {
                *slot = Some(field.wire_key().to_string());
            }
        }
        for field in FieldId::ALL {
            if cfg.flag(*field).is_none() {
                assert_eq!(cfg.text(*field), Some(field.wire_key()));
            }
        }
    }
}
