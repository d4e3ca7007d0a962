//! Blocking checks run before a save is attempted.

use crate::field::FieldId;
use crate::mask::{is_masked, SecretState};
use crate::state::ConfigEditorState;
use crate::toggle::Integration;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex")
});

/// Credential pairs where replacing one half while the other stays masked
/// would pair a new value with a stale one. Listed in both directions.
const CREDENTIAL_PAIRS: &[(FieldId, FieldId)] = &[
    (FieldId::TwilioAccountSid, FieldId::TwilioAuthToken),
    (FieldId::TwilioAuthToken, FieldId::TwilioAccountSid),
    (FieldId::S3AccessKeyId, FieldId::S3SecretAccessKey),
    (FieldId::S3SecretAccessKey, FieldId::S3AccessKeyId),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("{field} is required while {integration} is enabled")]
    MissingRequired {
        integration: crate::toggle::Integration,
        field: FieldId,
    },

    #[error("{changed} was changed, so {masked} must be re-entered")]
    MaskedPartner { changed: FieldId, masked: FieldId },

    #[error("{field} must be a hex color like #1a2b3c, got '{value}'")]
    InvalidColor { field: FieldId, value: String },

    #[error("{field} must be an absolute http(s) URL: {reason}")]
    InvalidUrl { field: FieldId, reason: String },
}

impl ValidationIssue {
    pub fn code_str(&self) -> &'static str {
        match self {
            ValidationIssue::MissingRequired { .. } => "missing_required",
            ValidationIssue::MaskedPartner { .. } => "masked_partner",
            ValidationIssue::InvalidColor { .. } => "invalid_color",
            ValidationIssue::InvalidUrl { .. } => "invalid_url",
        }
    }
}

/// All issues found in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|i| i.code_str() == code)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn required_fields(integration: Integration) -> &'static [FieldId] {
    match integration {
        Integration::Email => &[FieldId::SendgridApiKey],
        Integration::Sms => &[
            FieldId::TwilioAccountSid,
            FieldId::TwilioAuthToken,
            FieldId::TwilioFromNumber,
        ],
        // Region falls back to the default.
        Integration::S3 => &[
            FieldId::S3AccessKeyId,
            FieldId::S3SecretAccessKey,
            FieldId::S3BucketName,
        ],
    }
}

pub fn validate(state: &ConfigEditorState) -> Result<(), ValidationErrors> {
    let config = state.config();
    let touched = state.touched();
    let mut issues = Vec::new();

    for &integration in Integration::ALL {
        if !state.toggles().get(integration) {
            continue;
        }
        for &field in required_fields(integration) {
            // Masked counts as present: the server still holds the value.
            if !SecretState::classify(config.text(field)).is_present() {
                issues.push(ValidationIssue::MissingRequired { integration, field });
            }
        }
        for &(changed, partner) in CREDENTIAL_PAIRS {
            if Integration::governing(changed) != Some(integration) {
                continue;
            }
            let value = config.text(changed);
            if touched.is_touched(changed)
                && value.is_some()
                && !is_masked(value)
                && is_masked(config.text(partner))
            {
                issues.push(ValidationIssue::MaskedPartner {
                    changed,
                    masked: partner,
                });
            }
        }
    }

    for field in [FieldId::PrimaryColor, FieldId::SecondaryColor] {
        if let (true, Some(value)) = (touched.is_touched(field), config.text(field)) {
            if !HEX_COLOR.is_match(value) {
                issues.push(ValidationIssue::InvalidColor {
                    field,
                    value: value.to_string(),
                });
            }
        }
    }

    for field in [FieldId::LogoUrl, FieldId::FaviconUrl] {
        if let (true, Some(value)) = (touched.is_touched(field), config.text(field)) {
            if let Err(reason) = check_url(value) {
                issues.push(ValidationIssue::InvalidUrl { field, reason });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(issues))
    }
}

fn check_url(value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntegrationConfig;

    fn state_with(config: IntegrationConfig, touched: &[FieldId]) -> ConfigEditorState {
        let mut state = ConfigEditorState::new(config);
        for f in touched {
            state.touched.mark_touched(*f);
        }
        state
    }

    #[test]
    fn test_disabled_integrations_are_not_checked() {
        let state = state_with(IntegrationConfig::default(), &[]);
        assert!(validate(&state).is_ok());
    }

    #[test]
    fn test_s3_enabled_missing_bucket() {
        let mut cfg = IntegrationConfig::default();
        cfg.s3.enabled = true;
        cfg.s3.access_key_id = Some("AKIA...WXYZ".into());
        cfg.s3.secret_access_key = Some("wJal...EKEY".into());
        let errors = validate(&state_with(cfg, &[])).unwrap_err();
        assert_eq!(
            errors.issues(),
            &[ValidationIssue::MissingRequired {
                integration: Integration::S3,
                field: FieldId::S3BucketName
            }]
        );
    }

    #[test]
    fn test_new_access_key_with_masked_secret_is_rejected() {
        let mut cfg = IntegrationConfig::default();
        cfg.s3.enabled = true;
        cfg.s3.access_key_id = Some("AKIANEWKEY0000".into());
        cfg.s3.secret_access_key = Some("wJal...EKEY".into());
        cfg.s3.bucket_name = Some("acme".into());
        let errors = validate(&state_with(cfg, &[FieldId::S3AccessKeyId])).unwrap_err();
        assert!(errors.contains("masked_partner"));
    }

    #[test]
    fn test_new_secret_with_masked_access_key_is_rejected() {
        let mut cfg = IntegrationConfig::default();
        cfg.s3.enabled = true;
        cfg.s3.access_key_id = Some("AKIA...WXYZ".into());
        cfg.s3.secret_access_key = Some("new-secret-value".into());
        cfg.s3.bucket_name = Some("acme".into());
        let errors = validate(&state_with(cfg, &[FieldId::S3SecretAccessKey])).unwrap_err();
        assert_eq!(
            errors.issues(),
            &[ValidationIssue::MaskedPartner {
                changed: FieldId::S3SecretAccessKey,
                masked: FieldId::S3AccessKeyId,
            }]
        );
    }

    #[test]
    fn test_twilio_pair_checked_both_ways() {
        let mut cfg = IntegrationConfig::default();
        cfg.twilio.account_sid = Some("AC12...7890".into());
        cfg.twilio.auth_token = Some("fresh-token".into());
        cfg.twilio.from_number = Some("+15550100".into());
        let errors = validate(&state_with(cfg, &[FieldId::TwilioAuthToken])).unwrap_err();
        assert_eq!(
            errors.issues(),
            &[ValidationIssue::MaskedPartner {
                changed: FieldId::TwilioAuthToken,
                masked: FieldId::TwilioAccountSid,
            }]
        );

        let mut cfg = IntegrationConfig::default();
        cfg.twilio.account_sid = Some("AC-fresh".into());
        cfg.twilio.auth_token = Some("9f3e...01ab".into());
        cfg.twilio.from_number = Some("+15550100".into());
        let errors = validate(&state_with(cfg, &[FieldId::TwilioAccountSid])).unwrap_err();
        assert_eq!(
            errors.issues(),
            &[ValidationIssue::MaskedPartner {
                changed: FieldId::TwilioAccountSid,
                masked: FieldId::TwilioAuthToken,
            }]
        );
    }

    #[test]
    fn test_masked_pair_untouched_is_fine() {
        let mut cfg = IntegrationConfig::default();
        cfg.twilio.account_sid = Some("AC12...7890".into());
        cfg.twilio.auth_token = Some("9f3e...01ab".into());
        cfg.twilio.from_number = Some("+15550100".into());
        assert!(validate(&state_with(cfg, &[FieldId::TwilioFromNumber])).is_ok());
    }

    #[test]
    fn test_branding_checks_only_touched_fields() {
        let cfg = IntegrationConfig {
            primary_color: Some("blue".into()),
            secondary_color: Some("#abc".into()),
            logo_url: Some("ftp://example.com/logo.png".into()),
            favicon_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(validate(&state_with(cfg.clone(), &[])).is_ok());

        let errors = validate(&state_with(
            cfg,
            &[
                FieldId::PrimaryColor,
                FieldId::SecondaryColor,
                FieldId::LogoUrl,
                FieldId::FaviconUrl,
            ],
        ))
        .unwrap_err();
        assert_eq!(errors.issues().len(), 3);
        assert!(errors.contains("invalid_color"));
        assert!(errors.contains("invalid_url"));
    }
}
