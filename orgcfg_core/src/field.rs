//! Identifiers for every editable integration setting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a field lives in the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    /// Flat key on `integration_config`.
    Top,
    /// Key inside the nested `s3_storage` object.
    S3Storage,
}

impl FieldGroup {
    pub fn wire_prefix(self) -> Option<&'static str> {
        match self {
            FieldGroup::Top => None,
            FieldGroup::S3Storage => Some("s3_storage"),
        }
    }
}

/// Value shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    // Branding
    PrimaryColor,
    SecondaryColor,
    LogoUrl,
    FaviconUrl,
    // Feature flags
    RequireLeaveApproval,
    AllowSelfSignup,
    // Email
    SendgridApiKey,
    // SMS
    TwilioAccountSid,
    TwilioAuthToken,
    TwilioFromNumber,
    // S3 storage
    S3Enabled,
    S3AccessKeyId,
    S3SecretAccessKey,
    S3BucketName,
    S3Region,
}

impl FieldId {
    /// Allow-list in payload order.
    pub const ALL: &'static [FieldId] = &[
        FieldId::PrimaryColor,
        FieldId::SecondaryColor,
        FieldId::LogoUrl,
        FieldId::FaviconUrl,
        FieldId::RequireLeaveApproval,
        FieldId::AllowSelfSignup,
        FieldId::SendgridApiKey,
        FieldId::TwilioAccountSid,
        FieldId::TwilioAuthToken,
        FieldId::TwilioFromNumber,
        FieldId::S3Enabled,
        FieldId::S3AccessKeyId,
        FieldId::S3SecretAccessKey,
        FieldId::S3BucketName,
        FieldId::S3Region,
    ];

    /// Key used inside the field's group.
    pub fn wire_key(self) -> &'static str {
        match self {
            FieldId::PrimaryColor => "primary_color",
            FieldId::SecondaryColor => "secondary_color",
            FieldId::LogoUrl => "logo_url",
            FieldId::FaviconUrl => "favicon_url",
            FieldId::RequireLeaveApproval => "require_leave_approval",
            FieldId::AllowSelfSignup => "allow_self_signup",
            FieldId::SendgridApiKey => "sendgrid_api_key",
            FieldId::TwilioAccountSid => "twilio_account_sid",
            FieldId::TwilioAuthToken => "twilio_auth_token",
            FieldId::TwilioFromNumber => "twilio_from_number",
            FieldId::S3Enabled => "enabled",
            FieldId::S3AccessKeyId => "access_key_id",
            FieldId::S3SecretAccessKey => "secret_access_key",
            FieldId::S3BucketName => "bucket_name",
            FieldId::S3Region => "region",
        }
    }

    pub fn group(self) -> FieldGroup {
        match self {
            FieldId::S3Enabled
            | FieldId::S3AccessKeyId
            | FieldId::S3SecretAccessKey
            | FieldId::S3BucketName
            | FieldId::S3Region => FieldGroup::S3Storage,
            _ => FieldGroup::Top,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::RequireLeaveApproval | FieldId::AllowSelfSignup | FieldId::S3Enabled => {
                FieldKind::Flag
            }
            _ => FieldKind::Text,
        }
    }

    /// Secrets may arrive masked and must pass the mask filter before
    /// they are sent back.
    pub fn is_secret(self) -> bool {
        matches!(
            self,
            FieldId::SendgridApiKey
                | FieldId::TwilioAccountSid
                | FieldId::TwilioAuthToken
                | FieldId::S3AccessKeyId
                | FieldId::S3SecretAccessKey
        )
    }

    /// Dotted path as shown to operators, e.g. `s3_storage.bucket_name`.
    pub fn path(self) -> String {
        match self.group().wire_prefix() {
            Some(prefix) => format!("{}.{}", prefix, self.wire_key()),
            None => self.wire_key().to_string(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::PrimaryColor => "Primary color",
            FieldId::SecondaryColor => "Secondary color",
            FieldId::LogoUrl => "Logo URL",
            FieldId::FaviconUrl => "Favicon URL",
            FieldId::RequireLeaveApproval => "Require leave approval",
            FieldId::AllowSelfSignup => "Allow self signup",
            FieldId::SendgridApiKey => "SendGrid API key",
            FieldId::TwilioAccountSid => "Twilio account SID",
            FieldId::TwilioAuthToken => "Twilio auth token",
            FieldId::TwilioFromNumber => "Twilio from number",
            FieldId::S3Enabled => "S3 storage enabled",
            FieldId::S3AccessKeyId => "S3 access key ID",
            FieldId::S3SecretAccessKey => "S3 secret access key",
            FieldId::S3BucketName => "S3 bucket name",
            FieldId::S3Region => "S3 region",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}'")]
pub struct ParseFieldError(pub String);

impl FromStr for FieldId {
    type Err = ParseFieldError;

    /// Accepts `s3_storage.<key>`, the `s3.<key>` shorthand and flat keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let (group, key) = match normalized.split_once('.') {
            Some(("s3_storage" | "s3", key)) => (FieldGroup::S3Storage, key),
            Some(_) => return Err(ParseFieldError(s.to_string())),
            None => (FieldGroup::Top, normalized.as_str()),
        };
        FieldId::ALL
            .iter()
            .copied()
            .find(|f| f.group() == group && f.wire_key() == key)
            .ok_or_else(|| ParseFieldError(s.to_string()))
    }
}
