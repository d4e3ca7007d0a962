//! Minimal partial-update payloads.
//!
//! The payload mirrors the inbound shape: flat keys for branding, flags,
//! SendGrid and Twilio, plus an optional nested `s3_storage` object.

use crate::config::{IntegrationConfig, DEFAULT_S3_REGION};
use crate::field::{FieldGroup, FieldId, FieldKind};
use crate::mask::is_masked;
use crate::touched::TouchedFields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const S3_KEY: &str = "s3_storage";

/// Partial `integration_config` body. `null` means "delete on the server".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdatePayload(Map<String, Value>);

impl UpdatePayload {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Value sent for `field`, if any.
    pub fn get(&self, field: FieldId) -> Option<&Value> {
        match field.group() {
            FieldGroup::Top => self.0.get(field.wire_key()),
            FieldGroup::S3Storage => self
                .0
                .get(S3_KEY)
                .and_then(Value::as_object)
                .and_then(|s3| s3.get(field.wire_key())),
        }
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.get(field).is_some()
    }

    /// Fields carried by this payload, in allow-list order.
    pub fn fields(&self) -> Vec<FieldId> {
        FieldId::ALL
            .iter()
            .copied()
            .filter(|f| self.contains(*f))
            .collect()
    }

    /// Every leaf value, nested `s3_storage` entries included.
    pub fn leaf_values(&self) -> impl Iterator<Item = &Value> + '_ {
        FieldId::ALL.iter().filter_map(move |f| self.get(*f))
    }

    fn insert(&mut self, field: FieldId, value: Value) {
        match field.group() {
            FieldGroup::Top => {
                self.0.insert(field.wire_key().to_string(), value);
            }
            FieldGroup::S3Storage => {
                let entry = self
                    .0
                    .entry(S3_KEY)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(s3) = entry {
                    s3.insert(field.wire_key().to_string(), value);
                }
            }
        }
    }
}

/// Build the update payload for the fields the operator touched.
///
/// A field is included only if it is in `touched`; a secret field is
/// additionally dropped while its value is still the masked placeholder.
/// `s3_storage` only appears when one of its sub-fields qualifies. Pure:
/// the same inputs always give the same payload.
pub fn build_update_payload(config: &IntegrationConfig, touched: &TouchedFields) -> UpdatePayload {
    let mut payload = UpdatePayload::default();

    for &field in FieldId::ALL {
        if !touched.is_touched(field) {
            continue;
        }

        let value = match field.kind() {
            FieldKind::Flag => Value::Bool(config.flag(field).unwrap_or_default()),
            FieldKind::Text => {
                let current = config.text(field);
                if field.is_secret() && is_masked(current) {
                    debug!(field = %field, "skipping masked secret");
                    continue;
                }
                match current {
                    Some(v) => Value::String(v.to_string()),
                    None if field == FieldId::S3Region => {
                        Value::String(DEFAULT_S3_REGION.to_string())
                    }
                    None => Value::Null,
                }
            }
        };

        payload.insert(field, value);
    }

    debug!(fields = payload.fields().len(), "built update payload");
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn masked_config() -> IntegrationConfig {
        let mut cfg = IntegrationConfig {
            primary_color: Some("#336699".into()),
            logo_url: Some("https://cdn.example.com/logo.png".into()),
            sendgrid_api_key: Some("SG.a...wxyz".into()),
            ..Default::default()
        };
        cfg.twilio.account_sid = Some("AC12...7890".into());
        cfg.twilio.auth_token = Some("9f3e...01ab".into());
        cfg.twilio.from_number = Some("+15550100".into());
        cfg.s3.enabled = true;
        cfg.s3.access_key_id = Some("AKIA...WXYZ".into());
        cfg.s3.secret_access_key = Some("wJal...EKEY".into());
        cfg.s3.bucket_name = Some("acme-uploads".into());
        cfg.s3.region = Some("eu-west-1".into());
        cfg
    }

    #[test]
    fn test_empty_touched_gives_empty_payload() {
        let payload = build_update_payload(&masked_config(), &TouchedFields::new());
        assert!(payload.is_empty());
        assert_eq!(payload.into_value(), json!({}));
    }

    #[test]
    fn test_untouched_masked_key_is_omitted() {
        let cfg = masked_config();
        let touched: TouchedFields = [FieldId::PrimaryColor].into_iter().collect();
        let payload = build_update_payload(&cfg, &touched);
        assert_eq!(payload.into_value(), json!({ "primary_color": "#336699" }));
    }

    #[test]
    fn test_touched_but_still_masked_secret_is_omitted() {
        let cfg = masked_config();
        let touched: TouchedFields = [FieldId::SendgridApiKey].into_iter().collect();
        assert!(build_update_payload(&cfg, &touched).is_empty());
    }

    #[test]
    fn test_s3_only_bucket_name() {
        let mut cfg = masked_config();
        cfg.s3.bucket_name = Some("acme-archive".into());
        let touched: TouchedFields = [FieldId::S3BucketName].into_iter().collect();

        let payload = build_update_payload(&cfg, &touched);
        assert_eq!(
            payload.into_value(),
            json!({ "s3_storage": { "bucket_name": "acme-archive" } })
        );
    }

    #[test]
    fn test_s3_object_omitted_when_only_masked_subfields_touched() {
        let cfg = masked_config();
        let touched: TouchedFields = [FieldId::S3SecretAccessKey, FieldId::S3AccessKeyId]
            .into_iter()
            .collect();
        let payload = build_update_payload(&cfg, &touched);
        assert!(payload.as_map().get("s3_storage").is_none());
    }

    #[test]
    fn test_cleared_region_falls_back_to_default() {
        let mut cfg = masked_config();
        cfg.s3.region = None;
        let touched: TouchedFields = [FieldId::S3Region].into_iter().collect();
        let payload = build_update_payload(&cfg, &touched);
        assert_eq!(payload.get(FieldId::S3Region), Some(&json!(DEFAULT_S3_REGION)));
    }

    #[test]
    fn test_cleared_secret_is_sent_as_null() {
        let mut cfg = masked_config();
        cfg.sendgrid_api_key = None;
        let touched: TouchedFields = [FieldId::SendgridApiKey].into_iter().collect();
        let payload = build_update_payload(&cfg, &touched);
        assert_eq!(payload.get(FieldId::SendgridApiKey), Some(&Value::Null));
    }

    #[test]
    fn test_flags_are_booleans() {
        let mut cfg = masked_config();
        cfg.allow_self_signup = true;
        let touched: TouchedFields = [FieldId::AllowSelfSignup, FieldId::S3Enabled]
            .into_iter()
            .collect();
        let payload = build_update_payload(&cfg, &touched);
        assert_eq!(
            payload.into_value(),
            json!({ "allow_self_signup": true, "s3_storage": { "enabled": true } })
        );
    }

    #[test]
    fn test_keys_are_subset_of_touched_and_never_masked() {
        let cfg = masked_config();
        // Every subset of the allow-list up to pairs, plus the whole list.
        let mut sets: Vec<TouchedFields> = Vec::new();
        for a in FieldId::ALL {
            sets.push([*a].into_iter().collect());
            for b in FieldId::ALL {
                sets.push([*a, *b].into_iter().collect());
            }
        }
        sets.push(FieldId::ALL.iter().copied().collect());

        for touched in &sets {
            let payload = build_update_payload(&cfg, touched);
            for field in payload.fields() {
                assert!(touched.is_touched(field), "{} sent but not touched", field);
            }
            for value in payload.leaf_values() {
                assert!(!is_masked(value.as_str()), "masked value leaked: {}", value);
            }
            assert_eq!(payload, build_update_payload(&cfg, touched));
        }
    }
}
