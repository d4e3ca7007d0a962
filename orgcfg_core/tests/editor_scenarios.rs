use orgcfg_core::{
    is_masked, ConfigEditor, EditorError, FieldId, Integration, MemoryBackend, Organisation,
    SaveOutcome, SettingsBackend, ToggleOutcome,
};
use serde_json::json;

fn accept(_: &str) -> bool {
    true
}

/// Stored server-side state with every secret set.
fn stored_org() -> Organisation {
    serde_json::from_value(json!({
        "id": "org_1",
        "name": "Acme",
        "integration_config": {
            "primary_color": "#336699",
            "logo_url": "https://cdn.example.com/logo.png",
            "sendgrid_api_key": "SG.abcdefghijklmnopqrstuvwxyz",
            "twilio_account_sid": "AC0123456789abcdef",
            "twilio_auth_token": "authtoken0123456789",
            "twilio_from_number": "+15550100",
            "s3_storage": {
                "enabled": true,
                "access_key_id": "AKIAABCDEFGHWXYZ",
                "secret_access_key": "wJalrXUtnFEMIK7MDENGbPxRfiCYEXAMPLEKEY",
                "bucket_name": "acme-uploads",
                "region": "eu-west-1"
            }
        }
    }))
    .unwrap()
}

async fn open(backend: &MemoryBackend) -> ConfigEditor {
    let mut editor = ConfigEditor::new();
    editor.reload(backend).await.unwrap();
    editor
}

#[tokio::test]
async fn test_loaded_secrets_are_masked() {
    let backend = MemoryBackend::new(stored_org());
    let editor = open(&backend).await;
    let cfg = editor.state().config();
    assert!(is_masked(cfg.sendgrid_api_key.as_deref()));
    assert!(is_masked(cfg.s3.secret_access_key.as_deref()));
    assert!(!is_masked(cfg.s3.bucket_name.as_deref()));
    assert!(editor.is_enabled(Integration::Email));
    assert!(editor.is_enabled(Integration::Sms));
    assert!(editor.is_enabled(Integration::S3));
}

#[tokio::test]
async fn test_untouched_masked_key_is_not_sent() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    editor
        .set_text(FieldId::PrimaryColor, Some("#112233".into()))
        .unwrap();
    let outcome = editor.save(&backend).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));

    let sent = backend.received();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].contains(FieldId::SendgridApiKey));
    assert_eq!(sent[0].clone().into_value(), json!({ "primary_color": "#112233" }));

    let stored = backend.stored().unwrap();
    assert_eq!(
        stored.integration_config.sendgrid_api_key.as_deref(),
        Some("SG.abcdefghijklmnopqrstuvwxyz")
    );
}

#[tokio::test]
async fn test_bucket_change_leaves_masked_secret_alone() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    editor
        .set_text(FieldId::S3BucketName, Some("acme-archive".into()))
        .unwrap();
    assert_eq!(
        editor.payload().into_value(),
        json!({ "s3_storage": { "bucket_name": "acme-archive" } })
    );

    editor.save(&backend).await.unwrap();
    let stored = backend.stored().unwrap().integration_config;
    assert_eq!(stored.s3.bucket_name.as_deref(), Some("acme-archive"));
    assert_eq!(
        stored.s3.secret_access_key.as_deref(),
        Some("wJalrXUtnFEMIK7MDENGbPxRfiCYEXAMPLEKEY")
    );
}

#[tokio::test]
async fn test_new_key_typed_over_masked_one_is_sent_verbatim() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    editor
        .set_text(FieldId::SendgridApiKey, Some("SG.brand-new-key".into()))
        .unwrap();
    let payload = editor.payload();
    assert_eq!(
        payload.get(FieldId::SendgridApiKey),
        Some(&json!("SG.brand-new-key"))
    );

    editor.save(&backend).await.unwrap();
    assert_eq!(
        backend
            .stored()
            .unwrap()
            .integration_config
            .sendgrid_api_key
            .as_deref(),
        Some("SG.brand-new-key")
    );
}

#[tokio::test]
async fn test_sms_typed_values_survive_disable_enable() {
    let backend = MemoryBackend::new(Organisation {
        id: "org_2".into(),
        ..Default::default()
    });
    let mut editor = open(&backend).await;
    assert!(!editor.is_enabled(Integration::Sms));

    editor.set_enabled(Integration::Sms, true, &mut accept);
    editor
        .set_text(FieldId::TwilioAccountSid, Some("AC-typed".into()))
        .unwrap();
    editor
        .set_text(FieldId::TwilioAuthToken, Some("token-typed".into()))
        .unwrap();
    editor
        .set_text(FieldId::TwilioFromNumber, Some("+15550199".into()))
        .unwrap();

    editor.set_enabled(Integration::Sms, false, &mut accept);
    assert!(!editor.state().config().twilio.any_present());

    editor.set_enabled(Integration::Sms, true, &mut accept);
    let twilio = &editor.state().config().twilio;
    assert_eq!(twilio.account_sid.as_deref(), Some("AC-typed"));
    assert_eq!(twilio.auth_token.as_deref(), Some("token-typed"));
    assert_eq!(twilio.from_number.as_deref(), Some("+15550199"));
}

#[tokio::test]
async fn test_masked_email_disable_enable_restores_nothing() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    editor.set_enabled(Integration::Email, false, &mut accept);
    editor.set_enabled(Integration::Email, true, &mut accept);

    assert_eq!(editor.state().config().sendgrid_api_key, None);
    for value in editor.payload().leaf_values() {
        assert!(!is_masked(value.as_str()));
    }
}

#[tokio::test]
async fn test_validation_blocks_save() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    editor.set_text(FieldId::S3BucketName, None).unwrap();
    let err = editor.save(&backend).await.unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));
    assert!(backend.received().is_empty());
    assert!(editor.is_dirty());
}

#[tokio::test]
async fn test_declined_s3_disable_keeps_everything() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    let outcome = editor.set_enabled(Integration::S3, false, &mut |_: &str| false);
    assert_eq!(outcome, ToggleOutcome::Declined);
    assert!(editor.is_enabled(Integration::S3));
    assert!(!editor.is_dirty());
    assert!(editor.payload().is_empty());
}

#[tokio::test]
async fn test_nothing_to_save_sends_no_request() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    // Touched but still masked: nothing qualifies.
    editor
        .set_text(FieldId::SendgridApiKey, Some("SG.a...wxyz".into()))
        .unwrap();
    let outcome = editor.save(&backend).await.unwrap();
    assert_eq!(outcome, SaveOutcome::NothingToSave);
    assert!(backend.received().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_keeps_edits() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;
    editor
        .set_text(FieldId::FaviconUrl, Some("https://cdn.example.com/f.ico".into()))
        .unwrap();

    backend.reject_updates("database unavailable");
    let err = editor.save(&backend).await.unwrap_err();
    assert_eq!(err.code_str(), "rejected");
    assert!(editor.state().touched().is_touched(FieldId::FaviconUrl));

    backend.accept_updates();
    editor.save(&backend).await.unwrap();
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_successful_save_resets_tracker_and_reloads_masked() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    editor
        .set_text(FieldId::TwilioAuthToken, Some("fresh-auth-token-123".into()))
        .unwrap();
    editor
        .set_text(FieldId::TwilioAccountSid, Some("AC-fresh-sid-000".into()))
        .unwrap();
    editor.save(&backend).await.unwrap();

    assert!(!editor.is_dirty());
    assert!(is_masked(editor.state().config().twilio.auth_token.as_deref()));
    assert!(editor.payload().is_empty());

    let fetched = backend.fetch().await.unwrap();
    assert_eq!(&fetched.integration_config, editor.state().config());
}

#[tokio::test]
async fn test_s3_disable_then_save_turns_storage_off() {
    let backend = MemoryBackend::new(stored_org());
    let mut editor = open(&backend).await;

    let outcome = editor.set_enabled(Integration::S3, false, &mut accept);
    assert_eq!(outcome, ToggleOutcome::Changed);
    editor.save(&backend).await.unwrap();

    let stored = backend.stored().unwrap().integration_config;
    assert!(!stored.s3.enabled);
    assert_eq!(stored.s3.bucket_name, None);
    // Region is never left empty server-side.
    assert_eq!(stored.s3.region.as_deref(), Some("us-east-1"));
}
