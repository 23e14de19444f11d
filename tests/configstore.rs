mod common;

use std::io::Write;
use std::sync::Arc;

use dashborg::api::BackendApi;
use dashborg::cli::commands;
use dashborg::core::ConfigStore;

use common::ScriptedBackend;

#[tokio::test]
async fn malformed_document_is_a_verdict_not_an_error() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();

    // The endpoint answers successfully even for a broken document; the
    // call must succeed and the verdict alone must carry the invalidity.
    let verdict = ConfigStore::new(api)
        .validate("bad: yaml: [")
        .await
        .unwrap();
    assert!(!verdict.valid);
    assert_eq!(
        verdict.error.as_deref(),
        Some("mapping values are not allowed here")
    );
}

#[tokio::test]
async fn validate_command_fails_on_an_invalid_document() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "bad: yaml: [").unwrap();

    let err = commands::config_validate(api, file.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid"), "{err}");
    assert!(err.to_string().contains("mapping values"), "{err}");
}

#[tokio::test]
async fn validate_command_accepts_a_valid_document() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "repositories:\n  - path: /repo\n").unwrap();

    commands::config_validate(api, file.path()).await.unwrap();
}
