use super::*;

use crate::gateway::types::GatewayError;
use crate::session::test_helpers::{MockGateway, attachment};

#[tokio::test]
async fn stage_success_appends() {
    let gateway = MockGateway::new().script_upload(Ok(attachment("f1", "transcript.pdf", 2_097_152)));
    let mut manager = AttachmentManager::new();

    assert!(manager.stage(&gateway, "transcript.pdf", vec![0; 16]).await);
    assert_eq!(manager.staged().len(), 1);
    assert_eq!(manager.staged()[0].file_id, "f1");
    assert!(manager.error().is_none());
}

#[tokio::test]
async fn stage_rejects_sixth_file_without_network_call() {
    let gateway = MockGateway::new();
    let mut manager = AttachmentManager::new();
    manager.staged = (0..MAX_STAGED_FILES)
        .map(|i| attachment(&format!("f{i}"), "doc.pdf", 10))
        .collect();

    assert!(!manager.stage(&gateway, "one-too-many.pdf", vec![0; 16]).await);
    assert_eq!(manager.staged().len(), MAX_STAGED_FILES);
    assert_eq!(gateway.call_count("upload:"), 0);
    assert!(manager.error().unwrap().contains("Maximum of 5 files"));
}

#[tokio::test]
async fn stage_rejects_oversize_file_without_network_call() {
    let gateway = MockGateway::new();
    let mut manager = AttachmentManager::new();

    let oversize = vec![0u8; usize::try_from(MAX_FILE_BYTES).unwrap() + 1];
    assert!(!manager.stage(&gateway, "huge.pdf", oversize).await);
    assert!(manager.staged().is_empty());
    assert_eq!(gateway.call_count("upload:"), 0);
    assert!(manager.error().unwrap().contains("too large"));
}

#[tokio::test]
async fn stage_accepts_file_at_exact_limit() {
    let gateway = MockGateway::new();
    let mut manager = AttachmentManager::new();

    let at_limit = vec![0u8; usize::try_from(MAX_FILE_BYTES).unwrap()];
    assert!(manager.stage(&gateway, "limit.pdf", at_limit).await);
    assert_eq!(gateway.call_count("upload:"), 1);
}

#[tokio::test]
async fn stage_failure_surfaces_server_detail() {
    let gateway = MockGateway::new().script_upload(Err(GatewayError::Status {
        status: 422,
        detail: Some("File type not supported".into()),
    }));
    let mut manager = AttachmentManager::new();

    assert!(!manager.stage(&gateway, "weird.xyz", vec![0; 16]).await);
    assert!(manager.staged().is_empty());
    assert_eq!(manager.error(), Some("File type not supported"));
}

#[tokio::test]
async fn stage_failure_falls_back_to_generic_message() {
    let gateway = MockGateway::new().script_upload(Err(GatewayError::Request("timed out".into())));
    let mut manager = AttachmentManager::new();

    assert!(!manager.stage(&gateway, "slow.pdf", vec![0; 16]).await);
    assert_eq!(manager.error(), Some(GENERIC_UPLOAD_ERROR));
}

#[tokio::test]
async fn new_error_supersedes_previous() {
    let gateway = MockGateway::new()
        .script_upload(Err(GatewayError::Status { status: 422, detail: Some("first".into()) }))
        .script_upload(Err(GatewayError::Status { status: 422, detail: Some("second".into()) }));
    let mut manager = AttachmentManager::new();

    manager.stage(&gateway, "a.pdf", vec![0; 16]).await;
    manager.stage(&gateway, "b.pdf", vec![0; 16]).await;
    assert_eq!(manager.error(), Some("second"));
}

#[tokio::test]
async fn dismiss_clears_error() {
    let gateway = MockGateway::new().script_upload(Err(GatewayError::Request("boom".into())));
    let mut manager = AttachmentManager::new();

    manager.stage(&gateway, "a.pdf", vec![0; 16]).await;
    assert!(manager.error().is_some());
    manager.dismiss_error();
    assert!(manager.error().is_none());
}

#[tokio::test]
async fn unstage_success_removes_matching_entry() {
    let gateway = MockGateway::new();
    let mut manager = AttachmentManager::new();
    manager.staged = vec![attachment("f1", "a.pdf", 10), attachment("f2", "b.pdf", 20)];

    assert!(manager.unstage(&gateway, "f1").await);
    assert_eq!(manager.staged().len(), 1);
    assert_eq!(manager.staged()[0].file_id, "f2");
    assert_eq!(gateway.call_count("remove:f1"), 1);
}

#[tokio::test]
async fn unstage_failure_keeps_entry() {
    let gateway = MockGateway::new().script_remove(Err(GatewayError::Request("reset".into())));
    let mut manager = AttachmentManager::new();
    manager.staged = vec![attachment("f1", "a.pdf", 10)];

    assert!(!manager.unstage(&gateway, "f1").await);
    assert_eq!(manager.staged().len(), 1);
    // Removal failures are logged, not surfaced as a notice.
    assert!(manager.error().is_none());
}

#[tokio::test]
async fn take_staged_empties_and_returns_all() {
    let mut manager = AttachmentManager::new();
    manager.staged = vec![attachment("f1", "a.pdf", 10), attachment("f2", "b.pdf", 20)];

    let taken = manager.take_staged();
    assert_eq!(taken.len(), 2);
    assert!(manager.staged().is_empty());
}
