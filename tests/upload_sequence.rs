//! Upload sequence tests.
//!
//! Blob first, metadata second; a failed metadata write removes the blob.

mod common;

use std::sync::Arc;

use cloudstash::{FileService, FileType, RevalidationLog, UploadRequest, VaultError};
use common::{gateway, view_url, FaultyBackend};

fn request(name: &str) -> UploadRequest {
    UploadRequest::new(name, &b"hello world"[..], "user-1", "acct-1", "/documents")
}

#[tokio::test]
async fn test_upload_success_sequence() {
    let backend = Arc::new(FaultyBackend::new());
    let gateway = gateway(backend.clone());
    let log = RevalidationLog::new();

    let file = FileService::new(&gateway, &log)
        .upload(request("notes.txt"))
        .await
        .unwrap();

    assert_eq!(backend.calls(), vec!["create_blob", "create_document"]);
    assert_eq!(file.url, view_url(&file.bucket_file_id));
    assert_eq!(file.file_type, FileType::Document);
    assert_eq!(file.extension, "txt");
    assert_eq!(file.size, 11);
    assert_eq!(log.paths(), vec!["/documents"]);
}

#[tokio::test]
async fn test_upload_without_echoed_attributes_still_succeeds() {
    let backend = Arc::new(FaultyBackend::new());
    backend.blank_documents();
    let gateway = gateway(backend.clone());
    let log = RevalidationLog::new();

    let file = FileService::new(&gateway, &log)
        .upload(request("notes.txt"))
        .await
        .unwrap();

    assert_eq!(file.name, "notes.txt");
    assert_eq!(file.owner, "user-1");
    assert_eq!(file.account_id, "acct-1");
    assert_eq!(file.url, view_url(&file.bucket_file_id));
    assert!(file.users.is_empty());
    assert_eq!(backend.count("delete_blob"), 0);
    assert_eq!(backend.inner.blob_count().await, 1);
    assert_eq!(backend.inner.document_count("files").await, 1);
    assert_eq!(log.paths(), vec!["/documents"]);
}

#[tokio::test]
async fn test_failed_metadata_deletes_blob_once() {
    let backend = Arc::new(FaultyBackend::new());
    backend.fail("create_document");
    let gateway = gateway(backend.clone());
    let log = RevalidationLog::new();

    let err = FileService::new(&gateway, &log)
        .upload(request("notes.txt"))
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Backend(ref e) if e.to_string().contains("create_document")));
    assert_eq!(
        backend.calls(),
        vec!["create_blob", "create_document", "delete_blob"]
    );
    assert_eq!(backend.count("delete_blob"), 1);
    assert_eq!(backend.inner.blob_count().await, 0);
    assert_eq!(backend.inner.document_count("files").await, 0);
    assert!(log.paths().is_empty());
}

#[tokio::test]
async fn test_failed_cleanup_reports_both_errors() {
    let backend = Arc::new(FaultyBackend::new());
    backend.fail("create_document");
    backend.fail("delete_blob");
    let gateway = gateway(backend.clone());
    let log = RevalidationLog::new();

    let err = FileService::new(&gateway, &log)
        .upload(request("notes.txt"))
        .await
        .unwrap_err();

    match err {
        VaultError::UploadRollback { source, cleanup } => {
            assert!(source.to_string().contains("create_document"));
            assert!(cleanup.to_string().contains("delete_blob"));
        }
        other => panic!("expected UploadRollback, got {other:?}"),
    }
    assert_eq!(backend.count("delete_blob"), 1);
    assert_eq!(backend.inner.blob_count().await, 1);
}

#[tokio::test]
async fn test_failed_blob_upload_skips_metadata() {
    let backend = Arc::new(FaultyBackend::new());
    backend.fail("create_blob");
    let gateway = gateway(backend.clone());
    let log = RevalidationLog::new();

    let err = FileService::new(&gateway, &log)
        .upload(request("notes.txt"))
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Backend(_)));
    assert_eq!(backend.calls(), vec!["create_blob"]);
}

#[tokio::test]
async fn test_oversized_upload_makes_no_calls() {
    let backend = Arc::new(FaultyBackend::new());
    let gateway = gateway(backend.clone());
    let log = RevalidationLog::new();

    let err = FileService::new(&gateway, &log)
        .with_max_file_size(4)
        .upload(request("notes.txt"))
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Validation(_)));
    assert!(backend.calls().is_empty());
}
