//! Test helpers for integration tests.
//!
//! Provides a fault-injecting backend that wraps [`MemoryBackend`],
//! records every call by operation name and fails the operations a test
//! selects.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};

use cloudstash::backend::{
    Account, AccountService, BackendResult, BlobStore, Collections, Document, DocumentList,
    DocumentStore, EmailToken, FileUrls, MemoryBackend, Query, Session, StoredBlob,
};
use cloudstash::{BackendError, Gateway};

pub const ENDPOINT: &str = "https://cloud.example.com/v1";
pub const BUCKET: &str = "files";
pub const PROJECT: &str = "proj";

/// Backend wrapper that records calls and fails selected operations.
pub struct FaultyBackend {
    pub inner: MemoryBackend,
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    blank_documents: AtomicBool,
}

impl FaultyBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            blank_documents: AtomicBool::new(false),
        }
    }

    /// Store created documents normally but answer with no attributes.
    pub fn blank_documents(&self) {
        self.blank_documents.store(true, Ordering::SeqCst);
    }

    /// Make every later call to `op` fail with a 500.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to `op`.
    pub fn count(&self, op: &'static str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    fn record(&self, op: &'static str) -> BackendResult<()> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(op) {
            return Err(BackendError::Status {
                status: 500,
                message: format!("injected failure in {op}"),
                kind: Some("general_unknown".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyBackend {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document> {
        self.record("create_document")?;
        let mut doc = self.inner.create_document(collection, id, data).await?;
        if self.blank_documents.load(Ordering::SeqCst) {
            doc.data.clear();
        }
        Ok(doc)
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        self.record("list_documents")?;
        self.inner.list_documents(collection, queries).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document> {
        self.record("update_document")?;
        self.inner.update_document(collection, id, data).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> BackendResult<()> {
        self.record("delete_document")?;
        self.inner.delete_document(collection, id).await
    }
}

#[async_trait]
impl BlobStore for FaultyBackend {
    async fn create_blob(&self, id: &str, name: &str, data: Bytes) -> BackendResult<StoredBlob> {
        self.record("create_blob")?;
        self.inner.create_blob(id, name, data).await
    }

    async fn delete_blob(&self, id: &str) -> BackendResult<()> {
        self.record("delete_blob")?;
        self.inner.delete_blob(id).await
    }
}

#[async_trait]
impl AccountService for FaultyBackend {
    async fn create_email_token(&self, user_id: &str, email: &str) -> BackendResult<EmailToken> {
        self.record("create_email_token")?;
        self.inner.create_email_token(user_id, email).await
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> BackendResult<Session> {
        self.record("create_session")?;
        self.inner.create_session(user_id, secret).await
    }

    async fn get_account(&self, session_secret: &str) -> BackendResult<Account> {
        self.record("get_account")?;
        self.inner.get_account(session_secret).await
    }

    async fn delete_session(&self, session_secret: &str) -> BackendResult<()> {
        self.record("delete_session")?;
        self.inner.delete_session(session_secret).await
    }
}

/// Gateway over `backend` with the default collection names.
pub fn gateway<B>(backend: Arc<B>) -> Gateway
where
    B: DocumentStore + BlobStore + AccountService + 'static,
{
    Gateway::from_backend(
        backend,
        Collections {
            users: "users".to_string(),
            files: "files".to_string(),
        },
        FileUrls::new(ENDPOINT, BUCKET, PROJECT),
    )
}

/// Expected public URL of a blob.
pub fn view_url(blob_id: &str) -> String {
    format!("{ENDPOINT}/storage/buckets/{BUCKET}/files/{blob_id}/view?project={PROJECT}")
}
