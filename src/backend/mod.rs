//! Backend platform gateway.
//!
//! All durable state lives in an external backend-as-a-service platform.
//! This module defines the three service seams the application calls
//! through and the [`Gateway`] that bundles them:
//! - [`DocumentStore`] for metadata and user documents
//! - [`BlobStore`] for file contents
//! - [`AccountService`] for email tokens and sessions
//!
//! Two implementations are provided: [`HttpBackend`] talks to the
//! platform's REST API, [`MemoryBackend`] keeps everything in process.

mod error;
pub mod http;
pub mod memory;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::BackendConfig;

pub use error::BackendError;
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use query::Query;

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// A stored document: system attributes plus collection-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Creation timestamp.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Collection attributes.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Decode this document into a typed record.
    pub fn decode<T: DeserializeOwned>(self) -> BackendResult<T> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Result of a document listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentList {
    /// Total number of matching documents (before limit).
    pub total: u64,
    /// Matching documents.
    pub documents: Vec<Document>,
}

/// A blob as recorded by the blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Blob ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Stored file name.
    pub name: String,
    /// Size of the uploaded content in bytes.
    #[serde(rename = "sizeOriginal")]
    pub size: u64,
    /// MIME type detected by the store.
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

/// Outcome of an email-token request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailToken {
    /// Token ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Account the token was issued for.
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Account the session belongs to.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Session secret to be stored in the session cookie.
    #[serde(default)]
    pub secret: String,
}

/// Account details visible to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Account email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Document database operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with the given ID.
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document>;

    /// List documents matching all queries.
    async fn list_documents(&self, collection: &str, queries: &[Query])
        -> BackendResult<DocumentList>;

    /// Update the given attributes of a document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document>;

    /// Delete a document.
    async fn delete_document(&self, collection: &str, id: &str) -> BackendResult<()>;
}

/// Blob storage operations.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `id` with the given file name.
    async fn create_blob(&self, id: &str, name: &str, data: Bytes) -> BackendResult<StoredBlob>;

    /// Delete a blob.
    async fn delete_blob(&self, id: &str) -> BackendResult<()>;
}

/// Account and session operations.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Send a one-time passcode to `email`.
    ///
    /// `user_id` is used when the email has no account yet; otherwise the
    /// existing account is reused and its ID is returned.
    async fn create_email_token(&self, user_id: &str, email: &str) -> BackendResult<EmailToken>;

    /// Exchange an account ID and passcode for a session.
    async fn create_session(&self, user_id: &str, secret: &str) -> BackendResult<Session>;

    /// Resolve the account behind a session secret.
    async fn get_account(&self, session_secret: &str) -> BackendResult<Account>;

    /// Delete the session identified by its secret.
    async fn delete_session(&self, session_secret: &str) -> BackendResult<()>;
}

/// Collection identifiers used by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    /// User documents.
    pub users: String,
    /// File metadata documents.
    pub files: String,
}

/// Builds public view URLs for stored blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUrls {
    endpoint: String,
    bucket_id: String,
    project_id: String,
}

impl FileUrls {
    /// Create a URL builder.
    pub fn new(
        endpoint: impl Into<String>,
        bucket_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket_id: bucket_id.into(),
            project_id: project_id.into(),
        }
    }

    /// Public URL of a blob.
    pub fn view_url(&self, blob_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint, self.bucket_id, blob_id, self.project_id
        )
    }
}

/// Handles to the backend services, passed explicitly into every action.
///
/// Cloning is cheap; each request works on its own clone.
#[derive(Clone)]
pub struct Gateway {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    accounts: Arc<dyn AccountService>,
    collections: Collections,
    urls: FileUrls,
}

impl Gateway {
    /// Assemble a gateway from individual services.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        accounts: Arc<dyn AccountService>,
        collections: Collections,
        urls: FileUrls,
    ) -> Self {
        Self {
            documents,
            blobs,
            accounts,
            collections,
            urls,
        }
    }

    /// Gateway backed by a single object implementing all three services.
    pub fn from_backend<B>(backend: Arc<B>, collections: Collections, urls: FileUrls) -> Self
    where
        B: DocumentStore + BlobStore + AccountService + 'static,
    {
        Self::new(
            backend.clone(),
            backend.clone(),
            backend,
            collections,
            urls,
        )
    }

    /// Build the gateway selected by the configuration.
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let collections = Collections {
            users: config.users_collection_id.clone(),
            files: config.files_collection_id.clone(),
        };
        let urls = FileUrls::new(&config.endpoint, &config.bucket_id, &config.project_id);

        match config.kind.as_str() {
            "memory" => {
                tracing::warn!("Using in-memory backend; data is lost on shutdown");
                Ok(Self::from_backend(
                    Arc::new(MemoryBackend::new()),
                    collections,
                    urls,
                ))
            }
            _ => {
                let backend = HttpBackend::new(config)?;
                Ok(Self::from_backend(Arc::new(backend), collections, urls))
            }
        }
    }

    /// Document store handle.
    pub fn documents(&self) -> &dyn DocumentStore {
        self.documents.as_ref()
    }

    /// Blob store handle.
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// Account service handle.
    pub fn accounts(&self) -> &dyn AccountService {
        self.accounts.as_ref()
    }

    /// Collection identifiers.
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Public URL builder.
    pub fn urls(&self) -> &FileUrls {
        &self.urls
    }
}

/// Serialize a record into document attributes.
pub fn to_data<T: Serialize>(record: &T) -> BackendResult<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::Decode(format!(
            "expected an object for document data, got {other}"
        ))),
    }
}

/// Generate a platform-compatible unique ID.
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
