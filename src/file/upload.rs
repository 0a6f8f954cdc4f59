//! Upload sequence: store the blob, then its metadata document.
//!
//! The two writes go to different stores and cannot be made atomic. When
//! the metadata document cannot be created the blob is deleted again so no
//! unreferenced content is left behind.

use bytes::Bytes;
use tracing::{error, info, warn};

use crate::backend::{to_data, unique_id};
use crate::error::log_backend;
use crate::user::validation::validate_file_name;
use crate::{Result, VaultError};

use super::service::FileService;
use super::types::{get_file_type, FileRecord, NewFileRecord};

/// Request data for file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub filename: String,
    /// File content.
    pub content: Bytes,
    /// Owning user document ID.
    pub owner_id: String,
    /// Owner's account ID.
    pub account_id: String,
    /// Page path to revalidate on success.
    pub path: String,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<Bytes>,
        owner_id: impl Into<String>,
        account_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            owner_id: owner_id.into(),
            account_id: account_id.into(),
            path: path.into(),
        }
    }
}

impl FileService<'_> {
    /// Upload a file.
    ///
    /// # Validation
    /// - Filename: non-empty, no path separators
    /// - Content: non-empty, at most the configured size
    ///
    /// # Failure
    /// If the metadata document cannot be created the blob is deleted and
    /// the creation error is returned. If that delete fails as well,
    /// [`VaultError::UploadRollback`] carries both errors.
    pub async fn upload(&self, request: UploadRequest) -> Result<FileRecord> {
        validate_file_name(&request.filename)?;
        if request.content.is_empty() {
            return Err(VaultError::Validation("file is empty".to_string()));
        }
        if request.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(VaultError::Validation(format!(
                "file too large (max {max_mb}MB)"
            )));
        }

        let blobs = self.gateway.blobs();
        let blob = blobs
            .create_blob(&unique_id(), &request.filename, request.content)
            .await
            .map_err(log_backend("Failed to upload file"))?;

        let (file_type, extension) = get_file_type(&blob.name);
        let new_file = NewFileRecord {
            file_type,
            name: blob.name.clone(),
            url: self.gateway.urls().view_url(&blob.id),
            extension,
            size: blob.size,
            owner: request.owner_id,
            account_id: request.account_id,
            users: Vec::new(),
            bucket_file_id: blob.id.clone(),
        };

        let created = match to_data(&new_file) {
            Ok(data) => {
                self.gateway
                    .documents()
                    .create_document(self.files_collection(), &unique_id(), data)
                    .await
            }
            Err(e) => Err(e),
        };

        let doc = match created {
            Ok(doc) => doc,
            Err(source) => {
                error!(error = %source, blob_id = %blob.id, "Failed to create file document");
                if let Err(cleanup) = blobs.delete_blob(&blob.id).await {
                    warn!(error = %cleanup, blob_id = %blob.id, "Failed to remove orphaned blob");
                    return Err(VaultError::UploadRollback { source, cleanup });
                }
                return Err(source.into());
            }
        };

        // The document is stored; build the result from what was written
        // so a response missing attributes cannot fail the upload.
        let file = new_file.into_record(doc.id, doc.created_at, doc.updated_at);
        info!(file_id = %file.id, blob_id = %blob.id, size = file.size, "File uploaded");
        self.revalidator.revalidate(&request.path);
        Ok(file)
    }
}
