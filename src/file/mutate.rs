//! Rename, share and delete.
//!
//! Every mutation first loads the file through the acting user's
//! visibility and requires that user to be its owner.

use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::error::log_backend;
use crate::user::validation::{normalize_emails, validate_file_name};
use crate::user::UserRecord;
use crate::{Result, VaultError};

use super::service::FileService;
use super::types::{DeleteStatus, FileRecord};

/// Join a base name and extension. An empty extension leaves the name bare.
pub fn full_name(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}

impl FileService<'_> {
    async fn update_file(&self, file_id: &str, data: Map<String, Value>) -> Result<FileRecord> {
        let doc = self
            .gateway
            .documents()
            .update_document(self.files_collection(), file_id, data)
            .await
            .map_err(log_backend("Failed to update file"))?;
        Ok(doc.decode()?)
    }

    /// Rename a file to `{name}.{extension}`.
    ///
    /// Only the `name` attribute changes; the stored extension and type
    /// are kept.
    pub async fn rename(
        &self,
        user: &UserRecord,
        file_id: &str,
        name: &str,
        extension: &str,
        path: &str,
    ) -> Result<FileRecord> {
        let new_name = full_name(name.trim(), extension.trim());
        validate_file_name(&new_name)?;
        self.owned_file(user, file_id).await?;

        let mut data = Map::new();
        data.insert("name".to_string(), json!(new_name));
        let file = self.update_file(file_id, data).await?;

        info!(file_id, name = %file.name, "File renamed");
        self.revalidator.revalidate(path);
        Ok(file)
    }

    /// Replace the set of emails a file is shared with.
    pub async fn update_users(
        &self,
        user: &UserRecord,
        file_id: &str,
        emails: &[String],
        path: &str,
    ) -> Result<FileRecord> {
        let emails = normalize_emails(emails)?;
        self.owned_file(user, file_id).await?;

        let mut data = Map::new();
        data.insert("users".to_string(), json!(emails));
        let file = self.update_file(file_id, data).await?;

        info!(file_id, shared_with = file.users.len(), "File sharing updated");
        self.revalidator.revalidate(path);
        Ok(file)
    }

    /// Delete a file's metadata document, then its blob.
    ///
    /// The blob is the one the document points at, and it is only touched
    /// once the document is gone. A blob that cannot be deleted is reported
    /// as [`VaultError::OrphanedBlob`].
    pub async fn delete(
        &self,
        user: &UserRecord,
        file_id: &str,
        path: &str,
    ) -> Result<DeleteStatus> {
        let file = self.owned_file(user, file_id).await?;
        let blob_id = file.bucket_file_id.as_str();

        self.gateway
            .documents()
            .delete_document(self.files_collection(), file_id)
            .await
            .map_err(log_backend("Failed to delete file"))?;

        if let Err(source) = self.gateway.blobs().delete_blob(blob_id).await {
            error!(error = %source, file_id, blob_id, "Failed to delete blob");
            return Err(VaultError::OrphanedBlob {
                blob_id: blob_id.to_string(),
                source,
            });
        }

        info!(file_id, blob_id, "File deleted");
        self.revalidator.revalidate(path);
        Ok(DeleteStatus::Success)
    }
}
