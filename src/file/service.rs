//! File service.
//!
//! Entry point for the file actions. Each action runs its backend calls
//! strictly in sequence and reports the page path to revalidate on success.

use tracing::warn;

use crate::backend::{Gateway, Query};
use crate::error::log_backend;
use crate::revalidate::Revalidator;
use crate::user::UserRecord;
use crate::{Result, VaultError};

use super::query::FileQuery;
use super::{FileList, FileRecord, DEFAULT_MAX_FILE_SIZE};

/// File service for listing and mutating a user's files.
pub struct FileService<'a> {
    pub(super) gateway: &'a Gateway,
    pub(super) revalidator: &'a dyn Revalidator,
    pub(super) max_file_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(gateway: &'a Gateway, revalidator: &'a dyn Revalidator) -> Self {
        Self {
            gateway,
            revalidator,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Collection holding file metadata documents.
    pub(super) fn files_collection(&self) -> &str {
        &self.gateway.collections().files
    }

    /// Load a file `user` may change.
    ///
    /// Files the user cannot see are reported as [`VaultError::FileNotFound`];
    /// files only shared with them as [`VaultError::NotFileOwner`].
    pub(super) async fn owned_file(&self, user: &UserRecord, file_id: &str) -> Result<FileRecord> {
        let queries = [
            Query::equal("$id", file_id),
            FileQuery::visibility(user),
            Query::Limit(1),
        ];
        let list = self
            .gateway
            .documents()
            .list_documents(self.files_collection(), &queries)
            .await
            .map_err(log_backend("Failed to load file"))?;

        let file = match list.documents.into_iter().next() {
            Some(doc) => doc.decode::<FileRecord>()?,
            None => {
                warn!(file_id, user_id = %user.id, "File not visible to user");
                return Err(VaultError::FileNotFound(file_id.to_string()));
            }
        };
        if file.owner != user.id {
            warn!(file_id, user_id = %user.id, owner = %file.owner, "Change by non-owner rejected");
            return Err(VaultError::NotFileOwner(file_id.to_string()));
        }
        Ok(file)
    }

    /// List files owned by or shared with `user`.
    pub async fn list(&self, user: &UserRecord, query: &FileQuery) -> Result<FileList> {
        let queries = query.build(user);
        let list = self
            .gateway
            .documents()
            .list_documents(self.files_collection(), &queries)
            .await
            .map_err(log_backend("Failed to get files"))?;

        let documents = list
            .documents
            .into_iter()
            .map(|doc| doc.decode::<FileRecord>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(FileList {
            total: list.total,
            documents,
        })
    }
}
