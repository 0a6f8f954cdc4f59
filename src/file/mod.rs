//! File management.
//!
//! Files are stored as two records in the backend platform:
//! - a blob holding the content
//! - a metadata document in the files collection pointing at that blob
//!
//! [`FileService`] sequences the calls that keep the two in step.

mod mutate;
pub mod query;
mod service;
mod types;
mod upload;

pub use mutate::full_name;
pub use query::{FileQuery, SortSpec, DEFAULT_SORT};
pub use service::FileService;
pub use types::{get_file_type, DeleteStatus, FileList, FileRecord, FileType, NewFileRecord};
pub use upload::UploadRequest;

/// Default maximum file size (50MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
