//! File metadata types and file-type categorisation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "csv", "rtf", "ods", "ppt", "odp", "md", "html",
    "htm", "epub", "pages", "fig", "psd", "ai", "indd", "xd", "sketch", "afdesign", "afphoto",
];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Category of a stored file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Image,
    Video,
    Audio,
    Other,
}

impl FileType {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Document => "document",
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Other => "other",
        }
    }

    /// Categorise a lower-case extension.
    pub fn from_extension(extension: &str) -> Self {
        if DOCUMENT_EXTENSIONS.contains(&extension) {
            FileType::Document
        } else if IMAGE_EXTENSIONS.contains(&extension) {
            FileType::Image
        } else if VIDEO_EXTENSIONS.contains(&extension) {
            FileType::Video
        } else if AUDIO_EXTENSIONS.contains(&extension) {
            FileType::Audio
        } else {
            FileType::Other
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" => Ok(FileType::Document),
            "image" => Ok(FileType::Image),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            "other" => Ok(FileType::Other),
            other => Err(format!("unknown file type: {other}")),
        }
    }
}

/// Derive the file type and lower-case extension from a file name.
///
/// Names without an extension map to `(Other, "")`.
pub fn get_file_type(name: &str) -> (FileType, String) {
    let extension = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    };
    if extension.is_empty() {
        return (FileType::Other, extension);
    }
    (FileType::from_extension(&extension), extension)
}

/// A file metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Document ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Creation timestamp.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// File category.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Display name.
    pub name: String,
    /// Lower-case extension without the dot.
    pub extension: String,
    /// Public view URL of the blob.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// Owning user document ID.
    pub owner: String,
    /// Owner's account ID.
    #[serde(rename = "accountId")]
    pub account_id: String,
    /// Emails the file is shared with.
    #[serde(default)]
    pub users: Vec<String>,
    /// ID of the underlying blob.
    #[serde(rename = "bucketFileId")]
    pub bucket_file_id: String,
}

impl FileRecord {
    /// Whether `email` has been granted access.
    pub fn is_shared_with(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.eq_ignore_ascii_case(email))
    }
}

/// Attributes of a file metadata document to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFileRecord {
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub name: String,
    pub url: String,
    pub extension: String,
    pub size: u64,
    pub owner: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub users: Vec<String>,
    #[serde(rename = "bucketFileId")]
    pub bucket_file_id: String,
}

impl NewFileRecord {
    /// The record as stored under `id` with the backend's timestamps.
    pub fn into_record(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> FileRecord {
        FileRecord {
            id,
            created_at,
            updated_at,
            file_type: self.file_type,
            name: self.name,
            extension: self.extension,
            url: self.url,
            size: self.size,
            owner: self.owner,
            account_id: self.account_id,
            users: self.users,
            bucket_file_id: self.bucket_file_id,
        }
    }
}

/// A page of file records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileList {
    /// Total number of visible files matching the filters.
    pub total: u64,
    /// Files in query order.
    pub documents: Vec<FileRecord>,
}

/// Outcome marker of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteStatus {
    Success,
}
