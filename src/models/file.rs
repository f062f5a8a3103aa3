use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file the dashboard keeps track of. Only metadata is stored; the file
/// itself is never opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
    pub kind: FileKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Document,
    Image,
    Audio,
    Video,
    Archive,
    Other,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Archive => "archive",
            Self::Other => "other",
        }
    }

    /// Guess the kind from the file extension.
    pub fn from_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt" | "md" | "pdf" | "doc" | "docx" | "odt" | "csv" | "json") => Self::Document,
            Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp") => Self::Image,
            Some("mp3" | "wav" | "flac" | "ogg") => Self::Audio,
            Some("mp4" | "mkv" | "mov" | "avi" | "webm") => Self::Video,
            Some("zip" | "tar" | "gz" | "xz" | "7z") => Self::Archive,
            _ => Self::Other,
        }
    }
}

/// Input for adding a file. `kind` is inferred from the path when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFileInput {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub kind: Option<FileKind>,
}

/// Input for updating a file. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileInput {
    pub name: Option<String>,
    pub path: Option<String>,
    pub size_bytes: Option<u64>,
    pub kind: Option<FileKind>,
}
