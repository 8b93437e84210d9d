use chrono::{DateTime, Utc};

pub type EntryId = String;
pub type OwnerId = String;
pub type RequestId = u64;

/// Number of entries shown in the in-page history preview.
pub const PREVIEW_HISTORY_LIMIT: usize = 20;

/// A persisted generation: prompt paired with the image it produced.
///
/// Entries are insert-only; `prompt` and `image_ref` never change after the
/// store has assigned `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub owner_id: Option<OwnerId>,
    pub prompt: String,
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

/// Entry as submitted to the store, before it has an id or timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub prompt: String,
    pub image_ref: String,
    pub owner_id: Option<OwnerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLimit {
    Recent(usize),
    All,
}

impl HistoryLimit {
    pub fn as_option(self) -> Option<usize> {
        match self {
            HistoryLimit::Recent(n) => Some(n),
            HistoryLimit::All => None,
        }
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        HistoryLimit::Recent(PREVIEW_HISTORY_LIMIT)
    }
}

/// Failures of the remote generation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFailure {
    #[error("request rejected: {0}")]
    RequestRejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no image returned")]
    NoImageReturned,
}

/// Stable codes for every failure surfaced to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    EmptyPrompt,
    InvalidFileType,
    AttachmentTooLarge,
    RequestRejected,
    TransportError,
    NoImageReturned,
    PersistenceFailed,
    DownloadFailed,
}

impl FailureCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCode::EmptyPrompt => "empty-prompt",
            FailureCode::InvalidFileType => "invalid-file-type",
            FailureCode::AttachmentTooLarge => "attachment-too-large",
            FailureCode::RequestRejected => "request-rejected",
            FailureCode::TransportError => "transport-error",
            FailureCode::NoImageReturned => "no-image-returned",
            FailureCode::PersistenceFailed => "persistence-failed",
            FailureCode::DownloadFailed => "download-failed",
        }
    }
}

impl GenerationFailure {
    pub fn code(&self) -> FailureCode {
        match self {
            GenerationFailure::RequestRejected(_) => FailureCode::RequestRejected,
            GenerationFailure::Transport(_) => FailureCode::TransportError,
            GenerationFailure::NoImageReturned => FailureCode::NoImageReturned,
        }
    }
}
