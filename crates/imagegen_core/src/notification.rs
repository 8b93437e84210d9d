use crate::{FailureCode, GenerationFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Success,
    Error,
}

/// One-shot transient message for the shell. Wording is the shell's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    EmptyPrompt,
    InvalidFileType { content_type: String },
    AttachmentTooLarge { max_bytes: usize },
    Generated,
    GenerationFailed(GenerationFailure),
    Saved,
    SaveFailed { reason: String },
    HistoryLoadFailed { reason: String },
    Deleted,
    DeleteFailed { reason: String },
    Downloaded { location: String },
    DownloadFailed { reason: String },
}

impl Notification {
    pub fn category(&self) -> NotificationCategory {
        match self {
            Notification::Generated
            | Notification::Saved
            | Notification::Deleted
            | Notification::Downloaded { .. } => NotificationCategory::Success,
            _ => NotificationCategory::Error,
        }
    }

    pub fn failure_code(&self) -> Option<FailureCode> {
        match self {
            Notification::EmptyPrompt => Some(FailureCode::EmptyPrompt),
            Notification::InvalidFileType { .. } => Some(FailureCode::InvalidFileType),
            Notification::AttachmentTooLarge { .. } => Some(FailureCode::AttachmentTooLarge),
            Notification::GenerationFailed(failure) => Some(failure.code()),
            Notification::SaveFailed { .. }
            | Notification::HistoryLoadFailed { .. }
            | Notification::DeleteFailed { .. } => Some(FailureCode::PersistenceFailed),
            Notification::DownloadFailed { .. } => Some(FailureCode::DownloadFailed),
            Notification::Generated
            | Notification::Saved
            | Notification::Deleted
            | Notification::Downloaded { .. } => None,
        }
    }
}
