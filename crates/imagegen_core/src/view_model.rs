use crate::{EntryId, GenerationStatus, HistoryEntry, Notification, OwnerId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub status: GenerationStatus,
    pub prompt_draft: String,
    pub can_submit: bool,
    pub source_image_type: Option<String>,
    pub result_image_ref: Option<String>,
    pub error_message: Option<String>,
    pub owner: Option<OwnerId>,
    pub history: Vec<HistoryRowView>,
    pub history_loading: bool,
    pub download_pending: bool,
    pub last_notification: Option<Notification>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub id: EntryId,
    pub prompt: String,
    pub image_ref: String,
    pub created_date: String,
}

impl HistoryRowView {
    pub(crate) fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            prompt: entry.prompt.clone(),
            image_ref: entry.image_ref.clone(),
            created_date: entry.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}
