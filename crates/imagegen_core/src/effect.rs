use crate::{EntryId, GenerationRequest, HistoryQuery, NewHistoryEntry, Notification};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate(GenerationRequest),
    FetchHistory(HistoryQuery),
    InsertHistory(NewHistoryEntry),
    DeleteHistory { id: EntryId },
    Download { image_ref: String },
    Notify(Notification),
}
