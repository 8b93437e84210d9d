use crate::{EntryId, GenerationFailure, HistoryEntry, OwnerId, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The view became visible; load history for the current owner.
    Mounted,
    /// User edited the prompt input.
    PromptEdited(String),
    /// User pressed Generate (or Enter).
    SubmitClicked,
    /// User picked a local file to use as the source image.
    ImageSelected { content_type: String, bytes: Vec<u8> },
    /// User removed the attached source image.
    ImageRemoved,
    /// User picked a past generation from the gallery.
    HistoryItemSelected { id: EntryId },
    /// User asked to delete a past generation.
    DeleteClicked { id: EntryId },
    /// User asked to download the current result (`None`) or a history item.
    DownloadClicked { id: Option<EntryId> },
    /// User asked for a fresh history fetch.
    RefreshRequested,
    /// The authenticated owner changed (`None` means anonymous).
    IdentityChanged(Option<OwnerId>),
    /// Engine: generation call settled.
    GenerationFinished {
        request_id: RequestId,
        result: Result<String, GenerationFailure>,
    },
    /// Engine: history fetch settled.
    HistoryFetched {
        ticket: u64,
        result: Result<Vec<HistoryEntry>, String>,
    },
    /// Engine: history insert settled.
    HistoryInserted { result: Result<HistoryEntry, String> },
    /// Engine: history delete settled.
    HistoryDeleted { id: EntryId, result: Result<(), String> },
    /// Engine: download settled; `Ok` carries where the file went.
    DownloadFinished { result: Result<String, String> },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
