//! Imagegen core: pure generation-session and history state machine.
mod attachment;
mod effect;
mod history;
mod msg;
mod notification;
mod prompt;
mod session;
mod state;
mod types;
mod update;
mod view_model;

pub use attachment::{AttachmentError, ImageAttachment, DEFAULT_MAX_ATTACHMENT_BYTES};
pub use effect::Effect;
pub use history::{HistoryCache, HistoryQuery, RefreshOutcome, RemoveOutcome};
pub use msg::Msg;
pub use notification::{Notification, NotificationCategory};
pub use prompt::{is_infographic_request, prepare_prompt, DispatchPrompt, INFOGRAPHIC_STYLE_PREFIX};
pub use session::{Completion, GenerationRequest, GenerationSession, GenerationStatus, SubmitOutcome};
pub use state::{AppState, CoreConfig};
pub use types::{
    EntryId, FailureCode, GenerationFailure, HistoryEntry, HistoryLimit, NewHistoryEntry, OwnerId,
    RequestId, PREVIEW_HISTORY_LIMIT,
};
pub use update::update;
pub use view_model::{AppViewModel, HistoryRowView};
