use engine_logging::{engine_info, engine_warn};

use crate::session::{Completion, SubmitOutcome};
use crate::{
    AppState, AttachmentError, Effect, HistoryQuery, ImageAttachment, Msg, NewHistoryEntry,
    Notification, RefreshOutcome, RemoveOutcome,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects: Vec<Effect> = match msg {
        Msg::Mounted | Msg::RefreshRequested => refresh_history(&mut state).into_iter().collect(),
        Msg::PromptEdited(text) => {
            state.session.edit_prompt(text);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked => {
            let owner = state.owner().cloned();
            match state.session.submit(owner.as_ref()) {
                SubmitOutcome::Dispatched(request) => {
                    engine_info!(
                        "Dispatching generation request {} (prompt_len={}, source_image={})",
                        request.request_id,
                        request.prompt.len(),
                        request.source_image.is_some()
                    );
                    state.mark_dirty();
                    vec![Effect::Generate(request)]
                }
                // Re-entrancy guard: the outstanding request keeps the only slot.
                SubmitOutcome::AlreadyInFlight => Vec::new(),
                SubmitOutcome::EmptyPrompt => vec![notify(&mut state, Notification::EmptyPrompt)],
            }
        }
        Msg::ImageSelected {
            content_type,
            bytes,
        } => {
            let max_bytes = state.config().max_attachment_bytes;
            match ImageAttachment::from_bytes(&content_type, &bytes, max_bytes) {
                Ok(attachment) => {
                    engine_info!(
                        "Attached source image {} ({} bytes)",
                        attachment.content_type(),
                        attachment.byte_len()
                    );
                    state.session.attach_image(attachment);
                    state.mark_dirty();
                    Vec::new()
                }
                Err(err) => {
                    engine_warn!("Rejected source image: {}", err);
                    let notification = match err {
                        AttachmentError::TooLarge { max_bytes, .. } => {
                            Notification::AttachmentTooLarge { max_bytes }
                        }
                        AttachmentError::InvalidFileType { .. } => {
                            Notification::InvalidFileType { content_type }
                        }
                    };
                    vec![notify(&mut state, notification)]
                }
            }
        }
        Msg::ImageRemoved => {
            state.session.remove_image();
            state.mark_dirty();
            Vec::new()
        }
        Msg::HistoryItemSelected { id } => {
            if let Some(entry) = state.history.find(&id).cloned() {
                state.session.load_from_history(&entry.prompt, &entry.image_ref);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DeleteClicked { id } => {
            if state.history_enabled() {
                vec![Effect::DeleteHistory { id }]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadClicked { id } => {
            let image_ref = match id {
                Some(id) => state.history.find(&id).map(|entry| entry.image_ref.clone()),
                None => state.session.result_image_ref().map(ToOwned::to_owned),
            };
            match image_ref {
                Some(image_ref) => {
                    state.set_download_pending(true);
                    state.mark_dirty();
                    vec![Effect::Download { image_ref }]
                }
                None => Vec::new(),
            }
        }
        Msg::IdentityChanged(owner) => {
            if state.set_owner(owner) {
                engine_info!("Owner changed; signed_in={}", state.owner().is_some());
                state.history.reset();
                state.set_history_loading(false);
                state.mark_dirty();
                refresh_history(&mut state).into_iter().collect()
            } else {
                Vec::new()
            }
        }
        Msg::GenerationFinished { request_id, result } => {
            match state.session.complete(request_id, result) {
                Completion::Stale => Vec::new(),
                Completion::Failed(failure) => {
                    engine_warn!("Generation request {} failed: {}", request_id, failure);
                    vec![notify(&mut state, Notification::GenerationFailed(failure))]
                }
                Completion::Succeeded {
                    image_ref,
                    original_prompt,
                    owner_at_submit,
                } => {
                    let mut effects = vec![notify(&mut state, Notification::Generated)];
                    effects.extend(append_effect(
                        &mut state,
                        original_prompt,
                        image_ref,
                        owner_at_submit,
                    ));
                    effects
                }
            }
        }
        Msg::HistoryFetched { ticket, result } => {
            match state.history.apply_refresh(ticket, result) {
                RefreshOutcome::Applied { count } => {
                    engine_info!("History refreshed with {} entries", count);
                    let pending = state.history.is_superseded(ticket);
                    state.set_history_loading(pending);
                    state.mark_dirty();
                    Vec::new()
                }
                RefreshOutcome::Stale => Vec::new(),
                RefreshOutcome::Failed(reason) => {
                    engine_warn!("History refresh {} failed: {}", ticket, reason);
                    state.set_history_loading(false);
                    vec![notify(&mut state, Notification::HistoryLoadFailed { reason })]
                }
            }
        }
        Msg::HistoryInserted { result } => {
            let enabled = state.history_enabled();
            let owner = state.owner().cloned();
            match state.history.apply_append(owner, result) {
                Ok(query) => {
                    let mut effects = vec![notify(&mut state, Notification::Saved)];
                    if enabled {
                        state.set_history_loading(true);
                        effects.push(Effect::FetchHistory(query));
                    }
                    effects
                }
                Err(reason) => {
                    engine_warn!("Saving to history failed: {}", reason);
                    vec![notify(&mut state, Notification::SaveFailed { reason })]
                }
            }
        }
        Msg::HistoryDeleted { id, result } => match state.history.apply_remove(&id, result) {
            RemoveOutcome::Removed | RemoveOutcome::AlreadyAbsent => {
                vec![notify(&mut state, Notification::Deleted)]
            }
            RemoveOutcome::Failed(reason) => {
                engine_warn!("Deleting history entry {} failed: {}", id, reason);
                vec![notify(&mut state, Notification::DeleteFailed { reason })]
            }
        },
        Msg::DownloadFinished { result } => {
            state.set_download_pending(false);
            let notification = match result {
                Ok(location) => Notification::Downloaded { location },
                Err(reason) => Notification::DownloadFailed { reason },
            };
            vec![notify(&mut state, notification)]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn refresh_history(state: &mut AppState) -> Option<Effect> {
    if !state.history_enabled() {
        return None;
    }
    let query: HistoryQuery = state.history.begin_refresh(state.owner().cloned());
    state.set_history_loading(true);
    state.mark_dirty();
    Some(Effect::FetchHistory(query))
}

/// Decides whether a successful generation is written to history.
///
/// An entry is never attributed to someone other than the owner who
/// submitted it; if that owner signed out or switched meanwhile the image
/// stays on screen and the save is reported as failed.
fn append_effect(
    state: &mut AppState,
    prompt: String,
    image_ref: String,
    owner_at_submit: Option<crate::OwnerId>,
) -> Option<Effect> {
    let current = state.owner().cloned();
    if owner_at_submit.is_some() && owner_at_submit != current {
        let reason = "owner changed before the image could be saved".to_owned();
        return Some(notify(state, Notification::SaveFailed { reason }));
    }
    if !state.history_enabled() {
        return None;
    }
    Some(Effect::InsertHistory(NewHistoryEntry {
        prompt,
        image_ref,
        owner_id: current,
    }))
}

fn notify(state: &mut AppState, notification: Notification) -> Effect {
    state.record_notification(&notification);
    state.mark_dirty();
    Effect::Notify(notification)
}
