use engine_logging::engine_debug;

use crate::prompt::prepare_prompt;
use crate::{GenerationFailure, ImageAttachment, OwnerId, RequestId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Payload for the single outstanding generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub request_id: RequestId,
    /// Prompt after enhancement.
    pub prompt: String,
    /// Inlined `data:` reference of the attached source image.
    pub source_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Dispatched(GenerationRequest),
    AlreadyInFlight,
    EmptyPrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Succeeded {
        image_ref: String,
        /// User-authored prompt, pre-enhancement.
        original_prompt: String,
        owner_at_submit: Option<OwnerId>,
    },
    Failed(GenerationFailure),
    /// Completion for a request this session is not waiting on.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    request_id: RequestId,
    original_prompt: String,
    owner_at_submit: Option<OwnerId>,
    /// Attachment revision sent with the request, if any.
    sent_attachment: Option<u64>,
}

/// The current generation attempt.
///
/// Holds at most one pending request. `result_image_ref` always belongs to the
/// last successful request, so a failed retry never blanks it; `error_message`
/// is cleared whenever a new request starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationSession {
    status: GenerationStatus,
    prompt_draft: String,
    source_image: Option<ImageAttachment>,
    /// Bumped whenever `source_image` is replaced or removed.
    attachment_revision: u64,
    result_image_ref: Option<String>,
    error_message: Option<String>,
    pending: Option<PendingRequest>,
    last_request_id: RequestId,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == GenerationStatus::InFlight
    }

    pub fn prompt_draft(&self) -> &str {
        &self.prompt_draft
    }

    pub fn source_image(&self) -> Option<&ImageAttachment> {
        self.source_image.as_ref()
    }

    pub fn result_image_ref(&self) -> Option<&str> {
        self.result_image_ref.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn edit_prompt(&mut self, text: impl Into<String>) {
        self.prompt_draft = text.into();
    }

    pub fn attach_image(&mut self, attachment: ImageAttachment) {
        self.source_image = Some(attachment);
        self.attachment_revision += 1;
    }

    pub fn remove_image(&mut self) {
        self.source_image = None;
        self.attachment_revision += 1;
    }

    /// Starts a request unless one is already outstanding or the draft is blank.
    pub fn submit(&mut self, owner: Option<&OwnerId>) -> SubmitOutcome {
        if self.is_in_flight() {
            return SubmitOutcome::AlreadyInFlight;
        }
        let Some(prepared) = prepare_prompt(&self.prompt_draft) else {
            return SubmitOutcome::EmptyPrompt;
        };

        self.last_request_id += 1;
        let request_id = self.last_request_id;
        engine_debug!(
            "Prepared request {} (infographic_enhanced={})",
            request_id,
            prepared.is_enhanced()
        );
        self.pending = Some(PendingRequest {
            request_id,
            original_prompt: prepared.original,
            owner_at_submit: owner.cloned(),
            sent_attachment: self
                .source_image
                .as_ref()
                .map(|_| self.attachment_revision),
        });
        self.status = GenerationStatus::InFlight;
        self.error_message = None;

        SubmitOutcome::Dispatched(GenerationRequest {
            request_id,
            prompt: prepared.dispatched,
            source_image: self
                .source_image
                .as_ref()
                .map(|image| image.data_url().to_owned()),
        })
    }

    pub fn complete(
        &mut self,
        request_id: RequestId,
        result: Result<String, GenerationFailure>,
    ) -> Completion {
        let pending = match self.pending.take() {
            Some(pending) if pending.request_id == request_id => pending,
            other => {
                engine_debug!(
                    "Dropping completion for request {} (pending: {:?})",
                    request_id,
                    other.as_ref().map(|p| p.request_id)
                );
                self.pending = other;
                return Completion::Stale;
            }
        };

        let result = result.and_then(|image_ref| {
            if image_ref.trim().is_empty() {
                Err(GenerationFailure::NoImageReturned)
            } else {
                Ok(image_ref)
            }
        });

        match result {
            Ok(image_ref) => {
                self.status = GenerationStatus::Succeeded;
                self.result_image_ref = Some(image_ref.clone());
                self.error_message = None;
                // An image picked while the request ran was never sent.
                if pending.sent_attachment == Some(self.attachment_revision) {
                    self.source_image = None;
                }
                Completion::Succeeded {
                    image_ref,
                    original_prompt: pending.original_prompt,
                    owner_at_submit: pending.owner_at_submit,
                }
            }
            Err(failure) => {
                self.status = GenerationStatus::Failed;
                self.error_message = Some(failure.to_string());
                Completion::Failed(failure)
            }
        }
    }

    /// Re-loads a past generation: prompt and image are replaced together.
    pub fn load_from_history(&mut self, prompt: &str, image_ref: &str) {
        self.prompt_draft = prompt.to_owned();
        self.result_image_ref = Some(image_ref.to_owned());
        self.error_message = None;
    }
}
