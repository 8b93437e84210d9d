use crate::attachment::DEFAULT_MAX_ATTACHMENT_BYTES;
use crate::view_model::{AppViewModel, HistoryRowView};
use crate::{GenerationSession, HistoryCache, HistoryLimit, Notification, OwnerId};

/// Knobs the shell passes in when it mounts the generator view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    pub history_limit: HistoryLimit,
    /// Keep and show history without a signed-in owner.
    pub anonymous_history: bool,
    pub max_attachment_bytes: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            history_limit: HistoryLimit::default(),
            anonymous_history: false,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    config: CoreConfig,
    pub(crate) session: GenerationSession,
    pub(crate) history: HistoryCache,
    owner: Option<OwnerId>,
    history_loading: bool,
    download_pending: bool,
    last_notification: Option<Notification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            history: HistoryCache::new(config.history_limit),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    /// Whether history can be read or written for the current owner.
    pub fn history_enabled(&self) -> bool {
        self.owner.is_some() || self.config.anonymous_history
    }

    pub fn view(&self) -> AppViewModel {
        let session = &self.session;
        AppViewModel {
            status: session.status(),
            prompt_draft: session.prompt_draft().to_owned(),
            can_submit: !session.is_in_flight() && !session.prompt_draft().trim().is_empty(),
            source_image_type: session
                .source_image()
                .map(|image| image.content_type().to_owned()),
            result_image_ref: session.result_image_ref().map(ToOwned::to_owned),
            error_message: session.error_message().map(ToOwned::to_owned),
            owner: self.owner.clone(),
            history: self
                .history
                .items()
                .iter()
                .map(HistoryRowView::from_entry)
                .collect(),
            history_loading: self.history_loading,
            download_pending: self.download_pending,
            last_notification: self.last_notification.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn set_owner(&mut self, owner: Option<OwnerId>) -> bool {
        if self.owner == owner {
            return false;
        }
        self.owner = owner;
        true
    }

    pub(crate) fn set_history_loading(&mut self, loading: bool) {
        self.history_loading = loading;
    }

    pub(crate) fn set_download_pending(&mut self, pending: bool) {
        self.download_pending = pending;
    }

    pub(crate) fn record_notification(&mut self, notification: &Notification) {
        self.last_notification = Some(notification.clone());
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns and clears the render flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
