use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use imagegen_core::{Effect, GenerationFailure, HistoryQuery, Msg};
use tokio::sync::watch;

use crate::{Identity, ImageDownloader, ImageGenerator, HistoryStore, StoreError};

/// The collaborators the engine executes effects against.
#[derive(Clone)]
pub struct EngineServices {
    pub generator: Arc<dyn ImageGenerator>,
    pub store: Arc<dyn HistoryStore>,
    pub downloader: Arc<ImageDownloader>,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for any single effect. A generation that exceeds it
    /// settles as a transport error.
    pub effect_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            effect_timeout: Duration::from_secs(150),
        }
    }
}

enum EngineCommand {
    Execute(Effect),
    FollowIdentity(watch::Receiver<Option<Identity>>),
}

/// Runs effects on a background tokio runtime and reports completions as
/// [`Msg`]s. Every effect is spawned independently; ordering between them is
/// the state machine's concern.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<Msg>,
}

impl EngineHandle {
    pub fn new(services: EngineServices, config: EngineConfig) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("imagegen-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Execute(effect) => {
                            let services = services.clone();
                            let event_tx = event_tx.clone();
                            let timeout = config.effect_timeout;
                            runtime.spawn(async move {
                                if let Some(msg) = execute(&services, effect, timeout).await {
                                    let _ = event_tx.send(msg);
                                }
                            });
                        }
                        EngineCommand::FollowIdentity(rx) => {
                            runtime.spawn(forward_identity(rx, event_tx.clone()));
                        }
                    }
                }
                engine_info!("Engine command channel closed; shutting down");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn execute(&self, effect: Effect) {
        let _ = self.cmd_tx.send(EngineCommand::Execute(effect));
    }

    /// Emits `Msg::IdentityChanged` whenever the owner behind `rx` changes,
    /// starting with its current value.
    pub fn follow_identity(&self, rx: watch::Receiver<Option<Identity>>) {
        let _ = self.cmd_tx.send(EngineCommand::FollowIdentity(rx));
    }

    pub fn try_recv(&self) -> Option<Msg> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn execute(services: &EngineServices, effect: Effect, timeout: Duration) -> Option<Msg> {
    match effect {
        Effect::Generate(request) => {
            let call = services
                .generator
                .generate(&request.prompt, request.source_image.as_deref());
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(GenerationFailure::Transport(
                    "generation timed out".to_string(),
                )),
            };
            engine_debug!(
                "Generation request {} settled (ok={})",
                request.request_id,
                result.is_ok()
            );
            Some(Msg::GenerationFinished {
                request_id: request.request_id,
                result,
            })
        }
        Effect::FetchHistory(HistoryQuery {
            ticket,
            owner,
            limit,
        }) => {
            let call = services
                .store
                .select_recent(owner.as_deref(), limit.as_option());
            let result = with_timeout(timeout, call).await;
            Some(Msg::HistoryFetched {
                ticket,
                result: result.map_err(|err| err.to_string()),
            })
        }
        Effect::InsertHistory(entry) => {
            let result = with_timeout(timeout, services.store.insert(entry)).await;
            Some(Msg::HistoryInserted {
                result: result.map_err(|err| err.to_string()),
            })
        }
        Effect::DeleteHistory { id } => {
            let result = with_timeout(timeout, services.store.delete_by_id(&id)).await;
            Some(Msg::HistoryDeleted {
                id,
                result: result.map_err(|err| err.to_string()),
            })
        }
        Effect::Download { image_ref } => {
            let result = match tokio::time::timeout(timeout, services.downloader.download(&image_ref))
                .await
            {
                Ok(Ok(path)) => Ok(path.display().to_string()),
                Ok(Err(err)) => {
                    engine_warn!("Download failed: {}", err);
                    Err(err.to_string())
                }
                Err(_) => Err("download timed out".to_string()),
            };
            Some(Msg::DownloadFinished { result })
        }
        Effect::Notify(notification) => {
            engine_error!(
                "Notification {:?} reached the engine; the shell should render it",
                notification
            );
            None
        }
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    call: impl std::future::Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(StoreError::Timeout))
}

async fn forward_identity(mut rx: watch::Receiver<Option<Identity>>, event_tx: mpsc::Sender<Msg>) {
    let mut last_owner = None;
    loop {
        let owner = rx
            .borrow_and_update()
            .as_ref()
            .map(|identity| identity.user_id.clone());
        if last_owner.as_ref() != Some(&owner) {
            if event_tx.send(Msg::IdentityChanged(owner.clone())).is_err() {
                return;
            }
            last_owner = Some(owner);
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
