use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use imagegen_core::{update, AppState, Msg};
use imagegen_engine::{
    AuthClient, AuthError, AuthSession, EngineConfig, EngineHandle, EngineServices,
    HistoryStore, HttpImageGenerator, ImageDownloader, InMemoryHistoryStore, RestHistoryStore,
};

use super::config::{AppConfig, HistoryBackend};
use super::effects::EffectRunner;
use super::i18n::{self, Language};
use super::persistence::{self, Preferences};
use super::ui::commands::{self, Command};
use super::ui::render;

const POLL_INTERVAL: Duration = Duration::from_millis(75);
/// Slack on top of the HTTP timeout so the client reports its own timeout first.
const EFFECT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

enum ShellEvent {
    Line(String),
    InputClosed,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let settings = config.service_settings();
    let auth = AuthSession::anonymous();

    let store: Arc<dyn HistoryStore> = match config.history_backend {
        HistoryBackend::Remote => Arc::new(RestHistoryStore::new(settings.clone(), auth.clone())?),
        HistoryBackend::Memory => Arc::new(InMemoryHistoryStore::new(auth.clone())),
    };
    let services = EngineServices {
        generator: Arc::new(HttpImageGenerator::new(settings.clone(), auth.clone())?),
        store,
        downloader: Arc::new(ImageDownloader::new(&settings, config.download_dir.clone())?),
    };
    let engine = EngineHandle::new(
        services,
        EngineConfig {
            effect_timeout: settings.request_timeout + EFFECT_TIMEOUT_SLACK,
        },
    )?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let prefs = persistence::load_preferences(&config.state_file).unwrap_or(Preferences {
        language: config.language,
    });

    let mut shell = Shell {
        state: AppState::with_config(config.core_config()),
        effects: EffectRunner::new(engine, &auth),
        auth_client: AuthClient::new(settings)?,
        auth,
        runtime,
        prefs,
        state_file: config.state_file.clone(),
    };
    engine_info!(
        "Shell started: backend={:?} language={}",
        config.history_backend,
        shell.prefs.language.code()
    );

    let (event_tx, event_rx) = mpsc::channel::<ShellEvent>();
    thread::Builder::new()
        .name("imagegen-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if event_tx.send(ShellEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(ShellEvent::InputClosed);
        })?;

    shell.banner();
    shell.dispatch(Msg::Mounted);

    loop {
        match event_rx.recv_timeout(POLL_INTERVAL) {
            Ok(ShellEvent::Line(line)) => {
                if !shell.handle_command(commands::parse_command(&line)) {
                    break;
                }
            }
            Ok(ShellEvent::InputClosed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
        for msg in shell.effects.drain() {
            shell.dispatch(msg);
        }
        shell.render_if_dirty();
    }

    engine_info!("Shell exiting");
    Ok(())
}

struct Shell {
    state: AppState,
    effects: EffectRunner,
    auth: AuthSession,
    auth_client: AuthClient,
    runtime: tokio::runtime::Runtime,
    prefs: Preferences,
    state_file: PathBuf,
}

impl Shell {
    fn lang(&self) -> Language {
        self.prefs.language
    }

    fn dispatch(&mut self, msg: Msg) {
        let (next, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = next;
        for note in self.effects.enqueue(effects) {
            say(&render::render_notification(&note, self.lang()));
        }
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            self.render();
        }
    }

    fn render(&self) {
        for line in render::render(&self.state.view(), self.lang()) {
            say(&line);
        }
    }

    fn banner(&self) {
        let labels = i18n::labels(self.lang());
        say(labels.title);
        say(labels.subtitle);
        say(labels.help);
    }

    /// Returns `false` when the shell should exit.
    fn handle_command(&mut self, command: Command) -> bool {
        let labels = i18n::labels(self.lang());
        match command {
            Command::Empty => {}
            Command::Generate(prompt) => {
                if !prompt.is_empty() {
                    self.dispatch(Msg::PromptEdited(prompt));
                }
                self.dispatch(Msg::SubmitClicked);
            }
            Command::Attach(path) => self.attach(&path),
            Command::Detach => self.dispatch(Msg::ImageRemoved),
            Command::History => self.dispatch(Msg::RefreshRequested),
            Command::Select(target) => match commands::resolve_target(&self.state.view(), &target) {
                Some(id) => self.dispatch(Msg::HistoryItemSelected { id }),
                None => say(labels.no_such_entry),
            },
            Command::Delete(target) => match commands::resolve_target(&self.state.view(), &target) {
                Some(id) => self.dispatch(Msg::DeleteClicked { id }),
                None => say(labels.no_such_entry),
            },
            Command::Download(None) => self.dispatch(Msg::DownloadClicked { id: None }),
            Command::Download(Some(target)) => {
                match commands::resolve_target(&self.state.view(), &target) {
                    Some(id) => self.dispatch(Msg::DownloadClicked { id: Some(id) }),
                    None => say(labels.no_such_entry),
                }
            }
            Command::SignIn { email, password } => {
                let result = self
                    .runtime
                    .block_on(self.auth_client.sign_in(&email, &password));
                self.finish_auth(result, labels.signed_in);
            }
            Command::SignUp { email, password } => {
                let result = self
                    .runtime
                    .block_on(self.auth_client.sign_up(&email, &password));
                self.finish_auth(result, labels.signed_up);
            }
            Command::SignOut => {
                self.auth.sign_out();
                say(labels.signed_out);
            }
            Command::Language(language) => {
                self.prefs.language = language;
                persistence::save_preferences(&self.state_file, &self.prefs);
                say(i18n::labels(language).language_changed);
                self.render();
            }
            Command::Help => say(labels.help),
            Command::Quit => return false,
            Command::Unknown(line) => {
                engine_warn!("Unknown command: {}", line);
                say(labels.unknown_command);
            }
        }
        true
    }

    fn attach(&mut self, path: &Path) {
        match fs::read(path) {
            Ok(bytes) => {
                let content_type = commands::guess_content_type(path).to_string();
                self.dispatch(Msg::ImageSelected {
                    content_type,
                    bytes,
                });
            }
            Err(err) => {
                engine_warn!("Failed to read attachment {:?}: {}", path, err);
                say(&format!(
                    "{} {}: {}",
                    i18n::labels(self.lang()).read_failed,
                    path.display(),
                    err
                ));
            }
        }
    }

    /// The identity change reaches the state machine through the engine's
    /// identity forwarder, not through this call.
    fn finish_auth(&mut self, result: Result<imagegen_engine::Identity, AuthError>, ok: &str) {
        match result {
            Ok(identity) => {
                engine_info!("Signed in as {}", identity.user_id);
                self.auth.set(Some(identity));
                say(ok);
            }
            Err(err) => {
                engine_warn!("Authentication failed: {}", err);
                say(&i18n::auth_error_text(self.lang(), &err));
            }
        }
    }
}

fn say(line: &str) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{line}");
    let _ = out.flush();
}
