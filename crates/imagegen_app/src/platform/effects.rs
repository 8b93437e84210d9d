use engine_logging::{engine_debug, engine_error};
use imagegen_core::{Effect, Msg, Notification};
use imagegen_engine::{AuthSession, EngineHandle};

/// Routes effects: notifications stay in the shell, everything else goes to
/// the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, auth: &AuthSession) -> Self {
        engine.follow_identity(auth.subscribe());
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify(note) => notifications.push(note),
                other => {
                    engine_debug!("Dispatching {:?}", effect_name(&other));
                    self.engine.execute(other);
                }
            }
        }
        notifications
    }

    pub fn drain(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(msg) = self.engine.try_recv() {
            if matches!(msg, Msg::NoOp) {
                engine_error!("Engine produced an empty message");
                continue;
            }
            inbox.push(msg);
        }
        inbox
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::Generate(_) => "generate",
        Effect::FetchHistory(_) => "fetch-history",
        Effect::InsertHistory(_) => "insert-history",
        Effect::DeleteHistory { .. } => "delete-history",
        Effect::Download { .. } => "download",
        Effect::Notify(_) => "notify",
    }
}
