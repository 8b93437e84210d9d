use std::fs;
use std::path::Path;

use engine_logging::{engine_error, engine_info, engine_warn};
use imagegen_engine::replace_file;
use serde::{Deserialize, Serialize};

use super::i18n::Language;

/// Per-user shell preferences that survive restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Preferences {
    pub(crate) language: Language,
}

pub(crate) fn load_preferences(path: &Path) -> Option<Preferences> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            engine_warn!("Failed to read preferences from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str(&content) {
        Ok(prefs) => {
            engine_info!("Loaded preferences from {:?}", path);
            Some(prefs)
        }
        Err(err) => {
            engine_warn!("Failed to parse preferences from {:?}: {}", path, err);
            None
        }
    }
}

pub(crate) fn save_preferences(path: &Path, prefs: &Preferences) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(prefs, pretty) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    match replace_file(path, content) {
        Ok(()) => engine_info!("Saved preferences to {:?}", path),
        Err(err) => engine_error!("Failed to save preferences to {:?}: {}", path, err),
    }
}
