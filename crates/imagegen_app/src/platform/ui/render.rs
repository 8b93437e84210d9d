use imagegen_core::{AppViewModel, GenerationStatus, Notification, NotificationCategory};

use crate::platform::i18n::{self, Language};

const REF_DISPLAY_CHARS: usize = 72;
const PROMPT_DISPLAY_CHARS: usize = 60;

pub fn render(view: &AppViewModel, lang: Language) -> Vec<String> {
    let labels = i18n::labels(lang);
    let mut lines = Vec::new();

    let who = match &view.owner {
        Some(owner) => format!("{} {}", labels.signed_in_as, owner),
        None => labels.anonymous.to_string(),
    };
    lines.push(format!("== {} == [{}]", labels.title, who));

    let mut status = i18n::status_text(lang, view.status).to_string();
    if view.download_pending {
        status.push_str(" | ");
        status.push_str(labels.downloading);
    }
    lines.push(status);

    if !view.prompt_draft.is_empty() && view.status == GenerationStatus::InFlight {
        lines.push(format!(
            "{}: {}",
            labels.prompt,
            shorten(&view.prompt_draft, PROMPT_DISPLAY_CHARS)
        ));
    }
    if let Some(content_type) = &view.source_image_type {
        lines.push(format!("{}: {}", labels.source_image, content_type));
    }
    if let Some(image_ref) = &view.result_image_ref {
        lines.push(format!(
            "{}: {}",
            labels.result,
            shorten(image_ref, REF_DISPLAY_CHARS)
        ));
    }
    if let Some(message) = &view.error_message {
        lines.push(format!("{}: {}", labels.error, message));
    }

    if view.owner.is_some() || !view.history.is_empty() || view.history_loading {
        lines.push(format!("-- {} ({}) --", labels.history, view.history.len()));
        if view.history_loading && view.history.is_empty() {
            lines.push(format!("   {}", labels.history_loading));
        } else if view.history.is_empty() {
            lines.push(format!("   {}", labels.history_empty));
        }
        for (index, row) in view.history.iter().enumerate() {
            lines.push(format!(
                "{:>3}. [{}] {}",
                index + 1,
                row.created_date,
                shorten(&row.prompt, PROMPT_DISPLAY_CHARS)
            ));
        }
    }
    lines
}

pub fn render_notification(note: &Notification, lang: Language) -> String {
    let marker = match note.category() {
        NotificationCategory::Success => "[ok]",
        NotificationCategory::Error => "[!!]",
    };
    format!("{marker} {}", i18n::notification_text(lang, note))
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars).collect();
    short.push_str("...");
    short
}
