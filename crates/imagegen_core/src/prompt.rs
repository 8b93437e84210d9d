//! Rule-based prompt rewriting applied just before dispatch.

/// Style directive prepended to prompts that ask for an infographic.
pub const INFOGRAPHIC_STYLE_PREFIX: &str = "Create a professional educational infographic \
with a clean, well-organized layout, clear section headings, labeled illustrations and icons, \
and a consistent color palette suitable for teaching material. Subject: ";

const TRIGGER_EN: &str = "infographic";
const TRIGGER_AR: &str = "إنفوجرافيك";

/// A validated prompt split into what the user wrote and what is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPrompt {
    /// Trimmed user text. This is what history stores.
    pub original: String,
    /// Text sent to the generation service.
    pub dispatched: String,
}

impl DispatchPrompt {
    pub fn is_enhanced(&self) -> bool {
        self.original != self.dispatched
    }
}

pub fn is_infographic_request(prompt: &str) -> bool {
    prompt.to_lowercase().contains(TRIGGER_EN) || prompt.contains(TRIGGER_AR)
}

/// Trims `raw` and applies the infographic rewrite. Returns `None` for blank input.
pub fn prepare_prompt(raw: &str) -> Option<DispatchPrompt> {
    let original = raw.trim();
    if original.is_empty() {
        return None;
    }

    let dispatched = if is_infographic_request(original)
        && !original.starts_with(INFOGRAPHIC_STYLE_PREFIX)
    {
        format!("{INFOGRAPHIC_STYLE_PREFIX}{original}")
    } else {
        original.to_owned()
    };

    Some(DispatchPrompt {
        original: original.to_owned(),
        dispatched,
    })
}
