//! Line-oriented command parsing for the terminal shell.

use std::path::{Path, PathBuf};

use imagegen_core::{AppViewModel, EntryId};

use crate::platform::i18n::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 1-based position in the rendered history list.
    Index(usize),
    Id(EntryId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(String),
    Attach(PathBuf),
    Detach,
    History,
    Select(Target),
    Delete(Target),
    Download(Option<Target>),
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    Language(Language),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Generate(line.to_string());
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    match (name.to_ascii_lowercase().as_str(), args) {
        ("generate" | "gen", prompt) => Command::Generate(prompt.to_string()),
        ("attach", path) if !path.is_empty() => Command::Attach(PathBuf::from(path)),
        ("detach", "") => Command::Detach,
        ("history", "") => Command::History,
        ("select", arg) if !arg.is_empty() => Command::Select(parse_target(arg)),
        ("delete", arg) if !arg.is_empty() => Command::Delete(parse_target(arg)),
        ("download", "") => Command::Download(None),
        ("download", arg) => Command::Download(Some(parse_target(arg))),
        ("login", args) => credentials(args)
            .map(|(email, password)| Command::SignIn { email, password })
            .unwrap_or_else(|| Command::Unknown(line.to_string())),
        ("signup", args) => credentials(args)
            .map(|(email, password)| Command::SignUp { email, password })
            .unwrap_or_else(|| Command::Unknown(line.to_string())),
        ("logout", "") => Command::SignOut,
        ("lang", code) => Language::parse(code)
            .map(Command::Language)
            .unwrap_or_else(|| Command::Unknown(line.to_string())),
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

fn parse_target(arg: &str) -> Target {
    match arg.parse::<usize>() {
        Ok(index) => Target::Index(index),
        Err(_) => Target::Id(arg.to_string()),
    }
}

fn credentials(args: &str) -> Option<(String, String)> {
    let mut parts = args.split_whitespace();
    let email = parts.next()?;
    let password = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((email.to_string(), password.to_string()))
}

/// Resolves a target against the rows currently on screen.
pub fn resolve_target(view: &AppViewModel, target: &Target) -> Option<EntryId> {
    match target {
        Target::Index(index) => index
            .checked_sub(1)
            .and_then(|i| view.history.get(i))
            .map(|row| row.id.clone()),
        Target::Id(id) => view
            .history
            .iter()
            .find(|row| &row.id == id)
            .map(|row| row.id.clone()),
    }
}

/// Content type from the file extension; unknown extensions are passed on
/// as `application/octet-stream` so the core can reject them.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagegen_core::HistoryRowView;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_a_prompt() {
        assert_eq!(
            parse_command("  a red fox in snow "),
            Command::Generate("a red fox in snow".to_string())
        );
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn slash_commands_parse_their_arguments() {
        assert_eq!(
            parse_command("/attach photos/cat.png"),
            Command::Attach(PathBuf::from("photos/cat.png"))
        );
        assert_eq!(parse_command("/delete 2"), Command::Delete(Target::Index(2)));
        assert_eq!(
            parse_command("/select abc-123"),
            Command::Select(Target::Id("abc-123".to_string()))
        );
        assert_eq!(parse_command("/download"), Command::Download(None));
        assert_eq!(parse_command("/LANG ar"), Command::Language(Language::Ar));
        assert_eq!(
            parse_command("/login a@b.co secret"),
            Command::SignIn {
                email: "a@b.co".to_string(),
                password: "secret".to_string()
            }
        );
    }

    #[test]
    fn malformed_commands_are_unknown() {
        assert!(matches!(parse_command("/login only-email"), Command::Unknown(_)));
        assert!(matches!(parse_command("/lang fr"), Command::Unknown(_)));
        assert!(matches!(parse_command("/attach"), Command::Unknown(_)));
        assert!(matches!(parse_command("/frobnicate"), Command::Unknown(_)));
    }

    #[test]
    fn targets_resolve_against_visible_rows() {
        let view = AppViewModel {
            history: vec![
                HistoryRowView {
                    id: "e2".into(),
                    prompt: "newer".into(),
                    image_ref: "https://img/2.png".into(),
                    created_date: "2024-05-02".into(),
                },
                HistoryRowView {
                    id: "e1".into(),
                    prompt: "older".into(),
                    image_ref: "https://img/1.png".into(),
                    created_date: "2024-05-01".into(),
                },
            ],
            ..AppViewModel::default()
        };
        assert_eq!(resolve_target(&view, &Target::Index(2)), Some("e1".to_string()));
        assert_eq!(resolve_target(&view, &Target::Index(0)), None);
        assert_eq!(resolve_target(&view, &Target::Index(3)), None);
        assert_eq!(
            resolve_target(&view, &Target::Id("e2".into())),
            Some("e2".to_string())
        );
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(guess_content_type(Path::new("a/B.JPG")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_content_type(Path::new("blob")), "application/octet-stream");
    }
}
