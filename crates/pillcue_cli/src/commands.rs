//! Line-oriented command parsing for the terminal driver.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pillcue_core::{Language, ReminderDraft};
use std::path::Path;

pub const HELP: &str = "commands:
  photo <image-file|data-uri>          capture the medicine photo
  add <HH:MM> <days> <lang> [name...]  days: comma list of sun..sat or daily; lang: en|te|hi
  ack                                  acknowledge the firing alarm
  clear                                remove every reminder
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Photo(String),
    Add(ReminderDraft),
    Ack,
    Clear,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<CliCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "photo" => {
            let source = words.next().ok_or("usage: photo <image-file|data-uri>")?;
            CliCommand::Photo(source.to_string())
        }
        "add" => {
            let time = words.next().ok_or("usage: add <HH:MM> <days> <lang> [name...]")?;
            let days = words.next().ok_or("missing days, e.g. mon,wed or daily")?;
            let lang = words.next().unwrap_or("en");
            CliCommand::Add(ReminderDraft {
                lang: Language::from_code(lang),
                name: words.collect::<Vec<_>>().join(" "),
                photo: None,
                time: time.to_string(),
                days: days
                    .split(',')
                    .map(str::trim)
                    .filter(|day| !day.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        }
        "ack" | "ok" => CliCommand::Ack,
        "clear" => CliCommand::Clear,
        "help" | "?" => CliCommand::Help,
        "quit" | "exit" => CliCommand::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

/// Turns a `photo` argument into an image data URI, reading files as needed.
pub fn photo_data_uri(source: &str) -> std::io::Result<String> {
    if source.starts_with("data:") {
        return Ok(source.to_string());
    }
    let path = Path::new(source);
    let bytes = std::fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::{parse_line, photo_data_uri, CliCommand};
    use pillcue_core::Language;

    #[test]
    fn add_collects_days_language_and_name() {
        let Some(CliCommand::Add(draft)) =
            parse_line("add 21:00 mon,wed,fri te Dolo").expect("add should parse")
        else {
            panic!("expected add command");
        };
        assert_eq!(draft.days, vec!["mon", "wed", "fri"]);
        assert_eq!(draft.lang, Language::Te);
        assert_eq!(draft.name, "Dolo");
        assert_eq!(draft.photo, None);
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("ACK"), Ok(Some(CliCommand::Ack)));
        assert!(parse_line("snooze").is_err());
        assert!(parse_line("add").is_err());
    }

    #[test]
    fn photo_file_is_encoded_as_data_uri() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pill.jpg");
        std::fs::write(&path, b"abc").expect("write photo");

        let uri = photo_data_uri(path.to_str().expect("utf-8 path")).expect("encode photo");
        assert_eq!(uri, "data:image/jpeg;base64,YWJj");
        assert_eq!(
            photo_data_uri("data:image/png;base64,AAAA").expect("passthrough"),
            "data:image/png;base64,AAAA"
        );
    }
}
