//! Reminder languages and localized alarm texts.
//!
//! # Invariants
//! - Unknown language codes fall back to `Language::En`; parsing never fails.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Supported reminder languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    /// English (fallback).
    #[default]
    En,
    /// Telugu.
    Te,
    /// Hindi.
    Hi,
}

impl Language {
    /// Parses a language code, falling back to English for anything unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "te" => Self::Te,
            "hi" => Self::Hi,
            _ => Self::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Te => "te",
            Self::Hi => "hi",
        }
    }

    /// Popup message shown while a reminder is firing.
    ///
    /// An empty `name` renders the generic wording for each language.
    pub fn alarm_message(&self, name: &str) -> String {
        let name = name.trim();
        match self {
            Self::En => {
                let subject = if name.is_empty() { "medicine" } else { name };
                format!("💊 Time to take {subject}!")
            }
            Self::Te => prefixed(name, "మాత్రలు తీసుకునే సమయం!"),
            Self::Hi => prefixed(name, "दवा लेने का समय!"),
        }
    }
}

fn prefixed(name: &str, phrase: &str) -> String {
    if name.is_empty() {
        phrase.to_string()
    } else {
        format!("{name} {phrase}")
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Self::from_code(&value)
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.code().to_string()
    }
}

/// Label used in the reminder list when a reminder has no name.
pub const UNNAMED_REMINDER_LABEL: &str = "Medicine";
/// Text rendered when the reminder list is empty.
pub const EMPTY_LIST_TEXT: &str = "No reminders added yet.";
/// Notice shown when a submission lacks a time or photo.
pub const MISSING_FIELDS_NOTICE: &str = "Please select time & capture photo";
/// Notice shown once when persistence is unavailable for the session.
pub const STORAGE_UNAVAILABLE_NOTICE: &str =
    "Reminders cannot be saved on this device; changes last until the app closes.";
