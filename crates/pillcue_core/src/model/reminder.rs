//! Reminder domain model.
//!
//! # Responsibility
//! - Define the persisted reminder record and its submission draft.
//! - Validate drafts before they can enter the store.
//!
//! # Invariants
//! - `id` is stable for the reminder lifetime and never reused.
//! - `time` and `photo` are non-empty, `days` is non-empty.
//! - `done_today` is only true between acknowledgment and next local midnight.
//! - `done_on` is the scheduled date of the last acknowledged occurrence.
//!   Once flags are settled, `done_today` implies `done_on` is the current date.

use crate::model::locale::{Language, UNNAMED_REMINDER_LABEL};
use crate::model::schedule::{DayToken, TimeOfDay};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to a reminder at creation time.
pub type ReminderId = Uuid;

/// Validation failures for reminder submissions and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    MissingTime,
    InvalidTime(String),
    MissingPhoto,
    NoDays,
    UnknownDay(String),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTime => write!(f, "reminder time is required"),
            Self::InvalidTime(value) => write!(f, "invalid reminder time `{value}`; expected HH:MM"),
            Self::MissingPhoto => write!(f, "reminder photo is required"),
            Self::NoDays => write!(f, "at least one reminder day is required"),
            Self::UnknownDay(value) => write!(f, "unknown reminder day `{value}`"),
        }
    }
}

impl Error for ReminderValidationError {}

/// Persisted reminder record.
///
/// Field names follow the stored JSON blob (`lang`, `doneToday`, `doneOn`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Older blobs carry no id; one is generated on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: ReminderId,
    #[serde(default)]
    pub lang: Language,
    #[serde(default)]
    pub name: String,
    /// Captured image reference, usually a `data:image/...` URI.
    pub photo: String,
    pub time: TimeOfDay,
    pub days: Vec<DayToken>,
    #[serde(rename = "doneToday", default)]
    pub done_today: bool,
    /// Older blobs carry no date; their flag cannot be trusted past load.
    #[serde(rename = "doneOn", default, skip_serializing_if = "Option::is_none")]
    pub done_on: Option<NaiveDate>,
}

impl Reminder {
    /// Checks record-level invariants for data read back from storage.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.photo.trim().is_empty() {
            return Err(ReminderValidationError::MissingPhoto);
        }
        if self.days.is_empty() {
            return Err(ReminderValidationError::NoDays);
        }
        Ok(())
    }

    /// Whether the occurrence scheduled on `date` was already acknowledged.
    pub fn is_done_for(&self, date: NaiveDate) -> bool {
        self.done_on == Some(date)
    }

    /// Name shown in lists, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            UNNAMED_REMINDER_LABEL
        } else {
            name
        }
    }

    pub fn summary(&self) -> ReminderSummary {
        ReminderSummary {
            id: self.id,
            label: self.display_name().to_string(),
            time: self.time.to_string(),
            days: self
                .days
                .iter()
                .map(DayToken::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            done_today: self.done_today,
        }
    }
}

/// Raw user submission, as collected by the UI form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderDraft {
    pub lang: Language,
    pub name: String,
    /// `None` when nothing has been captured yet.
    pub photo: Option<String>,
    pub time: String,
    pub days: Vec<String>,
}

impl ReminderDraft {
    /// Validates the draft and builds a fresh reminder with a new id.
    ///
    /// # Errors
    /// - Time problems are reported before photo problems, then days.
    pub fn validate(&self) -> Result<Reminder, ReminderValidationError> {
        let time = TimeOfDay::parse(&self.time)?;
        let photo = self
            .photo
            .as_deref()
            .map(str::trim)
            .filter(|photo| !photo.is_empty())
            .ok_or(ReminderValidationError::MissingPhoto)?;

        let mut days = Vec::with_capacity(self.days.len());
        for raw in &self.days {
            let day = raw.parse::<DayToken>()?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        if days.is_empty() {
            return Err(ReminderValidationError::NoDays);
        }

        Ok(Reminder {
            id: Uuid::new_v4(),
            lang: self.lang,
            name: self.name.trim().to_string(),
            photo: photo.to_string(),
            time,
            days,
            done_today: false,
            done_on: None,
        })
    }
}

/// List row rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSummary {
    pub id: ReminderId,
    pub label: String,
    pub time: String,
    /// Day tokens joined with `", "`.
    pub days: String,
    pub done_today: bool,
}
