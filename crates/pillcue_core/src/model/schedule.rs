//! Schedule primitives: time of day and day tokens.
//!
//! # Responsibility
//! - Parse and format the `HH:MM` wall-clock time used by reminders.
//! - Map chrono weekdays onto the persisted day token vocabulary.
//!
//! # Invariants
//! - `TimeOfDay` always holds `hour <= 23` and `minute <= 59`.
//! - Serialized forms are exactly the persisted strings (`"08:05"`, `"mon"`).

use crate::model::reminder::ReminderValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid time regex"));

/// Local wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Builds a time of day, returning `None` when out of range.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    /// Parses the zero-padded 24h `HH:MM` format.
    ///
    /// # Errors
    /// - `MissingTime` when the input is blank.
    /// - `InvalidTime` when the input is not a valid `HH:MM` value.
    pub fn parse(value: &str) -> Result<Self, ReminderValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ReminderValidationError::MissingTime);
        }
        let captures = TIME_OF_DAY_RE
            .captures(trimmed)
            .ok_or_else(|| ReminderValidationError::InvalidTime(trimmed.to_string()))?;
        // The regex bounds both groups, so parsing cannot overflow a u8.
        let hour = captures[1]
            .parse::<u8>()
            .map_err(|_| ReminderValidationError::InvalidTime(trimmed.to_string()))?;
        let minute = captures[2]
            .parse::<u8>()
            .map_err(|_| ReminderValidationError::InvalidTime(trimmed.to_string()))?;
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns the time of day of `at`, dropping seconds.
    pub fn of(at: NaiveDateTime) -> Self {
        use chrono::Timelike;
        Self {
            hour: at.hour() as u8,
            minute: at.minute() as u8,
        }
    }

    /// Combines this time with `date` into the scheduled minute.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ReminderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ReminderValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Day pattern token stored in `Reminder::days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayToken {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    /// Matches every day of the week.
    Daily,
}

impl DayToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Daily => "daily",
        }
    }

    /// Token for a concrete weekday. Never returns `Daily`.
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Self::Sun,
            Weekday::Mon => Self::Mon,
            Weekday::Tue => Self::Tue,
            Weekday::Wed => Self::Wed,
            Weekday::Thu => Self::Thu,
            Weekday::Fri => Self::Fri,
            Weekday::Sat => Self::Sat,
        }
    }
}

impl Display for DayToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayToken {
    type Err = ReminderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Self::Sun),
            "mon" => Ok(Self::Mon),
            "tue" => Ok(Self::Tue),
            "wed" => Ok(Self::Wed),
            "thu" => Ok(Self::Thu),
            "fri" => Ok(Self::Fri),
            "sat" => Ok(Self::Sat),
            "daily" => Ok(Self::Daily),
            other => Err(ReminderValidationError::UnknownDay(other.to_string())),
        }
    }
}

/// Returns whether a day pattern covers `weekday`.
pub fn days_match(days: &[DayToken], weekday: Weekday) -> bool {
    let token = DayToken::from_weekday(weekday);
    days.iter().any(|day| *day == DayToken::Daily || *day == token)
}
