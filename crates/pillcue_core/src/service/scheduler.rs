//! Reminder matcher driven by the one-second tick.
//!
//! # Responsibility
//! - Decide which reminders are due since the previous tick.
//!
//! # Invariants
//! - A scheduled minute is crossed by exactly one call to `due`, so a
//!   reminder fires at most once per scheduled day.
//! - An occurrence already acknowledged for its date never fires.
//! - A clock that moves backwards never fires anything.

use crate::model::reminder::{Reminder, ReminderId};
use crate::model::schedule::days_match;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use log::debug;
use std::time::Duration;

/// One scheduled firing of a reminder.
///
/// `date` is the day the occurrence belongs to, which differs from the
/// current date when a missed occurrence is caught up after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub reminder_id: ReminderId,
    pub date: NaiveDate,
}

/// Catch-up matcher over the window `(last_checked, now]`.
#[derive(Debug, Clone)]
pub struct Scheduler {
    last_checked: Option<NaiveDateTime>,
    catch_up_window: TimeDelta,
}

impl Scheduler {
    /// Creates a matcher that replays at most `catch_up_window` of missed time.
    pub fn new(catch_up_window: Duration) -> Self {
        Self {
            last_checked: None,
            catch_up_window: TimeDelta::from_std(catch_up_window).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Minute covered by the latest call to `due`.
    pub fn last_checked(&self) -> Option<NaiveDateTime> {
        self.last_checked
    }

    /// Returns the occurrences whose scheduled minute was reached since the
    /// previous call, in snapshot order.
    ///
    /// The first call also covers the current minute, matching a widget that
    /// polls every second within the minute.
    pub fn due(&mut self, reminders: &[Reminder], now: NaiveDateTime) -> Vec<Occurrence> {
        let now_minute = truncate_to_minute(now);
        let start = match self.last_checked {
            None => now_minute - TimeDelta::minutes(1),
            Some(last) if now_minute < last => {
                debug!(
                    "event=scheduler_tick module=scheduler status=clock_rewind last={} now={}",
                    last, now_minute
                );
                self.last_checked = Some(now_minute);
                return Vec::new();
            }
            Some(last) => last,
        };
        self.last_checked = Some(now_minute);

        let start = match now_minute.checked_sub_signed(self.catch_up_window) {
            Some(floor) if floor > start => floor,
            _ => start,
        };
        if start >= now_minute {
            return Vec::new();
        }

        reminders
            .iter()
            .filter_map(|reminder| {
                scheduled_between(reminder, start, now_minute).map(|date| Occurrence {
                    reminder_id: reminder.id,
                    date,
                })
            })
            .collect()
    }
}

/// Whether `reminder` is scheduled exactly at `minute` (seconds ignored).
pub fn is_scheduled_at(reminder: &Reminder, minute: NaiveDateTime) -> bool {
    let minute = truncate_to_minute(minute);
    reminder.time.on(minute.date()) == minute && days_match(&reminder.days, minute.weekday())
}

/// Latest not-yet-acknowledged scheduled date of `reminder` whose minute lies
/// in `(after, until]`.
fn scheduled_between(
    reminder: &Reminder,
    after: NaiveDateTime,
    until: NaiveDateTime,
) -> Option<NaiveDate> {
    let mut date = until.date();
    while date >= after.date() {
        let at = reminder.time.on(date);
        if at > after
            && at <= until
            && days_match(&reminder.days, date.weekday())
            && !reminder.is_done_for(date)
        {
            return Some(date);
        }
        date = date.pred_opt()?;
    }
    None
}

fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|at| at.with_nanosecond(0))
        .unwrap_or(at)
}
