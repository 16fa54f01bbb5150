//! Day rollover detection for the done-for-today flags.
//!
//! The tracker compares calendar dates rather than waiting for an exact
//! `00:00` reading, so a suspend spanning midnight still resets the flags on
//! the first check afterwards.

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidnightReset {
    last_date: NaiveDate,
}

impl MidnightReset {
    /// Starts tracking from the date of `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            last_date: now.date(),
        }
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Records `now` and returns whether a local midnight was crossed since
    /// the previous observation. A clock moving backwards never resets.
    pub fn observe(&mut self, now: NaiveDateTime) -> bool {
        let today = now.date();
        if today <= self.last_date {
            if today < self.last_date {
                debug!(
                    "event=midnight_check module=midnight status=clock_rewind last_date={} today={}",
                    self.last_date, today
                );
            }
            return false;
        }
        self.last_date = today;
        true
    }
}
