//! Reminder store: the single owner of the reminder collection.
//!
//! # Responsibility
//! - Keep the in-memory reminder list and mirror it to key-value storage.
//! - Validate submissions before they enter the collection.
//!
//! # Invariants
//! - Every mutating call persists the whole collection with one write before
//!   returning.
//! - Loading never fails: missing, corrupt or unreadable data yields an empty
//!   (or partially recovered) collection.
//! - After the first storage failure the store stays in-memory only for the
//!   rest of the session and reports the failure exactly once.

use crate::model::reminder::{
    Reminder, ReminderDraft, ReminderId, ReminderSummary, ReminderValidationError,
};
use crate::repo::kv_store::{KeyValueStore, StorageError, StorageResult};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized reminder array.
pub const REMINDERS_KEY: &str = "reminders";

/// Error returned by store mutations that can be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(ReminderValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ReminderValidationError> for StoreError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Reminder collection mirrored to a `KeyValueStore`.
pub struct ReminderStore<S: KeyValueStore> {
    backend: S,
    reminders: Vec<Reminder>,
    degraded: bool,
    pending_notice: Option<StorageError>,
}

impl<S: KeyValueStore> ReminderStore<S> {
    /// Reads the persisted collection from `backend`.
    pub fn load(backend: S) -> Self {
        let mut store = Self {
            backend,
            reminders: Vec::new(),
            degraded: false,
            pending_notice: None,
        };

        match store.backend.get(REMINDERS_KEY) {
            Ok(Some(raw)) => store.reminders = decode_reminders(&raw),
            Ok(None) => {}
            Err(err) => store.degrade("load", err),
        }

        info!(
            "event=store_load module=store status=ok count={} degraded={}",
            store.reminders.len(),
            store.degraded
        );
        store
    }

    /// Validates `draft` and appends it as a not-done reminder.
    ///
    /// # Errors
    /// - `StoreError::Validation` when the draft is incomplete; the collection
    ///   is left untouched.
    pub fn add(&mut self, draft: &ReminderDraft) -> Result<ReminderId, StoreError> {
        let reminder = draft.validate()?;
        let id = reminder.id;
        info!(
            "event=reminder_add module=store status=ok reminder_id={} time={} lang={}",
            id, reminder.time, reminder.lang
        );
        self.reminders.push(reminder);
        self.persist();
        Ok(id)
    }

    /// Records the acknowledgment of the occurrence scheduled on `occurrence`.
    ///
    /// `done_today` is only raised when the occurrence belongs to `today`; a
    /// late acknowledgment of yesterday's dose leaves today's dose armed.
    /// Returns `false` (and skips the write) when no reminder has `id`.
    pub fn mark_done(&mut self, id: ReminderId, occurrence: NaiveDate, today: NaiveDate) -> bool {
        let Some(reminder) = self.reminders.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        reminder.done_on = Some(occurrence);
        reminder.done_today = occurrence == today;
        self.persist();
        true
    }

    /// Marks every reminder carrying `photo` as done for `today`.
    ///
    /// Kept for callers that still correlate popups by photo. Reminders sharing
    /// a photo are all marked. Returns the number of matches.
    pub fn mark_done_by_photo(&mut self, photo: &str, today: NaiveDate) -> usize {
        let mut matched = 0;
        for reminder in self.reminders.iter_mut().filter(|r| r.photo == photo) {
            reminder.done_today = true;
            reminder.done_on = Some(today);
            matched += 1;
        }
        self.persist();
        matched
    }

    /// Clears the done state on every reminder. Returns how many were set.
    pub fn reset_all_done(&mut self) -> usize {
        let mut cleared = 0;
        for reminder in &mut self.reminders {
            if reminder.done_today {
                cleared += 1;
            }
            reminder.done_today = false;
            reminder.done_on = None;
        }
        self.persist();
        cleared
    }

    /// Clears `done_today` on reminders whose acknowledgment belongs to a date
    /// other than `today`, including undated flags from older blobs.
    ///
    /// Returns how many flags were cleared; writes only when one was.
    pub fn settle_done_flags(&mut self, today: NaiveDate) -> usize {
        let mut cleared = 0;
        for reminder in &mut self.reminders {
            if reminder.done_today && !reminder.is_done_for(today) {
                reminder.done_today = false;
                cleared += 1;
            }
        }
        if cleared > 0 {
            self.persist();
        }
        cleared
    }

    /// Empties the collection and removes the persisted entry.
    pub fn clear(&mut self) {
        self.reminders.clear();
        if self.degraded {
            return;
        }
        if let Err(err) = self.backend.remove(REMINDERS_KEY) {
            self.degrade("clear", err);
        }
    }

    /// Read-only view of the current collection, in insertion order.
    pub fn snapshot(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn summaries(&self) -> Vec<ReminderSummary> {
        self.reminders.iter().map(Reminder::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// Whether the store has fallen back to in-memory only.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Returns the storage failure that caused degradation, once.
    pub fn take_storage_notice(&mut self) -> Option<StorageError> {
        self.pending_notice.take()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        if let Err(err) = self.write_all() {
            self.degrade("persist", err);
        }
    }

    fn write_all(&mut self) -> StorageResult<()> {
        let raw = serde_json::to_string(&self.reminders)?;
        self.backend.set(REMINDERS_KEY, &raw)
    }

    fn degrade(&mut self, operation: &str, err: StorageError) {
        warn!(
            "event=store_persist module=store status=degraded operation={} error={}",
            operation, err
        );
        self.degraded = true;
        if self.pending_notice.is_none() {
            self.pending_notice = Some(err);
        }
    }
}

/// Decodes a stored blob, keeping every record that is individually valid.
fn decode_reminders(raw: &str) -> Vec<Reminder> {
    let values = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values,
        Err(err) => {
            warn!(
                "event=store_load module=store status=corrupt action=reset error={}",
                err
            );
            return Vec::new();
        }
    };

    let mut reminders = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let decoded = serde_json::from_value::<Reminder>(value)
            .map_err(|err| err.to_string())
            .and_then(|reminder| {
                reminder
                    .validate()
                    .map(|()| reminder)
                    .map_err(|err| err.to_string())
            });
        match decoded {
            Ok(reminder) => reminders.push(reminder),
            Err(err) => warn!(
                "event=store_load module=store status=skip_record index={} error={}",
                index, err
            ),
        }
    }
    reminders
}
