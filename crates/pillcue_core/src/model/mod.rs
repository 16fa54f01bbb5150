//! Domain model for medicine reminders.
//!
//! # Responsibility
//! - Define the persisted reminder record and its schedule vocabulary.
//! - Keep localization of user-facing alarm text next to the language enum.
//!
//! # Invariants
//! - Every reminder is identified by a stable `ReminderId`.
//! - Reminders are never deleted one by one; the store only bulk-clears.

pub mod locale;
pub mod reminder;
pub mod schedule;
