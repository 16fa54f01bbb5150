//! Core domain logic for PillCue medicine reminders.
//! This crate is the single source of truth for scheduling and alarm rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod runtime;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use config::EngineConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::locale::Language;
pub use model::reminder::{
    Reminder, ReminderDraft, ReminderId, ReminderSummary, ReminderValidationError,
};
pub use model::schedule::{DayToken, TimeOfDay};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use runtime::{channel, run, Command, CommandError, EngineHandle};
pub use service::alarm::{AlarmController, AlarmState, FireOutcome};
pub use service::capture::{CameraError, CameraStatus, CaptureSession};
pub use service::engine::{AckOutcome, ReminderEngine, TickOutcome};
pub use service::midnight::MidnightReset;
pub use service::reminder_store::{ReminderStore, StoreError, REMINDERS_KEY};
pub use service::scheduler::{Occurrence, Scheduler};
pub use service::surface::{AlarmSurface, EffectBurst, FloatingIcon, PlaybackError, PopupContent};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
