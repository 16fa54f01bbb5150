//! Reminder engine: store, matcher, alarm and rollover wired to one surface.
//!
//! # Responsibility
//! - Translate timer ticks and user actions into component calls.
//! - Re-render the reminder list after every store mutation.
//!
//! # Invariants
//! - Only the engine mutates the store; the alarm controller never does.
//! - Day rollover is applied before matching, so flags from the previous
//!   day cannot suppress a reminder scheduled right after midnight.
//! - Done flags loaded from storage are settled against the start date, so a
//!   flag saved on an earlier day never survives a restart.
//! - An acknowledgment only counts for the date its occurrence was scheduled.

use crate::config::EngineConfig;
use crate::model::locale::{MISSING_FIELDS_NOTICE, STORAGE_UNAVAILABLE_NOTICE};
use crate::model::reminder::{ReminderDraft, ReminderId, ReminderValidationError};
use crate::repo::kv_store::KeyValueStore;
use crate::service::alarm::{AlarmController, FireOutcome};
use crate::service::capture::{CameraError, CaptureSession};
use crate::service::midnight::MidnightReset;
use crate::service::reminder_store::{ReminderStore, StoreError};
use crate::service::scheduler::Scheduler;
use crate::service::surface::AlarmSurface;
use chrono::NaiveDateTime;
use log::info;

/// Result of one matcher tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Reminders that came due during this tick, in snapshot order.
    pub due: Vec<ReminderId>,
    /// Reminder whose alarm started during this tick.
    pub activated: Option<ReminderId>,
    /// Whether the done flags were reset before matching.
    pub day_rolled: bool,
}

/// Result of acknowledging the popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AckOutcome {
    pub acknowledged: Option<ReminderId>,
    /// Next queued reminder that started firing right away.
    pub activated: Option<ReminderId>,
}

pub struct ReminderEngine<S: KeyValueStore, U: AlarmSurface> {
    store: ReminderStore<S>,
    scheduler: Scheduler,
    alarm: AlarmController,
    midnight: MidnightReset,
    capture: CaptureSession,
    surface: U,
}

impl<S: KeyValueStore, U: AlarmSurface> ReminderEngine<S, U> {
    pub fn new(store: ReminderStore<S>, surface: U, config: &EngineConfig, now: NaiveDateTime) -> Self {
        Self::with_alarm(store, surface, config, AlarmController::new(config), now)
    }

    /// Uses a pre-built alarm controller (e.g. with a seeded RNG).
    pub fn with_alarm(
        mut store: ReminderStore<S>,
        surface: U,
        config: &EngineConfig,
        alarm: AlarmController,
        now: NaiveDateTime,
    ) -> Self {
        let cleared = store.settle_done_flags(now.date());
        if cleared > 0 {
            info!(
                "event=midnight_reset module=engine status=ok trigger=start date={} cleared={}",
                now.date(),
                cleared
            );
        }
        Self {
            store,
            scheduler: Scheduler::new(config.catch_up_window),
            alarm,
            midnight: MidnightReset::new(now),
            capture: CaptureSession::new(),
            surface,
        }
    }

    /// Renders the initial list and reports a storage failure from loading.
    pub fn start(&mut self) {
        info!(
            "event=engine_start module=engine status=ok reminders={} degraded={}",
            self.store.len(),
            self.store.is_degraded()
        );
        self.render_list();
    }

    /// Validates and stores a submission.
    ///
    /// A draft without a photo takes the most recently captured one. On
    /// rejection the surface receives a notice and the store is untouched.
    pub fn add_reminder(&mut self, mut draft: ReminderDraft) -> Result<ReminderId, StoreError> {
        if draft.photo.is_none() {
            draft.photo = self.capture.current_photo().map(str::to_string);
        }
        match self.store.add(&draft) {
            Ok(id) => {
                self.render_list();
                Ok(id)
            }
            Err(err) => {
                let notice = match &err {
                    StoreError::Validation(
                        ReminderValidationError::MissingTime | ReminderValidationError::MissingPhoto,
                    ) => MISSING_FIELDS_NOTICE.to_string(),
                    other => other.to_string(),
                };
                self.surface.notify(&notice);
                Err(err)
            }
        }
    }

    /// Matcher tick: rolls the day if needed, then fires due reminders.
    pub fn on_match_tick(&mut self, now: NaiveDateTime) -> TickOutcome {
        let day_rolled = self.roll_day(now);
        let due = self.scheduler.due(self.store.snapshot(), now);

        let mut activated = None;
        for occurrence in &due {
            let Some(reminder) = self.store.get(occurrence.reminder_id) else {
                continue;
            };
            let outcome = self.alarm.fire(reminder, occurrence.date, &mut self.surface);
            if outcome == FireOutcome::Activated {
                activated = Some(occurrence.reminder_id);
            }
        }

        TickOutcome {
            due: due.iter().map(|occurrence| occurrence.reminder_id).collect(),
            activated,
            day_rolled,
        }
    }

    /// Rollover tick. Returns whether the done flags were reset.
    pub fn on_midnight_tick(&mut self, now: NaiveDateTime) -> bool {
        self.roll_day(now)
    }

    /// Repeat-cue tick. Returns whether the cue played.
    pub fn on_repeat_tick(&mut self) -> bool {
        self.alarm.repeat_cue(&mut self.surface)
    }

    /// Acknowledges the firing popup and marks its occurrence done.
    ///
    /// A caught-up occurrence from an earlier date does not mark today done.
    pub fn acknowledge(&mut self) -> AckOutcome {
        let Some(occurrence) = self.alarm.acknowledge(&mut self.surface) else {
            return AckOutcome::default();
        };
        let id = occurrence.reminder_id;
        self.store
            .mark_done(id, occurrence.date, self.midnight.last_date());
        self.render_list();
        let activated = self
            .alarm
            .activate_next(self.store.snapshot(), &mut self.surface);
        AckOutcome {
            acknowledged: Some(id),
            activated,
        }
    }

    /// Removes every reminder and dismisses any alarm in progress.
    pub fn clear_all(&mut self) {
        self.alarm.dismiss_all(&mut self.surface);
        self.store.clear();
        info!("event=reminders_clear module=engine status=ok");
        self.render_list();
    }

    /// Applies the resolved camera request.
    pub fn on_camera_result(&mut self, result: Result<(), CameraError>) {
        if let Some(notice) = self.capture.on_stream_result(result) {
            self.surface.notify(&notice);
        }
    }

    /// Stores a captured frame for the next submission.
    pub fn capture_photo(&mut self, data_uri: &str) -> Result<(), CameraError> {
        match self.capture.capture(data_uri) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.surface.notify(&err.to_string());
                Err(err)
            }
        }
    }

    pub fn is_firing(&self) -> bool {
        self.alarm.is_firing()
    }

    pub fn store(&self) -> &ReminderStore<S> {
        &self.store
    }

    pub fn alarm(&self) -> &AlarmController {
        &self.alarm
    }

    pub fn capture(&self) -> &CaptureSession {
        &self.capture
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    fn roll_day(&mut self, now: NaiveDateTime) -> bool {
        if !self.midnight.observe(now) {
            return false;
        }
        let cleared = self.store.settle_done_flags(self.midnight.last_date());
        info!(
            "event=midnight_reset module=engine status=ok date={} cleared={}",
            self.midnight.last_date(),
            cleared
        );
        self.render_list();
        true
    }

    fn render_list(&mut self) {
        let summaries = self.store.summaries();
        self.surface.render_list(&summaries);
        if self.store.take_storage_notice().is_some() {
            self.surface.notify(STORAGE_UNAVAILABLE_NOTICE);
        }
    }
}
