//! Alarm popup controller.
//!
//! # Responsibility
//! - Own the `Idle -> Firing -> Idle` lifecycle of the alarm popup.
//! - Drive the repeating cue and the decorative effect burst.
//! - Queue reminders that come due while another alarm is firing.
//!
//! # Invariants
//! - At most one repeat cue is armed at any time; activating an alarm
//!   disarms the previous one first.
//! - Cue playback failures never block showing or acknowledging the popup.
//! - A reminder id is either active or queued at most once.

use crate::config::EngineConfig;
use crate::model::reminder::{Reminder, ReminderId};
use crate::service::scheduler::Occurrence;
use crate::service::surface::{AlarmSurface, EffectBurst, FloatingIcon, PopupContent};
use chrono::NaiveDate;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;

const EFFECT_MAX_LEFT_PERCENT: f32 = 80.0;
const EFFECT_MIN_ANIMATION_SECS: f32 = 2.0;
const EFFECT_MAX_ANIMATION_SECS: f32 = 4.0;

/// Popup state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Firing {
        popup: PopupContent,
        occurrence: Occurrence,
    },
}

/// Result of handing a due reminder to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Popup shown and cue started.
    Activated,
    /// Another alarm is firing; the reminder waits in the queue.
    Queued,
    /// The reminder is already firing or queued.
    Duplicate,
}

pub struct AlarmController {
    state: AlarmState,
    pending: VecDeque<Occurrence>,
    repeat_armed: bool,
    effect_count: usize,
    effect_lifetime: Duration,
    effect_icon_url: String,
    rng: StdRng,
}

impl AlarmController {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Uses a caller-provided RNG for effect placement.
    pub fn with_rng(config: &EngineConfig, rng: StdRng) -> Self {
        Self {
            state: AlarmState::Idle,
            pending: VecDeque::new(),
            repeat_armed: false,
            effect_count: config.effect_count,
            effect_lifetime: config.effect_lifetime,
            effect_icon_url: config.effect_icon_url.clone(),
            rng,
        }
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    pub fn is_firing(&self) -> bool {
        matches!(self.state, AlarmState::Firing { .. })
    }

    /// Id of the reminder currently shown, if any.
    pub fn active_reminder(&self) -> Option<ReminderId> {
        match &self.state {
            AlarmState::Firing { occurrence, .. } => Some(occurrence.reminder_id),
            AlarmState::Idle => None,
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &Occurrence> {
        self.pending.iter()
    }

    /// Whether the repeating cue is currently armed.
    pub fn repeat_armed(&self) -> bool {
        self.repeat_armed
    }

    /// Starts the alarm for the occurrence of `reminder` scheduled on `date`,
    /// or queues it behind the active one.
    pub fn fire(
        &mut self,
        reminder: &Reminder,
        date: NaiveDate,
        surface: &mut dyn AlarmSurface,
    ) -> FireOutcome {
        let occurrence = Occurrence {
            reminder_id: reminder.id,
            date,
        };
        match self.active_reminder() {
            Some(active_id) if active_id == reminder.id => FireOutcome::Duplicate,
            Some(_) if self.pending.iter().any(|queued| queued.reminder_id == reminder.id) => {
                FireOutcome::Duplicate
            }
            Some(active_id) => {
                info!(
                    "event=alarm_queue module=alarm status=ok reminder_id={} active_id={} queued={}",
                    reminder.id,
                    active_id,
                    self.pending.len() + 1
                );
                self.pending.push_back(occurrence);
                FireOutcome::Queued
            }
            None => {
                self.activate(reminder, occurrence, surface);
                FireOutcome::Activated
            }
        }
    }

    /// Replays the cue if an alarm is firing. Returns whether it played.
    pub fn repeat_cue(&mut self, surface: &mut dyn AlarmSurface) -> bool {
        if !self.is_firing() || !self.repeat_armed {
            return false;
        }
        play_cue(surface);
        true
    }

    /// Acknowledges the active alarm: stops the cue and hides the popup.
    ///
    /// Returns the acknowledged occurrence, or `None` when idle. The caller is
    /// responsible for marking the reminder done.
    pub fn acknowledge(&mut self, surface: &mut dyn AlarmSurface) -> Option<Occurrence> {
        let AlarmState::Firing { occurrence, .. } =
            std::mem::replace(&mut self.state, AlarmState::Idle)
        else {
            return None;
        };
        surface.stop_cue();
        self.repeat_armed = false;
        surface.hide_popup();
        info!(
            "event=alarm_ack module=alarm status=ok reminder_id={} date={} queued={}",
            occurrence.reminder_id,
            occurrence.date,
            self.pending.len()
        );
        Some(occurrence)
    }

    /// Activates the next queued occurrence whose reminder still exists and
    /// has not been acknowledged for that date.
    pub fn activate_next(
        &mut self,
        reminders: &[Reminder],
        surface: &mut dyn AlarmSurface,
    ) -> Option<ReminderId> {
        if self.is_firing() {
            return None;
        }
        while let Some(occurrence) = self.pending.pop_front() {
            match reminders.iter().find(|r| r.id == occurrence.reminder_id) {
                Some(reminder) if !reminder.is_done_for(occurrence.date) => {
                    self.activate(reminder, occurrence, surface);
                    return Some(occurrence.reminder_id);
                }
                _ => continue,
            }
        }
        None
    }

    /// Drops the active alarm and the queue without acknowledging anything.
    pub fn dismiss_all(&mut self, surface: &mut dyn AlarmSurface) {
        self.pending.clear();
        if self.is_firing() {
            surface.stop_cue();
            surface.hide_popup();
        }
        self.repeat_armed = false;
        self.state = AlarmState::Idle;
    }

    fn activate(
        &mut self,
        reminder: &Reminder,
        occurrence: Occurrence,
        surface: &mut dyn AlarmSurface,
    ) {
        self.repeat_armed = false;

        let popup = PopupContent {
            reminder_id: reminder.id,
            message: reminder.lang.alarm_message(&reminder.name),
            photo: reminder.photo.clone(),
        };
        surface.show_popup(&popup);
        play_cue(surface);
        self.repeat_armed = true;

        let burst = self.effect_burst();
        surface.spawn_effects(&burst);

        info!(
            "event=alarm_fire module=alarm status=ok reminder_id={} date={} lang={} effects={}",
            reminder.id,
            occurrence.date,
            reminder.lang,
            burst.icons.len()
        );
        self.state = AlarmState::Firing { popup, occurrence };
    }

    fn effect_burst(&mut self) -> EffectBurst {
        let icons = (0..self.effect_count)
            .map(|_| FloatingIcon {
                icon_url: self.effect_icon_url.clone(),
                left_percent: self.rng.random_range(0.0..EFFECT_MAX_LEFT_PERCENT),
                animation: Duration::from_secs_f32(
                    self.rng
                        .random_range(EFFECT_MIN_ANIMATION_SECS..EFFECT_MAX_ANIMATION_SECS),
                ),
                lifetime: self.effect_lifetime,
            })
            .collect();
        EffectBurst { icons }
    }
}

fn play_cue(surface: &mut dyn AlarmSurface) {
    if let Err(err) = surface.play_cue() {
        warn!("event=cue_failed module=alarm status=ignored error={}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::{AlarmController, AlarmState, FireOutcome};
    use crate::config::EngineConfig;
    use crate::model::locale::Language;
    use crate::model::reminder::{Reminder, ReminderSummary};
    use crate::model::schedule::{DayToken, TimeOfDay};
    use crate::service::surface::{AlarmSurface, EffectBurst, PlaybackError, PopupContent};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    #[derive(Default)]
    struct Recorder {
        shown: Vec<PopupContent>,
        hidden: usize,
        plays: usize,
        stops: usize,
        bursts: Vec<EffectBurst>,
        fail_playback: bool,
    }

    impl AlarmSurface for Recorder {
        fn render_list(&mut self, _items: &[ReminderSummary]) {}

        fn show_popup(&mut self, popup: &PopupContent) {
            self.shown.push(popup.clone());
        }

        fn hide_popup(&mut self) {
            self.hidden += 1;
        }

        fn play_cue(&mut self) -> Result<(), PlaybackError> {
            self.plays += 1;
            if self.fail_playback {
                return Err(PlaybackError::new("autoplay blocked"));
            }
            Ok(())
        }

        fn stop_cue(&mut self) {
            self.stops += 1;
        }

        fn spawn_effects(&mut self, burst: &EffectBurst) {
            self.bursts.push(burst.clone());
        }

        fn notify(&mut self, _message: &str) {}
    }

    fn controller() -> AlarmController {
        AlarmController::with_rng(&EngineConfig::default(), StdRng::seed_from_u64(7))
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date")
    }

    fn reminder(name: &str, lang: Language) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            lang,
            name: name.to_string(),
            photo: format!("data:image/png;base64,{name}"),
            time: TimeOfDay::new(8, 5).expect("valid time"),
            days: vec![DayToken::Daily],
            done_today: false,
            done_on: None,
        }
    }

    #[test]
    fn fire_shows_localized_popup_plays_cue_and_spawns_effects() {
        let mut alarm = controller();
        let mut surface = Recorder::default();
        let rem = reminder("Aspirin", Language::En);

        assert_eq!(alarm.fire(&rem, monday(), &mut surface), FireOutcome::Activated);
        assert_eq!(surface.shown[0].message, "💊 Time to take Aspirin!");
        assert_eq!(surface.shown[0].photo, rem.photo);
        assert_eq!(surface.plays, 1);
        assert!(alarm.repeat_armed());

        let burst = &surface.bursts[0];
        assert_eq!(burst.icons.len(), 5);
        for icon in &burst.icons {
            assert!((0.0..80.0).contains(&icon.left_percent));
            assert!(icon.animation.as_secs_f32() >= 2.0 && icon.animation.as_secs_f32() < 4.0);
            assert_eq!(icon.lifetime.as_secs(), 4);
        }
    }

    #[test]
    fn repeat_cue_plays_only_while_firing() {
        let mut alarm = controller();
        let mut surface = Recorder::default();
        assert!(!alarm.repeat_cue(&mut surface));

        alarm.fire(&reminder("A", Language::En), monday(), &mut surface);
        assert!(alarm.repeat_cue(&mut surface));
        assert!(alarm.repeat_cue(&mut surface));
        assert_eq!(surface.plays, 3);

        alarm.acknowledge(&mut surface);
        assert!(!alarm.repeat_cue(&mut surface));
        assert_eq!(surface.plays, 3);
        assert!(!alarm.repeat_armed());
    }

    #[test]
    fn acknowledge_stops_cue_hides_popup_and_returns_id() {
        let mut alarm = controller();
        let mut surface = Recorder::default();
        let rem = reminder("A", Language::Te);
        alarm.fire(&rem, monday(), &mut surface);

        let acked = alarm.acknowledge(&mut surface).expect("alarm was firing");
        assert_eq!(acked.reminder_id, rem.id);
        assert_eq!(acked.date, monday());
        assert_eq!(surface.stops, 1);
        assert_eq!(surface.hidden, 1);
        assert_eq!(alarm.state(), &AlarmState::Idle);
        assert_eq!(alarm.acknowledge(&mut surface), None);
    }

    #[test]
    fn playback_failure_does_not_block_popup_or_ack() {
        let mut alarm = controller();
        let mut surface = Recorder {
            fail_playback: true,
            ..Recorder::default()
        };
        let rem = reminder("A", Language::Hi);
        assert_eq!(alarm.fire(&rem, monday(), &mut surface), FireOutcome::Activated);
        assert_eq!(surface.shown.len(), 1);
        assert!(alarm.repeat_cue(&mut surface));
        assert_eq!(
            alarm.acknowledge(&mut surface).map(|acked| acked.reminder_id),
            Some(rem.id)
        );
    }

    #[test]
    fn simultaneous_matches_are_queued_fifo_without_duplicates() {
        let mut alarm = controller();
        let mut surface = Recorder::default();
        let first = reminder("first", Language::En);
        let second = reminder("second", Language::En);
        let third = reminder("third", Language::En);

        assert_eq!(alarm.fire(&first, monday(), &mut surface), FireOutcome::Activated);
        assert_eq!(alarm.fire(&second, monday(), &mut surface), FireOutcome::Queued);
        assert_eq!(alarm.fire(&third, monday(), &mut surface), FireOutcome::Queued);
        assert_eq!(alarm.fire(&second, monday(), &mut surface), FireOutcome::Duplicate);
        assert_eq!(alarm.fire(&first, monday(), &mut surface), FireOutcome::Duplicate);
        assert_eq!(surface.shown.len(), 1);

        let mut snapshot = vec![first.clone(), second.clone(), third.clone()];
        alarm.acknowledge(&mut surface);
        snapshot[1].done_today = true;
        snapshot[1].done_on = Some(monday());
        assert_eq!(alarm.activate_next(&snapshot, &mut surface), Some(third.id));
        assert_eq!(alarm.active_reminder(), Some(third.id));
        assert_eq!(alarm.pending().count(), 0);
    }

    #[test]
    fn dismiss_all_clears_queue_and_popup() {
        let mut alarm = controller();
        let mut surface = Recorder::default();
        alarm.fire(&reminder("a", Language::En), monday(), &mut surface);
        alarm.fire(&reminder("b", Language::En), monday(), &mut surface);

        alarm.dismiss_all(&mut surface);
        assert!(!alarm.is_firing());
        assert_eq!(alarm.pending().count(), 0);
        assert_eq!(surface.hidden, 1);
        assert!(!alarm.repeat_cue(&mut surface));
    }
}
