mod common;

use common::{at, day, draft, RecordingSurface, PHOTO};
use pillcue_core::db::open_db;
use pillcue_core::{
    AlarmController, CameraError, EngineConfig, MemoryKeyValueStore, ReminderDraft,
    ReminderEngine, ReminderStore, SqliteKeyValueStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

type Engine = ReminderEngine<MemoryKeyValueStore, RecordingSurface>;

fn engine_at(now: chrono::NaiveDateTime) -> (Engine, RecordingSurface) {
    let surface = RecordingSurface::default();
    let config = EngineConfig::default();
    let alarm = AlarmController::with_rng(&config, StdRng::seed_from_u64(42));
    let store = ReminderStore::load(MemoryKeyValueStore::new());
    let mut engine = ReminderEngine::with_alarm(store, surface.clone(), &config, alarm, now);
    engine.start();
    (engine, surface)
}

/// Ticks once per second over `[from, to)`, returning how many alarms started.
fn tick_range(engine: &mut Engine, from: chrono::NaiveDateTime, to: chrono::NaiveDateTime) -> usize {
    let mut now = from;
    let mut started = 0;
    while now < to {
        if engine.on_match_tick(now).activated.is_some() {
            started += 1;
        }
        now += chrono::TimeDelta::seconds(1);
    }
    started
}

#[test]
fn daily_reminder_fires_once_and_not_again_after_ack() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    let id = engine
        .add_reminder(draft("Aspirin", "08:05", &["daily"]))
        .unwrap();

    assert_eq!(tick_range(&mut engine, at(4, 8, 4, 0), at(4, 8, 5, 30)), 1);
    assert_eq!(engine.alarm().active_reminder(), Some(id));
    assert_eq!(surface.shown()[0].message, "💊 Time to take Aspirin!");

    let ack = engine.acknowledge();
    assert_eq!(ack.acknowledged, Some(id));
    assert!(engine.store().get(id).unwrap().done_today);

    assert_eq!(tick_range(&mut engine, at(4, 8, 5, 30), at(4, 8, 7, 0)), 0);
    assert_eq!(surface.shown().len(), 1);
}

#[test]
fn weekday_reminder_only_fires_on_its_day() {
    let (mut engine, surface) = engine_at(at(5, 7, 0, 0));
    engine.add_reminder(draft("A", "08:05", &["mon"])).unwrap();

    // Tuesday through Sunday at the matching minute.
    for day in 5..=10 {
        assert!(engine.on_match_tick(at(day, 8, 5, 0)).due.is_empty(), "day {day}");
        engine.on_match_tick(at(day, 8, 6, 0));
    }
    assert!(surface.shown().is_empty());

    assert_eq!(engine.on_match_tick(at(11, 8, 5, 0)).due.len(), 1);
}

#[test]
fn ack_stops_repeating_cue() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    engine.add_reminder(draft("A", "08:05", &["daily"])).unwrap();
    engine.on_match_tick(at(4, 8, 5, 0));

    assert!(engine.on_repeat_tick());
    assert!(engine.on_repeat_tick());
    assert_eq!(surface.plays(), 3);

    engine.acknowledge();
    assert!(!engine.on_repeat_tick());
    assert!(!engine.on_repeat_tick());
    assert_eq!(surface.plays(), 3);
    assert_eq!(surface.log.borrow().stops, 1);
    assert_eq!(surface.log.borrow().hidden, 1);
}

#[test]
fn midnight_reset_lets_reminder_fire_again_next_day() {
    let (mut engine, _surface) = engine_at(at(4, 8, 0, 0));
    let id = engine.add_reminder(draft("A", "08:05", &["daily"])).unwrap();
    engine.on_match_tick(at(4, 8, 5, 0));
    engine.acknowledge();

    assert!(engine.on_midnight_tick(at(5, 0, 0, 30)));
    assert!(!engine.store().get(id).unwrap().done_today);

    let outcome = engine.on_match_tick(at(5, 8, 5, 0));
    assert_eq!(outcome.activated, Some(id));
}

#[test]
fn reminder_at_midnight_is_not_suppressed_by_yesterdays_flag() {
    let (mut engine, _surface) = engine_at(at(4, 0, 0, 0));
    let id = engine.add_reminder(draft("A", "00:00", &["daily"])).unwrap();
    assert_eq!(engine.on_match_tick(at(4, 0, 0, 5)).activated, Some(id));
    engine.acknowledge();
    engine.on_match_tick(at(4, 23, 59, 59));

    // The minute loop has not run yet; the matcher rolls the day itself.
    let outcome = engine.on_match_tick(at(5, 0, 0, 0));
    assert!(outcome.day_rolled);
    assert_eq!(outcome.activated, Some(id));
}

#[test]
fn next_day_rollover_reenables_each_reminder() {
    let (mut engine, _surface) = engine_at(at(4, 8, 0, 0));
    let early = engine.add_reminder(draft("A", "08:05", &["daily"])).unwrap();
    let late = engine.add_reminder(draft("B", "20:00", &["daily"])).unwrap();
    engine.on_match_tick(at(4, 8, 5, 0));
    engine.acknowledge();
    assert!(engine.store().get(early).unwrap().done_today);

    engine.on_midnight_tick(at(5, 0, 1, 0));
    assert_eq!(engine.on_match_tick(at(5, 8, 5, 0)).activated, Some(early));
    engine.acknowledge();
    assert_eq!(engine.on_match_tick(at(5, 20, 0, 0)).activated, Some(late));
}

#[test]
fn simultaneous_reminders_fire_one_after_another() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    let first = engine.add_reminder(draft("First", "08:05", &["daily"])).unwrap();
    let second = engine.add_reminder(draft("Second", "08:05", &["mon"])).unwrap();

    let outcome = engine.on_match_tick(at(4, 8, 5, 0));
    assert_eq!(outcome.due, vec![first, second]);
    assert_eq!(outcome.activated, Some(first));

    let ack = engine.acknowledge();
    assert_eq!(ack.acknowledged, Some(first));
    assert_eq!(ack.activated, Some(second));
    assert_eq!(surface.shown()[1].message, "💊 Time to take Second!");

    let ack = engine.acknowledge();
    assert_eq!(ack.acknowledged, Some(second));
    assert_eq!(ack.activated, None);
    assert!(engine.store().snapshot().iter().all(|r| r.done_today));
}

#[test]
fn missing_fields_produce_notice_and_keep_store_unchanged() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    let submission = ReminderDraft {
        time: "08:00".to_string(),
        days: vec!["daily".to_string()],
        ..ReminderDraft::default()
    };

    assert!(engine.add_reminder(submission).is_err());
    assert_eq!(surface.notices(), vec!["Please select time & capture photo"]);
    assert!(engine.store().is_empty());
}

#[test]
fn captured_photo_is_attached_to_next_submission() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    engine.on_camera_result(Ok(()));
    engine.capture_photo(PHOTO).unwrap();

    let mut submission = draft("A", "08:00", &["daily"]);
    submission.photo = None;
    let id = engine.add_reminder(submission).unwrap();
    assert_eq!(engine.store().get(id).unwrap().photo, PHOTO);
    assert_eq!(surface.last_list()[0].label, "A");
}

#[test]
fn denied_camera_blocks_photo_and_reminder_creation() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    engine.on_camera_result(Err(CameraError::PermissionDenied("NotAllowedError".into())));
    assert_eq!(engine.capture_photo(PHOTO), Err(CameraError::Unavailable));

    let mut submission = draft("A", "08:00", &["daily"]);
    submission.photo = None;
    assert!(engine.add_reminder(submission).is_err());

    let notices = surface.notices();
    assert!(notices[0].starts_with("Camera access denied or not supported"));
    assert_eq!(notices.last().unwrap(), "Please select time & capture photo");
}

#[test]
fn clear_all_dismisses_alarm_and_empties_list() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    engine.add_reminder(draft("A", "08:05", &["daily"])).unwrap();
    engine.on_match_tick(at(4, 8, 5, 0));
    assert!(engine.is_firing());

    engine.clear_all();
    assert!(!engine.is_firing());
    assert!(engine.store().is_empty());
    assert!(surface.last_list().is_empty());
    assert_eq!(engine.acknowledge().acknowledged, None);
}

#[test]
fn playback_failure_keeps_popup_usable() {
    let (mut engine, surface) = engine_at(at(4, 8, 0, 0));
    surface.log.borrow_mut().fail_playback = true;
    let id = engine.add_reminder(draft("A", "08:05", &["daily"])).unwrap();

    assert_eq!(engine.on_match_tick(at(4, 8, 5, 0)).activated, Some(id));
    assert_eq!(surface.shown().len(), 1);
    assert_eq!(engine.acknowledge().acknowledged, Some(id));
}

#[test]
fn acknowledged_dose_does_not_suppress_next_day_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pillcue.db");
    let config = EngineConfig::default();
    let open_engine = |now, surface: &RecordingSurface| {
        let store = ReminderStore::load(SqliteKeyValueStore::new(open_db(&path).unwrap()));
        let alarm = AlarmController::with_rng(&config, StdRng::seed_from_u64(42));
        let mut engine = ReminderEngine::with_alarm(store, surface.clone(), &config, alarm, now);
        engine.start();
        engine
    };

    let monday_surface = RecordingSurface::default();
    let id = {
        let mut engine = open_engine(at(4, 8, 0, 0), &monday_surface);
        let id = engine.add_reminder(draft("A", "08:05", &["daily"])).unwrap();
        assert_eq!(engine.on_match_tick(at(4, 8, 5, 0)).activated, Some(id));
        engine.acknowledge();
        assert!(engine.store().get(id).unwrap().done_today);
        id
    };

    // App closed overnight and reopened on Tuesday morning.
    let tuesday_surface = RecordingSurface::default();
    let mut engine = open_engine(at(5, 7, 0, 0), &tuesday_surface);
    assert!(!engine.store().get(id).unwrap().done_today);
    assert!(!tuesday_surface.last_list()[0].done_today);

    assert_eq!(engine.on_match_tick(at(5, 8, 4, 0)).activated, None);
    assert_eq!(engine.on_match_tick(at(5, 8, 5, 0)).activated, Some(id));
    assert_eq!(tuesday_surface.shown().len(), 1);
}

#[test]
fn caught_up_dose_from_yesterday_keeps_todays_dose_armed() {
    let (mut engine, surface) = engine_at(at(4, 21, 0, 0));
    let id = engine.add_reminder(draft("Night", "23:55", &["daily"])).unwrap();
    assert!(engine.on_match_tick(at(4, 22, 0, 0)).due.is_empty());

    // Asleep across 23:55 and midnight; Monday's dose is caught up on Tuesday.
    let outcome = engine.on_match_tick(at(5, 6, 0, 0));
    assert!(outcome.day_rolled);
    assert_eq!(outcome.activated, Some(id));

    assert_eq!(engine.acknowledge().acknowledged, Some(id));
    let reminder = engine.store().get(id).unwrap();
    assert!(!reminder.done_today);
    assert_eq!(reminder.done_on, Some(day(4)));

    assert_eq!(engine.on_match_tick(at(5, 23, 54, 0)).activated, None);
    assert_eq!(engine.on_match_tick(at(5, 23, 55, 0)).activated, Some(id));
    assert_eq!(surface.shown().len(), 2);
}
