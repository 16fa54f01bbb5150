//! FFI use-case API for Flutter/Web UI calls.
//!
//! # Responsibility
//! - Expose reminder use-cases as sync functions via FRB.
//! - Let the UI drive the three timers and drain the resulting UI events.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One engine per process, created lazily on first use.
//! - UI events are returned in the order the engine produced them.

use log::warn;
use pillcue_core::db::open_db;
use pillcue_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, AlarmSurface,
    CameraError, Clock, EffectBurst, EngineConfig, KeyValueStore, Language, MemoryKeyValueStore,
    PlaybackError, PopupContent, ReminderDraft, ReminderEngine, ReminderStore, ReminderSummary,
    SqliteKeyValueStore, SystemClock,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const ENGINE_DB_FILE_NAME: &str = "pillcue_ffi.sqlite3";
static ENGINE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static ENGINE: OnceLock<Mutex<Option<FfiEngine>>> = OnceLock::new();

type FfiEngine = ReminderEngine<Box<dyn KeyValueStore + Send>, QueueSurface>;

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Row of the reminder list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub reminder_id: String,
    pub label: String,
    pub time: String,
    pub days: String,
    pub done_today: bool,
}

/// Instruction for the UI produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    RenderList {
        items: Vec<ReminderItem>,
    },
    ShowPopup {
        reminder_id: String,
        message: String,
        photo: String,
    },
    HidePopup,
    /// Rewind and play the cue audio.
    PlayCue,
    /// Pause and rewind the cue audio.
    StopCue,
    /// Spawn floating icons; each removes itself after `lifetime_ms`.
    SpawnEffects {
        icon_url: String,
        left_percents: Vec<f32>,
        animation_ms: Vec<u32>,
        lifetime_ms: u32,
    },
    Notice {
        message: String,
    },
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderActionResponse {
    pub ok: bool,
    /// Reminder affected by the action, when there is one.
    pub reminder_id: Option<String>,
    pub message: String,
    /// Events produced while handling the action.
    pub events: Vec<UiEvent>,
}

impl ReminderActionResponse {
    fn success(message: impl Into<String>, reminder_id: Option<String>, events: Vec<UiEvent>) -> Self {
        Self {
            ok: true,
            reminder_id,
            message: message.into(),
            events,
        }
    }

    fn failure(message: impl Into<String>, events: Vec<UiEvent>) -> Self {
        Self {
            ok: false,
            reminder_id: None,
            message: message.into(),
            events,
        }
    }
}

/// Adds a reminder from the form fields.
///
/// A missing `photo` falls back to the last captured one.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_add(
    lang: String,
    name: String,
    time: String,
    days: Vec<String>,
    photo: Option<String>,
) -> ReminderActionResponse {
    let draft = ReminderDraft {
        lang: Language::from_code(&lang),
        name,
        photo: photo.filter(|photo| !photo.trim().is_empty()),
        time,
        days,
    };
    with_engine(|engine| match engine.add_reminder(draft) {
        Ok(id) => ReminderActionResponse::success(
            "Reminder added.",
            Some(id.to_string()),
            engine.surface_mut().drain(),
        ),
        Err(err) => ReminderActionResponse::failure(
            format!("reminder_add failed: {err}"),
            engine.surface_mut().drain(),
        ),
    })
}

/// Lists current reminders in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_list() -> Vec<ReminderItem> {
    with_engine(|engine| {
        engine
            .store()
            .summaries()
            .iter()
            .map(to_reminder_item)
            .collect()
    })
}

/// Acknowledges the firing alarm.
///
/// # FFI contract
/// - `ok=false` when no alarm is firing.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_acknowledge() -> ReminderActionResponse {
    with_engine(|engine| {
        let outcome = engine.acknowledge();
        let events = engine.surface_mut().drain();
        match outcome.acknowledged {
            Some(id) => {
                ReminderActionResponse::success("Reminder done for today.", Some(id.to_string()), events)
            }
            None => ReminderActionResponse::failure("No alarm is firing.", events),
        }
    })
}

/// Removes every reminder and dismisses any alarm.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_clear() -> ReminderActionResponse {
    with_engine(|engine| {
        engine.clear_all();
        ReminderActionResponse::success("All reminders cleared.", None, engine.surface_mut().drain())
    })
}

/// Reports the outcome of the camera stream request.
///
/// `error = None` means the stream started.
#[flutter_rust_bridge::frb(sync)]
pub fn camera_stream_result(error: Option<String>) -> Vec<UiEvent> {
    with_engine(|engine| {
        let result = match error {
            None => Ok(()),
            Some(reason) => Err(CameraError::PermissionDenied(reason)),
        };
        engine.on_camera_result(result);
        engine.surface_mut().drain()
    })
}

/// Stores a captured frame (`data:image/...;base64,...`).
#[flutter_rust_bridge::frb(sync)]
pub fn photo_capture(data_uri: String) -> ReminderActionResponse {
    with_engine(|engine| match engine.capture_photo(&data_uri) {
        Ok(()) => ReminderActionResponse::success("Photo captured.", None, engine.surface_mut().drain()),
        Err(err) => ReminderActionResponse::failure(
            format!("photo_capture failed: {err}"),
            engine.surface_mut().drain(),
        ),
    })
}

/// Matcher tick; call every second.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_tick() -> Vec<UiEvent> {
    with_engine(|engine| {
        engine.on_match_tick(SystemClock.now());
        engine.surface_mut().drain()
    })
}

/// Repeat-cue tick; call every second while a popup is shown.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_repeat_tick() -> Vec<UiEvent> {
    with_engine(|engine| {
        engine.on_repeat_tick();
        engine.surface_mut().drain()
    })
}

/// Day rollover tick; call every minute.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_midnight_tick() -> Vec<UiEvent> {
    with_engine(|engine| {
        engine.on_midnight_tick(SystemClock.now());
        engine.surface_mut().drain()
    })
}

/// Records that the UI could not play the cue. The popup stays usable.
#[flutter_rust_bridge::frb(sync)]
pub fn report_playback_failure(reason: String) {
    let err = PlaybackError::new(reason);
    warn!("event=cue_failed module=ffi status=ignored error={}", err);
}

/// Surface that queues UI events until the next FFI call drains them.
#[derive(Debug, Default)]
pub struct QueueSurface {
    events: VecDeque<UiEvent>,
}

impl QueueSurface {
    fn drain(&mut self) -> Vec<UiEvent> {
        self.events.drain(..).collect()
    }
}

impl AlarmSurface for QueueSurface {
    fn render_list(&mut self, items: &[ReminderSummary]) {
        self.events.push_back(UiEvent::RenderList {
            items: items.iter().map(to_reminder_item).collect(),
        });
    }

    fn show_popup(&mut self, popup: &PopupContent) {
        self.events.push_back(UiEvent::ShowPopup {
            reminder_id: popup.reminder_id.to_string(),
            message: popup.message.clone(),
            photo: popup.photo.clone(),
        });
    }

    fn hide_popup(&mut self) {
        self.events.push_back(UiEvent::HidePopup);
    }

    fn play_cue(&mut self) -> Result<(), PlaybackError> {
        // Playback happens in the UI; failures come back via `report_playback_failure`.
        self.events.push_back(UiEvent::PlayCue);
        Ok(())
    }

    fn stop_cue(&mut self) {
        self.events.push_back(UiEvent::StopCue);
    }

    fn spawn_effects(&mut self, burst: &EffectBurst) {
        let Some(first) = burst.icons.first() else {
            return;
        };
        self.events.push_back(UiEvent::SpawnEffects {
            icon_url: first.icon_url.clone(),
            left_percents: burst.icons.iter().map(|icon| icon.left_percent).collect(),
            animation_ms: burst
                .icons
                .iter()
                .map(|icon| icon.animation.as_millis() as u32)
                .collect(),
            lifetime_ms: first.lifetime.as_millis() as u32,
        });
    }

    fn notify(&mut self, message: &str) {
        self.events.push_back(UiEvent::Notice {
            message: message.to_string(),
        });
    }
}

fn with_engine<T>(f: impl FnOnce(&mut FfiEngine) -> T) -> T {
    let mut guard = lock_engine();
    let engine = guard.get_or_insert_with(open_engine);
    f(engine)
}

fn lock_engine() -> MutexGuard<'static, Option<FfiEngine>> {
    let cell = ENGINE.get_or_init(|| Mutex::new(None));
    // A panic inside a previous call must not brick the UI.
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn open_engine() -> FfiEngine {
    let db_path = resolve_engine_db_path();
    let backend: Box<dyn KeyValueStore + Send> = match open_db(&db_path) {
        Ok(conn) => Box::new(SqliteKeyValueStore::new(conn)),
        Err(err) => {
            warn!(
                "event=db_open module=ffi status=fallback path={} error={}",
                db_path.display(),
                err
            );
            Box::new(MemoryKeyValueStore::new())
        }
    };
    let config = EngineConfig::from_env();
    let mut engine = ReminderEngine::new(
        ReminderStore::load(backend),
        QueueSurface::default(),
        &config,
        SystemClock.now(),
    );
    engine.start();
    engine
}

fn resolve_engine_db_path() -> PathBuf {
    ENGINE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PILLCUE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENGINE_DB_FILE_NAME)
        })
        .clone()
}

fn to_reminder_item(summary: &ReminderSummary) -> ReminderItem {
    ReminderItem {
        reminder_id: summary.id.to_string(),
        label: summary.label.clone(),
        time: summary.time.clone(),
        days: summary.days.clone(),
        done_today: summary.done_today,
    }
}
