//! Single-threaded timer loop driving a `ReminderEngine`.
//!
//! # Responsibility
//! - Run the matcher, repeat-cue and rollover timers on one task.
//! - Serve user actions arriving through an `EngineHandle`.
//!
//! # Invariants
//! - Every `select!` branch runs to completion before the next one starts,
//!   so the engine needs no locking.
//! - There is exactly one repeat-cue interval. It is polled only while an
//!   alarm is firing and is reset whenever a new alarm starts.

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::model::reminder::{ReminderDraft, ReminderId};
use crate::repo::kv_store::KeyValueStore;
use crate::service::capture::CameraError;
use crate::service::engine::{AckOutcome, ReminderEngine};
use crate::service::reminder_store::StoreError;
use crate::service::surface::AlarmSurface;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

/// User action delivered to the loop.
#[derive(Debug)]
pub enum Command {
    AddReminder {
        draft: ReminderDraft,
        reply: oneshot::Sender<Result<ReminderId, StoreError>>,
    },
    Acknowledge {
        reply: oneshot::Sender<AckOutcome>,
    },
    ClearAll,
    CapturePhoto {
        data_uri: String,
        reply: oneshot::Sender<Result<(), CameraError>>,
    },
    /// Outcome of the asynchronous camera stream request.
    CameraResult(Result<(), CameraError>),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The loop has stopped.
    Closed,
    Store(StoreError),
    Camera(CameraError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "reminder loop is not running"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Camera(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Closed => None,
            Self::Store(err) => Some(err),
            Self::Camera(err) => Some(err),
        }
    }
}

/// Cloneable sender side used by front-ends.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
}

/// Creates a handle and the receiver consumed by `run`.
pub fn channel() -> (EngineHandle, mpsc::UnboundedReceiver<Command>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EngineHandle { tx }, rx)
}

impl EngineHandle {
    pub async fn add_reminder(&self, draft: ReminderDraft) -> Result<ReminderId, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AddReminder { draft, reply })?;
        rx.await
            .map_err(|_| CommandError::Closed)?
            .map_err(CommandError::Store)
    }

    pub async fn acknowledge(&self) -> Result<AckOutcome, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Acknowledge { reply })?;
        rx.await.map_err(|_| CommandError::Closed)
    }

    pub async fn capture_photo(&self, data_uri: impl Into<String>) -> Result<(), CommandError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::CapturePhoto {
            data_uri: data_uri.into(),
            reply,
        })?;
        rx.await
            .map_err(|_| CommandError::Closed)?
            .map_err(CommandError::Camera)
    }

    pub fn camera_result(&self, result: Result<(), CameraError>) -> Result<(), CommandError> {
        self.send(Command::CameraResult(result))
    }

    pub fn clear_all(&self) -> Result<(), CommandError> {
        self.send(Command::ClearAll)
    }

    pub fn shutdown(&self) -> Result<(), CommandError> {
        self.send(Command::Shutdown)
    }

    fn send(&self, command: Command) -> Result<(), CommandError> {
        self.tx.send(command).map_err(|_| CommandError::Closed)
    }
}

/// Drives `engine` until `Shutdown` arrives or every handle is dropped.
pub async fn run<S, U, C>(
    engine: &mut ReminderEngine<S, U>,
    clock: C,
    config: &EngineConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
) where
    S: KeyValueStore,
    U: AlarmSurface,
    C: Clock,
{
    let mut match_tick = interval(config.match_interval);
    match_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut repeat_tick = interval_at(
        Instant::now() + config.repeat_interval,
        config.repeat_interval,
    );
    repeat_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut midnight_tick = interval(config.midnight_interval);
    midnight_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "event=runtime_start module=runtime status=ok match_ms={} repeat_ms={} midnight_ms={}",
        config.match_interval.as_millis(),
        config.repeat_interval.as_millis(),
        config.midnight_interval.as_millis()
    );
    engine.start();

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("event=runtime_stop module=runtime status=handles_dropped");
                    break;
                };
                match apply_command(engine, command) {
                    CommandEffect::Continue => {}
                    CommandEffect::AlarmStarted => repeat_tick.reset(),
                    CommandEffect::Stop => break,
                }
            }
            _ = match_tick.tick() => {
                let outcome = engine.on_match_tick(clock.now());
                if outcome.activated.is_some() {
                    repeat_tick.reset();
                }
            }
            _ = repeat_tick.tick(), if engine.is_firing() => {
                engine.on_repeat_tick();
            }
            _ = midnight_tick.tick() => {
                engine.on_midnight_tick(clock.now());
            }
        }
    }

    info!("event=runtime_stop module=runtime status=ok");
}

enum CommandEffect {
    Continue,
    AlarmStarted,
    Stop,
}

fn apply_command<S, U>(engine: &mut ReminderEngine<S, U>, command: Command) -> CommandEffect
where
    S: KeyValueStore,
    U: AlarmSurface,
{
    // Reply send failures mean the caller stopped waiting; nothing to undo.
    match command {
        Command::AddReminder { draft, reply } => {
            let _ = reply.send(engine.add_reminder(draft));
        }
        Command::Acknowledge { reply } => {
            let outcome = engine.acknowledge();
            let _ = reply.send(outcome);
            if outcome.activated.is_some() {
                return CommandEffect::AlarmStarted;
            }
        }
        Command::ClearAll => engine.clear_all(),
        Command::CapturePhoto { data_uri, reply } => {
            let _ = reply.send(engine.capture_photo(&data_uri));
        }
        Command::CameraResult(result) => engine.on_camera_result(result),
        Command::Shutdown => return CommandEffect::Stop,
    }
    CommandEffect::Continue
}
