//! UI collaborator contract.
//!
//! The core never renders anything itself. Front-ends implement
//! `AlarmSurface` to draw the reminder list and the alarm popup, and to play
//! the sound cue.

use crate::model::reminder::{ReminderId, ReminderSummary};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Sound cue could not be played (autoplay blocked, no audio device, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackError {
    pub reason: String,
}

impl PlaybackError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cue playback failed: {}", self.reason)
    }
}

impl Error for PlaybackError {}

/// Content of the alarm popup for one firing reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub reminder_id: ReminderId,
    /// Localized message, e.g. `💊 Time to take Aspirin!`.
    pub message: String,
    pub photo: String,
}

/// One decorative icon floating over the popup.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingIcon {
    pub icon_url: String,
    /// Horizontal offset in percent of the viewport, in `[0, 80)`.
    pub left_percent: f32,
    pub animation: Duration,
    /// Time after which the icon removes itself.
    pub lifetime: Duration,
}

/// Transient set of icons spawned when an alarm starts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectBurst {
    pub icons: Vec<FloatingIcon>,
}

/// Rendering and audio hooks implemented by front-ends.
pub trait AlarmSurface {
    fn render_list(&mut self, items: &[ReminderSummary]);
    fn show_popup(&mut self, popup: &PopupContent);
    fn hide_popup(&mut self);
    /// Plays the cue from the start.
    fn play_cue(&mut self) -> Result<(), PlaybackError>;
    /// Pauses the cue and rewinds it.
    fn stop_cue(&mut self);
    fn spawn_effects(&mut self, burst: &EffectBurst);
    /// User-visible notice (validation, camera, storage).
    fn notify(&mut self, message: &str);
}
