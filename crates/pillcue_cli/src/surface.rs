//! Text rendering of the reminder list and alarm popup.

use pillcue_core::model::locale::EMPTY_LIST_TEXT;
use pillcue_core::{AlarmSurface, EffectBurst, PlaybackError, PopupContent, ReminderSummary};
use std::io::Write;

/// Writes list and popup updates to stdout; the cue is the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl AlarmSurface for TerminalSurface {
    fn render_list(&mut self, items: &[ReminderSummary]) {
        println!("Reminders");
        if items.is_empty() {
            println!("  {EMPTY_LIST_TEXT}");
            return;
        }
        for item in items {
            let done = if item.done_today { " (done today)" } else { "" };
            println!("  {} at {} [{}]{done}", item.label, item.time, item.days);
        }
    }

    fn show_popup(&mut self, popup: &PopupContent) {
        println!();
        println!("*** {} ***", popup.message);
        println!("    photo: {} bytes, type `ack` to dismiss", popup.photo.len());
    }

    fn hide_popup(&mut self) {
        println!("*** alarm dismissed ***");
    }

    fn play_cue(&mut self) -> Result<(), PlaybackError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|()| stdout.flush())
            .map_err(|err| PlaybackError::new(err.to_string()))
    }

    fn stop_cue(&mut self) {}

    fn spawn_effects(&mut self, burst: &EffectBurst) {
        let icons = "💊".repeat(burst.icons.len());
        println!("    {icons}");
    }

    fn notify(&mut self, message: &str) {
        println!("! {message}");
    }
}
