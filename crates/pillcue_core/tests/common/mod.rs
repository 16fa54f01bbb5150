#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pillcue_core::{
    AlarmSurface, EffectBurst, Language, PlaybackError, PopupContent, ReminderDraft,
    ReminderSummary,
};
use std::cell::RefCell;
use std::rc::Rc;

pub const PHOTO: &str = "data:image/png;base64,iVBORw0KGgo=";

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub lists: Vec<Vec<ReminderSummary>>,
    pub shown: Vec<PopupContent>,
    pub hidden: usize,
    pub plays: usize,
    pub stops: usize,
    pub bursts: Vec<EffectBurst>,
    pub notices: Vec<String>,
    pub fail_playback: bool,
}

/// Surface recording every call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn plays(&self) -> usize {
        self.log.borrow().plays
    }

    pub fn shown(&self) -> Vec<PopupContent> {
        self.log.borrow().shown.clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.log.borrow().notices.clone()
    }

    pub fn last_list(&self) -> Vec<ReminderSummary> {
        self.log.borrow().lists.last().cloned().unwrap_or_default()
    }
}

impl AlarmSurface for RecordingSurface {
    fn render_list(&mut self, items: &[ReminderSummary]) {
        self.log.borrow_mut().lists.push(items.to_vec());
    }

    fn show_popup(&mut self, popup: &PopupContent) {
        self.log.borrow_mut().shown.push(popup.clone());
    }

    fn hide_popup(&mut self) {
        self.log.borrow_mut().hidden += 1;
    }

    fn play_cue(&mut self) -> Result<(), PlaybackError> {
        let mut log = self.log.borrow_mut();
        log.plays += 1;
        if log.fail_playback {
            return Err(PlaybackError::new("autoplay blocked"));
        }
        Ok(())
    }

    fn stop_cue(&mut self) {
        self.log.borrow_mut().stops += 1;
    }

    fn spawn_effects(&mut self, burst: &EffectBurst) {
        self.log.borrow_mut().bursts.push(burst.clone());
    }

    fn notify(&mut self, message: &str) {
        self.log.borrow_mut().notices.push(message.to_string());
    }
}

pub fn draft(name: &str, time: &str, days: &[&str]) -> ReminderDraft {
    ReminderDraft {
        lang: Language::En,
        name: name.to_string(),
        photo: Some(PHOTO.to_string()),
        time: time.to_string(),
        days: days.iter().map(|day| day.to_string()).collect(),
    }
}

/// March 2024; the 4th is a Monday.
pub fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

/// Calendar date of `at(day, ..)`.
pub fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}
