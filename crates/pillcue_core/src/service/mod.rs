//! Core use-case services.
//!
//! # Responsibility
//! - Own the reminder collection and the alarm lifecycle.
//! - Keep front-ends decoupled from storage and timing details.

pub mod alarm;
pub mod capture;
pub mod engine;
pub mod midnight;
pub mod reminder_store;
pub mod scheduler;
pub mod surface;
