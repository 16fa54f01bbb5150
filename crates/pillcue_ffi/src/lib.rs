//! Flutter/Web-facing bindings for PillCue core.

pub mod api;
