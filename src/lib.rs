//! HTTP surface for Taskboard.
//!
//! The record models and the document store live in `taskboard-core`; this
//! crate maps REST routes onto them.

pub mod api;

pub use taskboard_core::{db, models};
