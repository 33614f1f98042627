//! neuromaster-core: Nerve catalog, scoring history and quiz sessions.
//!
//! This crate defines the data model every other neuromaster crate builds
//! on: the twelve cranial nerves, per-mode result history with personal
//! bests, and the state machines that drive the ordering and
//! multiple-choice quizzes.

pub mod catalog;
pub mod clock;
pub mod error;
pub mod model;
pub mod session;
pub mod stats;
pub mod traits;
