//! Core data model types for neuromaster.
//!
//! These are the fundamental types that the catalog, the stats store and the
//! quiz sessions share: nerve records, game modes and feedback cues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the twelve cranial nerves. Defined once in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NerveRecord {
    /// Anatomical ordinal, 1 (I) through 12 (XII).
    pub id: u8,
    /// Roman numeral label.
    pub roman: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Functional classification.
    pub function_type: FunctionType,
    /// What the nerve does.
    pub description: &'static str,
    /// Short summary of the main function.
    pub key_function: &'static str,
}

/// Functional classification of a cranial nerve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    Motor,
    Sensory,
    Mixed,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionType::Motor => write!(f, "Motor"),
            FunctionType::Sensory => write!(f, "Sensory"),
            FunctionType::Mixed => write!(f, "Mixed"),
        }
    }
}

/// The three playable game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Timed run selecting I through XII in order. Result is seconds.
    Ordering,
    /// Multiple choice on AI-generated clinical cases. Result is points.
    Clinical,
    /// Multiple choice on AI-generated illustrations. Result is points.
    Visual,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Ordering, GameMode::Clinical, GameMode::Visual];

    /// Stable persistence key, distinct per mode.
    pub fn storage_key(self) -> &'static str {
        match self {
            GameMode::Ordering => "nm_stats_ordering",
            GameMode::Clinical => "nm_stats_clinical",
            GameMode::Visual => "nm_stats_visual",
        }
    }

    /// Ordering is a race against the clock; the score modes count hits.
    pub fn lower_is_better(self) -> bool {
        matches!(self, GameMode::Ordering)
    }

    /// Unit of the recorded value.
    pub fn unit(self) -> &'static str {
        match self {
            GameMode::Ordering => "s",
            GameMode::Clinical | GameMode::Visual => "pts",
        }
    }

    /// Human-readable title of what the history tracks.
    pub fn metric_label(self) -> &'static str {
        match self {
            GameMode::Ordering => "Completion time",
            GameMode::Clinical | GameMode::Visual => "Correct answers per session",
        }
    }

    /// Whether `candidate` beats `current` under this mode's comparison.
    ///
    /// Anything beats an empty best.
    pub fn is_better(self, candidate: f64, current: Option<f64>) -> bool {
        match current {
            None => true,
            Some(best) if self.lower_is_better() => candidate < best,
            Some(best) => candidate > best,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Ordering => write!(f, "ordering"),
            GameMode::Clinical => write!(f, "clinical"),
            GameMode::Visual => write!(f, "visual"),
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ordering" | "order" => Ok(GameMode::Ordering),
            "clinical" => Ok(GameMode::Clinical),
            "visual" => Ok(GameMode::Visual),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// Feedback cue emitted by a session transition.
///
/// The presentation layer decides how to render it (sound, colour, bell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Error,
    Win,
}
