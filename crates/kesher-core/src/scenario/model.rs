//! Scenario definition types.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Difficulty tier of a scenario.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// An immutable simulation scenario definition.
///
/// Scenarios are created at catalog-build time and never mutated. Many
/// sessions may reference the same scenario by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable scenario identifier.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Opening context: where the conversation takes place and with whom.
    pub description: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Category tag (e.g. "first-date", "texting").
    pub category: String,
    /// What a successful conversation looks like in this scenario.
    pub goal: String,
    /// The partner's scripted opening line, shown when a session starts.
    /// Display context only; it is not part of the turn sequence.
    pub opening_message: String,
    /// Soft cap on user turns before the session should be wrapped up.
    pub max_turns: u32,
}
