//! The simulated partner's emotional state.
//!
//! Mood is always derived from the interest/comfort trajectory; callers can
//! never set it directly. Delta application is pure and total: out-of-range
//! deltas are clamped into [0, 100], never rejected.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Lower bound of the interest/comfort scale.
pub const LEVEL_MIN: i32 = 0;
/// Upper bound of the interest/comfort scale.
pub const LEVEL_MAX: i32 = 100;
/// Baseline level for a fresh session.
pub const LEVEL_BASELINE: u8 = 50;

/// Average level at or above which the partner's mood reads as positive.
pub const MOOD_POSITIVE_THRESHOLD: u8 = 66;
/// Average level at or below which the partner's mood reads as negative.
pub const MOOD_NEGATIVE_THRESHOLD: u8 = 33;

/// The partner's overall mood, derived from interest and comfort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mood {
    Positive,
    Neutral,
    Negative,
}

/// The simulated partner's disposition at a point in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Derived mood; recomputed on every delta application.
    pub mood: Mood,
    /// Engagement level, clamped to 0-100.
    pub interest: u8,
    /// Ease/comfort level, clamped to 0-100.
    pub comfort: u8,
}

impl EmotionalState {
    /// The fixed midpoint baseline for a fresh session: neutral, 50/50.
    pub fn initial() -> Self {
        Self {
            mood: Mood::Neutral,
            interest: LEVEL_BASELINE,
            comfort: LEVEL_BASELINE,
        }
    }

    /// Applies interest/comfort deltas, clamps each level to [0, 100], and
    /// recomputes the mood from the new averages.
    ///
    /// This function is pure and total. It never fails; arbitrarily large
    /// deltas simply saturate at the scale bounds.
    #[must_use]
    pub fn apply_delta(&self, interest_delta: i32, comfort_delta: i32) -> Self {
        let interest = clamp_level(self.interest as i32 + interest_delta);
        let comfort = clamp_level(self.comfort as i32 + comfort_delta);

        Self {
            mood: derive_mood(interest, comfort),
            interest,
            comfort,
        }
    }

    /// Average of interest and comfort, the value the mood thresholds apply to.
    pub fn average(&self) -> u8 {
        ((self.interest as u16 + self.comfort as u16) / 2) as u8
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::initial()
    }
}

fn clamp_level(value: i32) -> u8 {
    value.clamp(LEVEL_MIN, LEVEL_MAX) as u8
}

/// Derives the mood from interest/comfort by threshold on their average:
/// positive at >= 66, negative at <= 33, neutral otherwise.
fn derive_mood(interest: u8, comfort: u8) -> Mood {
    let average = ((interest as u16 + comfort as u16) / 2) as u8;
    if average >= MOOD_POSITIVE_THRESHOLD {
        Mood::Positive
    } else if average <= MOOD_NEGATIVE_THRESHOLD {
        Mood::Negative
    } else {
        Mood::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_neutral_midpoint() {
        let state = EmotionalState::initial();
        assert_eq!(state.mood, Mood::Neutral);
        assert_eq!(state.interest, 50);
        assert_eq!(state.comfort, 50);
    }

    #[test]
    fn test_deltas_are_clamped_to_scale() {
        let state = EmotionalState::initial();

        let saturated_high = state.apply_delta(1000, 1000);
        assert_eq!(saturated_high.interest, 100);
        assert_eq!(saturated_high.comfort, 100);
        assert_eq!(saturated_high.mood, Mood::Positive);

        let saturated_low = state.apply_delta(-1000, -1000);
        assert_eq!(saturated_low.interest, 0);
        assert_eq!(saturated_low.comfort, 0);
        assert_eq!(saturated_low.mood, Mood::Negative);
    }

    #[test]
    fn test_mood_positive_boundary_at_66() {
        // Average 66 is positive, average 65 is neutral.
        let at_threshold = EmotionalState::initial().apply_delta(16, 16);
        assert_eq!(at_threshold.average(), 66);
        assert_eq!(at_threshold.mood, Mood::Positive);

        let below_threshold = EmotionalState::initial().apply_delta(15, 15);
        assert_eq!(below_threshold.average(), 65);
        assert_eq!(below_threshold.mood, Mood::Neutral);
    }

    #[test]
    fn test_mood_negative_boundary_at_33() {
        // Average 33 is negative, average 34 is neutral.
        let at_threshold = EmotionalState::initial().apply_delta(-17, -17);
        assert_eq!(at_threshold.average(), 33);
        assert_eq!(at_threshold.mood, Mood::Negative);

        let above_threshold = EmotionalState::initial().apply_delta(-16, -16);
        assert_eq!(above_threshold.average(), 34);
        assert_eq!(above_threshold.mood, Mood::Neutral);
    }

    #[test]
    fn test_uneven_levels_average_for_mood() {
        // interest 100, comfort 32 -> average 66 -> positive
        let state = EmotionalState::initial().apply_delta(50, -18);
        assert_eq!(state.interest, 100);
        assert_eq!(state.comfort, 32);
        assert_eq!(state.mood, Mood::Positive);
    }

    #[test]
    fn test_zero_delta_keeps_levels() {
        let state = EmotionalState::initial().apply_delta(0, 0);
        assert_eq!(state, EmotionalState::initial());
    }
}
