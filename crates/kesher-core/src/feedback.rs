//! Post-session feedback scoring.
//!
//! The scorer is a deterministic function of the full message sequence, the
//! final emotional state, and the per-turn provider assessments already
//! resolved onto the session. Every criterion derives a 0-100 score from
//! message-content heuristics blended with the emotional trajectory and the
//! mean provider assessment, plus a qualitative comment. No provider call
//! happens inside scoring.

use crate::error::{KesherError, Result};
use crate::provider::CriterionAssessment;
use crate::session::{SimulationSession, Speaker};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Score at or above which a criterion is listed as a strength.
const STRENGTH_THRESHOLD: u8 = 70;
/// Score below which a criterion is listed as an area to improve.
const IMPROVEMENT_THRESHOLD: u8 = 40;

/// The named criteria a session is evaluated against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Criterion {
    Empathy,
    Clarity,
    Respect,
    Engagement,
}

/// One criterion's score and comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    /// 0-100.
    pub score: u8,
    /// Short qualitative comment for this criterion.
    pub comment: String,
}

/// The post-session scoring of the user's performance.
///
/// Computed once per finalized session and never retroactively altered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResult {
    /// Per-criterion breakdown, in criterion declaration order.
    pub scores: Vec<CriterionScore>,
    /// Mean of the criterion scores.
    pub overall: u8,
    /// Criteria the user did well on.
    pub strengths: Vec<String>,
    /// Criteria with clear room to grow.
    pub improvements: Vec<String>,
    /// Practical tips matched to the improvement areas.
    pub tips: Vec<String>,
}

impl FeedbackResult {
    /// Returns the score for a criterion, if present.
    pub fn score_for(&self, criterion: Criterion) -> Option<u8> {
        self.scores
            .iter()
            .find(|s| s.criterion == criterion)
            .map(|s| s.score)
    }
}

/// Evaluates a session against the named criteria.
#[derive(Debug, Default)]
pub struct FeedbackScorer;

impl FeedbackScorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores a session.
    ///
    /// Deterministic: the same message sequence and final state always
    /// produce the same result.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::Validation` if the session has no messages -
    /// there is nothing to score.
    pub fn score(&self, session: &SimulationSession) -> Result<FeedbackResult> {
        if session.messages.is_empty() {
            return Err(KesherError::validation(
                "cannot score a session with no messages",
            ));
        }

        let user_messages: Vec<&str> = session
            .messages
            .iter()
            .filter(|m| m.speaker == Speaker::User)
            .map(|m| m.content.as_str())
            .collect();

        let scores: Vec<CriterionScore> = Criterion::iter()
            .map(|criterion| {
                let score = self.criterion_score(criterion, &user_messages, session);
                CriterionScore {
                    criterion,
                    score,
                    comment: comment_for(criterion, score),
                }
            })
            .collect();

        let overall = (scores.iter().map(|s| s.score as u32).sum::<u32>()
            / scores.len() as u32) as u8;

        let strengths = scores
            .iter()
            .filter(|s| s.score >= STRENGTH_THRESHOLD)
            .map(|s| strength_for(s.criterion).to_string())
            .collect();
        let improvements: Vec<String> = scores
            .iter()
            .filter(|s| s.score < IMPROVEMENT_THRESHOLD)
            .map(|s| improvement_for(s.criterion).to_string())
            .collect();
        let tips = scores
            .iter()
            .filter(|s| s.score < IMPROVEMENT_THRESHOLD)
            .map(|s| tip_for(s.criterion).to_string())
            .collect();

        Ok(FeedbackResult {
            scores,
            overall,
            strengths,
            improvements,
            tips,
        })
    }

    fn criterion_score(
        &self,
        criterion: Criterion,
        user_messages: &[&str],
        session: &SimulationSession,
    ) -> u8 {
        let state = &session.emotional_state;
        let base = match criterion {
            // Content heuristic blended with where comfort ended up: feeling
            // heard is what empathy buys.
            Criterion::Empathy => blend(empathy_heuristic(user_messages), state.comfort),
            // Clarity is purely structural; the partner's state says little
            // about it.
            Criterion::Clarity => clarity_heuristic(user_messages),
            Criterion::Respect => blend(respect_heuristic(user_messages), state.comfort),
            Criterion::Engagement => blend(engagement_heuristic(user_messages), state.interest),
        };

        // Halve in the provider's per-turn read where replies were resolved
        // with one; sessions scored without assessments keep the pure
        // heuristic score.
        match assessment_mean(criterion, &session.turn_assessments) {
            Some(provider_level) => ((base as u32 + provider_level as u32) / 2) as u8,
            None => base,
        }
    }
}

/// Mean provider level for one criterion across the session's turns.
fn assessment_mean(criterion: Criterion, assessments: &[CriterionAssessment]) -> Option<u8> {
    if assessments.is_empty() {
        return None;
    }
    let total: u32 = assessments
        .iter()
        .map(|a| {
            let level = match criterion {
                Criterion::Empathy => a.empathy,
                Criterion::Clarity => a.clarity,
                Criterion::Respect => a.respect,
                Criterion::Engagement => a.engagement,
            };
            level as u32
        })
        .sum();
    Some((total / assessments.len() as u32) as u8)
}

/// 60% content heuristic, 40% final-state trajectory.
fn blend(heuristic: u8, state_level: u8) -> u8 {
    ((heuristic as u32 * 6 + state_level as u32 * 4) / 10) as u8
}

fn empathy_heuristic(user_messages: &[&str]) -> u8 {
    const MARKERS: [&str; 8] = [
        "i understand",
        "that sounds",
        "how do you feel",
        "i'm sorry",
        "i can imagine",
        "glad",
        "thank",
        "you're right",
    ];

    if user_messages.is_empty() {
        return 0;
    }
    let hits = user_messages
        .iter()
        .filter(|m| {
            let lower = m.to_lowercase();
            MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .count();
    // Base credit for showing up, plus per-message credit for empathetic turns.
    (30 + (hits * 70 / user_messages.len()).min(70)) as u8
}

fn clarity_heuristic(user_messages: &[&str]) -> u8 {
    if user_messages.is_empty() {
        return 0;
    }
    let total_words: usize = user_messages
        .iter()
        .map(|m| m.split_whitespace().count())
        .sum();
    let avg_words = total_words / user_messages.len();

    // Conversational sweet spot: long enough to carry meaning, short enough
    // to stay readable.
    match avg_words {
        0 => 0,
        1..=2 => 35,
        3..=5 => 60,
        6..=30 => 85,
        31..=60 => 60,
        _ => 40,
    }
}

fn respect_heuristic(user_messages: &[&str]) -> u8 {
    const HOSTILE: [&str; 7] = [
        "whatever",
        "boring",
        "stupid",
        "shut up",
        "don't care",
        "waste of time",
        "ugly",
    ];
    const COURTEOUS: [&str; 4] = ["please", "thanks", "thank you", "appreciate"];

    let mut score: i32 = 75;
    for message in user_messages {
        let lower = message.to_lowercase();
        if HOSTILE.iter().any(|w| lower.contains(w)) {
            score -= 30;
        }
        if COURTEOUS.iter().any(|w| lower.contains(w)) {
            score += 10;
        }
    }
    score.clamp(0, 100) as u8
}

fn engagement_heuristic(user_messages: &[&str]) -> u8 {
    if user_messages.is_empty() {
        return 0;
    }
    let questions = user_messages.iter().filter(|m| m.contains('?')).count();
    let turns_component = (user_messages.len() * 10).min(40);
    let questions_component = (questions * 60 / user_messages.len()).min(60);
    (turns_component + questions_component) as u8
}

fn comment_for(criterion: Criterion, score: u8) -> String {
    let band = if score >= 80 {
        "excellent"
    } else if score >= 60 {
        "good, with room to grow"
    } else if score >= 40 {
        "inconsistent"
    } else {
        "needs attention"
    };
    match criterion {
        Criterion::Empathy => format!("Empathy was {band}: how well you acknowledged your date's feelings."),
        Criterion::Clarity => format!("Clarity was {band}: how easy your messages were to follow."),
        Criterion::Respect => format!("Respect was {band}: the tone you kept throughout."),
        Criterion::Engagement => {
            format!("Engagement was {band}: how much curiosity you showed in your date.")
        }
    }
}

fn strength_for(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::Empathy => "You acknowledged your date's feelings",
        Criterion::Clarity => "Your messages were clear and easy to follow",
        Criterion::Respect => "You kept a warm, respectful tone",
        Criterion::Engagement => "You showed real curiosity about your date",
    }
}

fn improvement_for(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::Empathy => "Acknowledge feelings before moving on",
        Criterion::Clarity => "Keep messages focused on one thought",
        Criterion::Respect => "Watch for dismissive phrasing",
        Criterion::Engagement => "Ask more open questions",
    }
}

fn tip_for(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::Empathy => "Try phrases like 'that sounds tough' or 'I can imagine'",
        Criterion::Clarity => "One idea per message reads better than three",
        Criterion::Respect => "Rephrase disagreement as curiosity: 'help me understand'",
        Criterion::Engagement => "Follow up on details your date mentions",
    }
}
