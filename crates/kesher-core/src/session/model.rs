//! Session domain model.
//!
//! `SimulationSession` is an explicit value passed by the caller on every
//! operation; there is no hidden global session. The model enforces the two
//! structural invariants itself: strict user/partner speaker alternation
//! starting with the user, and non-decreasing message timestamps. Lifecycle
//! ordering (which transition is legal in which state) lives in the turn
//! processor.

use super::message::{Message, Speaker};
use crate::emotional_state::EmotionalState;
use crate::error::{KesherError, Result};
use crate::provider::CriterionAssessment;
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Waiting for the next user message.
    AwaitingUser,
    /// A user message was accepted; waiting for the partner reply.
    AwaitingPartnerReply,
    /// The session has ended. Terminal; no further messages are accepted.
    Closed,
}

/// One run of the simulator for a given scenario.
///
/// The session exclusively owns its message sequence and emotional state.
/// The referenced scenario is immutable shared data; the fields the turn
/// processor needs (context, goal) are snapshotted here so a session value
/// is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSession {
    /// Unique session identifier (UUID format).
    pub id: String,
    /// Id of the scenario this session runs.
    pub scenario_id: String,
    /// Scenario opening context, snapshotted at start.
    pub context: String,
    /// Scenario conversational goal, snapshotted at start.
    pub goal: String,
    /// The partner's scripted opening line. Display context only; not a turn.
    pub opening_message: String,
    /// Ordered conversation history. Insertion order is conversational
    /// order; messages are never reordered.
    pub messages: Vec<Message>,
    /// Per-criterion provider assessments, one per resolved partner reply.
    /// Consumed by the feedback scorer at finalize time.
    pub turn_assessments: Vec<CriterionAssessment>,
    /// Current position in the turn cycle.
    pub turn_state: TurnState,
    /// The partner's current emotional state.
    pub emotional_state: EmotionalState,
    /// The scenario's soft cap on user turns, snapshotted at start.
    pub max_turns: u32,
    /// Timestamp when the session was created (ISO 8601 format).
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format).
    pub updated_at: String,
}

impl SimulationSession {
    /// Creates a fresh session for a scenario: zero messages, the user's
    /// turn next, emotional state at the neutral baseline.
    pub fn start(scenario: &Scenario) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            scenario_id: scenario.id.clone(),
            context: scenario.description.clone(),
            goal: scenario.goal.clone(),
            opening_message: scenario.opening_message.clone(),
            messages: Vec::new(),
            turn_assessments: Vec::new(),
            turn_state: TurnState::AwaitingUser,
            emotional_state: EmotionalState::initial(),
            max_turns: scenario.max_turns,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The speaker whose message the sequence expects next.
    ///
    /// Alternation is strict and starts with the user, so this is fully
    /// determined by the current message count.
    pub fn expected_speaker(&self) -> Speaker {
        if self.messages.len() % 2 == 0 {
            Speaker::User
        } else {
            Speaker::Partner
        }
    }

    /// Number of completed user turns.
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.speaker == Speaker::User)
            .count()
    }

    /// Whether the scenario's soft turn cap has been reached.
    ///
    /// The cap is advisory: messages past it are still accepted, but the
    /// caller should steer the session toward ending.
    pub fn turn_cap_reached(&self) -> bool {
        self.user_turns() >= self.max_turns as usize
    }

    /// Appends a message, enforcing speaker alternation and timestamp
    /// monotonicity.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::State` if the speaker is out of turn. Content
    /// validation (emptiness, length) happens before this point, in the
    /// turn processor.
    pub(crate) fn append_message(&mut self, speaker: Speaker, content: String) -> Result<()> {
        if speaker != self.expected_speaker() {
            return Err(KesherError::state(format!(
                "out-of-order speaker: expected {}, got {}",
                self.expected_speaker(),
                speaker
            )));
        }

        let timestamp = self.next_timestamp();
        self.messages.push(Message {
            speaker,
            content,
            timestamp: timestamp.clone(),
        });
        self.updated_at = timestamp;
        Ok(())
    }

    /// Produces a timestamp that never goes backwards within the session,
    /// even if the wall clock does.
    fn next_timestamp(&self) -> String {
        let now = chrono::Utc::now().to_rfc3339();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp.clone(),
            _ => now,
        }
    }
}
