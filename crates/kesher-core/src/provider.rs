//! Language-generation provider capability.
//!
//! The provider is the simulator's single external generation dependency:
//! given the conversation so far it produces the partner's next line and a
//! disposition signal. It is slow (seconds), unreliable, and untrusted -
//! callers must treat failures as transient where flagged and must bound the
//! reply text before storing it. Abstracting it behind one trait lets the
//! turn processor and feedback scorer run against a deterministic stub.

use crate::emotional_state::EmotionalState;
use crate::error::Result;
use crate::session::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything the provider needs to generate the partner's next reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptContext {
    /// The scenario's opening context.
    pub scenario_context: String,
    /// The scenario's conversational goal.
    pub goal: String,
    /// The full message sequence so far, in order.
    pub messages: Vec<Message>,
    /// The partner's current emotional state.
    pub emotional_state: EmotionalState,
}

/// The provider's assessment of how the user's last message landed.
///
/// Levels are targets on the 0-100 scale, not deltas: the provider reports
/// where the partner's interest and comfort now sit. The turn processor
/// turns targets into bounded per-turn deltas and records the per-criterion
/// assessment on the session for the feedback scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionSignal {
    /// Target engagement/interest level (0-100).
    pub interest: u8,
    /// Target comfort/ease level (0-100).
    pub comfort: u8,
    /// Per-criterion read of the user's last message.
    pub assessment: CriterionAssessment,
}

/// Per-criterion levels (0-100 each) the provider assigns to a single user
/// message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionAssessment {
    pub empathy: u8,
    pub clarity: u8,
    pub respect: u8,
    pub engagement: u8,
}

impl CriterionAssessment {
    /// The same level on every criterion.
    pub fn uniform(level: u8) -> Self {
        Self {
            empathy: level,
            clarity: level,
            respect: level,
            engagement: level,
        }
    }
}

impl Default for CriterionAssessment {
    fn default() -> Self {
        Self::uniform(50)
    }
}

/// A generated partner reply plus its disposition signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    /// The partner's reply text. Untrusted: length is not guaranteed bounded.
    pub reply_text: String,
    /// How the user's last message affected the partner's disposition.
    pub disposition: DispositionSignal,
}

/// The single capability the simulator requires of a generation backend.
#[async_trait]
pub trait DialogueProvider: Send + Sync {
    /// Generates the partner's next reply for the given context.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::Upstream` on provider failure or timeout, with
    /// `retryable` set for transient causes.
    async fn generate(&self, context: &PromptContext) -> Result<GeneratedReply>;
}
