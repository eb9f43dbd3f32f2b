//! Finalized session records.

use super::message::Message;
use crate::emotional_state::EmotionalState;
use crate::feedback::FeedbackResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The append-only record written when a session is finalized.
///
/// A record captures the full outcome of a session - message sequence, final
/// emotional state, feedback - and is immutable after insertion. It is the
/// only thing the simulator ever persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique record identifier (UUID format).
    pub id: String,
    /// Id of the finalized session.
    pub session_id: String,
    /// Id of the scenario the session ran.
    pub scenario_id: String,
    /// The full conversation, in order.
    pub messages: Vec<Message>,
    /// The partner's emotional state at the end of the session.
    pub final_state: EmotionalState,
    /// The feedback computed at finalize time. Never retroactively altered.
    pub feedback: FeedbackResult,
    /// Wall-clock seconds between session start and finalize.
    pub duration_secs: i64,
    /// Timestamp when the record was created (ISO 8601 format).
    pub created_at: String,
}

impl SessionRecord {
    /// Builds a record from a finalized session's parts.
    pub fn new(
        session_id: impl Into<String>,
        scenario_id: impl Into<String>,
        messages: Vec<Message>,
        final_state: EmotionalState,
        feedback: FeedbackResult,
        duration_secs: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            scenario_id: scenario_id.into(),
            messages,
            final_state,
            feedback,
            duration_secs,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
