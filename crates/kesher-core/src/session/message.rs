//! Conversation message types.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Maximum accepted length (in characters) of a user message.
pub const USER_MESSAGE_MAX_LEN: usize = 1000;

/// Maximum stored length (in characters) of a partner reply. Provider output
/// is untrusted and unbounded; replies are truncated to this before storage.
pub const PARTNER_REPLY_MAX_LEN: usize = 2000;

/// Who sent a message within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Speaker {
    /// The practicing user.
    User,
    /// The simulated conversation partner.
    Partner,
}

/// A single message in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent the message.
    pub speaker: Speaker,
    /// Non-empty message text, bounded by the per-speaker length limits.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    /// Non-decreasing within a session.
    pub timestamp: String,
}
