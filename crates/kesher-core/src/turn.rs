//! Turn processor: the session's state machine.
//!
//! A turn cycles `AwaitingUser -> AwaitingPartnerReply -> AwaitingUser`, with
//! `Closed` as the terminal state. The two transitions are deliberately
//! separate operations: accepting the user message never touches the
//! emotional state, and a provider failure leaves the session parked in
//! `AwaitingPartnerReply` with the user message preserved, so the reply
//! transition can be retried without re-appending anything.

use crate::error::{KesherError, Result};
use crate::provider::{DialogueProvider, PromptContext};
use crate::session::{
    PARTNER_REPLY_MAX_LEN, SimulationSession, Speaker, TurnState, USER_MESSAGE_MAX_LEN,
};
use std::sync::Arc;

/// Largest interest/comfort swing a single exchange can produce.
///
/// The provider reports target levels; the processor clamps the implied
/// delta to this bound so one exchange cannot saturate the state.
pub const TURN_DELTA_BOUND: i32 = 15;

/// Runs the turn-cycle transitions for a session.
pub struct TurnProcessor {
    provider: Arc<dyn DialogueProvider>,
}

impl TurnProcessor {
    /// Creates a processor backed by the given generation provider.
    pub fn new(provider: Arc<dyn DialogueProvider>) -> Self {
        Self { provider }
    }

    /// Transition `AwaitingUser -> AwaitingPartnerReply`.
    ///
    /// Validates and appends the user message. The emotional state is not
    /// touched here; it only moves when the reply transition resolves.
    ///
    /// # Errors
    ///
    /// - `KesherError::Validation` if the text is empty (after trimming) or
    ///   exceeds [`USER_MESSAGE_MAX_LEN`].
    /// - `KesherError::State` if the session is not awaiting a user message.
    pub fn submit_user_message(&self, session: &mut SimulationSession, text: &str) -> Result<()> {
        match session.turn_state {
            TurnState::AwaitingUser => {}
            TurnState::AwaitingPartnerReply => {
                return Err(KesherError::state(
                    "a partner reply is pending; retry the reply transition instead",
                ));
            }
            TurnState::Closed => {
                return Err(KesherError::state("session is closed"));
            }
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(KesherError::validation("message must not be empty"));
        }
        if trimmed.chars().count() > USER_MESSAGE_MAX_LEN {
            return Err(KesherError::validation(format!(
                "message exceeds the {} character limit",
                USER_MESSAGE_MAX_LEN
            )));
        }

        session.append_message(Speaker::User, trimmed.to_string())?;
        session.turn_state = TurnState::AwaitingPartnerReply;
        tracing::debug!(session_id = %session.id, "accepted user message");
        if session.turn_cap_reached() {
            tracing::info!(
                session_id = %session.id,
                max_turns = session.max_turns,
                "turn cap reached; session should be wrapped up"
            );
        }
        Ok(())
    }

    /// Transition `AwaitingPartnerReply -> AwaitingUser`.
    ///
    /// Calls the provider with the scenario context, the full message
    /// sequence, the current emotional state, and the goal; converts the
    /// disposition signal into bounded deltas; applies them through the
    /// state model; and appends the (truncated) partner reply.
    ///
    /// On provider failure the session is left unchanged, still in
    /// `AwaitingPartnerReply` - the already-valid user message is preserved,
    /// and the caller may retry exactly this transition.
    ///
    /// # Errors
    ///
    /// - `KesherError::State` if no partner reply is pending.
    /// - `KesherError::Upstream` if the provider fails.
    pub async fn generate_reply(&self, session: &mut SimulationSession) -> Result<()> {
        if session.turn_state != TurnState::AwaitingPartnerReply {
            return Err(KesherError::state("no partner reply is pending"));
        }

        let context = PromptContext {
            scenario_context: session.context.clone(),
            goal: session.goal.clone(),
            messages: session.messages.clone(),
            emotional_state: session.emotional_state,
        };

        let reply = self.provider.generate(&context).await.map_err(|e| {
            tracing::warn!(session_id = %session.id, error = %e, "provider call failed");
            e
        })?;

        let (interest_delta, comfort_delta) =
            signal_to_deltas(&session.emotional_state, reply.disposition);
        session.emotional_state = session
            .emotional_state
            .apply_delta(interest_delta, comfort_delta);
        session.turn_assessments.push(reply.disposition.assessment);

        let text = truncate_chars(reply.reply_text.trim(), PARTNER_REPLY_MAX_LEN);
        session.append_message(Speaker::Partner, text)?;
        session.turn_state = TurnState::AwaitingUser;

        tracing::debug!(
            session_id = %session.id,
            interest = session.emotional_state.interest,
            comfort = session.emotional_state.comfort,
            mood = %session.emotional_state.mood,
            "partner reply applied"
        );
        Ok(())
    }

    /// Transition `AwaitingUser -> Closed`. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::State` if the session is already closed or a
    /// partner reply is still pending.
    pub fn close(&self, session: &mut SimulationSession) -> Result<()> {
        match session.turn_state {
            TurnState::AwaitingUser => {
                session.turn_state = TurnState::Closed;
                session.updated_at = chrono::Utc::now().to_rfc3339();
                tracing::debug!(session_id = %session.id, "session closed");
                Ok(())
            }
            TurnState::AwaitingPartnerReply => Err(KesherError::state(
                "cannot close while a partner reply is pending",
            )),
            TurnState::Closed => Err(KesherError::state("session is already closed")),
        }
    }
}

/// Converts target disposition levels into per-turn deltas.
///
/// The delta is the distance from the current level to the target, clamped
/// to [`TURN_DELTA_BOUND`]. Empathetic messages push targets above the
/// current levels (positive deltas), hostile ones below (negative), neutral
/// ones land near the current levels (deltas near zero).
fn signal_to_deltas(
    current: &crate::emotional_state::EmotionalState,
    signal: crate::provider::DispositionSignal,
) -> (i32, i32) {
    let interest = (signal.interest.min(100) as i32 - current.interest as i32)
        .clamp(-TURN_DELTA_BOUND, TURN_DELTA_BOUND);
    let comfort = (signal.comfort.min(100) as i32 - current.comfort as i32)
        .clamp(-TURN_DELTA_BOUND, TURN_DELTA_BOUND);
    (interest, comfort)
}

/// Truncates on a character boundary; provider output is untrusted and may
/// be arbitrarily long.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotional_state::Mood;
    use crate::provider::{CriterionAssessment, DispositionSignal, GeneratedReply};
    use crate::scenario::ScenarioCatalog;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider stub with a scripted queue of outcomes.
    struct StubProvider {
        outcomes: Mutex<Vec<Result<GeneratedReply>>>,
        calls: Mutex<usize>,
    }

    impl StubProvider {
        fn new(outcomes: Vec<Result<GeneratedReply>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            }
        }

        fn replying(text: &str, interest: u8, comfort: u8) -> Self {
            Self::new(vec![Ok(GeneratedReply {
                reply_text: text.to_string(),
                disposition: DispositionSignal {
                    interest,
                    comfort,
                    assessment: CriterionAssessment::uniform(interest),
                },
            })])
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DialogueProvider for StubProvider {
        async fn generate(&self, _context: &PromptContext) -> Result<GeneratedReply> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn fresh_session() -> SimulationSession {
        let catalog = ScenarioCatalog::builtin();
        SimulationSession::start(catalog.get("first-date-coffee").unwrap())
    }

    #[tokio::test]
    async fn test_full_turn_appends_both_messages() {
        let provider = Arc::new(StubProvider::replying("That's so sweet of you!", 62, 60));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        processor
            .submit_user_message(&mut session, "I'm really glad we could meet today")
            .unwrap();
        assert_eq!(session.turn_state, TurnState::AwaitingPartnerReply);
        assert_eq!(session.messages.len(), 1);
        // State untouched until the reply resolves.
        assert_eq!(session.emotional_state.interest, 50);

        processor.generate_reply(&mut session).await.unwrap();
        assert_eq!(session.turn_state, TurnState::AwaitingUser);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].speaker, Speaker::User);
        assert_eq!(session.messages[1].speaker, Speaker::Partner);
        assert!(session.emotional_state.interest >= 50);
        assert!(session.emotional_state.comfort >= 50);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_side_effects() {
        let provider = Arc::new(StubProvider::new(vec![]));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        let err = processor.submit_user_message(&mut session, "   ").unwrap_err();
        assert!(err.is_validation());
        assert!(session.messages.is_empty());
        assert_eq!(session.turn_state, TurnState::AwaitingUser);
    }

    #[tokio::test]
    async fn test_overlong_message_is_rejected() {
        let provider = Arc::new(StubProvider::new(vec![]));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        let long = "x".repeat(USER_MESSAGE_MAX_LEN + 1);
        let err = processor.submit_user_message(&mut session, &long).unwrap_err();
        assert!(err.is_validation());
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn test_submit_on_closed_session_is_state_error() {
        let provider = Arc::new(StubProvider::new(vec![]));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        processor.close(&mut session).unwrap();
        let err = processor
            .submit_user_message(&mut session, "hello")
            .unwrap_err();
        assert!(err.is_state());
    }

    #[tokio::test]
    async fn test_provider_failure_preserves_user_message_and_state() {
        let provider = Arc::new(StubProvider::new(vec![
            Err(KesherError::upstream("timeout", true)),
            Ok(GeneratedReply {
                reply_text: "Sorry, I spaced out - you were saying?".to_string(),
                disposition: DispositionSignal {
                    interest: 50,
                    comfort: 50,
                    assessment: CriterionAssessment::default(),
                },
            }),
        ]));
        let processor = TurnProcessor::new(provider.clone());
        let mut session = fresh_session();

        processor
            .submit_user_message(&mut session, "Tell me about your week")
            .unwrap();

        let err = processor.generate_reply(&mut session).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.turn_state, TurnState::AwaitingPartnerReply);
        assert_eq!(session.messages.len(), 1);

        // Retrying the reply transition never duplicates the user message.
        processor.generate_reply(&mut session).await.unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.user_turns(), 1);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_delta_is_bounded_per_turn() {
        // Target levels far above the current state: the swing must clamp
        // at the per-turn bound.
        let provider = Arc::new(StubProvider::replying("Wow!!", 100, 100));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        processor.submit_user_message(&mut session, "hey").unwrap();
        processor.generate_reply(&mut session).await.unwrap();

        assert_eq!(session.emotional_state.interest, 50 + TURN_DELTA_BOUND as u8);
        assert_eq!(session.emotional_state.comfort, 50 + TURN_DELTA_BOUND as u8);
    }

    #[tokio::test]
    async fn test_hostile_signal_biases_negative() {
        let provider = Arc::new(StubProvider::replying("Oh. Okay then.", 10, 10));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        processor
            .submit_user_message(&mut session, "whatever, this is boring")
            .unwrap();
        processor.generate_reply(&mut session).await.unwrap();

        assert_eq!(session.emotional_state.interest, 50 - TURN_DELTA_BOUND as u8);
        assert_eq!(session.emotional_state.comfort, 50 - TURN_DELTA_BOUND as u8);
    }

    #[tokio::test]
    async fn test_assessment_is_recorded_per_resolved_reply() {
        let provider = Arc::new(StubProvider::new(vec![
            Err(KesherError::upstream("timeout", true)),
            Ok(GeneratedReply {
                reply_text: "That means a lot, honestly.".to_string(),
                disposition: DispositionSignal {
                    interest: 60,
                    comfort: 60,
                    assessment: CriterionAssessment::uniform(80),
                },
            }),
        ]));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        processor
            .submit_user_message(&mut session, "I'm glad you told me that")
            .unwrap();

        // A failed reply records nothing.
        processor.generate_reply(&mut session).await.unwrap_err();
        assert!(session.turn_assessments.is_empty());

        processor.generate_reply(&mut session).await.unwrap();
        assert_eq!(session.turn_assessments.len(), 1);
        assert_eq!(session.turn_assessments[0].empathy, 80);
    }

    #[tokio::test]
    async fn test_unbounded_reply_text_is_truncated() {
        let giant = "a".repeat(PARTNER_REPLY_MAX_LEN * 3);
        let provider = Arc::new(StubProvider::replying(&giant, 55, 55));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        processor.submit_user_message(&mut session, "hi").unwrap();
        processor.generate_reply(&mut session).await.unwrap();

        assert_eq!(
            session.messages[1].content.chars().count(),
            PARTNER_REPLY_MAX_LEN
        );
    }

    #[tokio::test]
    async fn test_alternation_holds_over_five_turns() {
        let outcomes = (0..5)
            .map(|i| {
                Ok(GeneratedReply {
                    reply_text: format!("reply {}", i),
                    disposition: DispositionSignal {
                        interest: 55,
                        comfort: 55,
                        assessment: CriterionAssessment::default(),
                    },
                })
            })
            .collect();
        let provider = Arc::new(StubProvider::new(outcomes));
        let processor = TurnProcessor::new(provider);
        let mut session = fresh_session();

        for i in 0..5 {
            processor
                .submit_user_message(&mut session, &format!("message {}", i))
                .unwrap();
            processor.generate_reply(&mut session).await.unwrap();
        }

        assert_eq!(session.messages.len(), 10);
        for (i, message) in session.messages.iter().enumerate() {
            let expected = if i % 2 == 0 {
                Speaker::User
            } else {
                Speaker::Partner
            };
            assert_eq!(message.speaker, expected);
        }
        assert_eq!(session.emotional_state.mood, Mood::Neutral);
    }
}
