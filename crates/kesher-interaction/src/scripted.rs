//! Deterministic scripted provider.
//!
//! Plays the partner without any backend: a keyword read of the user's last
//! message decides how the disposition shifts and which canned reply comes
//! back. The same context always produces the same result, which makes this
//! the provider of choice for tests and offline demos.

use async_trait::async_trait;
use kesher_core::error::{KesherError, Result};
use kesher_core::provider::{
    CriterionAssessment, DialogueProvider, DispositionSignal, GeneratedReply, PromptContext,
};
use kesher_core::session::Speaker;

/// How far a clearly warm or hostile message moves the target levels.
const SHIFT: i32 = 12;
/// Drift applied to neutral small talk. Slightly positive: showing up and
/// talking at all beats silence.
const NEUTRAL_DRIFT: i32 = 2;

const WARM_MARKERS: [&str; 8] = [
    "glad",
    "thank",
    "i understand",
    "that sounds",
    "how do you feel",
    "i'm sorry",
    "i can imagine",
    "?",
];

const HOSTILE_MARKERS: [&str; 6] = [
    "whatever",
    "boring",
    "stupid",
    "shut up",
    "don't care",
    "waste of time",
];

/// A provider that simulates the partner with fixed rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedProvider;

impl ScriptedProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DialogueProvider for ScriptedProvider {
    async fn generate(&self, context: &PromptContext) -> Result<GeneratedReply> {
        let last_user = context
            .messages
            .iter()
            .rev()
            .find(|m| m.speaker == Speaker::User)
            .ok_or_else(|| {
                KesherError::upstream("no user message to reply to in prompt context", false)
            })?;

        let lower = last_user.content.to_lowercase();
        let (shift, reply_text, assessment) = if HOSTILE_MARKERS.iter().any(|m| lower.contains(m))
        {
            (
                -SHIFT,
                "Oh. Okay, I guess.".to_string(),
                CriterionAssessment {
                    empathy: 15,
                    clarity: 40,
                    respect: 10,
                    engagement: 15,
                },
            )
        } else if WARM_MARKERS.iter().any(|m| lower.contains(m)) {
            (
                SHIFT,
                "That's really nice to hear! Tell me more about that.".to_string(),
                CriterionAssessment {
                    empathy: 80,
                    clarity: 70,
                    respect: 85,
                    engagement: if lower.contains('?') { 85 } else { 70 },
                },
            )
        } else {
            (
                NEUTRAL_DRIFT,
                "Mm, fair enough. So what else has been going on?".to_string(),
                CriterionAssessment::default(),
            )
        };

        let state = &context.emotional_state;
        Ok(GeneratedReply {
            reply_text,
            disposition: DispositionSignal {
                interest: (state.interest as i32 + shift).clamp(0, 100) as u8,
                comfort: (state.comfort as i32 + shift).clamp(0, 100) as u8,
                assessment,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kesher_core::emotional_state::EmotionalState;
    use kesher_core::session::Message;

    fn context_with(user_text: &str) -> PromptContext {
        PromptContext {
            scenario_context: "first date coffee".to_string(),
            goal: "build rapport".to_string(),
            messages: vec![Message {
                speaker: Speaker::User,
                content: user_text.to_string(),
                timestamp: "2025-01-01T00:00:00Z".to_string(),
            }],
            emotional_state: EmotionalState::initial(),
        }
    }

    #[tokio::test]
    async fn test_warm_message_raises_targets() {
        let reply = ScriptedProvider::new()
            .generate(&context_with("I'm really glad we could meet today"))
            .await
            .unwrap();
        assert!(reply.disposition.interest > 50);
        assert!(reply.disposition.comfort > 50);
    }

    #[tokio::test]
    async fn test_hostile_message_lowers_targets() {
        let reply = ScriptedProvider::new()
            .generate(&context_with("whatever, this is boring"))
            .await
            .unwrap();
        assert!(reply.disposition.interest < 50);
        assert!(reply.disposition.comfort < 50);
    }

    #[tokio::test]
    async fn test_assessment_tracks_message_tone() {
        let provider = ScriptedProvider::new();
        let warm = provider
            .generate(&context_with("I'm really glad we could meet today"))
            .await
            .unwrap();
        let hostile = provider
            .generate(&context_with("whatever, this is boring"))
            .await
            .unwrap();

        assert!(warm.disposition.assessment.empathy > hostile.disposition.assessment.empathy);
        assert!(warm.disposition.assessment.respect > hostile.disposition.assessment.respect);
    }

    #[tokio::test]
    async fn test_neutral_message_drifts_gently() {
        let reply = ScriptedProvider::new()
            .generate(&context_with("the weather has been okay lately"))
            .await
            .unwrap();
        assert_eq!(reply.disposition.interest, 52);
        assert_eq!(reply.disposition.comfort, 52);
    }

    #[tokio::test]
    async fn test_missing_user_message_is_upstream_error() {
        let mut context = context_with("hi");
        context.messages.clear();
        let err = ScriptedProvider::new().generate(&context).await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = ScriptedProvider::new();
        let context = context_with("thanks for coming out tonight");
        let first = provider.generate(&context).await.unwrap();
        let second = provider.generate(&context).await.unwrap();
        assert_eq!(first, second);
    }
}
