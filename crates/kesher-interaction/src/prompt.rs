//! Prompt construction for generation providers.

use kesher_core::provider::PromptContext;
use kesher_core::session::Speaker;

/// Builds the system prompt that frames the partner's role.
///
/// The prompt carries the four inputs the turn processor guarantees: the
/// scenario context, the conversation goal, the current emotional state, and
/// (separately, as chat turns) the full message history.
pub fn system_prompt(context: &PromptContext) -> String {
    let state = &context.emotional_state;
    format!(
        "You are playing one side of a dating conversation simulation.\n\
         \n\
         Scenario: {}\n\
         The user's goal: {}\n\
         \n\
         Your current disposition toward the user: mood {}, interest {}/100, comfort {}/100. \
         Let that disposition color your reply - warmer and more open the higher the levels, \
         shorter and more guarded the lower.\n\
         \n\
         Reply in character with a natural conversational message, then assess how the user's \
         last message affected your disposition. Respond with ONLY a JSON object of the form:\n\
         {{\"reply\": \"<your in-character reply>\", \"interest\": <0-100>, \"comfort\": <0-100>, \
         \"scores\": {{\"empathy\": <0-100>, \"clarity\": <0-100>, \"respect\": <0-100>, \
         \"engagement\": <0-100>}}}}\n\
         where interest and comfort are the levels you now feel and scores rates the user's \
         last message on each criterion. Raise interest and comfort for empathetic, curious, \
         relevant messages; lower them for dismissive or hostile ones; keep them near the \
         current levels for neutral small talk.",
        context.scenario_context, context.goal, state.mood, state.interest, state.comfort
    )
}

/// Maps a session speaker onto a chat-completion role.
pub fn chat_role(speaker: Speaker) -> &'static str {
    match speaker {
        // The practicing user speaks as the API "user"; the simulated
        // partner's lines are the model's own previous turns.
        Speaker::User => "user",
        Speaker::Partner => "assistant",
    }
}
