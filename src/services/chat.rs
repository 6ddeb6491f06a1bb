//! Chat service — contextual fan Q&A.
//!
//! DESIGN
//! ======
//! Stateless: every question is answered from the snapshot sent with it and
//! nothing else. The snapshot is decoded here so a malformed context fails
//! this one request, and the prompt is a single user turn sent with the
//! service's default sampling.

use std::fmt::Write;

use tracing::debug;

use crate::frame::{ChatRequest, ErrorCode};
use crate::game::{GameContext, GameContextError};
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};

/// Placeholder used for both the latest play and the play history.
pub const NO_PLAYS_YET: &str = "No plays yet";

/// Maximum number of plays listed in the prompt's history section.
pub const RECENT_PLAY_LIMIT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Context(#[from] GameContextError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Context(e) => e.error_code(),
            Self::Llm(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

/// Answer one fan question grounded in the supplied game snapshot.
///
/// # Errors
///
/// Returns [`ChatError::Context`] for a malformed snapshot and
/// [`ChatError::Llm`] if the completion call fails.
pub async fn answer_question(llm: &dyn LlmChat, request: ChatRequest) -> Result<String, ChatError> {
    let context = GameContext::from_value(request.game_context)?;
    debug!(?context, "chat: game context");

    let prompt = build_chat_prompt(&request.content, &context);
    let response = llm.chat(&[Message::user(prompt)], None).await?;
    debug!(model = %response.model, input_tokens = response.input_tokens, output_tokens = response.output_tokens, "chat: completion received");
    Ok(response.text)
}

/// Build the single-turn Q&A prompt from the question and game snapshot.
pub(crate) fn build_chat_prompt(question: &str, context: &GameContext) -> String {
    let home = &context.teams.home;
    let away = &context.teams.away;
    let current = &context.current_play;

    let mut prompt = String::from("You are a knowledgeable baseball expert and commentator.\n\nCurrent game situation:\n");
    let _ = writeln!(prompt, "- Home Team: {}", home.team.name);
    let _ = writeln!(prompt, "- Away Team: {}", away.team.name);
    let _ = writeln!(prompt, "- Home Score: {}", home.score);
    let _ = writeln!(prompt, "- Away Score: {}", away.score);
    let _ = writeln!(prompt, "- Inning: {} {}", current.inning, current.inning_half);
    let _ = writeln!(prompt, "- Outs: {}", current.outs);
    let _ = writeln!(prompt, "- Count: {}-{}", current.balls, current.strikes);

    let latest = context
        .latest_play()
        .map_or(NO_PLAYS_YET, |p| p.description.as_str());
    let _ = writeln!(prompt, "\nLatest Play: {latest}");

    prompt.push_str("\nRecent Play History:\n");
    if context.plays.is_empty() {
        let _ = writeln!(prompt, "{NO_PLAYS_YET}");
    } else {
        for play in context.recent_plays(RECENT_PLAY_LIMIT) {
            let _ = writeln!(prompt, "- {}", play.description);
        }
    }

    let _ = writeln!(prompt, "\nThe fan asks: {question}");
    prompt.push_str(
        "\nIf the fan is asking what just happened or about the current game situation, give a brief 1-2 sentence response.\n\
         If the fan is asking to explain a baseball concept or term, provide a beginner-friendly explanation with examples.\n\
         For casual conversation, respond naturally.\n\
         Always use fan-friendly language.\n",
    );
    prompt
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
