//! Explain service — per-session play analysis conversation.
//!
//! DESIGN
//! ======
//! A `PlayExplainer` is owned by exactly one session. Its conversation is
//! opened lazily on the first request, seeded with a fixed persona exchange,
//! and then grows by one user/model pair per successful explanation. A
//! failed call leaves the history untouched. The explainer never returns to
//! `Uninitialized`.
//!
//! Failures are returned as `ExplainError`. The fan-facing fallback text is
//! substituted by the WebSocket handler, not here.

use tracing::debug;

use crate::frame::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{GenerationConfig, LlmError, Message};

/// Explanation content sent to the fan when analysis fails.
pub const FALLBACK_EXPLANATION: &str = "AI analysis unavailable at this time.";

pub const PERSONA_PREAMBLE: &str = "You are BaseballGPT, a friendly AI analyst who explains live baseball plays to fans. \
     Your responses should start with a brief title in italics (e.g. *Strategic Move*) followed by 2-3 sentences. \
     Focus on strategy, player tendencies, and game impact. \
     Use natural, engaging language and avoid heavy jargon.";

pub const PERSONA_ACK: &str =
    "I'll provide friendly baseball analysis with strategic insights and game context, starting with an italic title.";

/// Fixed sampling for play analysis: short, varied, single candidate.
pub const EXPLANATION_CONFIG: GenerationConfig = GenerationConfig {
    max_output_tokens: Some(75),
    temperature: Some(0.8),
    top_p: Some(0.9),
    candidate_count: Some(1),
};

#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl ErrorCode for ExplainError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Llm(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
        }
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Multi-turn history sent with every explanation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    history: Vec<Message>,
}

impl Conversation {
    fn seeded() -> Self {
        Self { history: vec![Message::user(PERSONA_PREAMBLE), Message::model(PERSONA_ACK)] }
    }

    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

/// Session-owned play explainer. `Uninitialized → Active`, never back.
///
/// `conversation` is `None` while uninitialized.
#[derive(Debug, Default)]
pub struct PlayExplainer {
    conversation: Option<Conversation>,
}

impl PlayExplainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.conversation.is_some()
    }

    /// The live conversation, once the first explanation has been requested.
    #[must_use]
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// Explain one play, continuing this session's conversation.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Llm`] if the completion call fails.
    pub async fn explain(&mut self, llm: &dyn LlmChat, play: &str) -> Result<String, ExplainError> {
        let conversation = self.activate();
        conversation.history.push(Message::user(analysis_prompt(play)));

        match llm.chat(&conversation.history, Some(&EXPLANATION_CONFIG)).await {
            Ok(response) => {
                debug!(turns = conversation.history.len(), output_tokens = response.output_tokens, "explain: analysis received");
                conversation.history.push(Message::model(response.text.clone()));
                Ok(response.text)
            }
            Err(e) => {
                conversation.history.pop();
                Err(e.into())
            }
        }
    }

    fn activate(&mut self) -> &mut Conversation {
        self.conversation.get_or_insert_with(|| {
            debug!("explain: opening conversation");
            Conversation::seeded()
        })
    }
}

fn analysis_prompt(play: &str) -> String {
    format!("Analyze this play (start with italic title, then 2-3 sentences): {play}")
}

#[cfg(test)]
#[path = "explain_test.rs"]
mod tests;
