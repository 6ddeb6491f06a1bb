//! Session service — one fan connection's state.
//!
//! DESIGN
//! ======
//! A `Session` is created per WebSocket after a liveness probe against the
//! completion service succeeds, and lives on that connection's task. It owns
//! the play-explanation conversation outright, so concurrent connections
//! never see each other's history and no locking is involved. Dropping the
//! session (disconnect, error) discards the conversation.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::chat::{self, ChatError};
use super::explain::{ExplainError, PlayExplainer};
use crate::frame::{ChatRequest, ErrorCode, PlayRequest};
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};

/// Fixed trivial prompt used to check the completion service on connect.
pub const PROBE_PROMPT: &str = "test";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("completion service not configured")]
    NotConfigured,
    #[error("liveness probe failed: {0}")]
    Probe(#[from] LlmError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Probe(_) => "E_PROBE_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Probe(e) if e.retryable())
    }
}

pub struct Session {
    id: Uuid,
    llm: Arc<dyn LlmChat>,
    explainer: PlayExplainer,
}

impl Session {
    /// Probe the completion service and open a session on success.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConfigured`] when no client is available and
    /// [`SessionError::Probe`] when the probe call fails.
    pub async fn open(llm: Option<Arc<dyn LlmChat>>) -> Result<Self, SessionError> {
        let llm = llm.ok_or(SessionError::NotConfigured)?;
        let id = Uuid::new_v4();

        let probe = llm.chat(&[Message::user(PROBE_PROMPT)], None).await?;
        debug!(session_id = %id, model = %probe.model, "session: liveness probe ok");

        info!(session_id = %id, "session: opened");
        Ok(Self { id, llm, explainer: PlayExplainer::new() })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn explainer(&self) -> &PlayExplainer {
        &self.explainer
    }

    /// Explain a play within this session's conversation.
    ///
    /// # Errors
    ///
    /// Propagates [`ExplainError`]; the caller decides how to present it.
    pub async fn explain_play(&mut self, request: &PlayRequest) -> Result<String, ExplainError> {
        debug!(session_id = %self.id, play_type = ?request.play_type, "session: explain play");
        self.explainer.explain(self.llm.as_ref(), &request.content).await
    }

    /// Answer a fan question from its own snapshot. Touches no session state.
    ///
    /// # Errors
    ///
    /// Propagates [`ChatError`].
    pub async fn answer(&self, request: ChatRequest) -> Result<String, ChatError> {
        chat::answer_question(self.llm.as_ref(), request).await
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
