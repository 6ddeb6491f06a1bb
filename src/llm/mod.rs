//! LLM — completion-service adapter for fan chat and play analysis.
//!
//! DESIGN
//! ======
//! Configured from environment variables. `LlmClient` pairs the Gemini HTTP
//! client with the configured model and implements [`LlmChat`], which is
//! the only surface the rest of the crate sees. Tests substitute mocks.

pub mod config;
pub mod gemini;
pub mod types;

use config::{GeminiBackend, LlmConfig};
pub use types::LlmChat;
use types::{ChatResponse, GenerationConfig, LlmError, Message};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by Gemini.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
    backend_name: &'static str,
}

impl LlmClient {
    /// Build an LLM client from environment variables. See [`LlmConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(&config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let backend_name = match config.backend {
            GeminiBackend::GenerativeLanguage { .. } => "generative-language",
            GeminiBackend::VertexAi { .. } => "vertex-ai",
        };
        Ok(Self { inner: gemini::GeminiClient::new(config)?, model: config.model.clone(), backend_name })
    }

    /// Return the configured model name (e.g. `"gemini-pro"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Return the backend label used in logs.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend_name
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, messages: &[Message], config: Option<&GenerationConfig>) -> Result<ChatResponse, LlmError> {
        self.inner.generate(&self.model, messages, config).await
    }
}
