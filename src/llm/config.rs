//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_VERTEX_REGION: &str = "us-central1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Env vars checked, in order, for the API credential.
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Which Gemini endpoint family serves requests, with its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiBackend {
    /// Generative Language API, key sent as `x-goog-api-key`.
    GenerativeLanguage { base_url: String, api_key: String },
    /// Vertex AI, OAuth access token sent as a bearer token.
    VertexAi { project: String, region: String, access_token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub backend: GeminiBackend,
    pub model: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - `GOOGLE_API_KEY` (or `GEMINI_API_KEY`), unless Vertex AI is selected
    ///
    /// Optional:
    /// - `GEMINI_MODEL`: default `gemini-pro`
    /// - `GEMINI_BASE_URL`: Generative Language API base URL
    /// - `GOOGLE_CLOUD_PROJECT` + `GOOGLE_ACCESS_TOKEN`: switch to Vertex AI
    ///   when both are set. A project alone keeps the API-key backend.
    /// - `GOOGLE_CLOUD_REGION`: Vertex AI region, default `us-central1`
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] if no credential is set, or
    /// [`LlmError::ConfigParse`] if a timeout is zero.
    pub fn from_env() -> Result<Self, LlmError> {
        let model = env_non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let vertex = env_non_empty("GOOGLE_CLOUD_PROJECT").zip(env_non_empty("GOOGLE_ACCESS_TOKEN"));
        let backend = match vertex {
            Some((project, access_token)) => GeminiBackend::VertexAi {
                project,
                region: env_non_empty("GOOGLE_CLOUD_REGION").unwrap_or_else(|| DEFAULT_VERTEX_REGION.to_string()),
                access_token,
            },
            None => GeminiBackend::GenerativeLanguage {
                base_url: env_non_empty("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_key: API_KEY_VARS
                    .iter()
                    .find_map(|var| env_non_empty(var))
                    .ok_or_else(|| LlmError::MissingApiKey { var: API_KEY_VARS.join(" or ") })?,
            },
        };
        let timeouts = LlmTimeouts {
            request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };
        if timeouts.request_secs == 0 || timeouts.connect_secs == 0 {
            return Err(LlmError::ConfigParse("LLM timeouts must be greater than zero".into()));
        }

        Ok(Self { backend, model, timeouts })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
