//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper over the Generative Language and Vertex AI endpoints,
//! which share one request/response schema. Pure request building and
//! response parsing for testability.

use std::time::Duration;

use super::config::{GeminiBackend, LlmConfig};
use super::types::{ChatResponse, GenerationConfig, LlmError, Message, Role};

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    backend: GeminiBackend,
}

impl GeminiClient {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, backend: config.backend.clone() })
    }

    pub async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        config: Option<&GenerationConfig>,
    ) -> Result<ChatResponse, LlmError> {
        let response = self
            .http_request(model, messages, config)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text, model)
    }

    /// Authenticated POST for one generate call.
    fn http_request(&self, model: &str, messages: &[Message], config: Option<&GenerationConfig>) -> reqwest::RequestBuilder {
        let request = self
            .http
            .post(endpoint_url(&self.backend, model))
            .json(&build_request(messages, config));
        match &self.backend {
            GeminiBackend::GenerativeLanguage { api_key, .. } => request.header("x-goog-api-key", api_key),
            GeminiBackend::VertexAi { access_token, .. } => request.bearer_auth(access_token),
        }
    }
}

fn endpoint_url(backend: &GeminiBackend, model: &str) -> String {
    match backend {
        GeminiBackend::GenerativeLanguage { base_url, .. } => format!("{base_url}/models/{model}:generateContent"),
        GeminiBackend::VertexAi { project, region, .. } => format!(
            "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/publishers/google/models/{model}:generateContent"
        ),
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, serde::Serialize)]
struct ApiContent<'a> {
    role: Role,
    parts: Vec<ApiTextPart<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct ApiTextPart<'a> {
    text: &'a str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<u32>,
}

impl From<&GenerationConfig> for ApiGenerationConfig {
    fn from(c: &GenerationConfig) -> Self {
        Self {
            max_output_tokens: c.max_output_tokens,
            temperature: c.temperature,
            top_p: c.top_p,
            candidate_count: c.candidate_count,
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Only text parts are read; other part kinds deserialize with `text: None`.
#[derive(serde::Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

// =============================================================================
// REQUEST / PARSING
// =============================================================================

fn build_request<'a>(messages: &'a [Message], config: Option<&GenerationConfig>) -> ApiRequest<'a> {
    let contents = messages
        .iter()
        .map(|m| ApiContent { role: m.role, parts: vec![ApiTextPart { text: &m.text }] })
        .collect();
    ApiRequest { contents, generation_config: config.map(ApiGenerationConfig::from) }
}

fn parse_response(json: &str, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(candidate) = api.candidates.into_iter().next() else {
        let reason = api
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map_or_else(|| "no candidates returned".to_string(), |r| format!("prompt blocked: {r}"));
        return Err(LlmError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
        return Err(LlmError::EmptyResponse(format!("no text in candidate (finish reason {reason})")));
    }

    let (input_tokens, output_tokens) = api
        .usage_metadata
        .map_or((0, 0), |u| (u.prompt_token_count, u.candidates_token_count));

    Ok(ChatResponse {
        text,
        model: api.model_version.unwrap_or_else(|| requested_model.to_string()),
        finish_reason: candidate.finish_reason,
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
