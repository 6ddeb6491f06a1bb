//! Frame — the wire messages exchanged with fan clients.
//!
//! ARCHITECTURE
//! ============
//! Every WebSocket text message is one JSON frame. Clients send an
//! [`Inbound`] frame (a play to explain, or a chat question with optional
//! game context) and the server answers with exactly one [`Outbound`] frame
//! of type `text`, `explanation`, or `error`.
//!
//! DESIGN
//! ======
//! - The message kind is decided once, in [`Inbound::parse`]. A missing or
//!   unrecognized `type` is chat; only `"explain_play"` selects the
//!   explanation path.
//! - The game context is carried raw so the chat path can report a malformed
//!   snapshot as a chat failure instead of a framing failure.

use serde::{Deserialize, Serialize};

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

/// Error frame content for any inbound frame that cannot be parsed.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid message format";

/// Inbound `type` value that selects the play-explanation path.
pub const EXPLAIN_PLAY_TYPE: &str = "explain_play";

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error logging.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced while parsing an inbound frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The text is not valid JSON or a field has the wrong type.
    #[error("invalid frame: {0}")]
    Invalid(#[from] serde_json::Error),

    /// The JSON value is valid but not an object.
    #[error("frame must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl ErrorCode for FrameError {
    fn error_code(&self) -> &'static str {
        "E_INVALID_FRAME"
    }
}

// =============================================================================
// INBOUND
// =============================================================================

/// A request to explain a single play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    /// Play description as shown to the fan.
    pub content: String,
    /// Optional play classification supplied by the client (logged only).
    pub play_type: Option<String>,
}

/// A free-text fan question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// The question, verbatim.
    pub content: String,
    /// Raw game snapshot. Decoded by the chat path; `None` when absent or null.
    pub game_context: Option<serde_json::Value>,
}

/// A parsed inbound frame. `Chat` is the default variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    ExplainPlay(PlayRequest),
    Chat(ChatRequest),
}

/// Wire shape of an inbound frame before the variant is chosen.
#[derive(Deserialize)]
struct RawInbound {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    play_type: Option<String>,
    #[serde(rename = "gameContext", default)]
    game_context: Option<serde_json::Value>,
}

impl Inbound {
    /// Parse one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] if the text is not a JSON object or a known
    /// field has the wrong type.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(FrameError::NotAnObject(json_kind(&value)));
        }
        let raw: RawInbound = serde_json::from_value(value)?;
        let content = raw.content.unwrap_or_default();

        if raw.kind.as_deref() == Some(EXPLAIN_PLAY_TYPE) {
            return Ok(Self::ExplainPlay(PlayRequest { content, play_type: raw.play_type }));
        }
        Ok(Self::Chat(ChatRequest { content, game_context: raw.game_context }))
    }

    /// Short label used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExplainPlay(_) => EXPLAIN_PLAY_TYPE,
            Self::Chat(_) => "text",
        }
    }
}

/// JSON type name used in error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// A frame sent back to the client: `{"type": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Outbound {
    /// Answer to a chat question.
    Text(String),
    /// Analysis of a single play.
    Explanation(String),
    /// A failure the client should see.
    Error(String),
}

impl Outbound {
    /// The fixed reply to an unparseable inbound frame.
    #[must_use]
    pub fn invalid_format() -> Self {
        Self::Error(INVALID_FORMAT_MESSAGE.into())
    }

    /// Build an error frame from a typed error's description.
    #[must_use]
    pub fn error_from(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self::Error(err.to_string())
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Explanation(_) => "explanation",
            Self::Error(_) => "error",
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Text(c) | Self::Explanation(c) | Self::Error(c) => c,
        }
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
