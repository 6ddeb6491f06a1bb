//! Game context — the caller-supplied snapshot used to ground chat prompts.
//!
//! DESIGN
//! ======
//! The snapshot mirrors the MLB live-feed shape the client already holds.
//! Every field is optional on the wire and falls back to a documented
//! default, so a chat message without context still produces a prompt.
//! Fields that are present but malformed (a string score, a play without a
//! description) are rejected rather than guessed. Counts accept any JSON
//! number, since clients may send `3.0` where they mean `3`.

use std::fmt;

use serde::Deserialize;

pub const UNKNOWN_TEAM: &str = "Unknown";
pub const DEFAULT_INNING: u32 = 1;
pub const DEFAULT_INNING_HALF: &str = "top";

/// Errors produced while decoding a game snapshot.
#[derive(Debug, thiserror::Error)]
pub enum GameContextError {
    #[error("malformed game context: expected an object, got {0}")]
    NotAnObject(&'static str),

    #[error("malformed game context: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl crate::frame::ErrorCode for GameContextError {
    fn error_code(&self) -> &'static str {
        "E_INVALID_GAME_CONTEXT"
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time game state supplied with a chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameContext {
    pub teams: Teams,
    #[serde(rename = "currentPlay")]
    pub current_play: CurrentPlay,
    /// Recent plays, most recent first.
    pub plays: Vec<Play>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Teams {
    pub home: TeamSide,
    pub away: TeamSide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeamSide {
    pub team: TeamInfo,
    pub score: Tally,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeamInfo {
    pub name: String,
}

impl Default for TeamInfo {
    fn default() -> Self {
        Self { name: UNKNOWN_TEAM.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentPlay {
    pub inning: Tally,
    pub inning_half: String,
    pub outs: Tally,
    pub balls: Tally,
    pub strikes: Tally,
}

impl Default for CurrentPlay {
    fn default() -> Self {
        Self {
            inning: DEFAULT_INNING.into(),
            inning_half: DEFAULT_INNING_HALF.into(),
            outs: Tally::default(),
            balls: Tally::default(),
            strikes: Tally::default(),
        }
    }
}

/// A score or count exactly as the client sent it.
///
/// Whole-valued floats render without the fractional part (`3.0` → `3`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Tally(serde_json::Number);

impl Default for Tally {
    fn default() -> Self {
        Self(0u32.into())
    }
}

impl From<u32> for Tally {
    fn from(n: u32) -> Self {
        Self(n.into())
    }
}

impl PartialEq<u32> for Tally {
    fn eq(&self, other: &u32) -> bool {
        self.0.as_u64() == Some(u64::from(*other))
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self
            .0
            .as_f64()
            .filter(|v| self.0.is_f64() && v.fract().abs() < f64::EPSILON && v.abs() < 1e15);
        match whole {
            Some(v) => write!(f, "{v:.0}"),
            None => write!(f, "{}", self.0),
        }
    }
}

/// One entry of the play-by-play list. `description` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Play {
    pub description: String,
}

impl GameContext {
    /// Decode an optional raw snapshot. `None` yields the all-defaults context.
    ///
    /// # Errors
    ///
    /// Returns [`GameContextError`] if the value is not an object or a
    /// present field has the wrong shape.
    pub fn from_value(raw: Option<serde_json::Value>) -> Result<Self, GameContextError> {
        let Some(value) = raw else {
            return Ok(Self::default());
        };
        if !value.is_object() {
            return Err(GameContextError::NotAnObject(crate::frame::json_kind(&value)));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The most recent play, if any.
    #[must_use]
    pub fn latest_play(&self) -> Option<&Play> {
        self.plays.first()
    }

    /// Up to `n` most recent plays, newest first.
    pub fn recent_plays(&self, n: usize) -> impl Iterator<Item = &Play> {
        self.plays.iter().take(n)
    }
}

#[cfg(test)]
#[path = "game_test.rs"]
mod tests;
