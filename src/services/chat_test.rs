use super::*;
use crate::state::test_helpers::{Fallback, MockLlm};
use serde_json::json;

fn snapshot() -> serde_json::Value {
    json!({
        "teams": {
            "home": { "team": { "name": "Baltimore Orioles" }, "score": 4 },
            "away": { "team": { "name": "Los Angeles Angels" }, "score": 1 }
        },
        "currentPlay": { "inning": 6, "inningHalf": "bottom", "outs": 1, "balls": 2, "strikes": 2 },
        "plays": [
            { "description": "Anthony Santander homers to right." },
            { "description": "Ryan Mountcastle singles to center." },
            { "description": "Jorge Mateo steals second." },
            { "description": "Colton Cowser flies out." }
        ]
    })
}

fn chat(content: &str, game_context: Option<serde_json::Value>) -> ChatRequest {
    ChatRequest { content: content.into(), game_context }
}

// =========================================================================
// build_chat_prompt
// =========================================================================

#[test]
fn prompt_without_context_uses_defaults() {
    let prompt = build_chat_prompt("what's a balk?", &GameContext::default());
    assert!(prompt.contains("- Home Team: Unknown"));
    assert!(prompt.contains("- Away Team: Unknown"));
    assert!(prompt.contains("- Home Score: 0"));
    assert!(prompt.contains("- Away Score: 0"));
    assert!(prompt.contains("- Inning: 1 top"));
    assert!(prompt.contains("- Outs: 0"));
    assert!(prompt.contains("- Count: 0-0"));
    assert!(prompt.contains("Latest Play: No plays yet"));
    assert!(prompt.contains("Recent Play History:\nNo plays yet\n"));
    assert!(prompt.contains("The fan asks: what's a balk?"));
}

#[test]
fn prompt_interpolates_snapshot() {
    let ctx = GameContext::from_value(Some(snapshot())).unwrap();
    let prompt = build_chat_prompt("what just happened?", &ctx);
    assert!(prompt.contains("- Home Team: Baltimore Orioles"));
    assert!(prompt.contains("- Away Team: Los Angeles Angels"));
    assert!(prompt.contains("- Home Score: 4"));
    assert!(prompt.contains("- Away Score: 1"));
    assert!(prompt.contains("- Inning: 6 bottom"));
    assert!(prompt.contains("- Outs: 1"));
    assert!(prompt.contains("- Count: 2-2"));
    assert!(prompt.contains("Latest Play: Anthony Santander homers to right."));
}

#[test]
fn prompt_accepts_whole_float_scores() {
    let ctx = GameContext::from_value(Some(json!({
        "teams": { "home": { "score": 3.0 }, "away": { "score": 1 } },
        "currentPlay": { "balls": 1.0, "strikes": 2.0 }
    })))
    .unwrap();
    let prompt = build_chat_prompt("who's winning?", &ctx);
    assert!(prompt.contains("- Home Score: 3\n"));
    assert!(prompt.contains("- Away Score: 1\n"));
    assert!(prompt.contains("- Count: 1-2\n"));
}

#[test]
fn prompt_lists_at_most_three_recent_plays() {
    let ctx = GameContext::from_value(Some(snapshot())).unwrap();
    let prompt = build_chat_prompt("recap?", &ctx);
    assert!(prompt.contains(
        "Recent Play History:\n\
         - Anthony Santander homers to right.\n\
         - Ryan Mountcastle singles to center.\n\
         - Jorge Mateo steals second.\n"
    ));
    assert!(!prompt.contains("Colton Cowser"));
}

#[test]
fn prompt_carries_behavioral_instructions_after_question() {
    let prompt = build_chat_prompt("hi!", &GameContext::default());
    let question_at = prompt.find("The fan asks: hi!").unwrap();
    let brief_at = prompt.find("brief 1-2 sentence response").unwrap();
    assert!(brief_at > question_at);
    assert!(prompt.contains("beginner-friendly explanation"));
    assert!(prompt.contains("respond naturally"));
    assert!(prompt.contains("fan-friendly language"));
}

// =========================================================================
// answer_question
// =========================================================================

#[tokio::test]
async fn answer_returns_raw_completion_text() {
    let llm = MockLlm::new(vec![Ok("The Orioles lead 4-1.".into())], Fallback::Fail);
    let answer = answer_question(&llm, chat("score?", Some(snapshot()))).await.unwrap();
    assert_eq!(answer, "The Orioles lead 4-1.");
}

#[tokio::test]
async fn answer_sends_single_turn_with_default_sampling() {
    let llm = MockLlm::echo();
    answer_question(&llm, chat("who's pitching?", None)).await.unwrap();
    answer_question(&llm, chat("and now?", None)).await.unwrap();

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.messages.len(), 1, "chat must not carry history");
        assert!(call.config.is_none());
    }
    assert!(calls[1].messages[0].text.contains("The fan asks: and now?"));
    assert!(!calls[1].messages[0].text.contains("who's pitching?"));
}

#[tokio::test]
async fn answer_without_context_succeeds() {
    let llm = MockLlm::echo();
    let answer = answer_question(&llm, chat("what's an RBI?", None)).await.unwrap();
    assert!(answer.starts_with("echo: "));
    assert!(answer.contains("Home Team: Unknown"));
}

#[tokio::test]
async fn answer_llm_failure_is_described() {
    let llm = MockLlm::failing();
    let err = answer_question(&llm, chat("score?", None)).await.unwrap_err();
    assert!(matches!(err, ChatError::Llm(LlmError::ApiRequest(_))));
    assert!(!err.to_string().is_empty());
    assert_eq!(err.error_code(), "E_API_REQUEST");
    assert!(err.retryable());
}

#[tokio::test]
async fn answer_malformed_context_fails_before_llm_call() {
    let llm = MockLlm::echo();
    let err = answer_question(&llm, chat("score?", Some(json!(["not", "an", "object"]))))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Context(_)));
    assert!(err.to_string().contains("malformed game context"));
    assert_eq!(err.error_code(), "E_INVALID_GAME_CONTEXT");
    assert!(llm.calls().is_empty());
}
