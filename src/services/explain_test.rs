use super::*;
use crate::llm::types::Role;
use crate::state::test_helpers::{Fallback, MockLlm};

fn preamble_count(messages: &[Message]) -> usize {
    messages.iter().filter(|m| m.text == PERSONA_PREAMBLE).count()
}

#[test]
fn new_explainer_is_uninitialized() {
    let explainer = PlayExplainer::new();
    assert!(!explainer.is_active());
    assert!(explainer.conversation().is_none());
}

#[tokio::test]
async fn first_call_seeds_persona_and_activates() {
    let llm = MockLlm::new(vec![Ok("*Moonshot* Judge clears the wall.".into())], Fallback::Fail);
    let mut explainer = PlayExplainer::new();

    let text = explainer.explain(&llm, "Aaron Judge homers to left").await.unwrap();
    assert_eq!(text, "*Moonshot* Judge clears the wall.");
    assert!(explainer.is_active());

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    let sent = &calls[0].messages;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], Message::user(PERSONA_PREAMBLE));
    assert_eq!(sent[1], Message::model(PERSONA_ACK));
    assert_eq!(
        sent[2].text,
        "Analyze this play (start with italic title, then 2-3 sentences): Aaron Judge homers to left"
    );
    assert_eq!(sent[2].role, Role::User);
}

#[tokio::test]
async fn uses_fixed_sampling() {
    let llm = MockLlm::echo();
    let mut explainer = PlayExplainer::new();
    explainer.explain(&llm, "strikeout looking").await.unwrap();

    let config = llm.calls()[0].config.expect("explanation config should be sent");
    assert_eq!(config.max_output_tokens, Some(75));
    assert_eq!(config.top_p, Some(0.9));
    assert_eq!(config.temperature, Some(0.8));
    assert_eq!(config.candidate_count, Some(1));
}

#[tokio::test]
async fn conversation_is_seeded_exactly_once() {
    let llm = MockLlm::echo();
    let mut explainer = PlayExplainer::new();

    for play in ["single to center", "stolen base", "double play"] {
        explainer.explain(&llm, play).await.unwrap();
        assert!(explainer.is_active());
    }

    let calls = llm.calls();
    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert_eq!(preamble_count(&call.messages), 1);
        assert_eq!(call.messages[0].text, PERSONA_PREAMBLE);
    }
    // Seed pair + one user/model pair per play.
    assert_eq!(explainer.conversation().unwrap().history().len(), 2 + 2 * 3);
}

#[tokio::test]
async fn later_calls_send_prior_turns_and_only_the_new_play() {
    let llm = MockLlm::echo();
    let mut explainer = PlayExplainer::new();
    explainer.explain(&llm, "walk").await.unwrap();
    explainer.explain(&llm, "wild pitch").await.unwrap();

    let calls = llm.calls();
    let second = &calls[1].messages;
    assert_eq!(second.len(), 5);
    assert_eq!(second[3].role, Role::Model);
    assert!(second[3].text.contains("walk"));
    assert!(second[4].text.ends_with(": wild pitch"));
}

#[tokio::test]
async fn failure_keeps_history_and_stays_active() {
    let llm = MockLlm::new(
        vec![Ok("*Free Pass* Four wide ones.".into()), Err(LlmError::ApiResponse { status: 503, body: String::new() })],
        Fallback::Echo,
    );
    let mut explainer = PlayExplainer::new();
    explainer.explain(&llm, "walk").await.unwrap();
    let before = explainer.conversation().unwrap().clone();

    let err = explainer.explain(&llm, "balk").await.unwrap_err();
    assert!(matches!(err, ExplainError::Llm(LlmError::ApiResponse { status: 503, .. })));
    assert!(err.retryable());
    assert!(explainer.is_active());
    assert_eq!(explainer.conversation().unwrap(), &before);

    // The next request continues from the last successful turn.
    explainer.explain(&llm, "pickoff").await.unwrap();
    let calls = llm.calls();
    let third = &calls[2].messages;
    assert_eq!(third.len(), 5);
    assert!(!third.iter().any(|m| m.text.contains("balk")));
}

#[tokio::test]
async fn failure_on_first_call_still_activates_once() {
    let llm = MockLlm::new(vec![Err(LlmError::ApiRequest("timeout".into()))], Fallback::Echo);
    let mut explainer = PlayExplainer::new();

    assert!(explainer.explain(&llm, "sac fly").await.is_err());
    assert!(explainer.is_active());
    assert_eq!(explainer.conversation().unwrap().history().len(), 2);

    explainer.explain(&llm, "sac fly").await.unwrap();
    assert_eq!(preamble_count(&llm.calls()[1].messages), 1);
}

#[tokio::test]
async fn separate_explainers_do_not_share_history() {
    let llm = MockLlm::echo();
    let mut a = PlayExplainer::new();
    let mut b = PlayExplainer::new();

    a.explain(&llm, "A: grand slam").await.unwrap();
    b.explain(&llm, "B: triple play").await.unwrap();
    a.explain(&llm, "A: intentional walk").await.unwrap();

    let a_history = a.conversation().unwrap().history();
    let b_history = b.conversation().unwrap().history();
    assert!(a_history.iter().all(|m| !m.text.contains("B:")));
    assert!(b_history.iter().all(|m| !m.text.contains("A:")));
    assert_eq!(a_history.len(), 6);
    assert_eq!(b_history.len(), 4);
}
