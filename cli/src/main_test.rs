use super::*;
use serde_json::json;

#[test]
fn chat_frame_without_context() {
    assert_eq!(chat_frame("what's a balk?", None), json!({ "type": "text", "content": "what's a balk?" }));
}

#[test]
fn chat_frame_carries_game_context() {
    let context = json!({ "currentPlay": { "inning": 9 } });
    let frame = chat_frame("who's up?", Some(context.clone()));
    assert_eq!(frame["gameContext"], context);
}

#[test]
fn explain_frame_includes_play_type_when_given() {
    assert_eq!(
        explain_frame("Judge homers", Some("home_run")),
        json!({ "type": "explain_play", "content": "Judge homers", "play_type": "home_run" })
    );
    assert!(explain_frame("walk", None).get("play_type").is_none());
}

#[test]
fn reply_content_returns_text_and_explanation() {
    assert_eq!(reply_content(r#"{"type":"text","content":"4-1 O's"}"#).unwrap(), "4-1 O's");
    assert_eq!(reply_content(r#"{"type":"explanation","content":"*Moonshot*"}"#).unwrap(), "*Moonshot*");
}

#[test]
fn reply_content_surfaces_error_frames() {
    let err = reply_content(r#"{"type":"error","content":"Invalid message format"}"#).unwrap_err();
    assert!(matches!(err, CliError::ServerError(ref m) if m == "Invalid message format"));
}

#[test]
fn reply_content_rejects_unknown_shapes() {
    assert!(matches!(reply_content(r#"{"type":"ping"}"#), Err(CliError::UnexpectedReply(_))));
    assert!(matches!(reply_content("nope"), Err(CliError::InvalidJson(_))));
}

#[test]
fn load_context_reports_missing_file() {
    let err = load_context(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, CliError::ReadContext { .. }));
}

#[test]
fn cli_parses_ask_with_defaults() {
    let cli = Cli::try_parse_from(["pitchside-cli", "ask", "score?"]).unwrap();
    assert_eq!(cli.timeout_secs, 30);
    assert!(matches!(cli.command, Command::Ask { ref question, context: None } if question == "score?"));
}

#[test]
fn cli_parses_explain_with_play_type() {
    let cli = Cli::try_parse_from(["pitchside-cli", "--url", "ws://example:1", "explain", "balk", "--play-type", "balk"])
        .unwrap();
    assert_eq!(cli.url, "ws://example:1");
    assert!(matches!(cli.command, Command::Explain { play_type: Some(ref t), .. } if t == "balk"));
}

#[test]
fn send_and_connect_failures_read_differently() {
    use tokio_tungstenite::tungstenite::Error as WsError;

    let send = CliError::WsSend(Box::new(WsError::ConnectionClosed));
    let connect = CliError::WsConnect(Box::new(WsError::ConnectionClosed));
    assert!(send.to_string().starts_with("websocket send failed"));
    assert!(connect.to_string().starts_with("websocket connect failed"));
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = chat_frame("score?", None);
    let err = round_trip(&format!("ws://{addr}"), &request, Duration::from_secs(2)).await.unwrap_err();
    assert!(matches!(err, CliError::WsConnect(_)));
}
