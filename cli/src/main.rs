use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket send failed: {0}")]
    WsSend(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket receive failed: {0}")]
    WsRecv(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed before a reply arrived")]
    WsClosed,
    #[error("timed out waiting for a reply")]
    Timeout,
    #[error("server returned error: {0}")]
    ServerError(String),
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
    #[error("failed to read {path}: {source}")]
    ReadContext { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pitchside-cli", about = "Ask baseball questions over the Pitchside websocket")]
struct Cli {
    #[arg(long, env = "PITCHSIDE_URL", default_value = "ws://127.0.0.1:8765")]
    url: String,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a question, optionally grounded in a game snapshot.
    Ask {
        question: String,
        #[arg(long, help = "Path to a JSON game snapshot")]
        context: Option<PathBuf>,
    },
    /// Ask for an analysis of one play.
    Explain {
        play: String,
        #[arg(long)]
        play_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let request = match cli.command {
        Command::Ask { question, context } => {
            let context = context.as_deref().map(load_context).transpose()?;
            chat_frame(&question, context)
        }
        Command::Explain { play, play_type } => explain_frame(&play, play_type.as_deref()),
    };

    let reply = round_trip(&cli.url, &request, Duration::from_secs(cli.timeout_secs)).await?;
    println!("{reply}");
    Ok(())
}

/// Send one request frame and wait for its reply content.
async fn round_trip(url: &str, request: &Value, timeout: Duration) -> Result<String, CliError> {
    let (mut stream, _) = connect_async(url)
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;

    stream
        .send(Message::text(request.to_string()))
        .await
        .map_err(|error| CliError::WsSend(Box::new(error)))?;

    let text = recv_text(&mut stream, timeout).await?;
    let _ = stream.close(None).await;
    reply_content(&text)
}

async fn recv_text(stream: &mut WsStream, timeout: Duration) -> Result<String, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message.map_err(|error| CliError::WsRecv(Box::new(error)))? {
                Message::Text(text) => return Ok(text.as_str().to_owned()),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CliError::Timeout)?
}

fn chat_frame(question: &str, context: Option<Value>) -> Value {
    let mut frame = Map::new();
    frame.insert("type".to_owned(), Value::String("text".to_owned()));
    frame.insert("content".to_owned(), Value::String(question.to_owned()));
    if let Some(context) = context {
        frame.insert("gameContext".to_owned(), context);
    }
    Value::Object(frame)
}

fn explain_frame(play: &str, play_type: Option<&str>) -> Value {
    let mut frame = Map::new();
    frame.insert("type".to_owned(), Value::String("explain_play".to_owned()));
    frame.insert("content".to_owned(), Value::String(play.to_owned()));
    if let Some(play_type) = play_type {
        frame.insert("play_type".to_owned(), Value::String(play_type.to_owned()));
    }
    Value::Object(frame)
}

fn load_context(path: &Path) -> Result<Value, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::ReadContext { path: path.to_owned(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Extract the content of a reply frame, turning `error` frames into errors.
fn reply_content(text: &str) -> Result<String, CliError> {
    let value = serde_json::from_str::<Value>(text)?;
    let kind = value.get("type").and_then(Value::as_str);
    let content = value.get("content").and_then(Value::as_str);

    match (kind, content) {
        (Some("error"), Some(message)) => Err(CliError::ServerError(message.to_owned())),
        (Some("text" | "explanation"), Some(content)) => Ok(content.to_owned()),
        _ => Err(CliError::UnexpectedReply(text.to_owned())),
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
