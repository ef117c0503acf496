//! Operator CLI for the decopad relay.
//!
//! Talks the same wire as the director and controller surfaces: HTTP for
//! the health probe, JSON text frames over WebSocket for everything else.
//! Useful for poking at a live session without either surface running.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use futures_util::{SinkExt, StreamExt};
use protocol::{
    Command, DecoId, Direction, MultiAction, OneAction, PcState, SessionId, StoreEvent,
    StoreRequest,
};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

const ECHO_TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid session id: {0}")]
    InvalidSession(#[from] protocol::ProtocolError),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("websocket error: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for the relay's echo")]
    Timeout,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "decopad-cli", about = "decopad relay operator CLI")]
struct Cli {
    #[arg(long, env = "DECOPAD_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Check relay liveness via /healthz.
    Ping,
    /// Subscribe to a session and print every store event.
    Watch { session: String },
    /// Publish a pcState snapshot (JSON) into a session.
    Publish {
        session: String,
        /// Full pcState JSON, e.g. '{"scene":0,"decoList":[],"selectedIds":[]}'.
        #[arg(long)]
        data: String,
    },
    /// Replace the selection; no ids clears it.
    Select {
        session: String,
        ids: Vec<String>,
    },
    /// Move one selected item to a controller-space position.
    MoveOne {
        session: String,
        id: String,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
    /// Fixed-step nudge/rotate/scale of the whole selection.
    Nudge {
        session: String,
        #[arg(value_enum)]
        action: NudgeAction,
        #[arg(value_enum)]
        direction: NudgeDirection,
    },
    /// Delete every selected item.
    Delete { session: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NudgeAction {
    Move,
    Rotate,
    Scale,
}

impl From<NudgeAction> for MultiAction {
    fn from(action: NudgeAction) -> Self {
        match action {
            NudgeAction::Move => Self::Move,
            NudgeAction::Rotate => Self::Rotate,
            NudgeAction::Scale => Self::Scale,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NudgeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl From<NudgeDirection> for Direction {
    fn from(direction: NudgeDirection) -> Self {
        match direction {
            NudgeDirection::Up => Self::Up,
            NudgeDirection::Down => Self::Down,
            NudgeDirection::Left => Self::Left,
            NudgeDirection::Right => Self::Right,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url.trim_end_matches('/').to_owned();

    match cli.command {
        CliCommand::Ping => run_ping(&base_url).await,
        CliCommand::Watch { session } => run_watch(&base_url, &session).await,
        CliCommand::Publish { session, data } => {
            let pc_state: PcState = serde_json::from_str(&data)?;
            run_send(&base_url, &session, StoreRequest::PublishSnapshot { pc_state }).await
        }
        CliCommand::Select { session, ids } => {
            let ids = ids.into_iter().map(DecoId::new).collect();
            run_command(&base_url, &session, Command::SelectMulti { ids }).await
        }
        CliCommand::MoveOne { session, id, x, y } => {
            let command = Command::ControlOne {
                id: DecoId::new(id),
                action: OneAction::Move,
                x_mobile: x,
                y_mobile: y,
            };
            run_command(&base_url, &session, command).await
        }
        CliCommand::Nudge { session, action, direction } => {
            let command = Command::ControlMulti {
                action: action.into(),
                direction: direction.into(),
            };
            run_command(&base_url, &session, command).await
        }
        CliCommand::Delete { session } => {
            run_command(&base_url, &session, Command::DeleteMulti).await
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let response = client.get(format!("{base_url}/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_watch(base_url: &str, session: &str) -> Result<(), CliError> {
    let mut stream = connect(base_url, session).await?;
    loop {
        match next_event(&mut stream).await {
            Ok(event) => print_event(&event)?,
            Err(CliError::WsClosed) => {
                print_event(&StoreEvent::Disconnected)?;
                return Ok(());
            }
            Err(error) => return Err(error),
        }
    }
}

async fn run_command(base_url: &str, session: &str, command: Command) -> Result<(), CliError> {
    run_send(base_url, session, StoreRequest::SendCommand { command }).await
}

/// Send one request, wait for its echoed `changed` event, print the doc.
async fn run_send(base_url: &str, session: &str, request: StoreRequest) -> Result<(), CliError> {
    let mut stream = connect(base_url, session).await?;

    // Skip the resume event so the next `changed` is our own write.
    let _resume = next_event_timeout(&mut stream).await?;

    let json = serde_json::to_string(&request)?;
    stream.send(Message::Text(json.into())).await?;

    let echo = next_event_timeout(&mut stream).await?;
    print_event(&echo)?;
    stream.close(None).await?;
    Ok(())
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

async fn connect(base_url: &str, session: &str) -> Result<WsStream, CliError> {
    let session: SessionId = session.parse()?;
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(CliError::InvalidBaseUrl(base_url.to_owned()));
    };

    let (stream, _) = connect_async(format!("{ws_base}/ws?session={session}")).await?;
    Ok(stream)
}

async fn next_event(stream: &mut WsStream) -> Result<StoreEvent, CliError> {
    loop {
        let Some(msg) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match msg? {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
}

async fn next_event_timeout(stream: &mut WsStream) -> Result<StoreEvent, CliError> {
    tokio::time::timeout(ECHO_TIMEOUT, next_event(stream))
        .await
        .map_err(|_| CliError::Timeout)?
}

fn print_event(event: &StoreEvent) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}
