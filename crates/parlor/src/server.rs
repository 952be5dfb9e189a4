//! WebSocket accept loop and per-connection plumbing.
//!
//! Connections never touch shared state. Each one gets a reader task
//! (frames → parsed events → orchestrator commands) and a writer task
//! (an unbounded channel the gateway pushes into → socket). The
//! orchestrator learns about the connection's whole life through
//! `Connected` / `Inbound` / `Closed` commands.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use parlor_protocol::{ParticipantId, decode_client_event};
use parlor_store::MessageStore;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;

use crate::{Command, Orchestrator, OrchestratorConfig, ParlorError, WsGateway};

/// Counter for assigning connection identities.
static NEXT_PARTICIPANT_ID: AtomicU64 = AtomicU64::new(1);

type CommandSender = UnboundedSender<Command<UnboundedSender<Message>>>;

/// A bound Parlor server with its orchestrator task already running.
pub struct ParlorServer {
    listener: TcpListener,
    commands: CommandSender,
}

impl ParlorServer {
    /// Binds the listen socket and spawns the orchestrator.
    pub async fn bind(addr: &str, store: MessageStore) -> Result<Self, ParlorError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr, "parlor server listening");

        let (orchestrator, commands) =
            Orchestrator::new(WsGateway::new(), store, OrchestratorConfig::default());
        tokio::spawn(orchestrator.run());

        Ok(Self { listener, commands })
    }

    /// The actual bound address (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one handler task each.
    pub async fn run(self) -> Result<(), ParlorError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let commands = self.commands.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_socket(stream, commands).await {
                            tracing::debug!(%addr, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Runs one connection from handshake to close.
async fn handle_socket(
    stream: TcpStream,
    commands: CommandSender,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let participant_id = ParticipantId(NEXT_PARTICIPANT_ID.fetch_add(1, Ordering::Relaxed));
    tracing::debug!(%participant_id, "websocket connection established");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let (sink, mut outbound) = mpsc::unbounded_channel::<Message>();
    let _ = commands.send(Command::Connected { participant_id, sink });

    // Writer: drain the gateway's channel into the socket.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    // Reader: parse frames, forward events, drop garbage.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => match decode_client_event(text.as_str()) {
                Ok(event) => {
                    let _ = commands.send(Command::Inbound { participant_id, event });
                }
                Err(e) => {
                    tracing::debug!(%participant_id, error = %e, "unparseable frame dropped");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong: nothing to do
            Err(e) => {
                tracing::debug!(%participant_id, error = %e, "websocket error");
                break;
            }
        }
    }

    // Whatever ended the read loop, the orchestrator reconciles state.
    let _ = commands.send(Command::Closed { participant_id });
    writer.abort();
    Ok(())
}
