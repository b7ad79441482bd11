//! Channel-based network client for the quiz server.
//!
//! Spawns background reader/writer tasks and exposes channels so the
//! session layer can send and receive protocol messages without owning
//! the socket directly. The incoming channel closing is the disconnect
//! signal; replacing the connection is the reconnect supervisor's job
//! ([`crate::reconnect`]).

use tokio::sync::mpsc;

#[cfg(feature = "native")]
use crate::transport::{Transport, TransportReader, TransportWriter};
use quiz_core::protocol::{ClientMessage, ServerMessage};

// ---------------------------------------------------------------------------
// Wire-level parsing
// ---------------------------------------------------------------------------

/// Try to deserialize a raw text frame as a [`ServerMessage`].
///
/// Returns `None` for empty/whitespace-only input. A frame that is not
/// valid JSON, lacks the `event_type`/`args` shape, or names an unknown
/// event is a protocol violation: it is logged and dropped so one bad
/// frame cannot take down the session.
pub fn parse_server_frame(text: &str) -> Option<ServerMessage> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ServerMessage>(trimmed) {
        Ok(msg) => Some(msg),
        Err(err) => {
            tracing::warn!(error = %err, frame = trimmed, "dropping malformed server frame");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// NetClient
// ---------------------------------------------------------------------------

/// A channel-based network client for the quiz server.
///
/// Construct with [`NetClient::from_transport`] (generic), or the
/// convenience method [`connect_ws`](NetClient::connect_ws).
///
/// The client exposes:
/// - [`incoming`](NetClient::incoming) — an [`mpsc::UnboundedReceiver<ServerMessage>`]
///   of decoded server messages. The channel closing signals disconnection.
/// - [`send`](NetClient::send) — a non-async, non-blocking method to
///   enqueue a [`ClientMessage`] for transmission.
///
/// There is no handshake: readiness is observed only by the eventual
/// receipt of the server's `status` message on the incoming channel.
#[derive(Debug)]
pub struct NetClient {
    /// Receive decoded server messages. Channel close = disconnected.
    pub incoming: mpsc::UnboundedReceiver<ServerMessage>,
    /// Send-side of the writer channel (kept for [`Self::send`]).
    outgoing: mpsc::UnboundedSender<ClientMessage>,
}

impl NetClient {
    // ------------------------------------------------------------------
    // Generic transport constructor (native only — uses tokio::spawn)
    // ------------------------------------------------------------------

    /// Create a `NetClient` over any [`Transport`] implementation.
    ///
    /// Splits the transport into read/write halves and spawns the
    /// background I/O tasks.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        let (reader, writer) = transport.split();

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();

        Self::spawn_reader_task(reader, msg_tx);
        Self::spawn_writer_task(writer, cmd_rx);

        Self {
            incoming: msg_rx,
            outgoing: cmd_tx,
        }
    }

    // ------------------------------------------------------------------
    // WebSocket convenience constructor
    // ------------------------------------------------------------------

    /// Open a WebSocket connection to the server and spawn the background
    /// I/O tasks.
    #[cfg(feature = "native")]
    pub async fn connect_ws(url: &str) -> Result<Self, crate::transport::TransportError> {
        let transport = crate::ws_transport::WsTransport::connect(url).await?;
        Ok(Self::from_transport(transport))
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    /// Enqueue a [`ClientMessage`] for transmission to the server.
    ///
    /// Non-blocking — the background writer task handles the actual I/O.
    /// An `Err` means the connection is already gone; a message enqueued
    /// while the connection is going down is dropped, never queued for
    /// the next connection (the server re-syncs every fresh connection
    /// with `status`, so a stale message would be meaningless).
    pub fn send(&self, msg: ClientMessage) -> Result<(), mpsc::error::SendError<ClientMessage>> {
        self.outgoing.send(msg)
    }

    // ------------------------------------------------------------------
    // WASM WebSocket constructor
    // ------------------------------------------------------------------

    /// Open a WebSocket connection from a WASM environment.
    ///
    /// Uses `gloo-net` for the WebSocket and
    /// `wasm_bindgen_futures::spawn_local` for the background tasks (no
    /// `Send` requirement).
    #[cfg(all(feature = "web", not(feature = "native")))]
    pub async fn connect_ws(url: &str) -> Result<Self, crate::transport::TransportError> {
        use futures_util::{SinkExt, StreamExt};
        use gloo_net::websocket::{Message, futures::WebSocket};

        use crate::transport::TransportError;

        let ws = WebSocket::open(url).map_err(|e| TransportError::Io(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();

        // Reader task (spawn_local — no Send required)
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Some(msg) = parse_server_frame(&text)
                            && msg_tx.send(msg).is_err()
                        {
                            break;
                        }
                    }
                    Ok(Message::Bytes(_)) => {} // skip binary frames
                    Err(_) => break,
                }
            }
            // Stream ended or error — channel drops, signalling disconnect.
        });

        // Writer task (spawn_local — no Send required)
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(msg) = cmd_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            incoming: msg_rx,
            outgoing: cmd_tx,
        })
    }

    // ------------------------------------------------------------------
    // Private: background task spawners (native only)
    // ------------------------------------------------------------------

    /// Spawn the reader task: decode frames, forward good ones, drop the
    /// rest.
    #[cfg(feature = "native")]
    fn spawn_reader_task<R: TransportReader>(
        mut reader: R,
        msg_tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        tokio::spawn(async move {
            while let Ok(Some(frame)) = reader.recv().await {
                if let Some(msg) = parse_server_frame(&frame)
                    && msg_tx.send(msg).is_err()
                {
                    break;
                }
            }
            tracing::info!("server connection closed");
            // Channel drops here, signalling disconnect to the session.
        });
    }

    /// Spawn the writer task: serialize queued messages onto the wire.
    #[cfg(feature = "native")]
    fn spawn_writer_task<W: TransportWriter>(
        mut writer: W,
        mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    ) {
        tokio::spawn(async move {
            while let Some(msg) = cmd_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if writer.send(&json).await.is_err() {
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::json;

    #[test]
    fn parse_rejects_blank_and_malformed_frames() {
        assert_eq!(parse_server_frame(""), None);
        assert_eq!(parse_server_frame("   \n"), None);
        assert_eq!(parse_server_frame("{not json"), None);
        assert_eq!(parse_server_frame(r#"{"no_event_type": 1}"#), None);
        assert_eq!(
            parse_server_frame(r#"{"event_type":"leaderboard","args":{}}"#),
            None
        );
    }

    #[test]
    fn parse_accepts_valid_frames() {
        assert_eq!(
            parse_server_frame(r#" {"event_type":"status","args":{"registered":false}} "#),
            Some(ServerMessage::Status {
                registered: false,
                name: None,
            })
        );
    }

    #[tokio::test]
    async fn outbound_messages_hit_the_wire_as_event_objects() {
        let (transport, mut server) = MockTransport::pair();
        let net = NetClient::from_transport(transport);

        net.send(ClientMessage::Register {
            name: "Alice".to_string(),
        })
        .unwrap();

        let frame = server.from_client.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value,
            json!({"event_type": "register", "args": {"name": "Alice"}})
        );
    }

    #[tokio::test]
    async fn inbound_frames_are_decoded_and_bad_ones_skipped() {
        let (transport, server) = MockTransport::pair();
        let mut net = NetClient::from_transport(transport);

        server.push_frame("{definitely not json");
        server.push_message(&ServerMessage::Question {
            number_of_variants: 3,
        });

        // The malformed frame is dropped; the next good frame comes through.
        let msg = net.incoming.recv().await.unwrap();
        assert_eq!(
            msg,
            ServerMessage::Question {
                number_of_variants: 3
            }
        );
    }

    #[tokio::test]
    async fn incoming_channel_closes_when_the_server_goes_away() {
        let (transport, server) = MockTransport::pair();
        let mut net = NetClient::from_transport(transport);

        drop(server);
        assert_eq!(net.incoming.recv().await, None);
    }
}
