//! Channel-backed transport double for tests.
//!
//! [`MockTransport::pair`] returns the client-side transport plus a
//! [`MockServer`] handle the test drives: push frames the "server" sends,
//! inspect frames the client wrote. Dropping the handle closes both
//! directions, which reads as a clean disconnect.

use tokio::sync::mpsc;

use crate::transport::{Transport, TransportError, TransportReader, TransportWriter};
use quiz_core::protocol::{ClientMessage, ServerMessage};

pub(crate) struct MockTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

/// The server end of a [`MockTransport`] pair.
pub(crate) struct MockServer {
    pub to_client: mpsc::UnboundedSender<String>,
    pub from_client: mpsc::UnboundedReceiver<String>,
}

impl MockTransport {
    pub(crate) fn pair() -> (Self, MockServer) {
        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        (
            Self { inbound, outbound },
            MockServer {
                to_client,
                from_client,
            },
        )
    }
}

impl MockServer {
    /// Push a raw text frame to the client, as if the server sent it.
    pub(crate) fn push_frame(&self, frame: &str) {
        let _ = self.to_client.send(frame.to_string());
    }

    /// Push a well-formed protocol message to the client.
    pub(crate) fn push_message(&self, msg: &ServerMessage) {
        self.push_frame(&serde_json::to_string(msg).expect("serializable message"));
    }

    /// Await the next message the client sent, decoded.
    pub(crate) async fn recv_message(&mut self) -> Option<ClientMessage> {
        let frame = self.from_client.recv().await?;
        Some(serde_json::from_str(&frame).expect("client sent a well-formed frame"))
    }
}

impl Transport for MockTransport {
    type Reader = MockReader;
    type Writer = MockWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        (
            MockReader {
                inbound: self.inbound,
            },
            MockWriter {
                outbound: self.outbound,
            },
        )
    }
}

pub(crate) struct MockReader {
    inbound: mpsc::UnboundedReceiver<String>,
}

impl TransportReader for MockReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.inbound.recv().await)
    }
}

pub(crate) struct MockWriter {
    outbound: mpsc::UnboundedSender<String>,
}

impl TransportWriter for MockWriter {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.outbound
            .send(text.to_string())
            .map_err(|_| TransportError::ConnectionClosed)
    }
}
