//! Session controller: the single mutation gateway for the session view.
//!
//! Owns a [`NetClient`] and a [`SessionView`], providing the dispatch
//! logic shared by every frontend:
//!
//! - Processing incoming [`ServerMessage`]s and updating the view.
//! - Forwarding outbound [`ClientMessage`]s to the server.
//!
//! All view mutation happens inside [`recv`](SessionController::recv) /
//! [`try_recv`](SessionController::try_recv) on the caller's task, so the
//! single-threaded-dispatch invariant holds without locking.

use crate::net_client::NetClient;
#[cfg(feature = "native")]
use crate::transport::Transport;
use quiz_core::protocol::{ClientMessage, ServerMessage};
use quiz_core::session::{LogCategory, SessionEvent, SessionView, ViewChanged};

/// Outcome of processing a single network event.
#[derive(Debug)]
pub enum PollResult {
    /// A server message was applied; the flags describe what changed.
    Updated(ViewChanged),
    /// The connection dropped. The view keeps its last contents so the
    /// frontend can render through the outage; the reconnect supervisor
    /// hands out a fresh controller (and a fresh view) afterwards.
    Disconnected,
    /// No event was available (channel empty).
    Empty,
}

/// Owns the network client and session view for one connection.
#[derive(Debug)]
pub struct SessionController {
    net: NetClient,
    pub view: SessionView,
}

impl SessionController {
    /// Wrap an established connection with a fresh [`SessionView`].
    ///
    /// Fresh is the point: the server is the source of truth and syncs
    /// every new connection with `status`, so nothing carries over.
    pub fn new(net: NetClient) -> Self {
        Self {
            net,
            view: SessionView::new(),
        }
    }

    /// Create a controller over any [`Transport`] implementation.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        Self::new(NetClient::from_transport(transport))
    }

    /// Connect to the quiz server over WebSocket.
    #[cfg(any(feature = "native", feature = "web"))]
    pub async fn connect_ws(url: &str) -> Result<Self, crate::transport::TransportError> {
        Ok(Self::new(NetClient::connect_ws(url).await?))
    }

    /// Try to receive and process one network event (non-blocking).
    pub fn try_recv(&mut self) -> PollResult {
        match self.net.incoming.try_recv() {
            Ok(msg) => self.handle_server_message(msg),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => PollResult::Empty,
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => self.mark_disconnected(),
        }
    }

    /// Await the next network event. Useful in `tokio::select!` loops.
    pub async fn recv(&mut self) -> PollResult {
        match self.net.incoming.recv().await {
            Some(msg) => self.handle_server_message(msg),
            None => self.mark_disconnected(),
        }
    }

    /// Send a [`ClientMessage`] to the server.
    ///
    /// A message sent while the connection is down is dropped, matching
    /// the protocol's design; the drop is visible at debug level.
    pub fn send(&self, msg: ClientMessage) {
        if let Err(err) = self.net.send(msg) {
            tracing::debug!(dropped = ?err.0, "connection is down, dropping outbound message");
        }
    }

    /// Borrow the session view immutably (for rendering).
    pub fn session_view(&self) -> &SessionView {
        &self.view
    }

    /// Append local feedback to the session event log.
    ///
    /// Frontends call this instead of mutating the view directly, keeping
    /// the controller as the single mutation gateway.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.view.add_message(text, category);
    }

    // -- private -----------------------------------------------------------

    fn handle_server_message(&mut self, msg: ServerMessage) -> PollResult {
        PollResult::Updated(self.view.apply(&msg))
    }

    fn mark_disconnected(&mut self) -> PollResult {
        // A closed channel stays closed, so polls after the first would
        // otherwise flood the log with duplicate entries.
        if self.view.connected {
            self.view.connected = false;
            self.view.add_event(SessionEvent::Disconnected);
        }
        PollResult::Disconnected
    }
}
