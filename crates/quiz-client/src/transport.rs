//! Transport abstraction for the server connection.
//!
//! The quiz protocol is text frames over a bidirectional connection; this
//! seam keeps [`NetClient`](crate::net_client::NetClient) independent of
//! the concrete transport (WebSocket in production, channel pairs in
//! tests).

use std::future::Future;

use thiserror::Error;

/// Errors that can occur during transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O or protocol-level error.
    #[error("{0}")]
    Io(String),
}

/// Read half of a connection.
///
/// Implementations receive UTF-8 text frames from the server.
pub trait TransportReader: Send + 'static {
    /// Receive the next text frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;
}

/// Write half of a connection.
pub trait TransportWriter: Send + 'static {
    /// Send a text frame to the server.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A bidirectional connection splittable into independent read and write
/// halves, so each half can be moved into its own async task.
pub trait Transport: Send + 'static {
    /// The read half produced by [`split`](Transport::split).
    type Reader: TransportReader;
    /// The write half produced by [`split`](Transport::split).
    type Writer: TransportWriter;

    /// Split the connection into read and write halves.
    fn split(self) -> (Self::Reader, Self::Writer);
}
