//! Ports for the chat service: history endpoint and duplex socket.

use fooorum_types::chat::IncomingMessage;
use fooorum_types::error::{FetchError, TransportError};

/// `GET /chat/messages` -- the recent-history seed.
pub trait HistorySource: Send + Sync + 'static {
    /// Fetch recent messages, optionally with an `Authorization` header value.
    fn fetch_recent(
        &self,
        bearer: Option<String>,
    ) -> impl std::future::Future<Output = Result<Vec<IncomingMessage>, FetchError>> + Send;
}

/// Opens duplex connections to the chat socket endpoint.
///
/// Each call is one handshake attempt; the transport decides when to retry.
pub trait ChatConnector: Send + Sync + 'static {
    type Connection: ChatConnection;

    fn connect(
        &self,
    ) -> impl std::future::Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// One open socket carrying JSON text frames.
pub trait ChatConnection: Send + 'static {
    /// Write one text frame.
    fn send_text(
        &mut self,
        frame: String,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Next inbound text frame. `None` once the peer has closed the socket.
    ///
    /// Must be cancel-safe: the transport polls it inside `select!`.
    fn next_text(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<String, TransportError>>> + Send;

    /// Close the socket. Best effort; errors are swallowed.
    fn close(&mut self) -> impl std::future::Future<Output = ()> + Send;
}
