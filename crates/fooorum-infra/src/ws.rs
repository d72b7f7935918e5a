//! Chat socket connector over tokio-tungstenite.
//!
//! Ping/pong is answered by tungstenite itself. Binary frames are ignored;
//! a close frame or end of stream ends the connection cleanly.

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use fooorum_core::chat::ports::{ChatConnection, ChatConnector};
use fooorum_types::error::TransportError;

use crate::endpoints;

/// Opens connections to `{forum_url}/chat/ws`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    /// Build a connector for the forum service at `forum_url`.
    ///
    /// Fails if the URL cannot be parsed or its scheme is not http(s)/ws(s).
    pub fn new(forum_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            url: endpoints::chat_socket_url(forum_url)?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl ChatConnector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self) -> Result<WsConnection, TransportError> {
        debug!(url = %self.url, "opening chat socket");
        let (stream, response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!(status = response.status().as_u16(), "chat socket handshake complete");
        Ok(WsConnection { stream })
    }
}

/// One open chat socket.
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl ChatConnection for WsConnection {
    async fn send_text(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::text(frame))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "chat socket closed by server");
                    return None;
                }
                Ok(Message::Binary(bytes)) => {
                    trace!(len = bytes.len(), "ignoring binary chat frame");
                }
                Ok(_) => {}
                Err(e) => return Some(Err(TransportError::Io(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "chat socket close failed");
        }
    }
}
