//! Chat room message, frame, and connection-state types.
//!
//! Server-to-client frames are [`IncomingMessage`]s; once stamped with a
//! receipt time they become [`ChatMessage`]s, which is what the feed stores.
//! Client-to-server frames are [`ClientFrame`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;

/// Server-assigned message identifier, the sole de-duplication key.
///
/// The forum service may emit ids as numbers or strings; both normalise to
/// the same string form so `1` and `"1"` are the same message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => MessageId(s),
            RawId::Signed(n) => MessageId(n.to_string()),
            RawId::Unsigned(n) => MessageId(n.to_string()),
        })
    }
}

/// A message frame as received from the history endpoint or the socket.
///
/// `created_at` is optional on the wire; see [`IncomingMessage::stamp`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: MessageId,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl IncomingMessage {
    /// Convert into a stored message, defaulting `created_at` to `received_at`.
    pub fn stamp(self, received_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: self.id,
            author: self.author,
            text: self.text,
            created_at: self.created_at.unwrap_or(received_at),
        }
    }
}

/// A chat message held in the in-memory feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Ownership check by display name.
    ///
    /// The chat service does not send an author id, so two users sharing a
    /// display name will both see the message as their own.
    pub fn is_authored_by(&self, username: &str) -> bool {
        self.author == username
    }
}

/// Discriminator for control frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Auth,
}

/// A client-to-server frame on the chat socket.
///
/// Serialises to `{"type":"auth","token":...}` or `{"text":...,"token":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientFrame {
    Auth {
        #[serde(rename = "type")]
        kind: FrameKind,
        token: String,
    },
    Message {
        text: String,
        token: String,
    },
}

impl ClientFrame {
    /// The one-shot authentication frame sent right after the handshake.
    pub fn auth(token: impl Into<String>) -> Self {
        ClientFrame::Auth {
            kind: FrameKind::Auth,
            token: token.into(),
        }
    }

    /// A chat message carrying the sender's bearer token.
    pub fn message(text: impl Into<String>, token: impl Into<String>) -> Self {
        ClientFrame::Message {
            text: text.into(),
            token: token.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Lifecycle of the chat socket while a transport is mounted.
///
/// There is no `Closed` variant: a close is only ever observed
/// as a transition into `Reconnecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Reconnecting => write!(f, "reconnecting"),
        }
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Connecting
    }
}
