use thiserror::Error;

/// Why a bearer token could not be decoded into claims.
///
/// Always recovered locally: the session falls back to unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    #[error("token is empty")]
    Empty,

    #[error("expected 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("segment {0} is empty")]
    EmptySegment(usize),

    #[error("payload is not valid base64url")]
    Base64,

    #[error("payload is not valid UTF-8")]
    Utf8,

    #[error("payload is not valid claims JSON: {0}")]
    Json(String),
}

/// Errors surfaced to the user from login/register.
///
/// When any of these is returned no session state has been committed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("no access token received")]
    MissingToken,

    #[error("invalid access token: {0}")]
    InvalidToken(#[from] TokenDecodeError),

    #[error("auth service unreachable: {0}")]
    Network(String),

    #[error("malformed auth response: {0}")]
    Malformed(String),

    #[error("could not persist session: {0}")]
    Storage(String),
}

/// Socket-level failures. Recovered by the scheduled reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connection closed")]
    Closed,

    #[error("socket error: {0}")]
    Io(String),

    #[error("send failed: {0}")]
    Send(String),
}

/// Failure to load the message history. Shown as a dismissible banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("history request failed with status {0}")]
    Status(u16),

    #[error("history request failed: {0}")]
    Network(String),

    #[error("history response could not be decoded: {0}")]
    Decode(String),
}

/// A compose action refused locally, before touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendRejected {
    #[error("message is empty")]
    EmptyMessage,

    #[error("log in to participate in the chat")]
    Unauthenticated,

    #[error("connection not ready, please wait")]
    NotReady,
}

/// Errors from the persisted-token store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}
