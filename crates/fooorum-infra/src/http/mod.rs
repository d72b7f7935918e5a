//! HTTP clients for the auth and forum services.

pub mod auth;
pub mod history;

pub use auth::HttpAuthClient;
pub use history::HttpHistoryClient;

use std::time::Duration;

use crate::endpoints::InvalidUrl;

/// User-Agent sent on every request.
pub const USER_AGENT: &str = concat!("fooorum-client/", env!("CARGO_PKG_VERSION"));

/// Why an HTTP adapter could not be constructed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Build a shared reqwest client. `timeout` of `None` leaves requests untimed.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
