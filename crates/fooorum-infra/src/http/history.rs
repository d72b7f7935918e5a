//! reqwest client for the chat history endpoint.

use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use fooorum_core::chat::ports::HistorySource;
use fooorum_types::chat::IncomingMessage;
use fooorum_types::error::FetchError;

use super::ClientError;
use crate::endpoints::{self, HISTORY_PATH};

/// `GET /chat/messages`, with no request timeout.
pub struct HttpHistoryClient {
    url: Url,
    http: reqwest::Client,
}

impl HttpHistoryClient {
    pub fn new(forum_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            url: endpoints::join(forum_url, HISTORY_PATH)?,
            http: super::build_client(None)?,
        })
    }
}

impl HistorySource for HttpHistoryClient {
    async fn fetch_recent(
        &self,
        bearer: Option<String>,
    ) -> Result<Vec<IncomingMessage>, FetchError> {
        let mut request = self.http.get(self.url.clone());
        if let Some(bearer) = bearer {
            request = request.header(AUTHORIZATION, bearer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let messages = parse_history(&body)?;
        debug!(count = messages.len(), "fetched chat history");
        Ok(messages)
    }
}

/// A `null` or empty body is an empty history.
fn parse_history(body: &str) -> Result<Vec<IncomingMessage>, FetchError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Option<Vec<IncomingMessage>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_history_accepts_null_and_empty() {
        assert!(parse_history("null").unwrap().is_empty());
        assert!(parse_history("").unwrap().is_empty());
        assert!(parse_history("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_history_reads_messages() {
        let body = r#"[
            {"id": 1, "author": "bob", "text": "hi", "created_at": "2024-05-01T12:00:00Z"},
            {"id": "m2", "author": "eve", "text": "yo"}
        ]"#;
        let messages = parse_history(body).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.as_str(), "1");
        assert!(messages[1].created_at.is_none());
    }

    #[test]
    fn parse_history_rejects_garbage() {
        assert!(matches!(parse_history("{oops"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn new_builds_history_url() {
        let client = HttpHistoryClient::new("http://localhost:8081").unwrap();
        assert_eq!(client.url.as_str(), "http://localhost:8081/chat/messages");
    }
}
