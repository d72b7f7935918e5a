//! reqwest client for the auth service.

use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use fooorum_core::session::api::AuthApi;
use fooorum_types::auth::{AuthResponse, ErrorBody, LoginRequest, RegisterRequest};
use fooorum_types::error::AuthError;

use super::ClientError;
use crate::endpoints::{self, LOGIN_PATH, REGISTER_PATH};

const LOGIN_FALLBACK: &str = "Failed to login. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Talks JSON to `POST /auth/login` and `POST /auth/register`.
pub struct HttpAuthClient {
    login_url: Url,
    register_url: Url,
    http: reqwest::Client,
}

impl HttpAuthClient {
    /// Create a client for the auth service at `base_url`.
    ///
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            login_url: endpoints::join(base_url, LOGIN_PATH)?,
            register_url: endpoints::join(base_url, REGISTER_PATH)?,
            http: super::build_client(Some(timeout))?,
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, AuthError> {
        debug!(url = %url, "auth request");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(&body, fallback);
            warn!(status = status.as_u16(), "auth request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<AuthResponse>()
            .await
            .map_err(|e| AuthError::Malformed(e.to_string()))
    }
}

impl AuthApi for HttpAuthClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        self.post(&self.login_url, request, LOGIN_FALLBACK).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        self.post(&self.register_url, request, REGISTER_FALLBACK).await
    }
}

/// The server's `error` field if the body carries one, else `fallback`.
fn rejection_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_server_error() {
        let body = r#"{"error":"invalid credentials","code":"AUTH_FAILED"}"#;
        assert_eq!(rejection_message(body, LOGIN_FALLBACK), "invalid credentials");
    }

    #[test]
    fn rejection_message_falls_back() {
        assert_eq!(rejection_message("", LOGIN_FALLBACK), LOGIN_FALLBACK);
        assert_eq!(rejection_message("<html>502</html>", REGISTER_FALLBACK), REGISTER_FALLBACK);
        assert_eq!(rejection_message(r#"{"error":"  "}"#, LOGIN_FALLBACK), LOGIN_FALLBACK);
    }

    #[test]
    fn new_builds_endpoint_urls() {
        let client = HttpAuthClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.login_url.as_str(), "http://localhost:8080/auth/login");
        assert_eq!(client.register_url.as_str(), "http://localhost:8080/auth/register");
    }

    #[test]
    fn new_rejects_invalid_base() {
        assert!(matches!(
            HttpAuthClient::new("::nope::", Duration::from_secs(5)),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
