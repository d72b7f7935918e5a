//! Endpoint derivation from the configured base URLs.
//!
//! The chat socket scheme mirrors the forum base URL's transport security:
//! `https` becomes `wss`, `http` becomes `ws`.

use reqwest::Url;

use fooorum_types::error::TransportError;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const HISTORY_PATH: &str = "/chat/messages";
pub const CHAT_SOCKET_PATH: &str = "/chat/ws";

/// A configured base URL could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid URL {0}")]
pub struct InvalidUrl(pub String);

/// Append `path` to `base`, keeping any path prefix `base` already has.
pub fn join(base: &str, path: &str) -> Result<Url, InvalidUrl> {
    let mut url = Url::parse(base).map_err(|e| InvalidUrl(format!("{base}: {e}")))?;
    let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(None);
    Ok(url)
}

/// The chat socket URL for a forum base URL.
pub fn chat_socket_url(forum_url: &str) -> Result<Url, TransportError> {
    let mut url =
        join(forum_url, CHAT_SOCKET_PATH).map_err(|e| TransportError::Connect(e.to_string()))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(TransportError::Connect(format!(
                "unsupported forum URL scheme: {other}"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::Connect(format!("cannot use scheme {scheme} for {forum_url}")))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_maps_to_ws() {
        let url = chat_socket_url("http://localhost:8081").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8081/chat/ws");
    }

    #[test]
    fn https_maps_to_wss() {
        let url = chat_socket_url("https://forum.example.com/").unwrap();
        assert_eq!(url.as_str(), "wss://forum.example.com/chat/ws");
    }

    #[test]
    fn path_prefix_is_kept() {
        let url = chat_socket_url("https://example.com/forum/").unwrap();
        assert_eq!(url.as_str(), "wss://example.com/forum/chat/ws");

        let history = join("http://localhost:8081/api", HISTORY_PATH).unwrap();
        assert_eq!(history.as_str(), "http://localhost:8081/api/chat/messages");
    }

    #[test]
    fn rejects_unknown_scheme_and_garbage() {
        assert!(chat_socket_url("ftp://example.com").is_err());
        assert!(chat_socket_url("not a url").is_err());
    }
}
