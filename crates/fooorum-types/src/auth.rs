//! Auth service wire types and decoded token claims.
//!
//! The auth service answers `POST /auth/login` and `POST /auth/register`
//! with an [`AuthResponse`]. Its field spelling has drifted between
//! `access_token`/`user` and `AccessToken`/`User`, so both are accepted.

use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::UserId;

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// User record echoed back by the auth service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Successful login/register response.
///
/// `access_token` is optional at the type level so a response without one
/// can be reported as a missing-token failure rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, alias = "AccessToken")]
    pub access_token: Option<String>,
    #[serde(default, alias = "RefreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "User")]
    pub user: Option<AuthUser>,
}

/// Error body returned by the auth service on 4xx/5xx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Claims carried in the middle segment of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Accepts `7`, `7.0` and `"7"` -- signers disagree on how to encode ids.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<UserId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(id) => Ok(id),
        RawId::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
        RawId::Float(f) => Err(serde::de::Error::custom(format!(
            "user_id is not an integer: {f}"
        ))),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("user_id is not numeric: '{s}'"))),
    }
}
