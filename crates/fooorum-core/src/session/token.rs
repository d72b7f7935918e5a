//! Bearer token decoding.
//!
//! Tokens are compact three-segment signed tokens. The client never verifies
//! the signature -- it only reads the claims in the middle segment to build
//! the identity read model. Any failure yields a [`TokenDecodeError`].

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use fooorum_types::auth::TokenClaims;
use fooorum_types::error::TokenDecodeError;

/// Standard-alphabet decoder that tolerates missing padding.
///
/// The url-safe characters are translated before decoding, so this accepts
/// both base64 and base64url payloads.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Strip one surrounding quote pair and an optional `Bearer ` prefix.
pub fn normalize_token(raw: &str) -> &str {
    let mut token = raw;

    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        token = &token[1..token.len() - 1];
    }

    if let Some(prefix) = token.get(..6) {
        let rest = &token[6..];
        if prefix.eq_ignore_ascii_case("bearer") && rest.starts_with(char::is_whitespace) {
            token = rest.trim_start();
        }
    }

    token
}

/// Decode the claims carried by a bearer token.
pub fn decode_token(raw: &str) -> Result<TokenClaims, TokenDecodeError> {
    let token = normalize_token(raw);
    if token.is_empty() {
        return Err(TokenDecodeError::Empty);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenDecodeError::SegmentCount(segments.len()));
    }
    if let Some(index) = segments.iter().position(|s| s.is_empty()) {
        return Err(TokenDecodeError::EmptySegment(index + 1));
    }

    let payload = segments[1].replace('-', "+").replace('_', "/");
    let bytes = PAYLOAD_ENGINE
        .decode(payload.as_bytes())
        .map_err(|_| TokenDecodeError::Base64)?;
    let json = String::from_utf8(bytes).map_err(|_| TokenDecodeError::Utf8)?;

    serde_json::from_str(&json).map_err(|e| TokenDecodeError::Json(e.to_string()))
}
