//! Auth service port.

use fooorum_types::auth::{AuthResponse, LoginRequest, RegisterRequest};
use fooorum_types::error::AuthError;

/// Trait for the remote auth service.
///
/// Implementations map transport failures and non-2xx responses into
/// [`AuthError`]; a 2xx response is returned as-is, even if it lacks a token,
/// so the session manager decides what counts as a usable response.
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl std::future::Future<Output = Result<AuthResponse, AuthError>> + Send;

    /// `POST /auth/register`.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl std::future::Future<Output = Result<AuthResponse, AuthError>> + Send;
}
