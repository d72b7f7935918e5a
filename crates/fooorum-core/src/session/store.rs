//! Persisted-token store port.

use fooorum_types::error::StoreError;

/// Trait for the single persisted slot holding the raw bearer token.
///
/// Absence of a token means logged out.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the stored token.
    fn save(&self, token: &str) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Remove the stored token. Removing an absent token is not an error.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
