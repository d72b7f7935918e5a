//! Session manager: the single owner of authentication state.
//!
//! Login and register follow a strict commit order: decode the returned
//! token, persist it, then publish the identity. A rejected request, a
//! missing token or a storage failure leaves both the store and the
//! published session untouched. A token that does not decode ends any
//! previous session: the stored token is purged and the session is
//! published as unauthenticated.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use fooorum_types::auth::{AuthResponse, LoginRequest, RegisterRequest, TokenClaims};
use fooorum_types::error::AuthError;
use fooorum_types::identity::{Identity, Role};

use super::api::AuthApi;
use super::context::{Session, SessionContext};
use super::store::TokenStore;
use super::token::{decode_token, normalize_token};

/// Owns the bearer token lifecycle and publishes the identity read model.
///
/// Generic over the auth service and the token store so tests can plug in
/// fakes; the binary pins them to the HTTP client and the file store.
pub struct SessionManager<A, S> {
    api: A,
    store: S,
    state: watch::Sender<Option<Arc<Session>>>,
}

impl<A: AuthApi, S: TokenStore> SessionManager<A, S> {
    /// Create an unauthenticated manager. Call [`restore_session`](Self::restore_session)
    /// once at startup to pick up a persisted token.
    pub fn new(api: A, store: S) -> Self {
        let (state, _) = watch::channel(None);
        Self { api, store, state }
    }

    /// A read-only handle for views and the chat transport.
    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.state.subscribe())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.state.borrow().as_ref().map(|s| s.identity().clone())
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await.inspect_err(|e| {
            warn!(error = %e, "login failed");
        })?;
        self.commit(response).await
    }

    /// Create an account and sign in with it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Identity, AuthError> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        };
        let response = self.api.register(&request).await.inspect_err(|e| {
            warn!(error = %e, "registration failed");
        })?;
        self.commit(response).await
    }

    /// Forget the session. Never fails; a store error is only logged.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to remove stored token during logout");
        }
        self.state.send_replace(None);
        info!("logged out");
    }

    /// Hydrate the session from the persisted token, if one exists.
    ///
    /// - No stored token: no writes at all, returns `None`.
    /// - Token decodes: publishes the identity and returns it.
    /// - Token does not decode: purges it and publishes the unauthenticated state.
    pub async fn restore_session(&self) -> Option<Identity> {
        let raw = match self.store.load().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored token, staying logged out");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                return None;
            }
        };

        match decode_token(&raw) {
            Ok(claims) => {
                let username = claims.username.clone().unwrap_or_default();
                let identity = identity_from_claims(&claims, username);
                self.publish(normalize_token(&raw), identity.clone());
                info!(user_id = identity.user_id, role = %identity.role, "session restored");
                Some(identity)
            }
            Err(e) => {
                warn!(error = %e, "stored token is invalid, purging it");
                self.purge().await;
                None
            }
        }
    }

    async fn commit(&self, response: AuthResponse) -> Result<Identity, AuthError> {
        let raw = response
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::MissingToken)?;
        let token = normalize_token(&raw);
        let claims = match decode_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "auth response carried an invalid token, ending session");
                self.purge().await;
                return Err(e.into());
            }
        };

        // The response's user record wins over the claim for the display name.
        let username = response
            .user
            .and_then(|u| u.username)
            .or_else(|| claims.username.clone())
            .ok_or_else(|| AuthError::Malformed("response carries no username".to_string()))?;
        let identity = identity_from_claims(&claims, username);

        self.store
            .save(token)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.publish(token, identity.clone());

        info!(user_id = identity.user_id, role = %identity.role, "authenticated");
        Ok(identity)
    }

    async fn purge(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to purge invalid token");
        }
        self.state.send_replace(None);
    }

    fn publish(&self, token: &str, identity: Identity) {
        self.state
            .send_replace(Some(Arc::new(Session::new(token, identity))));
    }
}

fn identity_from_claims(claims: &TokenClaims, username: String) -> Identity {
    Identity::new(
        claims.user_id,
        username,
        Role::from_claim(claims.role.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token::tests::token_with_payload;
    use fooorum_types::auth::AuthUser;
    use fooorum_types::error::StoreError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned auth service: every call returns a clone of `response`.
    struct FakeAuth {
        response: Mutex<Option<Result<AuthResponse, AuthError>>>,
        calls: AtomicUsize,
    }

    impl FakeAuth {
        fn returning(response: Result<AuthResponse, AuthError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                calls: AtomicUsize::new(0),
            }
        }

        fn take(&self) -> Result<AuthResponse, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(AuthError::Network("exhausted".to_string())))
        }
    }

    impl AuthApi for FakeAuth {
        async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, AuthError> {
            self.take()
        }

        async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
            self.take()
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        token: Mutex<Option<String>>,
        writes: AtomicUsize,
        fail_save: bool,
    }

    impl MemoryStore {
        fn with_token(token: &str) -> Self {
            Self {
                token: Mutex::new(Some(token.to_string())),
                ..Self::default()
            }
        }

        fn stored(&self) -> Option<String> {
            self.token.lock().unwrap().clone()
        }
    }

    impl TokenStore for MemoryStore {
        async fn load(&self) -> Result<Option<String>, StoreError> {
            Ok(self.stored())
        }

        async fn save(&self, token: &str) -> Result<(), StoreError> {
            if self.fail_save {
                return Err(StoreError::Io("disk full".to_string()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.token.lock().unwrap() = Some(token.to_string());
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.token.lock().unwrap() = None;
            Ok(())
        }
    }

    fn response(token: &str, username: Option<&str>) -> AuthResponse {
        AuthResponse {
            access_token: Some(token.to_string()),
            refresh_token: None,
            user: Some(AuthUser {
                username: username.map(str::to_string),
                ..AuthUser::default()
            }),
        }
    }

    #[tokio::test]
    async fn login_decodes_claims_and_takes_username_from_response() {
        let token = token_with_payload(r#"{"user_id":7,"role":"admin"}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response(&token, Some("alice")))),
            MemoryStore::default(),
        );

        let identity = manager.login("a@b.com", "x").await.unwrap();

        assert_eq!(identity, Identity::new(7, "alice", Role::Admin));
        assert!(manager.is_authenticated());
        assert_eq!(manager.store.stored(), Some(token.clone()));

        let ctx = manager.context();
        assert_eq!(ctx.current_user(), Some(identity));
        assert_eq!(ctx.token(), Some(token));
    }

    #[tokio::test]
    async fn login_defaults_role_to_user() {
        let token = token_with_payload(r#"{"user_id":3,"username":"carol"}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response(&token, None))),
            MemoryStore::default(),
        );

        let identity = manager.login("c@d.com", "pw").await.unwrap();
        assert_eq!(identity, Identity::new(3, "carol", Role::User));
    }

    #[tokio::test]
    async fn login_rejected_commits_nothing() {
        let manager = SessionManager::new(
            FakeAuth::returning(Err(AuthError::Rejected {
                status: 401,
                message: "invalid credentials".to_string(),
            })),
            MemoryStore::default(),
        );

        let err = manager.login("a@b.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
        assert!(!manager.is_authenticated());
        assert_eq!(manager.store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn login_without_token_commits_nothing() {
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(AuthResponse::default())),
            MemoryStore::default(),
        );

        let err = manager.login("a@b.com", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
        assert!(!manager.is_authenticated());
        assert!(manager.store.stored().is_none());
    }

    #[tokio::test]
    async fn login_with_undecodable_token_stores_nothing() {
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response("not-a-token", Some("alice")))),
            MemoryStore::default(),
        );

        let err = manager.login("a@b.com", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert!(!manager.is_authenticated());
        assert!(manager.store.stored().is_none());
    }

    #[tokio::test]
    async fn login_with_undecodable_token_ends_restored_session() {
        let token = token_with_payload(r#"{"user_id":5,"username":"erin"}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response("h.!!!.s", Some("erin")))),
            MemoryStore::with_token(&token),
        );
        manager.restore_session().await.unwrap();
        let ctx = manager.context();
        assert!(ctx.is_authenticated());

        let err = manager.login("e@f.com", "x").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert!(!manager.is_authenticated());
        assert!(!ctx.is_authenticated());
        assert!(manager.store.stored().is_none());
    }

    #[tokio::test]
    async fn login_storage_failure_publishes_nothing() {
        let token = token_with_payload(r#"{"user_id":7}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response(&token, Some("alice")))),
            MemoryStore {
                fail_save: true,
                ..MemoryStore::default()
            },
        );

        let err = manager.login("a@b.com", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn register_follows_login_contract() {
        let token = token_with_payload(r#"{"user_id":11,"role":"moderator"}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response(&token, Some("dave")))),
            MemoryStore::default(),
        );

        let identity = manager.register("d@e.com", "secret1", "dave").await.unwrap();
        assert_eq!(identity, Identity::new(11, "dave", Role::Moderator));
        assert!(manager.context().can_modify(99));
    }

    #[tokio::test]
    async fn logout_clears_store_and_identity() {
        let token = token_with_payload(r#"{"user_id":7,"username":"alice"}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Err(AuthError::MissingToken)),
            MemoryStore::with_token(&token),
        );
        manager.restore_session().await.unwrap();
        let ctx = manager.context();
        assert!(ctx.is_authenticated());

        manager.logout().await;

        assert!(!manager.is_authenticated());
        assert!(!ctx.is_authenticated());
        assert!(manager.store.stored().is_none());
    }

    #[tokio::test]
    async fn restore_session_hydrates_from_claims() {
        let token = token_with_payload(r#"{"user_id":5,"username":"erin","role":"moderator"}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Err(AuthError::MissingToken)),
            MemoryStore::with_token(&format!("\"{token}\"")),
        );

        let identity = manager.restore_session().await.unwrap();
        assert_eq!(identity, Identity::new(5, "erin", Role::Moderator));
        assert_eq!(manager.context().token(), Some(token));
    }

    #[tokio::test]
    async fn restore_session_purges_invalid_tokens() {
        for bad in ["a.b", "h.!!!.s", "onlyone", "h..s"] {
            let manager = SessionManager::new(
                FakeAuth::returning(Err(AuthError::MissingToken)),
                MemoryStore::with_token(bad),
            );

            assert!(manager.restore_session().await.is_none(), "token: {bad}");
            assert!(!manager.is_authenticated());
            assert!(manager.store.stored().is_none(), "token not purged: {bad}");
        }
    }

    #[tokio::test]
    async fn restore_session_without_token_has_no_side_effects() {
        let manager = SessionManager::new(
            FakeAuth::returning(Err(AuthError::MissingToken)),
            MemoryStore::default(),
        );

        assert!(manager.restore_session().await.is_none());
        assert!(manager.restore_session().await.is_none());
        assert_eq!(manager.store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(manager.api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn context_observes_login() {
        let token = token_with_payload(r#"{"user_id":7}"#);
        let manager = SessionManager::new(
            FakeAuth::returning(Ok(response(&token, Some("alice")))),
            MemoryStore::default(),
        );
        let mut ctx = manager.context();

        manager.login("a@b.com", "x").await.unwrap();

        assert!(ctx.changed().await);
        assert!(ctx.is_authenticated());
    }
}
