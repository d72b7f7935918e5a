//! The session read model shared with every view.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use fooorum_types::identity::{Identity, UserId};

/// An authenticated session: the bearer token plus the identity decoded from it.
///
/// The token is a [`SecretString`] so it never shows up in `Debug` output.
#[derive(Debug)]
pub struct Session {
    token: SecretString,
    identity: Identity,
}

impl Session {
    pub fn new(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            token: SecretString::from(token.into()),
            identity,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Cloneable, read-only handle on the current session.
///
/// Obtained from [`SessionManager::context`](super::SessionManager::context).
/// Reads always reflect the latest committed state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<Option<Arc<Session>>>,
}

impl SessionContext {
    pub(crate) fn new(rx: watch::Receiver<Option<Arc<Session>>>) -> Self {
        Self { rx }
    }

    /// A context frozen at `session` with no manager behind it.
    pub fn fixed(session: Option<Session>) -> Self {
        let (_tx, rx) = watch::channel(session.map(Arc::new));
        Self { rx }
    }

    fn current(&self) -> Option<Arc<Session>> {
        self.rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.current().map(|s| s.identity.clone())
    }

    /// The raw bearer token, for attaching to socket frames.
    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token().to_string())
    }

    /// `Bearer <token>` for an `Authorization` header.
    pub fn bearer_header(&self) -> Option<String> {
        self.current().map(|s| format!("Bearer {}", s.token()))
    }

    /// Whether the current user may edit or delete content owned by `author_id`.
    pub fn can_modify(&self, author_id: UserId) -> bool {
        self.current()
            .is_some_and(|s| s.identity.can_modify(author_id))
    }

    /// Wait for the next login, logout or restore.
    ///
    /// Returns `false` once the owning manager has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fooorum_types::identity::Role;

    #[test]
    fn test_fixed_anonymous_context() {
        let ctx = SessionContext::fixed(None);
        assert!(!ctx.is_authenticated());
        assert!(ctx.current_user().is_none());
        assert!(ctx.bearer_header().is_none());
        assert!(!ctx.can_modify(1));
    }

    #[test]
    fn test_fixed_authenticated_context() {
        let session = Session::new("h.p.s", Identity::new(7, "alice", Role::User));
        let ctx = SessionContext::fixed(Some(session));
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.current_user().unwrap().username, "alice");
        assert_eq!(ctx.bearer_header().as_deref(), Some("Bearer h.p.s"));
        assert!(ctx.can_modify(7));
        assert!(!ctx.can_modify(8));
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session::new("super-secret-token", Identity::new(1, "a", Role::User));
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret-token"));
    }
}
