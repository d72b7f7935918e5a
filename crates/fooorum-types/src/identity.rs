//! User identity and role types.
//!
//! An [`Identity`] is derived solely from the claims of a bearer token. It is
//! the read model every view consults for "who am I" and "may I do this".

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Stable numeric user id assigned by the auth service.
pub type UserId = i64;

/// Authorization role carried in the token's `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    /// Resolve a role from an optional claim value.
    ///
    /// Missing or unrecognised claims fall back to [`Role::User`].
    pub fn from_claim(claim: Option<&str>) -> Self {
        claim.and_then(|c| c.parse().ok()).unwrap_or_default()
    }

    /// Moderators and admins.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Moderator => write!(f, "moderator"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// The authenticated user as decoded from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    /// Whether this user holds a moderator or admin role.
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Whether this user may edit or delete content owned by `author_id`.
    ///
    /// Staff may modify anything; everyone else only their own content,
    /// compared by stable id.
    pub fn can_modify(&self, author_id: UserId) -> bool {
        self.is_staff() || self.user_id == author_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_role_from_claim_defaults_to_user() {
        assert_eq!(Role::from_claim(None), Role::User);
        assert_eq!(Role::from_claim(Some("superuser")), Role::User);
        assert_eq!(Role::from_claim(Some("ADMIN")), Role::Admin);
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Moderator).unwrap();
        assert_eq!(json, "\"moderator\"");
    }

    #[test]
    fn test_can_modify_by_owner_and_staff() {
        let alice = Identity::new(7, "alice", Role::User);
        assert!(alice.can_modify(7));
        assert!(!alice.can_modify(8));

        let mod_bob = Identity::new(9, "bob", Role::Moderator);
        assert!(mod_bob.can_modify(7));

        let admin = Identity::new(1, "root", Role::Admin);
        assert!(admin.is_staff());
        assert!(admin.can_modify(42));
    }
}
