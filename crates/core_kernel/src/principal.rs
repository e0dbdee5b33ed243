//! Authenticated principals
//!
//! Session issuance happens outside the core. By the time a call reaches a
//! domain engine the caller has been authenticated and is described by a
//! `Principal`.

use serde::{Deserialize, Serialize};

use crate::identifiers::UserId;

/// Role carried by a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// An already-authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier (user id for customers, staff handle for admins)
    pub subject: String,
    pub roles: Vec<Role>,
}

impl Principal {
    /// Creates an admin principal
    pub fn admin(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            roles: vec![Role::Admin],
        }
    }

    /// Creates a customer principal for a user
    pub fn user(user_id: UserId) -> Self {
        Self {
            subject: user_id.to_string(),
            roles: vec![Role::User],
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Parses the subject as a user id
    pub fn user_id(&self) -> Option<UserId> {
        self.subject.parse().ok()
    }
}
