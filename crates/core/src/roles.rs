//! Platform roles and the gates composed from them.

use serde::{Deserialize, Serialize};

/// Role held by a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can read and comment.
    Reader,
    /// Can write and edit their own articles.
    Author,
    /// Can review, publish, and moderate.
    Editor,
    /// Full access.
    Admin,
}

/// Roles allowed to drive publishing transitions and moderation actions.
pub const MODERATOR_ROLES: &[Role] = &[Role::Editor, Role::Admin];

impl Role {
    /// Whether this role may review, publish, and moderate content.
    pub fn can_moderate(self) -> bool {
        MODERATOR_ROLES.contains(&self)
    }
}
