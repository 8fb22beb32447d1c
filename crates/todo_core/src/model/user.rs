//! Reference to a user owned by the identity collaborator.

use serde::{Deserialize, Serialize};

/// Snapshot of the acting user stored as `author` on todos and comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    /// Stable user key issued by the identity collaborator.
    pub key: String,
    /// Display name at the time the record was authored.
    pub name: String,
}

impl UserRef {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}
