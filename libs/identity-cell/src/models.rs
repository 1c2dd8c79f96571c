use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Usernames with full visibility over every booking. Matching is exact and
/// case-sensitive; there is no role column.
pub const ADMIN_USERNAMES: [&str; 2] = ["admin", "root"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
}

impl UserAccount {
    pub fn is_administrator(&self) -> bool {
        is_administrator(&self.username)
    }
}

pub fn is_administrator(username: &str) -> bool {
    ADMIN_USERNAMES.contains(&username)
}

/// Public listing entry for the "book on behalf of" selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
