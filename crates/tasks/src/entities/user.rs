//! Signed-in user and session types.

use serde::{Deserialize, Serialize};

/// The current user as seen by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl User {
    /// Build a user, deriving the display name when none was supplied at sign-up.
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: Option<&str>) -> Self {
        let email = email.into();
        let name = display_name(&email, name);
        Self {
            id: id.into(),
            email,
            name,
        }
    }
}

/// Supplied name if non-blank, else the email local part, else `"User"`.
pub fn display_name(email: &str, supplied: Option<&str>) -> String {
    if let Some(name) = supplied.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("User")
        .to_string()
}

/// An authenticated session issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: User,
}
