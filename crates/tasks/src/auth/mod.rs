//! Authentication against the hosted identity provider.

mod memory;
mod supabase;

use async_trait::async_trait;

use crate::entities::{Session, User};
use crate::errors::TasksResult;

pub use memory::MemoryAuth;
pub use supabase::SupabaseAuth;

/// Message shown instead of the provider's credential-mismatch error.
pub const NOT_REGISTERED_HINT: &str =
    "Invalid email or password. If you haven't registered yet, please sign up first.";

/// Provider wording for a wrong email/password pair.
const CREDENTIAL_MISMATCH: &str = "Invalid login credentials";

/// Result of a sign-up.
///
/// `session` is absent when the provider requires email confirmation first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user: User,
    pub session: Option<Session>,
}

/// Identity provider operations.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> TasksResult<Session>;

    /// Register a new account.
    async fn sign_up(&self, email: &str, password: &str, name: Option<&str>)
        -> TasksResult<Registration>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> TasksResult<()>;

    /// Resolve the user owning `access_token`.
    async fn current_user(&self, access_token: &str) -> TasksResult<User>;
}

/// Provider messages pass through, except the credential mismatch.
pub fn user_facing_message(provider_message: &str) -> String {
    if provider_message.contains(CREDENTIAL_MISMATCH) {
        NOT_REGISTERED_HINT.to_string()
    } else {
        provider_message.to_string()
    }
}
