//! In-process identity provider for local runs and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{user_facing_message, Authenticator, Registration};
use crate::entities::{Session, User};
use crate::errors::{TasksError, TasksResult};

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
}

/// Accounts and sessions held in memory. Clones share state.
///
/// Passwords are kept as given; not for production use.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuth {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    async fn open_session(&self, user: User) -> Session {
        let token = Uuid::new_v4().to_string();
        self.inner
            .write()
            .await
            .sessions
            .insert(token.clone(), user.email.clone());
        Session {
            access_token: token,
            refresh_token: None,
            user,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl Authenticator for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> TasksResult<Session> {
        let email = normalize_email(email);
        let user = {
            let inner = self.inner.read().await;
            match inner.accounts.get(&email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => {
                    return Err(TasksError::Auth {
                        message: user_facing_message("Invalid login credentials"),
                    })
                }
            }
        };
        Ok(self.open_session(user).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> TasksResult<Registration> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(TasksError::Auth {
                message: "Unable to validate email address: invalid format".to_string(),
            });
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(TasksError::Auth {
                message: format!("Password should be at least {MIN_PASSWORD_CHARS} characters."),
            });
        }

        let user = {
            let mut inner = self.inner.write().await;
            if inner.accounts.contains_key(&email) {
                return Err(TasksError::Auth {
                    message: "User already registered".to_string(),
                });
            }
            let user = User::new(Uuid::new_v4().to_string(), email.clone(), name);
            inner.accounts.insert(
                email,
                Account {
                    user: user.clone(),
                    password: password.to_string(),
                },
            );
            user
        };

        info!(user_id = %user.id, "Registered user");
        let session = self.open_session(user.clone()).await;
        Ok(Registration {
            user,
            session: Some(session),
        })
    }

    async fn sign_out(&self, access_token: &str) -> TasksResult<()> {
        self.inner
            .write()
            .await
            .sessions
            .remove(access_token)
            .map(|_| ())
            .ok_or(TasksError::Unauthorized)
    }

    async fn current_user(&self, access_token: &str) -> TasksResult<User> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(access_token)
            .and_then(|email| inner.accounts.get(email))
            .map(|account| account.user.clone())
            .ok_or(TasksError::Unauthorized)
    }
}
