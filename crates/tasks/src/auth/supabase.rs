//! GoTrue (Supabase Auth) client.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{user_facing_message, Authenticator, Registration};
use crate::entities::{Session, User};
use crate::errors::{TasksError, TasksResult};
use crate::supabase::{error_message, SupabaseConfig, SERVICE};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<AuthUser> for User {
    fn from(user: AuthUser) -> Self {
        let name = user.user_metadata.and_then(|m| m.name);
        Self::new(user.id, user.email.unwrap_or_default(), name.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

/// Sign-up answers with a session, or with the bare user when email
/// confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(SessionResponse),
    User(AuthUser),
}

/// Supabase Auth gateway.
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseAuth {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: SupabaseConfig) -> Self {
        Self { client, config }
    }

    fn post(&self, path: &str) -> TasksResult<RequestBuilder> {
        let config = self.config.require()?;
        Ok(self
            .client
            .post(config.endpoint(path))
            .header("apikey", &config.anon_key))
    }

    fn get(&self, path: &str) -> TasksResult<RequestBuilder> {
        let config = self.config.require()?;
        Ok(self
            .client
            .get(config.endpoint(path))
            .header("apikey", &config.anon_key))
    }

    /// Send a request and decode a successful body.
    ///
    /// Client errors become user-facing `Auth` errors; everything else is a
    /// provider failure.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> TasksResult<Option<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| TasksError::provider(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TasksError::provider(SERVICE, format!("failed to read response: {e}")))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Rejected tokens and rejected credentials share these codes
            let message = error_message(&body);
            warn!(%status, %message, "Auth request rejected");
            return Err(if message.contains("Invalid login credentials") {
                TasksError::Auth {
                    message: user_facing_message(&message),
                }
            } else {
                TasksError::Unauthorized
            });
        }
        if status.is_client_error() {
            let message = error_message(&body);
            warn!(%status, %message, "Auth request failed");
            return Err(TasksError::Auth {
                message: user_facing_message(&message),
            });
        }
        if !status.is_success() {
            return Err(TasksError::provider(
                SERVICE,
                format!("{status}: {}", error_message(&body)),
            ));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| TasksError::provider(SERVICE, format!("unexpected response: {e}")))
    }

    fn session_from(response: SessionResponse, missing_user: &str) -> TasksResult<Session> {
        let user = response.user.ok_or_else(|| TasksError::Auth {
            message: missing_user.to_string(),
        })?;
        Ok(Session {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            user: User::from(user),
        })
    }
}

#[async_trait]
impl Authenticator for SupabaseAuth {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> TasksResult<Session> {
        let request = self
            .post("auth/v1/token")?
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });

        let response: SessionResponse =
            self.send(request).await?.ok_or_else(|| TasksError::Auth {
                message: "No user returned from authentication".to_string(),
            })?;

        let session = Self::session_from(response, "No user returned from authentication")?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> TasksResult<Registration> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let request = self.post("auth/v1/signup")?.json(&SignUpRequest {
            email,
            password,
            data: SignUpMetadata { name },
        });

        let response: SignUpResponse =
            self.send(request).await?.ok_or_else(|| TasksError::Auth {
                message: "No user returned from registration".to_string(),
            })?;

        let registration = match response {
            SignUpResponse::Session(response) => {
                let mut session =
                    Self::session_from(response, "No user returned from registration")?;
                if let Some(name) = name {
                    session.user.name = name.to_string();
                }
                Registration {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => {
                let mut user = User::from(user);
                if let Some(name) = name {
                    user.name = name.to_string();
                }
                Registration {
                    user,
                    session: None,
                }
            }
        };

        info!(
            user_id = %registration.user.id,
            confirmed = registration.session.is_some(),
            "Registered user"
        );
        Ok(registration)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> TasksResult<()> {
        let request = self
            .post("auth/v1/logout")?
            .header(AUTHORIZATION, format!("Bearer {access_token}"));

        self.send::<serde_json::Value>(request).await?;
        debug!("Signed out");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, access_token: &str) -> TasksResult<User> {
        let request = self
            .get("auth/v1/user")?
            .header(AUTHORIZATION, format!("Bearer {access_token}"));

        let user: AuthUser = self
            .send(request)
            .await?
            .ok_or(TasksError::Unauthorized)?;
        Ok(User::from(user))
    }
}
