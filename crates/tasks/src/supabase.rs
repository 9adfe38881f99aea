//! Connection settings and response helpers shared by the Supabase gateways.

use serde::Deserialize;

use crate::errors::{TasksError, TasksResult};

/// Service name used in provider errors and log fields.
pub const SERVICE: &str = "supabase";

/// Project URL and anonymous key of a Supabase project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Both the URL and the key are present.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    /// Fail with `NotConfigured` unless both settings are present.
    pub fn require(&self) -> TasksResult<&Self> {
        if self.is_configured() {
            Ok(self)
        } else {
            Err(TasksError::NotConfigured {
                service: SERVICE.to_string(),
            })
        }
    }

    /// Endpoint under the project URL, e.g. `endpoint("rest/v1/tasks")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// The error body shapes returned by PostgREST and GoTrue.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Best-effort human message from an error response body.
pub fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string())
}
