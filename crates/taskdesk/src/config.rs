//! Configuration for the taskdesk service.

use std::env;
use std::str::FromStr;

use tasks::ai::{DEFAULT_MODEL, GROQ_API_KEY_ENV, GROQ_API_URL};
use tasks::SupabaseConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

/// Service configuration, read from the environment.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Address to bind.
    pub bind: String,
    /// Supabase project URL.
    pub supabase_url: Option<String>,
    /// Supabase anonymous key.
    pub supabase_anon_key: Option<String>,
    /// Groq API key for extraction.
    pub groq_api_key: Option<String>,
    /// Model used for extraction.
    pub extraction_model: String,
    /// Chat completions endpoint.
    pub llm_api_url: String,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind", &self.bind)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &self.supabase_anon_key.as_ref().map(|_| "***"))
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "***"))
            .field("extraction_model", &self.extraction_model)
            .field("llm_api_url", &self.llm_api_url)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("TASKDESK_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            bind: non_empty("TASKDESK_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            supabase_url: non_empty("SUPABASE_URL"),
            supabase_anon_key: non_empty("SUPABASE_ANON_KEY"),
            groq_api_key: non_empty(GROQ_API_KEY_ENV),
            extraction_model: non_empty("EXTRACTION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_api_url: non_empty("LLM_API_URL").unwrap_or_else(|| GROQ_API_URL.to_string()),
            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Store and identity provider settings; blank when unset.
    pub fn supabase(&self) -> SupabaseConfig {
        SupabaseConfig::new(
            self.supabase_url.clone().unwrap_or_default(),
            self.supabase_anon_key.clone().unwrap_or_default(),
        )
    }

    /// Names of the unset store variables.
    pub fn missing_supabase_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supabase_url.is_none() {
            missing.push("SUPABASE_URL");
        }
        if self.supabase_anon_key.is_none() {
            missing.push("SUPABASE_ANON_KEY");
        }
        missing
    }

    /// `bind:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Use a mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 8] = [
        "TASKDESK_PORT",
        "TASKDESK_BIND",
        "SUPABASE_URL",
        "SUPABASE_ANON_KEY",
        "GROQ_API_KEY",
        "EXTRACTION_MODEL",
        "LLM_API_URL",
        "LOG_FORMAT",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear();

        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.extraction_model, DEFAULT_MODEL);
        assert_eq!(config.llm_api_url, GROQ_API_URL);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(
            config.missing_supabase_vars(),
            vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"]
        );
        assert!(!config.supabase().is_configured());
    }

    #[test]
    fn test_config_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear();

        env::set_var("TASKDESK_PORT", "8080");
        env::set_var("SUPABASE_URL", "https://demo.supabase.co/");
        env::set_var("SUPABASE_ANON_KEY", "anon");
        env::set_var("GROQ_API_KEY", "  ");
        env::set_var("LOG_FORMAT", "json");

        let config = Config::from_env();
        assert_eq!(config.port, 8080);
        assert!(config.missing_supabase_vars().is_empty());
        assert!(config.supabase().is_configured());
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.log_format, LogFormat::Json);

        clear();
    }

    #[test]
    fn test_debug_hides_secrets() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear();
        env::set_var("SUPABASE_ANON_KEY", "super-secret");

        let rendered = format!("{:?}", Config::from_env());
        assert!(!rendered.contains("super-secret"));

        clear();
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
