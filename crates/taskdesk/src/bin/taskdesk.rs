//! Taskdesk service binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tasks::{
    Authenticator, MemoryAuth, MemoryStorage, OpenAIProvider, Storage, SupabaseAuth,
    SupabaseStorage, TaskExtractor,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskdesk::{run_server, AppState, Config, LogFormat};

const DEFAULT_LOG_FILTER: &str = "taskdesk=info,tasks=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about = "Personal task board service")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "TASKDESK_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "TASKDESK_BIND")]
    bind: Option<String>,

    /// Keep tasks and accounts in memory instead of Supabase
    #[arg(long)]
    memory_store: bool,

    /// Log output format (text or json)
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(DEFAULT_LOG_FILTER).context("Invalid default log filter")?,
    };

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }

    init_tracing(config.log_format)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Could not read environment file"),
    }

    info!("Starting taskdesk...");

    let (storage, auth): (Arc<dyn Storage>, Arc<dyn Authenticator>) = if args.memory_store {
        warn!("Using in-memory store; data is lost on exit");
        (Arc::new(MemoryStorage::new()), Arc::new(MemoryAuth::new()))
    } else {
        let missing = config.missing_supabase_vars();
        if !missing.is_empty() {
            // Keep serving; store calls fail until configured
            error!(
                missing = %missing.join(", "),
                "Supabase is not configured, task and auth requests will fail"
            );
        }
        let supabase = config.supabase();
        (
            Arc::new(SupabaseStorage::new(supabase.clone())),
            Arc::new(SupabaseAuth::new(supabase)),
        )
    };

    let provider = OpenAIProvider::groq(config.groq_api_key.clone())
        .with_base_url(config.llm_api_url.clone());
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY is not set, task extraction will fail");
    }
    let extractor = TaskExtractor::new(Arc::new(provider), config.extraction_model.clone());

    info!(
        storage = storage.storage_type(),
        model = %config.extraction_model,
        "Services configured"
    );

    let state = AppState::new(storage, auth, Arc::new(extractor));
    run_server(state, &config.listen_addr()).await
}
