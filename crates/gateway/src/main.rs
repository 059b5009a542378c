//! taskmind server binary.
//!
//! Wires the whole system together: config, provider, circuit breaker,
//! stores, context cache, orchestrator, fallback policy, and the HTTP
//! router. All instances are constructed here and injected; nothing in
//! the system reaches for a global.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use taskmind_agent::{AgentOrchestrator, ContextCache, FallbackPolicy};
use taskmind_config::AppConfig;
use taskmind_core::event::EventBus;
use taskmind_core::provider::Provider;
use taskmind_core::store::{ConversationStore, TaskStore};
use taskmind_gateway::{build_router, GatewayState};
use taskmind_resilience::CircuitBreaker;
use taskmind_store::{InMemoryConversationStore, InMemoryTaskStore};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskmind", version, about = "Conversational task-management agent server")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "taskmind.toml")]
    config: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config).context("loading configuration")?;
    config.apply_env_overrides();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if !config.has_api_key() {
        warn!("No API key configured; provider calls will fail until one is supplied");
    }

    let provider = taskmind_providers::build_from_config(&config);
    match provider.health_check().await {
        Ok(true) => info!(provider = %provider.name(), "Provider reachable"),
        Ok(false) => warn!(provider = %provider.name(), "Provider endpoint answered unhealthy"),
        Err(e) => warn!(provider = %provider.name(), error = %e, "Provider health check failed"),
    }
    let breaker = Arc::new(CircuitBreaker::new(
        config.breaker.failure_threshold,
        Duration::from_secs(config.breaker.recovery_timeout_secs),
    ));
    let tasks: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let conversations: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());
    let cache = Arc::new(ContextCache::new(
        conversations.clone(),
        Duration::from_secs(config.cache.ttl_secs),
    ));
    let events = Arc::new(EventBus::default());

    // Log domain events as they happen.
    let mut event_rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            debug!(?event, "domain event");
        }
    });

    let orchestrator = AgentOrchestrator::new(
        provider,
        breaker,
        cache,
        conversations,
        events,
        config.provider.model.clone(),
        config.agent.clone(),
    );
    let fallback = FallbackPolicy::new(config.fallback.clone());

    let state = Arc::new(GatewayState {
        orchestrator,
        fallback,
        tasks,
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(%addr, model = %config.provider.model, "taskmind listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;

    Ok(())
}
