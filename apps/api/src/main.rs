mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod search;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{CareerNavigator, NavigatorOptions};
use crate::config::Config;
use crate::llm_client::{build_generator, ProviderChain, ProviderDescriptor};
use crate::routes::build_router;
use crate::search::{DisabledSearch, TavilyClient, WebSearch};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values, not on missing keys)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Navigator API v{}", env!("CARGO_PKG_VERSION"));

    let search: Arc<dyn WebSearch> = match &config.tavily_api_key {
        Some(key) => {
            info!("Search client initialized (Tavily)");
            Arc::new(TavilyClient::new(
                key.clone(),
                Duration::from_secs(config.search_timeout_secs),
            )?)
        }
        None => {
            warn!("TAVILY_API_KEY not set; analyses run without live search context");
            Arc::new(DisabledSearch)
        }
    };

    let navigator = CareerNavigator::new(
        build_chain(&config)?,
        search,
        NavigatorOptions {
            max_roles: config.max_roles,
            parallel_lookups: config.parallel_lookups,
        },
    );

    let providers = navigator.provider_names();
    if providers.is_empty() {
        warn!("No text providers configured; every analysis will use the canned fallback");
    } else {
        info!("Provider chain: {}", providers.join(" -> "));
    }

    let state = AppState {
        navigator: Arc::new(navigator),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Gemini (when keyed) is the primary; `FALLBACK_PROVIDERS` follow in configured order.
fn build_chain(config: &Config) -> Result<ProviderChain> {
    let primary = match &config.google_api_key {
        Some(key) => Some(build_generator(&ProviderDescriptor::gemini(
            key.clone(),
            config.gemini_model.clone(),
            config.provider_timeout_secs,
        ))?),
        None => {
            warn!("GOOGLE_API_KEY not set; skipping primary provider");
            None
        }
    };

    let fallbacks = config
        .fallback_providers
        .iter()
        .map(|descriptor| {
            let mut descriptor = descriptor.clone();
            descriptor
                .timeout_secs
                .get_or_insert(config.provider_timeout_secs);
            build_generator(&descriptor)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProviderChain::new(primary, fallbacks))
}
