use anyhow::{Context, Result};

use crate::llm_client::ProviderDescriptor;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Application configuration loaded from environment variables.
///
/// Provider keys are optional: a missing primary key or an empty fallback list
/// only narrows the provider chain, it never prevents the service from starting.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub tavily_api_key: Option<String>,
    /// Ordered secondary text-generation endpoints, tried after the primary fails.
    pub fallback_providers: Vec<ProviderDescriptor>,
    pub provider_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub max_roles: usize,
    pub parallel_lookups: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let fallback_providers = match optional_env("FALLBACK_PROVIDERS") {
            Some(raw) => parse_fallback_providers(&raw)?,
            None => Vec::new(),
        };

        Ok(Config {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            tavily_api_key: optional_env("TAVILY_API_KEY"),
            fallback_providers,
            provider_timeout_secs: parse_env("PROVIDER_TIMEOUT_SECS", 60)?,
            search_timeout_secs: parse_env("SEARCH_TIMEOUT_SECS", 20)?,
            max_roles: parse_env("MAX_ROLES", 7)?,
            parallel_lookups: parse_env("PARALLEL_LOOKUPS", false)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parses the `FALLBACK_PROVIDERS` JSON array. Order in the array is chain order.
pub fn parse_fallback_providers(raw: &str) -> Result<Vec<ProviderDescriptor>> {
    serde_json::from_str(raw)
        .context("FALLBACK_PROVIDERS must be a JSON array of provider descriptors")
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
