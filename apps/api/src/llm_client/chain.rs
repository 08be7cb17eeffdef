//! Provider chain: primary provider, ordered fallbacks, and a canned terminal answer.
//!
//! Each provider is tried at most once per request. There is no backoff: a failure of
//! any kind (transport, timeout, non-2xx, error payload, blank body) moves on to the
//! next entry. When every entry fails the chain still answers, with `CANNED_ANALYSIS`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{GenerationError, TextGenerator};

/// Provider id reported when the canned answer is used.
pub const CANNED_PROVIDER: &str = "canned-fallback";

/// Generic, clearly labeled analysis returned when no provider produced usable text.
/// Uses the same section markers the analysis prompt asks for.
pub const CANNED_ANALYSIS: &str = "\
[Generic analysis: live market data was unavailable, so this report contains general guidance only.]

*Eligible Job Roles:*
- Software Developer: builds and maintains applications using your listed skills.
- Data Analyst: turns business data into reports and insights.
- Technical Support Engineer: troubleshoots systems and supports users.
- Quality Assurance Engineer: designs and runs tests for software products.
- IT Project Coordinator: tracks delivery of technical projects.

*Skill Gap Analysis:*
Compare your skills with current postings for the roles above. Common gaps include cloud platforms, version control, automated testing and communication of technical results. Prioritize the gaps that appear most often in postings you want.

*Companies Hiring:*
Live hiring data was unavailable. Check major job boards, company career pages and local technology meetups for current openings.

*Salary Packages:*
Live salary data was unavailable. Use published salary surveys for your location and experience level as a starting point.
";

/// Text produced for one prompt, with its origin.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub provider: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
    /// True when the text is the canned fallback rather than provider output.
    pub degraded: bool,
}

impl RawResponse {
    fn canned() -> Self {
        Self {
            provider: CANNED_PROVIDER.to_string(),
            text: CANNED_ANALYSIS.to_string(),
            received_at: Utc::now(),
            degraded: true,
        }
    }
}

/// Ordered provider list. Cheap to clone; providers are shared.
#[derive(Clone, Default)]
pub struct ProviderChain {
    primary: Option<Arc<dyn TextGenerator>>,
    fallbacks: Vec<Arc<dyn TextGenerator>>,
}

impl ProviderChain {
    pub fn new(
        primary: Option<Arc<dyn TextGenerator>>,
        fallbacks: Vec<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self { primary, fallbacks }
    }

    /// Provider names in the order they are attempted.
    pub fn provider_names(&self) -> Vec<String> {
        self.primary
            .iter()
            .chain(self.fallbacks.iter())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Obtains text for a prompt. Never fails: the last resort is the canned analysis.
    pub async fn generate(&self, prompt: &str, system: &str) -> RawResponse {
        match &self.primary {
            Some(primary) => match attempt(primary.as_ref(), prompt, system).await {
                Ok(text) => return success(primary.as_ref(), text),
                Err(e) => warn!("Primary provider {} failed: {e}", primary.name()),
            },
            None => warn!("No primary provider configured"),
        }

        // Secondary tier is only entered when one is configured.
        for (index, provider) in self.fallbacks.iter().enumerate() {
            match attempt(provider.as_ref(), prompt, system).await {
                Ok(text) => {
                    info!(
                        "Fallback provider {} ({}/{}) succeeded",
                        provider.name(),
                        index + 1,
                        self.fallbacks.len()
                    );
                    return success(provider.as_ref(), text);
                }
                Err(e) => warn!("Fallback provider {} failed: {e}", provider.name()),
            }
        }

        warn!("All text providers failed; using canned analysis");
        RawResponse::canned()
    }
}

/// One bounded call. Blank output counts as a failure.
async fn attempt(
    provider: &dyn TextGenerator,
    prompt: &str,
    system: &str,
) -> Result<String, GenerationError> {
    let limit = provider.timeout();
    let text = tokio::time::timeout(limit, provider.generate(prompt, system))
        .await
        .map_err(|_| GenerationError::Timeout(limit))??;

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }
    Ok(text)
}

fn success(provider: &dyn TextGenerator, text: String) -> RawResponse {
    RawResponse {
        provider: provider.name().to_string(),
        text,
        received_at: Utc::now(),
        degraded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::FakeGenerator;
    use std::time::Duration;

    #[tokio::test]
    async fn test_primary_success_skips_fallbacks() {
        let primary = FakeGenerator::replying("primary", "primary text");
        let fallback = FakeGenerator::replying("fallback", "fallback text");
        let chain = ProviderChain::new(Some(primary.shared()), vec![fallback.shared()]);

        let response = chain.generate("prompt", "system").await;
        assert_eq!(response.text, "primary text");
        assert_eq!(response.provider, "primary");
        assert!(!response.degraded);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallbacks_tried_in_order_until_first_success() {
        let primary = FakeGenerator::failing("primary");
        let empty = FakeGenerator::replying("blank", "   \n\t");
        let good = FakeGenerator::replying("good", "usable");
        let never = FakeGenerator::replying("never", "unused");
        let chain = ProviderChain::new(
            Some(primary.shared()),
            vec![empty.shared(), good.shared(), never.shared()],
        );

        let response = chain.generate("prompt", "system").await;
        assert_eq!(response.provider, "good");
        assert_eq!(response.text, "usable");
        assert_eq!(primary.calls(), 1);
        assert_eq!(empty.calls(), 1);
        assert_eq!(good.calls(), 1);
        assert_eq!(never.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_failures_return_canned_analysis() {
        let primary = FakeGenerator::failing("primary");
        let fallback = FakeGenerator::failing("fallback");
        let chain = ProviderChain::new(Some(primary.shared()), vec![fallback.shared()]);

        let response = chain.generate("prompt", "system").await;
        assert!(response.degraded);
        assert_eq!(response.provider, CANNED_PROVIDER);
        assert_eq!(response.text, CANNED_ANALYSIS);
        // at most once each, no retries
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_secondary_tier_goes_straight_to_canned() {
        let primary = FakeGenerator::failing("primary");
        let chain = ProviderChain::new(Some(primary.shared()), vec![]);

        let response = chain.generate("prompt", "system").await;
        assert!(response.degraded);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_primary_uses_fallback() {
        let fallback = FakeGenerator::replying("fallback", "from fallback");
        let chain = ProviderChain::new(None, vec![fallback.shared()]);

        let response = chain.generate("prompt", "system").await;
        assert_eq!(response.text, "from fallback");
    }

    #[tokio::test]
    async fn test_empty_chain_is_canned() {
        let response = ProviderChain::default().generate("prompt", "system").await;
        assert!(response.degraded);
        assert_eq!(response.text, CANNED_ANALYSIS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out_and_chain_advances() {
        let slow = FakeGenerator::hanging("slow", Duration::from_secs(5));
        let good = FakeGenerator::replying("good", "in time");
        let chain = ProviderChain::new(Some(slow.shared()), vec![good.shared()]);

        let response = chain.generate("prompt", "system").await;
        assert_eq!(response.provider, "good");
        assert_eq!(slow.calls(), 1);
    }

    #[test]
    fn test_provider_names_in_attempt_order() {
        let chain = ProviderChain::new(
            Some(FakeGenerator::replying("a", "x").shared()),
            vec![
                FakeGenerator::replying("b", "x").shared(),
                FakeGenerator::replying("c", "x").shared(),
            ],
        );
        assert_eq!(chain.provider_names(), vec!["a", "b", "c"]);
    }
}
