//! Orchestrator: runs one analysis from profile to assembled report.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::analysis::assembler::assemble;
use crate::analysis::normalizer::{default_role_lookup, extract_roles, parse_role_lookup, split_sections};
use crate::analysis::profile::UserProfile;
use crate::analysis::query_builder::{
    build_request, build_role_lookup_prompt, build_role_search_query, build_search_query,
};
use crate::analysis::report::{CareerReport, RoleLookup, Section, MARKER_PROTOCOL_VERSION};
use crate::errors::AppError;
use crate::llm_client::ProviderChain;
use crate::search::{SearchError, SearchResult, WebSearch};

pub const DEFAULT_MAX_ROLES: usize = 7;

#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    /// Upper bound on roles taken from the analysis, and so on per-role lookups.
    pub max_roles: usize,
    /// Run per-role lookups concurrently. Results keep role order either way.
    pub parallel_lookups: bool,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            max_roles: DEFAULT_MAX_ROLES,
            parallel_lookups: false,
        }
    }
}

pub struct CareerNavigator {
    chain: ProviderChain,
    search: Arc<dyn WebSearch>,
    options: NavigatorOptions,
}

impl CareerNavigator {
    pub fn new(chain: ProviderChain, search: Arc<dyn WebSearch>, options: NavigatorOptions) -> Self {
        Self {
            chain,
            search,
            options,
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.chain.provider_names()
    }

    /// Produces a four-section report. The only error is a profile without skills,
    /// rejected before any provider or search call.
    pub async fn analyze(&self, profile: &UserProfile) -> Result<CareerReport, AppError> {
        profile.validate()?;
        info!(
            "Analyzing {} skills at {}",
            profile.skills.len(),
            profile.experience_level.tier()
        );

        let search = self.search_or_degrade(&build_search_query(profile)).await;
        let request = build_request(profile, search.as_ref());
        debug!(
            "Built analysis prompt for {} skills (search context: {}, marker protocol v{})",
            request.profile.skills.len(),
            request.search_context.is_some(),
            MARKER_PROTOCOL_VERSION
        );
        let response = self
            .chain
            .generate(&request.prompt, &request.system_prompt)
            .await;

        let analysis = split_sections(&response.text);
        let roles = extract_roles(
            analysis.body(Section::EligibleJobRoles),
            self.options.max_roles,
        );
        info!(
            "Analysis from {} matched {}/4 sections, {} roles",
            response.provider,
            analysis.matched,
            roles.len()
        );

        let lookups = if response.degraded {
            // No provider answered; per-role calls would fail the same way.
            roles.iter().map(|role| default_role_lookup(role)).collect()
        } else {
            self.lookup_roles(&roles, profile).await
        };

        Ok(assemble(profile, analysis, roles, lookups, response.degraded))
    }

    /// Runs a search, turning any failure into `None`.
    async fn search_or_degrade(&self, query: &str) -> Option<SearchResult> {
        match self.search.search(query).await {
            Ok(result) => Some(result),
            Err(SearchError::NotConfigured) => None,
            Err(e) => {
                warn!(status = ?e.status(), "Search failed, continuing without it: {e}");
                None
            }
        }
    }

    async fn lookup_roles(&self, roles: &[String], profile: &UserProfile) -> Vec<RoleLookup> {
        if self.options.parallel_lookups {
            join_all(roles.iter().map(|role| self.lookup_role(role, profile))).await
        } else {
            let mut lookups = Vec::with_capacity(roles.len());
            for role in roles {
                lookups.push(self.lookup_role(role, profile).await);
            }
            lookups
        }
    }

    /// One role's companies, skill gaps and salaries. Never fails.
    async fn lookup_role(&self, role: &str, profile: &UserProfile) -> RoleLookup {
        let search = self
            .search_or_degrade(&build_role_search_query(role, profile))
            .await;
        let (system, prompt) = build_role_lookup_prompt(role, profile, search.as_ref());
        let response = self.chain.generate(&prompt, &system).await;

        if response.degraded {
            warn!("Lookup for '{role}' had no provider answer; using defaults");
            return default_role_lookup(role);
        }
        parse_role_lookup(role, &response.text)
    }
}
