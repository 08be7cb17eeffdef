//! Query Builder: turns a profile into the analysis prompt, the search queries, and the
//! per-role lookup prompts. Pure string work with no I/O.

use crate::analysis::profile::UserProfile;
use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, CAREER_ANALYST_SYSTEM, NO_SEARCH_CONTEXT,
    ROLE_LOOKUP_PROMPT_TEMPLATE, ROLE_LOOKUP_SYSTEM,
};
use crate::analysis::report::Section;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::search::SearchResult;

const ANY_LOCATION: &str = "Any / flexible";
const NO_GOALS: &str = "Not specified";

/// Number of search hits rendered into a prompt.
pub const SEARCH_CONTEXT_HITS: usize = 5;

/// Everything needed for one main-analysis provider call.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub profile: UserProfile,
    pub system_prompt: String,
    pub prompt: String,
    /// Rendered search block, `None` when search was skipped or failed.
    pub search_context: Option<String>,
}

/// Builds the main analysis prompt without search context. Deterministic.
pub fn build_prompt(profile: &UserProfile) -> String {
    render_analysis_prompt(profile, NO_SEARCH_CONTEXT)
}

/// Short web-search query for the profile as a whole.
pub fn build_search_query(profile: &UserProfile) -> String {
    let skills = profile
        .skills
        .iter()
        .take(4)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let mut query = format!(
        "{skills} jobs {} hiring salary",
        profile.experience_level.tier().to_lowercase()
    );
    if let Some(location) = &profile.preferred_location {
        query.push(' ');
        query.push_str(location);
    }
    query
}

/// Search query for one role's companies and salaries.
pub fn build_role_search_query(role: &str, profile: &UserProfile) -> String {
    let location = profile.preferred_location.as_deref().unwrap_or("");
    format!("{role} companies hiring salary range {location}")
        .trim_end()
        .to_string()
}

pub fn build_request(profile: &UserProfile, search: Option<&SearchResult>) -> AnalysisRequest {
    let search_context = search
        .filter(|s| !s.is_empty())
        .map(|s| render_search_block(s, SEARCH_CONTEXT_HITS));

    let prompt = render_analysis_prompt(
        profile,
        search_context.as_deref().unwrap_or(NO_SEARCH_CONTEXT),
    );

    AnalysisRequest {
        profile: profile.clone(),
        system_prompt: CAREER_ANALYST_SYSTEM.to_string(),
        prompt,
        search_context,
    }
}

/// Returns `(system, prompt)` for one per-role JSON lookup.
pub fn build_role_lookup_prompt(
    role: &str,
    profile: &UserProfile,
    search: Option<&SearchResult>,
) -> (String, String) {
    let search_context = search
        .filter(|s| !s.is_empty())
        .map(|s| render_search_block(s, SEARCH_CONTEXT_HITS))
        .unwrap_or_else(|| NO_SEARCH_CONTEXT.to_string());

    let skills = profile.skills_list();
    let prompt = fill_template(
        ROLE_LOOKUP_PROMPT_TEMPLATE,
        &[
            ("role", role),
            ("skills", skills.as_str()),
            ("experience_level", profile.experience_level.label()),
            ("location", location(profile)),
            ("search_context", search_context.as_str()),
            ("grounding", GROUNDING_INSTRUCTION),
        ],
    );

    (format!("{ROLE_LOOKUP_SYSTEM}\n{JSON_ONLY_SYSTEM}"), prompt)
}

/// One marker per line, in canonical order. Role bullets are requested explicitly so
/// role extraction has a stable anchor.
fn section_format() -> String {
    Section::ALL
        .iter()
        .map(|section| match section {
            Section::EligibleJobRoles => format!(
                "{}\n- <Job Title>: <one-line reason> (one bullet per role, 5 to 7 roles)",
                section.marker()
            ),
            _ => section.marker(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_analysis_prompt(profile: &UserProfile, search_context: &str) -> String {
    let skills = profile.skills_list();
    let section_format = section_format();
    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("skills", skills.as_str()),
            ("experience_level", profile.experience_level.label()),
            ("location", location(profile)),
            (
                "career_goals",
                profile.career_goals.as_deref().unwrap_or(NO_GOALS),
            ),
            ("search_context", search_context),
            ("grounding", GROUNDING_INSTRUCTION),
            ("section_format", section_format.as_str()),
        ],
    )
}

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted values are
/// never rescanned, so braces in skills, goals or search snippets stay literal.
/// Braces that do not name a known placeholder (the JSON schema) are kept as-is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match substitution {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_search_block(result: &SearchResult, limit: usize) -> String {
    format!(
        "Real-time search results for \"{}\":\n{}",
        result.query,
        result.as_context(limit)
    )
}

fn location(profile: &UserProfile) -> &str {
    profile
        .preferred_location
        .as_deref()
        .unwrap_or(ANY_LOCATION)
}
