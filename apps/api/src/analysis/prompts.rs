// All LLM prompt constants for the Analysis module.
// Cross-cutting fragments (grounding, JSON-only) live in llm_client::prompts.

/// System prompt for the main skills → jobs analysis.
pub const CAREER_ANALYST_SYSTEM: &str = "\
You are an expert career counselor and job market analyst with deep knowledge of various \
industries, job roles, and skill requirements. Your role is to analyze a person's skills and \
provide comprehensive job matching analysis based on real-time market data.

You have access to web search results about current job market trends, specific job role \
requirements, company hiring practices and salary ranges, and industry-specific requirements.

Always provide accurate, up-to-date information based on real market data, never use \
synthetic or placeholder information. Focus on actionable insights that help the person make \
informed career decisions.";

/// Main analysis prompt. Placeholders: `{skills}`, `{experience_level}`, `{location}`,
/// `{career_goals}`, `{search_context}`, `{grounding}`, `{section_format}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze job opportunities for a candidate with the following profile:

Skills: {skills}
Experience Level: {experience_level}
Preferred Location: {location}
Career Goals: {career_goals}

{search_context}

Perform the following analysis:

1. Eligible Job Roles: identify specific job titles the candidate qualifies for, with requirements and market demand. Include entry-level and advanced positions that fit the experience level.
2. Skill Gap Analysis: compare the candidate's skills with the requirements of those roles, list missing skills by priority, and suggest learning resources and certifications.
3. Companies Hiring: list companies actively hiring for these roles, including established companies and startups, with role details.
4. Salary Packages: give current salary ranges for the identified roles, considering location and experience level, plus progression paths.

{grounding}

Return all information using EXACTLY these four section markers, each on its own line, in this order:
{section_format}

Do not rename, bold, or translate the markers."#;

/// Persona for per-role lookups. Combined with `JSON_ONLY_SYSTEM` by the query builder.
pub const ROLE_LOOKUP_SYSTEM: &str = "\
You are a job market researcher. You report hiring companies, missing skills and salary \
ranges for a single job role.";

/// Per-role lookup prompt. Placeholders: `{role}`, `{skills}`, `{experience_level}`,
/// `{location}`, `{search_context}`, `{grounding}`.
pub const ROLE_LOOKUP_PROMPT_TEMPLATE: &str = r#"Target role: {role}
Candidate skills: {skills}
Candidate experience level: {experience_level}
Location: {location}

{search_context}

{grounding}

Return a JSON object with this EXACT schema (no extra fields):
{
  "companies": ["Company name", "Company name"],
  "missing_skills": ["Skill the candidate lacks for this role"],
  "salary_ranges": {
    "Entry Level": "range with currency and period",
    "Mid Level": "range with currency and period",
    "Senior Level": "range with currency and period"
  }
}

List up to 6 companies that are hiring for this role now. Salary ranges must reflect the location above."#;

/// Rendered into `{search_context}` when search returned nothing usable.
pub const NO_SEARCH_CONTEXT: &str =
    "No live search results are available for this request; rely on your most recent market knowledge and say where data may be dated.";
