//! Response Normalizer: converts model-authored text into the fixed report shape.
//!
//! Nothing in this module returns an error. Unmarked analysis text lands in a general
//! bucket, malformed lookup JSON becomes `default_role_lookup`, and every string that
//! leaves here has its angle brackets escaped.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::report::{LookupSource, RoleLookup, SalaryBand, Section};
use crate::llm_client::strip_json_fences;

const MAX_COMPANIES: usize = 8;
const MAX_MISSING_SKILLS: usize = 8;
/// Bullet text longer than this is prose, not a job title.
const MAX_ROLE_LEN: usize = 80;

/// Section bodies recovered from one analysis response.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnalysis {
    /// Always the four canonical sections, in `Section::ALL` order, each non-empty.
    pub sections: Vec<(Section, String)>,
    /// Whole sanitized response when no marker was found.
    pub general: Option<String>,
    /// Number of distinct sections recovered from markers.
    pub matched: usize,
}

impl NormalizedAnalysis {
    pub fn body(&self, section: Section) -> &str {
        &self.sections[section.index()].1
    }
}

/// Marker regex for protocol version 1: `*Title:*`, tolerating up to three asterisks on
/// either side, whitespace around the title, any casing, and `*Title*:`.
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        let titles = Section::ALL
            .iter()
            .map(|s| s.title().replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?i)\*{{1,3}}[ \t]*({titles})[ \t]*(?::[ \t]*\*{{1,3}}|\*{{1,3}}[ \t]*:)"
        );
        Regex::new(&pattern).expect("marker pattern is valid")
    })
}

/// Splits raw analysis text on the section markers. Marker order in the source does not
/// matter; the first non-empty body for a section wins.
pub fn split_sections(raw: &str) -> NormalizedAnalysis {
    let markers: Vec<(Section, usize, usize)> = marker_regex()
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let section = Section::from_title(caps.get(1)?.as_str())?;
            Some((section, whole.start(), whole.end()))
        })
        .collect();

    if markers.is_empty() {
        let general = Some(escape_markup(raw.trim())).filter(|g| !g.is_empty());
        warn!("Analysis text carried no section markers; using general bucket");
        let sections = Section::ALL
            .iter()
            .map(|&section| {
                let body = match (&general, section) {
                    (Some(text), Section::EligibleJobRoles) => text.clone(),
                    _ => placeholder(section),
                };
                (section, body)
            })
            .collect();
        return NormalizedAnalysis {
            sections,
            general,
            matched: 0,
        };
    }

    let mut bodies: [Option<String>; 4] = Default::default();
    for (i, &(section, _, end)) in markers.iter().enumerate() {
        let next_start = markers.get(i + 1).map(|m| m.1).unwrap_or(raw.len());
        let body = raw[end..next_start].trim();
        let slot = &mut bodies[section.index()];
        if slot.is_none() && !body.is_empty() {
            *slot = Some(escape_markup(body));
        }
    }

    let matched = bodies.iter().filter(|b| b.is_some()).count();
    debug!("Recovered {matched}/4 sections from {} markers", markers.len());

    let sections = Section::ALL
        .iter()
        .map(|&section| {
            let body = bodies[section.index()]
                .take()
                .unwrap_or_else(|| placeholder(section));
            (section, body)
        })
        .collect();

    NormalizedAnalysis {
        sections,
        general: None,
        matched,
    }
}

/// Escapes `<` and `>`. Leaves `&` alone so the result is stable under re-escaping.
pub fn escape_markup(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

pub fn placeholder(section: Section) -> String {
    format!(
        "Structured data for {} was unavailable in this analysis.",
        section.title()
    )
}

/// Pulls job titles out of the top-level bullets of a roles section.
pub fn extract_roles(body: &str, max: usize) -> Vec<String> {
    let bullets: Vec<(usize, &str)> = body
        .lines()
        .filter_map(|line| {
            let indent = line.len() - line.trim_start().len();
            strip_bullet(line.trim_start()).map(|rest| (indent, rest))
        })
        .collect();

    let Some(top) = bullets.iter().map(|(indent, _)| *indent).min() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    bullets
        .into_iter()
        .filter(|(indent, _)| *indent == top)
        .filter_map(|(_, text)| role_title(text))
        .filter(|role| seen.insert(role.to_lowercase()))
        .take(max)
        .collect()
}

/// Returns the text after a `-`, `*`, `+`, `•` or `1.` / `1)` bullet.
fn strip_bullet(line: &str) -> Option<&str> {
    for bullet in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return Some(rest);
        }
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
}

fn role_title(text: &str) -> Option<String> {
    let plain: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    let cut = [":", " - ", " – ", " — ", "("]
        .iter()
        .filter_map(|sep| plain.find(sep))
        .min()
        .unwrap_or(plain.len());
    let title = plain[..cut].trim().trim_end_matches('.').trim();
    if title.is_empty() || title.len() > MAX_ROLE_LEN {
        return None;
    }
    Some(title.to_string())
}

/// Normalizes one per-role lookup response. The object must carry all three fields;
/// anything else yields the static default, never a mix of the two.
pub fn parse_role_lookup(role: &str, raw: &str) -> RoleLookup {
    match parse_lookup_payload(raw) {
        Some(payload) if !payload.is_empty() => RoleLookup {
            role: role.to_string(),
            companies: payload.companies,
            missing_skills: payload.missing_skills,
            salary_ranges: payload.salary_ranges,
            source: LookupSource::Parsed,
        },
        _ => {
            warn!("Role lookup for '{role}' was not usable JSON; using defaults");
            default_role_lookup(role)
        }
    }
}

/// Fixed entries used whenever a lookup cannot be parsed. Identical on every call.
pub fn default_role_lookup(role: &str) -> RoleLookup {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    RoleLookup {
        role: role.to_string(),
        companies: strings(&[
            "Google",
            "Microsoft",
            "Amazon",
            "Accenture",
            "Infosys",
        ]),
        missing_skills: strings(&[
            "Cloud platforms (AWS, Azure or GCP)",
            "Version control with Git",
            "Communication of technical results",
        ]),
        salary_ranges: [
            ("Entry Level", "Live salary data unavailable; consult a current salary survey"),
            ("Mid Level", "Live salary data unavailable; consult a current salary survey"),
            ("Senior Level", "Live salary data unavailable; consult a current salary survey"),
        ]
        .iter()
        .map(|(tier, range)| SalaryBand {
            tier: tier.to_string(),
            range: range.to_string(),
        })
        .collect(),
        source: LookupSource::Fallback,
    }
}

#[derive(Debug, Default)]
struct LookupPayload {
    companies: Vec<String>,
    missing_skills: Vec<String>,
    salary_ranges: Vec<SalaryBand>,
}

impl LookupPayload {
    fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.missing_skills.is_empty() && self.salary_ranges.is_empty()
    }
}

/// `None` for malformed JSON, a non-object value, or a missing or mistyped field.
fn parse_lookup_payload(raw: &str) -> Option<LookupPayload> {
    let text = strip_json_fences(raw);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let value: Value = match serde_json::from_str(&text[start..=end]) {
        Ok(v) => v,
        Err(e) => {
            debug!("Lookup JSON parse failed: {e}");
            return None;
        }
    };
    let Value::Object(object) = value else {
        return None;
    };

    Some(LookupPayload {
        companies: capped(dedup(string_list(object.get("companies"), &["name", "company"])?), MAX_COMPANIES),
        missing_skills: capped(dedup(string_list(object.get("missing_skills"), &["skill", "name"])?), MAX_MISSING_SKILLS),
        salary_ranges: salary_bands(object.get("salary_ranges"))?,
    })
}

/// Reads an array of strings, or of objects carrying one of `keys`.
fn string_list(value: Option<&Value>, keys: &[&str]) -> Option<Vec<String>> {
    let Some(Value::Array(items)) = value else {
        return None;
    };

    let mut out = Vec::new();
    for item in items {
        let text = match item {
            Value::String(s) => s.as_str(),
            Value::Object(map) => match keys.iter().find_map(|k| map.get(*k)?.as_str()) {
                Some(s) => s,
                None => continue,
            },
            _ => return None,
        };
        let text = text.trim();
        if !text.is_empty() {
            out.push(escape_markup(text));
        }
    }
    Some(out)
}

/// Accepts `{"Entry Level": "..."}` or `[{"tier": "...", "range": "..."}]`, sorted by tier.
fn salary_bands(value: Option<&Value>) -> Option<Vec<SalaryBand>> {
    let mut bands = match value? {
        Value::Object(map) => bands_from_map(map)?,
        Value::Array(items) => {
            let mut bands = Vec::new();
            for item in items {
                let map = item.as_object()?;
                let tier = map.get("tier").and_then(Value::as_str);
                let range = map.get("range").and_then(scalar_text);
                if let (Some(tier), Some(range)) = (tier, range) {
                    bands.push(band(tier, &range));
                }
            }
            bands
        }
        _ => return None,
    };
    bands.retain(|b| !b.tier.is_empty() && !b.range.is_empty());
    bands.sort_by_key(|b| tier_rank(&b.tier));
    Some(bands)
}

fn bands_from_map(map: &Map<String, Value>) -> Option<Vec<SalaryBand>> {
    map.iter()
        .map(|(tier, range)| scalar_text(range).map(|r| band(tier, &r)))
        .collect()
}

fn band(tier: &str, range: &str) -> SalaryBand {
    SalaryBand {
        tier: escape_markup(tier.trim()),
        range: escape_markup(range.trim()),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn tier_rank(tier: &str) -> usize {
    let tier = tier.to_lowercase();
    ["entry", "junior", "mid", "senior", "lead", "expert", "principal"]
        .iter()
        .position(|key| tier.starts_with(key))
        .unwrap_or(usize::MAX)
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn capped(mut items: Vec<String>, max: usize) -> Vec<String> {
    items.truncate(max);
    items
}


#[cfg(test)]
mod tests {
    use super::*;

    const MARKED: &str = "\
Intro line from the model.

*Eligible Job Roles:*
- Data Analyst: SQL reporting
- Python Developer - backend services

*Skill Gap Analysis:*
Learn Tableau and statistics.

*Companies Hiring:*
Acme Corp, Globex

*Salary Packages:*
$55,000 - $70,000 per year
";

    #[test]
    fn test_split_recovers_all_sections() {
        let normalized = split_sections(MARKED);
        assert_eq!(normalized.matched, 4);
        assert!(normalized.general.is_none());
        assert_eq!(
            normalized.body(Section::EligibleJobRoles),
            "- Data Analyst: SQL reporting\n- Python Developer - backend services"
        );
        assert_eq!(normalized.body(Section::SkillGapAnalysis), "Learn Tableau and statistics.");
        assert_eq!(normalized.body(Section::CompaniesHiring), "Acme Corp, Globex");
        assert_eq!(normalized.body(Section::SalaryPackages), "$55,000 - $70,000 per year");
    }

    #[test]
    fn test_split_is_independent_of_marker_order() {
        let shuffled = "\
*Salary Packages:*
$55,000 - $70,000 per year
*Companies Hiring:*
Acme Corp, Globex
*Eligible Job Roles:*
- Data Analyst: SQL reporting
*Skill Gap Analysis:*
Learn Tableau and statistics.";
        let normalized = split_sections(shuffled);
        assert_eq!(normalized.matched, 4);
        assert_eq!(normalized.body(Section::EligibleJobRoles), "- Data Analyst: SQL reporting");
        assert_eq!(normalized.body(Section::SkillGapAnalysis), "Learn Tableau and statistics.");
        assert_eq!(normalized.body(Section::CompaniesHiring), "Acme Corp, Globex");
        assert_eq!(normalized.body(Section::SalaryPackages), "$55,000 - $70,000 per year");
        let order: Vec<Section> = normalized.sections.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, Section::ALL.to_vec());
    }

    #[test]
    fn test_split_accepts_marker_variants() {
        let text = "\
**eligible job roles:**
- QA Engineer
*  Skill   Gap Analysis :*
Selenium
*COMPANIES HIRING*:
Initech
**Salary Packages:**
40k";
        let normalized = split_sections(text);
        assert_eq!(normalized.matched, 4);
        assert_eq!(normalized.body(Section::EligibleJobRoles), "- QA Engineer");
        assert_eq!(normalized.body(Section::SkillGapAnalysis), "Selenium");
        assert_eq!(normalized.body(Section::CompaniesHiring), "Initech");
        assert_eq!(normalized.body(Section::SalaryPackages), "40k");
    }

    #[test]
    fn test_split_accepts_triple_asterisk_markers() {
        let text = "***Eligible Job Roles:***\n- Data Analyst\n***Salary Packages***:\n$60k";
        let normalized = split_sections(text);
        assert_eq!(normalized.matched, 2);
        assert_eq!(normalized.body(Section::EligibleJobRoles), "- Data Analyst");
        assert_eq!(normalized.body(Section::SalaryPackages), "$60k");
    }

    #[test]
    fn test_split_fills_missing_sections_with_placeholder() {
        let normalized = split_sections("*Eligible Job Roles:*\n- Data Analyst\n*Companies Hiring:*\n");
        assert_eq!(normalized.matched, 1);
        assert_eq!(
            normalized.body(Section::CompaniesHiring),
            placeholder(Section::CompaniesHiring)
        );
        assert_eq!(
            normalized.body(Section::SalaryPackages),
            placeholder(Section::SalaryPackages)
        );
    }

    #[test]
    fn test_split_first_non_empty_duplicate_wins() {
        let text = "*Companies Hiring:*\n*Companies Hiring:*\nFirst\n*Companies Hiring:*\nSecond";
        let normalized = split_sections(text);
        assert_eq!(normalized.body(Section::CompaniesHiring), "First");
    }

    #[test]
    fn test_split_without_markers_uses_general_bucket() {
        let raw = "Here are some roles: Data Analyst, <b>Python Developer</b>.";
        let first = split_sections(raw);
        let second = split_sections(raw);
        assert_eq!(first, second);
        assert_eq!(first.matched, 0);
        assert_eq!(
            first.general.as_deref(),
            Some("Here are some roles: Data Analyst, &lt;b&gt;Python Developer&lt;/b&gt;.")
        );
        assert_eq!(first.body(Section::EligibleJobRoles), first.general.as_deref().unwrap());
        for section in [Section::SkillGapAnalysis, Section::CompaniesHiring, Section::SalaryPackages] {
            assert_eq!(first.body(section), placeholder(section));
        }
    }

    #[test]
    fn test_split_blank_text_is_all_placeholders() {
        let normalized = split_sections("   \n");
        assert!(normalized.general.is_none());
        for (section, body) in &normalized.sections {
            assert_eq!(body, &placeholder(*section));
        }
    }

    #[test]
    fn test_split_escapes_injected_markup() {
        let normalized = split_sections("*Eligible Job Roles:*\n- Data Analyst <script>alert(1)</script>");
        let body = normalized.body(Section::EligibleJobRoles);
        assert!(!body.contains('<') && !body.contains('>'));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_escape_markup_is_idempotent() {
        let once = escape_markup("a <b> & c");
        assert_eq!(once, "a &lt;b&gt; & c");
        assert_eq!(escape_markup(&once), once);
    }

    #[test]
    fn test_extract_roles_reads_top_level_bullets() {
        let body = "\
Roles that fit your profile:
1. **Data Analyst**: turns data into reports
   - Needs SQL
2. Python Developer - backend services
3. Business Intelligence Analyst (BI)
4. data analyst: duplicate
- Junior Data Engineer";
        assert_eq!(
            extract_roles(body, 10),
            vec![
                "Data Analyst",
                "Python Developer",
                "Business Intelligence Analyst",
                "Junior Data Engineer"
            ]
        );
        assert_eq!(extract_roles(body, 2), vec!["Data Analyst", "Python Developer"]);
    }

    #[test]
    fn test_extract_roles_without_bullets_is_empty() {
        assert!(extract_roles("No list here, just prose.", 5).is_empty());
    }

    #[test]
    fn test_parse_role_lookup_reads_expected_shape() {
        let raw = r#"```json
{
  "companies": ["Acme Corp", {"name": "Globex"}, "acme corp"],
  "missing_skills": ["Tableau"],
  "salary_ranges": {"Senior Level": "$110k", "Entry Level": "$60k", "Mid Level": "$85k"}
}
```"#;
        let lookup = parse_role_lookup("Data Analyst", raw);
        assert_eq!(lookup.source, LookupSource::Parsed);
        assert_eq!(lookup.companies, vec!["Acme Corp", "Globex"]);
        assert_eq!(lookup.missing_skills, vec!["Tableau"]);
        let tiers: Vec<&str> = lookup.salary_ranges.iter().map(|b| b.tier.as_str()).collect();
        assert_eq!(tiers, vec!["Entry Level", "Mid Level", "Senior Level"]);
        assert_eq!(lookup.salary_ranges[0].range, "$60k");
    }

    #[test]
    fn test_parse_role_lookup_ignores_surrounding_prose() {
        let raw = r#"Sure! Here is the data: {"companies": ["Initech"], "missing_skills": [], "salary_ranges": {"Entry Level": "$50k"}} Hope this helps."#;
        let lookup = parse_role_lookup("QA Engineer", raw);
        assert_eq!(lookup.source, LookupSource::Parsed);
        assert_eq!(lookup.companies, vec!["Initech"]);
        assert!(lookup.missing_skills.is_empty());
        assert_eq!(lookup.salary_ranges[0].range, "$50k");
    }

    #[test]
    fn test_parse_role_lookup_missing_field_is_full_default() {
        for raw in [
            r#"{"companies": ["Initech"]}"#,
            r#"{"companies": ["Initech"], "missing_skills": ["Selenium"]}"#,
            r#"{"missing_skills": ["Selenium"], "salary_ranges": {"Entry Level": "$50k"}}"#,
        ] {
            let lookup = parse_role_lookup("QA Engineer", raw);
            assert_eq!(lookup.source, LookupSource::Fallback, "input: {raw}");
            assert_eq!(lookup, default_role_lookup("QA Engineer"), "input: {raw}");
        }
    }

    #[test]
    fn test_parse_role_lookup_malformed_is_stable_default() {
        for raw in [
            "not json at all",
            "{\"companies\": [\"Acme\",}",
            "[\"Acme\", \"Globex\"]",
            "{\"companies\": \"Acme\"}",
            "{\"salary_ranges\": [1, 2]}",
            "{}",
            "",
        ] {
            let first = parse_role_lookup("Data Analyst", raw);
            let second = parse_role_lookup("Data Analyst", raw);
            assert_eq!(first, default_role_lookup("Data Analyst"), "input: {raw}");
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_parse_role_lookup_escapes_markup() {
        let raw = r#"{"companies": ["<img src=x>Acme"], "missing_skills": ["<b>SQL</b>"], "salary_ranges": [{"tier": "Entry Level", "range": 55000}]}"#;
        let lookup = parse_role_lookup("Data Analyst", raw);
        assert_eq!(lookup.companies, vec!["&lt;img src=x&gt;Acme"]);
        assert_eq!(lookup.missing_skills, vec!["&lt;b&gt;SQL&lt;/b&gt;"]);
        assert_eq!(lookup.salary_ranges[0].range, "55000");
    }
}
