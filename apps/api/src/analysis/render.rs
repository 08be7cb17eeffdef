//! Markdown export of a `CareerReport`.

use std::fmt::Write;

use crate::analysis::normalizer::escape_markup;
use crate::analysis::report::{CareerReport, LookupSource, SectionDetail};

/// Renders the report as a standalone Markdown document. Works from section titles
/// and typed detail only; marker syntax never reaches this layer. Profile fields are
/// user input and are escaped here; report text was escaped during normalization.
pub fn render_markdown(report: &CareerReport) -> String {
    let mut out = String::new();
    let profile = &report.profile;

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# Career Analysis Report\n");
    let _ = writeln!(out, "- **Skills:** {}", escape_markup(&profile.skills_list()));
    let _ = writeln!(out, "- **Experience:** {}", profile.experience_level.label());
    if let Some(location) = &profile.preferred_location {
        let _ = writeln!(out, "- **Location:** {}", escape_markup(location));
    }
    if let Some(goals) = &profile.career_goals {
        let _ = writeln!(out, "- **Career goals:** {}", escape_markup(goals));
    }
    let _ = writeln!(
        out,
        "- **Generated:** {}",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    if report.degraded {
        let _ = writeln!(
            out,
            "\n> Live market data was unavailable. This report contains generic guidance only."
        );
    }

    for section in &report.sections {
        let _ = writeln!(out, "\n## {}\n", section.title);
        let _ = writeln!(out, "{}", section.body);

        match &section.detail {
            None | Some(SectionDetail::Roles(_)) => {}
            Some(SectionDetail::SkillGaps(entries)) => {
                for entry in entries {
                    let _ = writeln!(out, "\n### {}{}", entry.role, source_note(entry.source));
                    write_bullets(&mut out, &entry.missing_skills);
                }
            }
            Some(SectionDetail::Companies(entries)) => {
                for entry in entries {
                    let _ = writeln!(out, "\n### {}{}", entry.role, source_note(entry.source));
                    write_bullets(&mut out, &entry.companies);
                }
            }
            Some(SectionDetail::Salaries(entries)) => {
                for entry in entries {
                    let _ = writeln!(out, "\n### {}{}", entry.role, source_note(entry.source));
                    for band in &entry.ranges {
                        let _ = writeln!(out, "- **{}:** {}", band.tier, band.range);
                    }
                }
            }
        }
    }

    out
}

fn write_bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn source_note(source: LookupSource) -> &'static str {
    match source {
        LookupSource::Parsed => "",
        LookupSource::Fallback => " (generic data)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assembler::assemble;
    use crate::analysis::normalizer::{parse_role_lookup, split_sections};
    use crate::analysis::profile::{ExperienceLevel, UserProfile};

    fn report(degraded: bool) -> CareerReport {
        let profile = UserProfile::new(
            vec!["Python".into(), "SQL".into()],
            ExperienceLevel::Entry,
            Some("Remote".into()),
            None,
        )
        .unwrap();
        let analysis = split_sections(
            "*Eligible Job Roles:*\n- Data Analyst\n- QA Engineer\n*Companies Hiring:*\nAcme",
        );
        let lookups = vec![parse_role_lookup(
            "Data Analyst",
            r#"{"companies": ["Acme"], "missing_skills": ["Tableau"], "salary_ranges": {"Entry Level": "$60k"}}"#,
        )];
        assemble(
            &profile,
            analysis,
            vec!["Data Analyst".into(), "QA Engineer".into()],
            lookups,
            degraded,
        )
    }

    #[test]
    fn test_sections_render_in_canonical_order() {
        let markdown = render_markdown(&report(false));
        let positions: Vec<usize> = [
            "## Eligible Job Roles",
            "## Skill Gap Analysis",
            "## Companies Hiring",
            "## Salary Packages",
        ]
        .iter()
        .map(|h| markdown.find(h).expect("heading missing"))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(markdown.contains("- **Location:** Remote"));
        assert!(!markdown.contains("*Companies Hiring:*"));
    }

    #[test]
    fn test_detail_entries_are_listed_per_role() {
        let markdown = render_markdown(&report(false));
        assert!(markdown.contains("### Data Analyst\n- Acme"));
        assert!(markdown.contains("### QA Engineer (generic data)"));
        assert!(markdown.contains("- **Entry Level:** $60k"));
    }

    #[test]
    fn test_profile_fields_are_escaped() {
        let mut report = report(false);
        report.profile.skills = vec!["<b>Rust</b>".into()];
        report.profile.preferred_location = Some("<script>x</script>".into());
        report.profile.career_goals = Some("lead <team>".into());

        let markdown = render_markdown(&report);
        assert!(!markdown.contains('<') && !markdown.contains('>'), "{markdown}");
        assert!(markdown.contains("- **Skills:** &lt;b&gt;Rust&lt;/b&gt;"));
        assert!(markdown.contains("- **Career goals:** lead &lt;team&gt;"));
    }

    #[test]
    fn test_degraded_report_is_labeled() {
        assert!(render_markdown(&report(true)).contains("generic guidance only"));
        assert!(!render_markdown(&report(false)).contains("generic guidance only"));
    }
}
