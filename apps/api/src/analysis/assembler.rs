//! Report Assembler: merges the main analysis with the per-role lookups.

use chrono::Utc;
use uuid::Uuid;

use crate::analysis::normalizer::{default_role_lookup, NormalizedAnalysis};
use crate::analysis::profile::UserProfile;
use crate::analysis::report::{
    CareerReport, ReportSection, RoleCompanies, RoleLookup, RoleSalaries, RoleSkillGap, Section,
    SectionDetail,
};

/// Builds the final report. Every role in `roles` gets a lookup entry in role order;
/// a role without a matching lookup receives the static default.
pub fn assemble(
    profile: &UserProfile,
    analysis: NormalizedAnalysis,
    roles: Vec<String>,
    lookups: Vec<RoleLookup>,
    degraded: bool,
) -> CareerReport {
    let lookups = align_lookups(&roles, lookups);

    let sections = analysis
        .sections
        .into_iter()
        .map(|(topic, body)| ReportSection {
            topic,
            title: topic.title().to_string(),
            body,
            detail: detail_for(topic, &roles, &lookups),
        })
        .collect();

    CareerReport {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        profile: profile.clone(),
        sections,
        degraded,
    }
}

fn align_lookups(roles: &[String], mut lookups: Vec<RoleLookup>) -> Vec<RoleLookup> {
    roles
        .iter()
        .map(|role| {
            match lookups.iter().position(|l| &l.role == role) {
                Some(index) => lookups.remove(index),
                None => default_role_lookup(role),
            }
        })
        .collect()
}

fn detail_for(topic: Section, roles: &[String], lookups: &[RoleLookup]) -> Option<SectionDetail> {
    if roles.is_empty() {
        return None;
    }
    let detail = match topic {
        Section::EligibleJobRoles => SectionDetail::Roles(roles.to_vec()),
        Section::SkillGapAnalysis => SectionDetail::SkillGaps(
            lookups
                .iter()
                .map(|l| RoleSkillGap {
                    role: l.role.clone(),
                    missing_skills: l.missing_skills.clone(),
                    source: l.source,
                })
                .collect(),
        ),
        Section::CompaniesHiring => SectionDetail::Companies(
            lookups
                .iter()
                .map(|l| RoleCompanies {
                    role: l.role.clone(),
                    companies: l.companies.clone(),
                    source: l.source,
                })
                .collect(),
        ),
        Section::SalaryPackages => SectionDetail::Salaries(
            lookups
                .iter()
                .map(|l| RoleSalaries {
                    role: l.role.clone(),
                    ranges: l.salary_ranges.clone(),
                    source: l.source,
                })
                .collect(),
        ),
    };
    Some(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::{parse_role_lookup, split_sections};
    use crate::analysis::profile::ExperienceLevel;
    use crate::analysis::report::LookupSource;

    fn profile() -> UserProfile {
        UserProfile::new(vec!["Python".into()], ExperienceLevel::Mid, None, None).unwrap()
    }

    fn roles() -> Vec<String> {
        vec!["Data Analyst".to_string(), "QA Engineer".to_string(), "Python Developer".to_string()]
    }

    #[test]
    fn test_sections_follow_canonical_order() {
        let analysis = split_sections("*Salary Packages:*\n50k\n*Eligible Job Roles:*\n- Data Analyst");
        let report = assemble(&profile(), analysis, vec![], vec![], false);
        let topics: Vec<Section> = report.sections.iter().map(|s| s.topic).collect();
        assert_eq!(topics, Section::ALL.to_vec());
        assert!(report.sections.iter().all(|s| !s.body.is_empty()));
        assert!(report.sections.iter().all(|s| s.detail.is_none()));
    }

    #[test]
    fn test_entries_follow_role_order_with_missing_lookup_defaulted() {
        let lookups = vec![
            parse_role_lookup(
                "Python Developer",
                r#"{"companies": ["Globex"], "missing_skills": ["Docker"], "salary_ranges": {"Entry Level": "$70k"}}"#,
            ),
            parse_role_lookup(
                "Data Analyst",
                r#"{"companies": ["Acme"], "missing_skills": ["Tableau"], "salary_ranges": {"Entry Level": "$60k"}}"#,
            ),
        ];
        let report = assemble(&profile(), split_sections(""), roles(), lookups, false);

        let Some(SectionDetail::Companies(entries)) = &report.section(Section::CompaniesHiring).unwrap().detail
        else {
            panic!("companies detail missing");
        };
        let names: Vec<&str> = entries.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(names, vec!["Data Analyst", "QA Engineer", "Python Developer"]);
        assert_eq!(entries[0].companies, vec!["Acme"]);
        assert_eq!(entries[1].source, LookupSource::Fallback);
        assert_eq!(entries[2].companies, vec!["Globex"]);

        let Some(SectionDetail::Salaries(salaries)) = &report.section(Section::SalaryPackages).unwrap().detail
        else {
            panic!("salary detail missing");
        };
        assert_eq!(salaries.len(), 3);
    }

    #[test]
    fn test_degraded_flag_and_profile_are_carried() {
        let report = assemble(&profile(), split_sections(""), vec![], vec![], true);
        assert!(report.degraded);
        assert_eq!(report.profile, profile());
    }
}
