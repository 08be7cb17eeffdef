//! Report data model: canonical sections and the assembled `CareerReport`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::profile::UserProfile;

/// Version of the `*<Title>:*` marker syntax shared by the analysis prompt and the
/// section splitter. Bump both sides together.
pub const MARKER_PROTOCOL_VERSION: u32 = 1;

/// The four canonical report topics. Declaration order is presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    EligibleJobRoles,
    SkillGapAnalysis,
    CompaniesHiring,
    SalaryPackages,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::EligibleJobRoles,
        Section::SkillGapAnalysis,
        Section::CompaniesHiring,
        Section::SalaryPackages,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::EligibleJobRoles => "Eligible Job Roles",
            Section::SkillGapAnalysis => "Skill Gap Analysis",
            Section::CompaniesHiring => "Companies Hiring",
            Section::SalaryPackages => "Salary Packages",
        }
    }

    /// Literal marker the model is asked to emit, e.g. `*Companies Hiring:*`.
    pub fn marker(&self) -> String {
        format!("*{}:*", self.title())
    }

    /// Matches a title regardless of case or inner whitespace.
    pub fn from_title(title: &str) -> Option<Section> {
        let wanted = title.split_whitespace().collect::<Vec<_>>().join(" ");
        Section::ALL
            .into_iter()
            .find(|s| s.title().eq_ignore_ascii_case(&wanted))
    }

    pub fn index(&self) -> usize {
        match self {
            Section::EligibleJobRoles => 0,
            Section::SkillGapAnalysis => 1,
            Section::CompaniesHiring => 2,
            Section::SalaryPackages => 3,
        }
    }
}

/// Whether a per-role fragment came from provider output or the static default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Parsed,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBand {
    pub tier: String,
    pub range: String,
}

/// Normalized result of one per-role company/salary lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleLookup {
    pub role: String,
    pub companies: Vec<String>,
    pub missing_skills: Vec<String>,
    pub salary_ranges: Vec<SalaryBand>,
    pub source: LookupSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSkillGap {
    pub role: String,
    pub missing_skills: Vec<String>,
    pub source: LookupSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCompanies {
    pub role: String,
    pub companies: Vec<String>,
    pub source: LookupSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSalaries {
    pub role: String,
    pub ranges: Vec<SalaryBand>,
    pub source: LookupSource,
}

/// Typed sub-structure attached to a section, alongside its text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum SectionDetail {
    Roles(Vec<String>),
    SkillGaps(Vec<RoleSkillGap>),
    Companies(Vec<RoleCompanies>),
    Salaries(Vec<RoleSalaries>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub topic: Section,
    pub title: String,
    /// Sanitized text body; never empty.
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<SectionDetail>,
}

/// The single artifact handed to render/export consumers.
/// `sections` always holds the four canonical sections in `Section::ALL` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub profile: UserProfile,
    pub sections: Vec<ReportSection>,
    /// True when the main analysis came from the canned fallback.
    pub degraded: bool,
}

impl CareerReport {
    pub fn section(&self, topic: Section) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.topic == topic)
    }
}
