//! User profile: the only input to an analysis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Professional experience tier, as offered by the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Expert,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Expert,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry Level (0-2 years)",
            ExperienceLevel::Mid => "Mid Level (2-5 years)",
            ExperienceLevel::Senior => "Senior Level (5-10 years)",
            ExperienceLevel::Expert => "Expert Level (10+ years)",
        }
    }

    /// Short tier name, as used for salary bands.
    pub fn tier(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry Level",
            ExperienceLevel::Mid => "Mid Level",
            ExperienceLevel::Senior => "Senior Level",
            ExperienceLevel::Expert => "Expert Level",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    /// Accepts the variant name or any form label, e.g. "🌱 Entry Level (0-2 years) - Recent graduate".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        ExperienceLevel::ALL
            .into_iter()
            .find(|level| {
                let key = match level {
                    ExperienceLevel::Entry => "entry",
                    ExperienceLevel::Mid => "mid",
                    ExperienceLevel::Senior => "senior",
                    ExperienceLevel::Expert => "expert",
                };
                normalized.starts_with(key)
            })
            .ok_or_else(|| format!("Unknown experience level: {s}"))
    }
}

impl TryFrom<String> for ExperienceLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Skills and preferences submitted for analysis. Treated as immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub skills: Vec<String>,
    pub experience_level: ExperienceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_goals: Option<String>,
}

impl UserProfile {
    /// Builds a profile, trimming inputs and rejecting an empty skills list.
    pub fn new(
        skills: Vec<String>,
        experience_level: ExperienceLevel,
        preferred_location: Option<String>,
        career_goals: Option<String>,
    ) -> Result<Self, AppError> {
        let profile = Self {
            skills: clean_skills(skills),
            experience_level,
            preferred_location: clean_optional(preferred_location),
            career_goals: clean_optional(career_goals),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Skills must contain at least one non-blank entry.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.skills.iter().all(|s| s.trim().is_empty()) {
            return Err(AppError::Validation(
                "skills cannot be empty: enter at least one skill to begin the analysis".to_string(),
            ));
        }
        Ok(())
    }

    pub fn skills_list(&self) -> String {
        self.skills.join(", ")
    }
}

/// Splits a free-text skills field ("Python, SQL\nExcel; Tableau") into an ordered list.
pub fn skills_from_text(text: &str) -> Vec<String> {
    clean_skills(
        text.split(|c: char| c == ',' || c == ';' || c == '\n')
            .map(str::to_string)
            .collect(),
    )
}

/// Trims entries, drops blanks, and removes case-insensitive duplicates keeping the first.
fn clean_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
