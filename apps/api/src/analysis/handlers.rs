//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::analysis::profile::{skills_from_text, ExperienceLevel, UserProfile};
use crate::analysis::render::render_markdown;
use crate::analysis::report::CareerReport;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Skills arrive either as a JSON list or as the free-text field of the form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Text(String),
}

impl SkillsInput {
    fn into_list(self) -> Vec<String> {
        match self {
            SkillsInput::List(skills) => skills,
            SkillsInput::Text(text) => skills_from_text(&text),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub skills: SkillsInput,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub preferred_location: Option<String>,
    #[serde(default)]
    pub career_goals: Option<String>,
}

impl AnalyzeRequest {
    pub fn into_profile(self) -> Result<UserProfile, AppError> {
        UserProfile::new(
            self.skills.into_list(),
            self.experience_level,
            self.preferred_location,
            self.career_goals,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Runs a full analysis and returns the four-section report.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<CareerReport>, AppError> {
    let profile = profile_from(payload)?;
    let report = state.navigator.analyze(&profile).await?;
    Ok(Json(report))
}

/// POST /api/v1/analyze/markdown
///
/// Same analysis, exported as a Markdown document.
pub async fn handle_analyze_markdown(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profile_from(payload)?;
    let report = state.navigator.analyze(&profile).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_markdown(&report),
    ))
}

fn profile_from(payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> Result<UserProfile, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    request.into_profile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_accept_list_or_text() {
        let request: AnalyzeRequest = serde_json::from_str(
            r#"{"skills": ["Python", "SQL"], "experience_level": "entry"}"#,
        )
        .unwrap();
        assert_eq!(request.into_profile().unwrap().skills, vec!["Python", "SQL"]);

        let request: AnalyzeRequest = serde_json::from_str(
            r#"{"skills": "Python, SQL\nExcel", "experience_level": "Mid Level (2-5 years)", "preferred_location": "Remote"}"#,
        )
        .unwrap();
        let profile = request.into_profile().unwrap();
        assert_eq!(profile.skills, vec!["Python", "SQL", "Excel"]);
        assert_eq!(profile.experience_level, ExperienceLevel::Mid);
        assert_eq!(profile.preferred_location.as_deref(), Some("Remote"));
    }

    #[test]
    fn test_blank_skills_text_is_validation_error() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"skills": " , ", "experience_level": "senior"}"#).unwrap();
        assert!(matches!(request.into_profile(), Err(AppError::Validation(_))));
    }
}
