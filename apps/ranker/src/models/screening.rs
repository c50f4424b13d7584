use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A screening session as stored by the upload layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningRow {
    pub id: Uuid,
    pub job_title: String,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
}

/// One candidate to rank: the resume's extracted text, if extraction succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateDocument {
    pub candidate_id: Uuid,
    pub candidate_name: Option<String>,
    pub resume_text: Option<String>,
}

impl CandidateDocument {
    pub fn new(candidate_id: Uuid, candidate_name: &str, resume_text: &str) -> Self {
        Self {
            candidate_id,
            candidate_name: Some(candidate_name.to_string()),
            resume_text: Some(resume_text.to_string()),
        }
    }

    /// Resume text with surrounding whitespace removed, or `None` if there is nothing to score.
    pub fn scoreable_text(&self) -> Option<&str> {
        self.resume_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.candidate_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }
}
