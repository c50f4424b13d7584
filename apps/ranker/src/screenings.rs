//! Read-only access to the screening sessions and resumes written by the upload layer.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::screening::{CandidateDocument, ScreeningRow};

pub async fn load_screening(pool: &PgPool, screening_id: Uuid) -> Result<Option<ScreeningRow>> {
    Ok(sqlx::query_as::<_, ScreeningRow>(
        "SELECT id, job_title, job_description, created_at FROM screenings WHERE id = $1",
    )
    .bind(screening_id)
    .fetch_optional(pool)
    .await?)
}

/// Resumes attached to a screening, in upload order.
pub async fn load_candidates(pool: &PgPool, screening_id: Uuid) -> Result<Vec<CandidateDocument>> {
    Ok(sqlx::query_as::<_, CandidateDocument>(
        r#"
        SELECT id AS candidate_id, candidate_name, extracted_text AS resume_text
        FROM resumes
        WHERE screening_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(screening_id)
    .fetch_all(pool)
    .await?)
}
