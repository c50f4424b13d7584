use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::scoring::WeightSet;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoringWeightsRow {
    pub session_id: Uuid,
    pub skills_weight: f64,
    pub experience_weight: f64,
    pub education_weight: f64,
    pub culture_weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScoringWeightsRow> for WeightSet {
    fn from(row: ScoringWeightsRow) -> Self {
        WeightSet {
            skills: row.skills_weight,
            experience: row.experience_weight,
            education: row.education_weight,
            culture: row.culture_weight,
        }
    }
}
