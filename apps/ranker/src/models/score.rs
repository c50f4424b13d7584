use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::evaluation::EvaluatorKind;
use crate::scoring::AggregatedScore;

/// A persisted evaluation of one candidate in one ranking run. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub candidate_id: Uuid,
    pub overall_score: i32,
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub culture_score: f64,
    pub skills_details: Value,
    pub experience_details: Value,
    pub education_details: Value,
    pub culture_details: Value,
    pub key_highlights: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub relevant_experience: Vec<String>,
    pub weights: Value,
    pub rank: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a `ScoreRecord`.
#[derive(Debug, Clone)]
pub struct NewScoreRecord {
    pub session_id: Uuid,
    pub candidate_id: Uuid,
    pub overall_score: i32,
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub culture_score: f64,
    pub skills_details: Value,
    pub experience_details: Value,
    pub education_details: Value,
    pub culture_details: Value,
    pub key_highlights: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub relevant_experience: Vec<String>,
    pub weights: Value,
}

impl NewScoreRecord {
    pub fn from_aggregate(
        session_id: Uuid,
        candidate_id: Uuid,
        score: &AggregatedScore,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            session_id,
            candidate_id,
            overall_score: score.overall as i32,
            skills_score: score.component_score(EvaluatorKind::Skills),
            experience_score: score.component_score(EvaluatorKind::Experience),
            education_score: score.component_score(EvaluatorKind::Education),
            culture_score: score.component_score(EvaluatorKind::Culture),
            skills_details: serde_json::to_value(&score.skills)?,
            experience_details: serde_json::to_value(&score.experience)?,
            education_details: serde_json::to_value(&score.education)?,
            culture_details: serde_json::to_value(&score.culture)?,
            key_highlights: score.key_highlights(),
            strengths: score.strengths(),
            weaknesses: score.weaknesses(),
            relevant_experience: score.relevant_experience(),
            weights: serde_json::to_value(score.weights)?,
        })
    }

    /// Materializes the record the way the database would, for in-memory stores.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> ScoreRecord {
        ScoreRecord {
            id,
            session_id: self.session_id,
            candidate_id: self.candidate_id,
            overall_score: self.overall_score,
            skills_score: self.skills_score,
            experience_score: self.experience_score,
            education_score: self.education_score,
            culture_score: self.culture_score,
            skills_details: self.skills_details,
            experience_details: self.experience_details,
            education_details: self.education_details,
            culture_details: self.culture_details,
            key_highlights: self.key_highlights,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            relevant_experience: self.relevant_experience,
            weights: self.weights,
            rank: None,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::mock;
    use crate::evaluation::SkillsAssessment;
    use crate::scoring::{combine, WeightSet};

    #[test]
    fn test_from_aggregate_copies_scores_and_details() {
        let aggregated = combine(
            mock::skills(80.0),
            mock::experience(70.0),
            mock::education(90.0),
            mock::culture(60.0),
            &WeightSet::STANDARD,
        );
        let session_id = Uuid::new_v4();
        let candidate_id = Uuid::new_v4();

        let record = NewScoreRecord::from_aggregate(session_id, candidate_id, &aggregated).unwrap();

        assert_eq!(record.overall_score, aggregated.overall as i32);
        assert_eq!(record.skills_score, 80.0);
        assert_eq!(record.culture_score, 60.0);
        assert_eq!(record.skills_details["matched"][0], "Rust");
        assert_eq!(record.experience_details["seniority"], "senior");
        assert_eq!(record.weights["skills"], 0.4);
        assert_eq!(record.strengths.len(), 3);

        let skills: SkillsAssessment = serde_json::from_value(record.skills_details).unwrap();
        assert_eq!(skills, aggregated.skills);
    }
}
