//! Evaluator contract — the seam between the aggregation engine and whatever
//! classifies a resume along one dimension.
//!
//! The engine only depends on [`Evaluator`]. `LlmEvaluator` is the production
//! backend; `mock` holds in-process evaluators for tests.

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::EvaluationFailure;

pub mod assessments;
pub mod llm;
pub mod mock;
pub mod prompts;

pub use assessments::{
    CultureAssessment, EducationAssessment, ExperienceAssessment, Seniority, SkillsAssessment,
};
pub use llm::LlmEvaluator;

/// The four assessment dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorKind {
    Skills,
    Experience,
    Education,
    Culture,
}

impl EvaluatorKind {
    pub const ALL: [EvaluatorKind; 4] = [
        EvaluatorKind::Skills,
        EvaluatorKind::Experience,
        EvaluatorKind::Education,
        EvaluatorKind::Culture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluatorKind::Skills => "skills",
            EvaluatorKind::Experience => "experience",
            EvaluatorKind::Education => "education",
            EvaluatorKind::Culture => "culture",
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only inputs handed to every evaluator for one candidate.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub job_description: String,
    pub candidate_text: String,
    pub candidate_name: String,
}

/// A kind-specific evaluation result: a score in `[0, 100]` plus structured detail.
///
/// Implementors are the strict response schemas. Deserialization failures
/// (missing fields, wrong types) are schema violations, never partial results.
pub trait Assessment: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const KIND: EvaluatorKind;

    fn score(&self) -> f64;

    /// Clamps the score into `[0, 100]`. Called by evaluators before returning.
    fn clamp_score(&mut self);

    fn reasoning(&self) -> &str;
}

/// One assessment dimension. Carried by the aggregator as `Arc<dyn Evaluator<A>>`.
#[async_trait]
pub trait Evaluator<A: Assessment>: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<A, EvaluationFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EvaluatorKind::Experience).unwrap();
        assert_eq!(json, "\"experience\"");
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in EvaluatorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"'), kind.to_string());
        }
    }
}
