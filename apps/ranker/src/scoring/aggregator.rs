//! Aggregator — fans one candidate out to the four evaluators and combines
//! their scores under a `WeightSet`.
//!
//! The aggregator never normalizes weights and never persists anything; it is
//! the pure combination step between the evaluators and the ranking driver.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AggregationFailure;
use crate::evaluation::{
    Assessment, CultureAssessment, EducationAssessment, EvaluationRequest, Evaluator,
    EvaluatorKind, ExperienceAssessment, SkillsAssessment,
};
use crate::scoring::weights::WeightSet;

/// Per-kind weighted contribution (score × weight), each rounded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: i32,
    pub experience: i32,
    pub education: i32,
    pub culture: i32,
}

impl ScoreBreakdown {
    pub fn contribution(&self, kind: EvaluatorKind) -> i32 {
        match kind {
            EvaluatorKind::Skills => self.skills,
            EvaluatorKind::Experience => self.experience,
            EvaluatorKind::Education => self.education,
            EvaluatorKind::Culture => self.culture,
        }
    }
}

/// One candidate's combined evaluation.
///
/// `overall` comes from the unrounded weighted sum, so the rounded
/// `breakdown` fields may differ from it by one or two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedScore {
    pub overall: u32,
    pub breakdown: ScoreBreakdown,
    pub weights: WeightSet,
    pub skills: SkillsAssessment,
    pub experience: ExperienceAssessment,
    pub education: EducationAssessment,
    pub culture: CultureAssessment,
}

impl AggregatedScore {
    pub fn component_score(&self, kind: EvaluatorKind) -> f64 {
        match kind {
            EvaluatorKind::Skills => self.skills.score(),
            EvaluatorKind::Experience => self.experience.score(),
            EvaluatorKind::Education => self.education.score(),
            EvaluatorKind::Culture => self.culture.score(),
        }
    }

    /// Matched skills, surfaced first in result views.
    pub fn key_highlights(&self) -> Vec<String> {
        self.skills.matched.clone()
    }

    pub fn strengths(&self) -> Vec<String> {
        self.skills
            .matched
            .iter()
            .chain(self.culture.soft_skills.iter())
            .cloned()
            .collect()
    }

    /// Missing skills plus culture indicators that describe a lack of something.
    pub fn weaknesses(&self) -> Vec<String> {
        self.skills
            .missing
            .iter()
            .chain(
                self.culture
                    .indicators
                    .iter()
                    .filter(|i| i.to_lowercase().contains("lack")),
            )
            .cloned()
            .collect()
    }

    pub fn relevant_experience(&self) -> Vec<String> {
        self.experience.relevant_roles.clone()
    }
}

/// Halves round toward +∞, so a negative contribution of -50.5 becomes -50.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Combines four assessments under `weights`. Pure; no I/O.
pub fn combine(
    skills: SkillsAssessment,
    experience: ExperienceAssessment,
    education: EducationAssessment,
    culture: CultureAssessment,
    weights: &WeightSet,
) -> AggregatedScore {
    let skills_raw = skills.score() * weights.skills;
    let experience_raw = experience.score() * weights.experience;
    let education_raw = education.score() * weights.education;
    let culture_raw = culture.score() * weights.culture;

    let weighted_sum = skills_raw + experience_raw + education_raw + culture_raw;
    let overall = round_half_up(weighted_sum.clamp(0.0, 100.0)) as u32;

    AggregatedScore {
        overall,
        breakdown: ScoreBreakdown {
            skills: round_half_up(skills_raw) as i32,
            experience: round_half_up(experience_raw) as i32,
            education: round_half_up(education_raw) as i32,
            culture: round_half_up(culture_raw) as i32,
        },
        weights: *weights,
        skills,
        experience,
        education,
        culture,
    }
}

/// Holds one evaluator per kind. Cheap to clone.
#[derive(Clone)]
pub struct Aggregator {
    skills: Arc<dyn Evaluator<SkillsAssessment>>,
    experience: Arc<dyn Evaluator<ExperienceAssessment>>,
    education: Arc<dyn Evaluator<EducationAssessment>>,
    culture: Arc<dyn Evaluator<CultureAssessment>>,
}

impl Aggregator {
    pub fn new(
        skills: Arc<dyn Evaluator<SkillsAssessment>>,
        experience: Arc<dyn Evaluator<ExperienceAssessment>>,
        education: Arc<dyn Evaluator<EducationAssessment>>,
        culture: Arc<dyn Evaluator<CultureAssessment>>,
    ) -> Self {
        Self {
            skills,
            experience,
            education,
            culture,
        }
    }

    /// Evaluates one candidate on all four dimensions concurrently and combines
    /// the results. The first evaluator failure fails the whole aggregation.
    pub async fn aggregate(
        &self,
        request: &EvaluationRequest,
        weights: &WeightSet,
    ) -> Result<AggregatedScore, AggregationFailure> {
        if !weights.is_normalized() {
            warn!(
                "Weights don't sum to 1.0 (total: {}); applying as given",
                weights.sum()
            );
        }

        let (skills, experience, education, culture) = tokio::try_join!(
            self.skills.evaluate(request),
            self.experience.evaluate(request),
            self.education.evaluate(request),
            self.culture.evaluate(request),
        )?;

        let aggregated = combine(skills, experience, education, culture, weights);
        debug!(
            "Aggregated {}: overall={} breakdown={:?}",
            request.candidate_name, aggregated.overall, aggregated.breakdown
        );
        Ok(aggregated)
    }

    pub async fn aggregate_with_default_weights(
        &self,
        request: &EvaluationRequest,
    ) -> Result<AggregatedScore, AggregationFailure> {
        self.aggregate(request, &WeightSet::default()).await
    }
}
