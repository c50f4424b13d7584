//! Response schemas for the four evaluator kinds.
//!
//! Field names follow the JSON the evaluators are asked to return (camelCase).
//! Every field is required; there are no serde defaults.

use serde::{Deserialize, Serialize};

use super::{Assessment, EvaluatorKind};

fn clamp_to_range(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsAssessment {
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub partial: Vec<String>,
    pub reasoning: String,
}

/// Career level reported by the experience evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceAssessment {
    pub score: f64,
    pub years_of_experience: f64,
    pub seniority: Seniority,
    pub has_leadership: bool,
    pub relevant_roles: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationAssessment {
    pub score: f64,
    pub degree: String,
    pub degree_match: bool,
    pub certifications: Vec<String>,
    pub relevant_certifications: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CultureAssessment {
    pub score: f64,
    pub traits: Vec<String>,
    pub indicators: Vec<String>,
    pub soft_skills: Vec<String>,
    pub reasoning: String,
}

impl Assessment for SkillsAssessment {
    const KIND: EvaluatorKind = EvaluatorKind::Skills;

    fn score(&self) -> f64 {
        self.score
    }

    fn clamp_score(&mut self) {
        self.score = clamp_to_range(self.score);
    }

    fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

impl Assessment for ExperienceAssessment {
    const KIND: EvaluatorKind = EvaluatorKind::Experience;

    fn score(&self) -> f64 {
        self.score
    }

    fn clamp_score(&mut self) {
        self.score = clamp_to_range(self.score);
        // Negative tenure is meaningless; treat as none.
        self.years_of_experience = self.years_of_experience.max(0.0);
    }

    fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

impl Assessment for EducationAssessment {
    const KIND: EvaluatorKind = EvaluatorKind::Education;

    fn score(&self) -> f64 {
        self.score
    }

    fn clamp_score(&mut self) {
        self.score = clamp_to_range(self.score);
    }

    fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

impl Assessment for CultureAssessment {
    const KIND: EvaluatorKind = EvaluatorKind::Culture;

    fn score(&self) -> f64 {
        self.score
    }

    fn clamp_score(&mut self) {
        self.score = clamp_to_range(self.score);
    }

    fn reasoning(&self) -> &str {
        &self.reasoning
    }
}
