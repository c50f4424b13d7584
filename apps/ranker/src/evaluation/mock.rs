//! In-process evaluators for exercising the aggregation engine without LLM calls.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    Assessment, CultureAssessment, EducationAssessment, EvaluationRequest, Evaluator,
    EvaluatorKind, ExperienceAssessment, Seniority, SkillsAssessment,
};
use crate::errors::EvaluationFailure;

/// Returns the same assessment for every candidate.
///
/// Optionally sleeps before answering, which lets tests observe whether
/// evaluators were invoked concurrently.
pub struct FixedEvaluator<A> {
    assessment: A,
    latency: Option<Duration>,
    call_count: AtomicU32,
}

impl<A: Assessment> FixedEvaluator<A> {
    pub fn new(assessment: A) -> Self {
        Self {
            assessment,
            latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of evaluations performed so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<A: Assessment> Evaluator<A> for FixedEvaluator<A> {
    async fn evaluate(&self, _request: &EvaluationRequest) -> Result<A, EvaluationFailure> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut assessment = self.assessment.clone();
        assessment.clamp_score();
        Ok(assessment)
    }
}

/// Picks a score from the candidate text, so one evaluator can score a
/// whole batch differently. Candidates without a mapping get `fallback`.
pub struct ScriptedEvaluator<A> {
    template: A,
    scores: Vec<(String, f64)>,
    fallback: f64,
    set_score: fn(&mut A, f64),
}

impl<A: Assessment> ScriptedEvaluator<A> {
    pub fn new(template: A, set_score: fn(&mut A, f64)) -> Self {
        let fallback = template.score();
        Self {
            template,
            scores: Vec::new(),
            fallback,
            set_score,
        }
    }

    /// Candidates whose text contains `marker` get `score`.
    pub fn score_when(mut self, marker: &str, score: f64) -> Self {
        self.scores.push((marker.to_string(), score));
        self
    }
}

#[async_trait]
impl<A: Assessment> Evaluator<A> for ScriptedEvaluator<A> {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<A, EvaluationFailure> {
        let score = self
            .scores
            .iter()
            .find(|(marker, _)| request.candidate_text.contains(marker.as_str()))
            .map(|(_, s)| *s)
            .unwrap_or(self.fallback);
        let mut assessment = self.template.clone();
        (self.set_score)(&mut assessment, score);
        assessment.clamp_score();
        Ok(assessment)
    }
}

/// Always fails with the configured reason.
pub struct FailingEvaluator {
    kind: EvaluatorKind,
    reason: FailureReason,
    call_count: AtomicU32,
}

#[derive(Debug, Clone, Copy)]
pub enum FailureReason {
    NoContent,
    Parse,
    Upstream,
}

impl FailingEvaluator {
    pub fn new(kind: EvaluatorKind, reason: FailureReason) -> Self {
        Self {
            kind,
            reason,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    fn failure(&self) -> EvaluationFailure {
        let kind = self.kind;
        match self.reason {
            FailureReason::NoContent => EvaluationFailure::NoContent { kind },
            FailureReason::Parse => EvaluationFailure::Parse {
                kind,
                reason: "expected value at line 1 column 1".to_string(),
            },
            FailureReason::Upstream => EvaluationFailure::Upstream {
                kind,
                message: "API error (status 503): overloaded".to_string(),
            },
        }
    }
}

#[async_trait]
impl<A: Assessment> Evaluator<A> for FailingEvaluator {
    async fn evaluate(&self, _request: &EvaluationRequest) -> Result<A, EvaluationFailure> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Err(self.failure())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixture assessments
// ────────────────────────────────────────────────────────────────────────────

pub fn skills(score: f64) -> SkillsAssessment {
    SkillsAssessment {
        score,
        matched: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        missing: vec!["Kubernetes".to_string()],
        partial: vec!["Docker".to_string()],
        reasoning: "Covers the core stack".to_string(),
    }
}

pub fn experience(score: f64) -> ExperienceAssessment {
    ExperienceAssessment {
        score,
        years_of_experience: 6.0,
        seniority: Seniority::Senior,
        has_leadership: true,
        relevant_roles: vec!["Backend Engineer".to_string()],
        reasoning: "Six years in comparable roles".to_string(),
    }
}

pub fn education(score: f64) -> EducationAssessment {
    EducationAssessment {
        score,
        degree: "BS Computer Science".to_string(),
        degree_match: true,
        certifications: vec!["AWS Solutions Architect".to_string()],
        relevant_certifications: vec!["AWS Solutions Architect".to_string()],
        reasoning: "Relevant degree".to_string(),
    }
}

pub fn culture(score: f64) -> CultureAssessment {
    CultureAssessment {
        score,
        traits: vec!["ownership".to_string()],
        indicators: vec![
            "Mentored junior developers".to_string(),
            "Lacks cross-team collaboration examples".to_string(),
        ],
        soft_skills: vec!["communication".to_string()],
        reasoning: "Collaborative signals".to_string(),
    }
}

/// Four fixed evaluators, one per kind, with the given scores.
pub struct FixedPanel {
    pub skills: Arc<FixedEvaluator<SkillsAssessment>>,
    pub experience: Arc<FixedEvaluator<ExperienceAssessment>>,
    pub education: Arc<FixedEvaluator<EducationAssessment>>,
    pub culture: Arc<FixedEvaluator<CultureAssessment>>,
}

impl FixedPanel {
    pub fn new(scores: [f64; 4]) -> Self {
        Self {
            skills: Arc::new(FixedEvaluator::new(skills(scores[0]))),
            experience: Arc::new(FixedEvaluator::new(experience(scores[1]))),
            education: Arc::new(FixedEvaluator::new(education(scores[2]))),
            culture: Arc::new(FixedEvaluator::new(culture(scores[3]))),
        }
    }

    pub fn with_latency(scores: [f64; 4], latency: Duration) -> Self {
        Self {
            skills: Arc::new(FixedEvaluator::new(skills(scores[0])).with_latency(latency)),
            experience: Arc::new(FixedEvaluator::new(experience(scores[1])).with_latency(latency)),
            education: Arc::new(FixedEvaluator::new(education(scores[2])).with_latency(latency)),
            culture: Arc::new(FixedEvaluator::new(culture(scores[3])).with_latency(latency)),
        }
    }
}
