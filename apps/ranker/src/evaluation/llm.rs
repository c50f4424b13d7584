use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::prompts::{build_evaluation_prompt, system_prompt};
use super::{Assessment, EvaluationRequest, Evaluator, EvaluatorKind};
use crate::errors::EvaluationFailure;
use crate::llm_client::{LlmClient, LlmError};

/// Evaluator backed by Claude. One instance per assessment kind, all sharing
/// the same `LlmClient`.
pub struct LlmEvaluator<A> {
    llm: LlmClient,
    _assessment: PhantomData<fn() -> A>,
}

impl<A: Assessment> LlmEvaluator<A> {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            _assessment: PhantomData,
        }
    }
}

#[async_trait]
impl<A: Assessment> Evaluator<A> for LlmEvaluator<A> {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<A, EvaluationFailure> {
        let kind = A::KIND;
        let prompt = build_evaluation_prompt(kind, request);
        let system = system_prompt(kind);

        let mut assessment = self
            .llm
            .call_json::<A>(&prompt, &system)
            .await
            .map_err(|e| {
                warn!("{kind} evaluation failed for {}: {e}", request.candidate_name);
                into_failure(kind, e)
            })?;

        assessment.clamp_score();
        debug!(
            "{kind} evaluation for {}: score={}",
            request.candidate_name,
            assessment.score()
        );
        Ok(assessment)
    }
}

fn into_failure(kind: EvaluatorKind, error: LlmError) -> EvaluationFailure {
    match error {
        LlmError::EmptyContent => EvaluationFailure::NoContent { kind },
        LlmError::Parse(e) => EvaluationFailure::Parse {
            kind,
            reason: e.to_string(),
        },
        other => EvaluationFailure::Upstream {
            kind,
            message: other.to_string(),
        },
    }
}
