use thiserror::Error;
use uuid::Uuid;

use crate::evaluation::EvaluatorKind;

/// One evaluator's upstream call or response parsing failed.
#[derive(Debug, Error)]
pub enum EvaluationFailure {
    #[error("{kind} evaluator returned no content")]
    NoContent { kind: EvaluatorKind },

    #[error("{kind} evaluator response did not match its schema: {reason}")]
    Parse { kind: EvaluatorKind, reason: String },

    #[error("{kind} evaluator call failed: {message}")]
    Upstream { kind: EvaluatorKind, message: String },
}

impl EvaluationFailure {
    pub fn kind(&self) -> EvaluatorKind {
        match self {
            EvaluationFailure::NoContent { kind }
            | EvaluationFailure::Parse { kind, .. }
            | EvaluationFailure::Upstream { kind, .. } => *kind,
        }
    }
}

/// All-or-nothing failure of a single candidate's aggregation.
#[derive(Debug, Error)]
#[error("aggregation failed: {0}")]
pub struct AggregationFailure(#[from] pub EvaluationFailure);

impl AggregationFailure {
    pub fn failed_kind(&self) -> EvaluatorKind {
        self.0.kind()
    }
}

/// The store was unavailable or rejected a write.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Score record {0} not found")]
    RecordNotFound(Uuid),
}

/// Failures that abort a whole ranking run.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("No candidates found for session {0}")]
    NoCandidates(Uuid),
}
