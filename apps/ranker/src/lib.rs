//! Candidate ranking engine: four independent evaluators, per-session weights,
//! and a deterministic combination into one bounded score per candidate.

pub mod config;
pub mod db;
pub mod errors;
pub mod evaluation;
pub mod llm_client;
pub mod models;
pub mod ranking;
pub mod scoring;
pub mod screenings;
pub mod store;

pub use errors::{AggregationFailure, EvaluationFailure, PersistenceFailure, RankingError};
pub use ranking::{RankRequest, RankingDriver, RankingSummary};
pub use scoring::{normalize, AggregatedScore, Aggregator, PartialWeights, WeightSet};
