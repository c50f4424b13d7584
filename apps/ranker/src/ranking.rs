//! Ranking Driver — one batch pass over a session's candidates.
//!
//! Flow: resolve weights once → aggregate each candidate in input order →
//! persist each score as it completes → stable-sort the scored candidates.
//! Evaluation failures and persistence failures are reported per candidate and
//! never abort the run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{PersistenceFailure, RankingError};
use crate::evaluation::{EvaluationRequest, EvaluatorKind};
use crate::models::score::NewScoreRecord;
use crate::models::screening::CandidateDocument;
use crate::scoring::{normalize, AggregatedScore, Aggregator, PartialWeights, WeightSet};
use crate::store::{ScoreStore, WeightStore};

#[derive(Debug, Clone)]
pub struct RankRequest {
    pub session_id: Uuid,
    pub job_description: String,
    pub candidates: Vec<CandidateDocument>,
    /// Replaces the session's stored weights (after normalization) before scoring.
    pub weight_override: Option<PartialWeights>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub rank: u32,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub overall: u32,
    /// `None` when the score could not be persisted.
    pub record_id: Option<Uuid>,
    pub score: AggregatedScore,
}

impl RankedCandidate {
    pub fn persisted(&self) -> bool {
        self.record_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SkipReason {
    /// No extracted resume text.
    MissingText,
    /// One evaluator failed, so the candidate has no score.
    Evaluation {
        kind: EvaluatorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub candidate_id: Uuid,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceProblem {
    pub candidate_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSummary {
    pub session_id: Uuid,
    pub weights: WeightSet,
    pub scored: usize,
    pub ranking: Vec<RankedCandidate>,
    pub skipped: Vec<SkippedCandidate>,
    pub persistence_failures: Vec<PersistenceProblem>,
}

impl RankingSummary {
    pub fn top(&self) -> Option<&RankedCandidate> {
        self.ranking.first()
    }
}

#[derive(Clone)]
pub struct RankingDriver {
    aggregator: Aggregator,
    weights: Arc<dyn WeightStore>,
    scores: Arc<dyn ScoreStore>,
    persist_ranks: bool,
}

impl RankingDriver {
    pub fn new(
        aggregator: Aggregator,
        weights: Arc<dyn WeightStore>,
        scores: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            aggregator,
            weights,
            scores,
            persist_ranks: false,
        }
    }

    /// Also write each candidate's derived rank onto its stored record after the run.
    pub fn with_persisted_ranks(mut self, persist_ranks: bool) -> Self {
        self.persist_ranks = persist_ranks;
        self
    }

    pub async fn rank_session(&self, request: RankRequest) -> Result<RankingSummary, RankingError> {
        let RankRequest {
            session_id,
            job_description,
            candidates,
            weight_override,
        } = request;

        if candidates.is_empty() {
            return Err(RankingError::NoCandidates(session_id));
        }

        let weights = self.resolve_weights(session_id, weight_override).await;
        info!(
            "Ranking {} candidates for session {session_id} with weights {weights:?}",
            candidates.len()
        );

        let mut scored: Vec<RankedCandidate> = Vec::new();
        let mut skipped = Vec::new();
        let mut persistence_failures = Vec::new();

        for candidate in &candidates {
            let Some(text) = candidate.scoreable_text() else {
                warn!(
                    "Candidate {} has no extracted text, skipping",
                    candidate.candidate_id
                );
                skipped.push(SkippedCandidate {
                    candidate_id: candidate.candidate_id,
                    reason: SkipReason::MissingText,
                });
                continue;
            };

            let eval_request = EvaluationRequest {
                job_description: job_description.clone(),
                candidate_text: text.to_string(),
                candidate_name: candidate.display_name().to_string(),
            };

            let score = match self.aggregator.aggregate(&eval_request, &weights).await {
                Ok(score) => score,
                Err(e) => {
                    error!("Error scoring candidate {}: {e}", candidate.candidate_id);
                    skipped.push(SkippedCandidate {
                        candidate_id: candidate.candidate_id,
                        reason: SkipReason::Evaluation {
                            kind: e.failed_kind(),
                            message: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            let record_id = match self.persist(session_id, candidate.candidate_id, &score).await {
                Ok(id) => Some(id),
                Err(e) => {
                    error!(
                        "Failed to persist score for candidate {}: {e}",
                        candidate.candidate_id
                    );
                    persistence_failures.push(PersistenceProblem {
                        candidate_id: candidate.candidate_id,
                        message: e.to_string(),
                    });
                    None
                }
            };

            scored.push(RankedCandidate {
                rank: 0,
                candidate_id: candidate.candidate_id,
                candidate_name: eval_request.candidate_name,
                overall: score.overall,
                record_id,
                score,
            });
        }

        let ranking = rank_by_overall(scored);

        if self.persist_ranks {
            self.store_ranks(&ranking).await;
        }

        let summary = RankingSummary {
            session_id,
            weights,
            scored: ranking.len(),
            ranking,
            skipped,
            persistence_failures,
        };

        match summary.top() {
            Some(top) => info!(
                "Session {session_id}: scored {} candidates, skipped {}; top {} ({})",
                summary.scored,
                summary.skipped.len(),
                top.candidate_id,
                top.overall
            ),
            None => warn!("Session {session_id}: no candidate could be scored"),
        }

        Ok(summary)
    }

    /// Loads (or overrides) the session weights. Store problems never fail the
    /// run; the standard weights are used instead.
    async fn resolve_weights(
        &self,
        session_id: Uuid,
        weight_override: Option<PartialWeights>,
    ) -> WeightSet {
        if let Some(partial) = weight_override {
            let custom = normalize(&partial);
            return match self.weights.update(session_id, custom).await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Could not store weight override for session {session_id}: {e}");
                    custom
                }
            };
        }

        match self.weights.get_or_create(session_id).await {
            Ok(weights) => weights,
            Err(e) => {
                warn!("Could not load weights for session {session_id}, using defaults: {e}");
                WeightSet::default()
            }
        }
    }

    async fn persist(
        &self,
        session_id: Uuid,
        candidate_id: Uuid,
        score: &AggregatedScore,
    ) -> Result<Uuid, PersistenceFailure> {
        let record = NewScoreRecord::from_aggregate(session_id, candidate_id, score)?;
        self.scores.save(&record).await
    }

    async fn store_ranks(&self, ranking: &[RankedCandidate]) {
        for candidate in ranking {
            let Some(record_id) = candidate.record_id else {
                continue;
            };
            if let Err(e) = self.scores.assign_rank(record_id, candidate.rank as i32).await {
                warn!(
                    "Could not store rank {} for candidate {}: {e}",
                    candidate.rank, candidate.candidate_id
                );
            }
        }
    }
}

/// Stable sort by overall score, highest first, then 1-based ranks.
/// Equal scores keep their input order.
pub fn rank_by_overall(mut scored: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
    scored.sort_by(|a, b| b.overall.cmp(&a.overall));
    for (i, candidate) in scored.iter_mut().enumerate() {
        candidate.rank = i as u32 + 1;
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::mock::{
        self, FailingEvaluator, FailureReason, FixedEvaluator, ScriptedEvaluator,
    };
    use crate::evaluation::{CultureAssessment, SkillsAssessment};
    use crate::store::{InMemoryScoreStore, InMemoryWeightStore};

    // Skills weight 1.0 makes the overall score equal to the scripted skills score.
    const SKILLS_ONLY: PartialWeights = PartialWeights {
        skills: Some(1.0),
        experience: Some(0.0),
        education: Some(0.0),
        culture: Some(0.0),
    };

    fn scripted_aggregator(scores: &[(&str, f64)]) -> Aggregator {
        let mut skills = ScriptedEvaluator::new(mock::skills(0.0), |a: &mut SkillsAssessment, s| {
            a.score = s
        });
        for (marker, score) in scores {
            skills = skills.score_when(marker, *score);
        }
        Aggregator::new(
            Arc::new(skills),
            Arc::new(FixedEvaluator::new(mock::experience(50.0))),
            Arc::new(FixedEvaluator::new(mock::education(50.0))),
            Arc::new(FixedEvaluator::new(mock::culture(50.0))),
        )
    }

    fn candidate(text: &str) -> CandidateDocument {
        CandidateDocument::new(Uuid::new_v4(), text, text)
    }

    fn request(session_id: Uuid, candidates: Vec<CandidateDocument>) -> RankRequest {
        RankRequest {
            session_id,
            job_description: "Backend engineer, Rust".to_string(),
            candidates,
            weight_override: Some(SKILLS_ONLY),
        }
    }

    fn driver(aggregator: Aggregator, scores: Arc<InMemoryScoreStore>) -> RankingDriver {
        RankingDriver::new(aggregator, Arc::new(InMemoryWeightStore::new()), scores)
    }

    #[tokio::test]
    async fn test_ranks_by_overall_descending() {
        let scores = Arc::new(InMemoryScoreStore::new());
        let driver = driver(
            scripted_aggregator(&[("alpha", 55.0), ("beta", 91.0), ("gamma", 77.0)]),
            scores.clone(),
        );
        let candidates = vec![candidate("alpha"), candidate("beta"), candidate("gamma")];
        let beta_id = candidates[1].candidate_id;

        let summary = driver
            .rank_session(request(Uuid::new_v4(), candidates))
            .await
            .unwrap();

        let overalls: Vec<u32> = summary.ranking.iter().map(|c| c.overall).collect();
        assert_eq!(overalls, vec![91, 77, 55]);
        let ranks: Vec<u32> = summary.ranking.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(summary.scored, 3);
        assert_eq!(summary.top().unwrap().candidate_id, beta_id);
        assert_eq!(scores.all().await.len(), 3);
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let driver = driver(
            scripted_aggregator(&[("first", 70.0), ("second", 70.0), ("third", 80.0)]),
            Arc::new(InMemoryScoreStore::new()),
        );
        let candidates = vec![candidate("first"), candidate("second"), candidate("third")];
        let ids: Vec<Uuid> = candidates.iter().map(|c| c.candidate_id).collect();

        let summary = driver
            .rank_session(request(Uuid::new_v4(), candidates))
            .await
            .unwrap();

        let ranked: Vec<Uuid> = summary.ranking.iter().map(|c| c.candidate_id).collect();
        assert_eq!(ranked, vec![ids[2], ids[0], ids[1]]);
    }

    #[tokio::test]
    async fn test_missing_text_is_skipped_not_fatal() {
        let scores = Arc::new(InMemoryScoreStore::new());
        let driver = driver(scripted_aggregator(&[("alpha", 60.0)]), scores.clone());
        let mut blank = candidate("");
        blank.resume_text = None;
        let blank_id = blank.candidate_id;

        let summary = driver
            .rank_session(request(Uuid::new_v4(), vec![blank, candidate("alpha")]))
            .await
            .unwrap();

        assert_eq!(summary.scored, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].candidate_id, blank_id);
        assert_eq!(summary.skipped[0].reason, SkipReason::MissingText);
        assert_eq!(scores.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluator_failure_skips_candidate_and_persists_nothing_for_it() {
        let scores = Arc::new(InMemoryScoreStore::new());
        let aggregator = Aggregator::new(
            Arc::new(FixedEvaluator::new(mock::skills(80.0))),
            Arc::new(FailingEvaluator::new(
                EvaluatorKind::Experience,
                FailureReason::Upstream,
            )),
            Arc::new(FixedEvaluator::new(mock::education(80.0))),
            Arc::new(FixedEvaluator::new(mock::culture(80.0))),
        );
        let driver = driver(aggregator, scores.clone());
        let doc = candidate("alpha");
        let id = doc.candidate_id;

        let summary = driver
            .rank_session(request(Uuid::new_v4(), vec![doc]))
            .await
            .unwrap();

        assert_eq!(summary.scored, 0);
        assert!(summary.top().is_none());
        match &summary.skipped[0].reason {
            SkipReason::Evaluation { kind, .. } => assert_eq!(*kind, EvaluatorKind::Experience),
            other => panic!("unexpected skip reason {other:?}"),
        }
        assert_eq!(summary.skipped[0].candidate_id, id);
        assert!(scores.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_reported_and_run_continues() {
        let first = candidate("alpha");
        let second = candidate("beta");
        let scores = Arc::new(InMemoryScoreStore::new().rejecting(first.candidate_id));
        let driver = driver(
            scripted_aggregator(&[("alpha", 90.0), ("beta", 40.0)]),
            scores.clone(),
        );
        let first_id = first.candidate_id;

        let summary = driver
            .rank_session(request(Uuid::new_v4(), vec![first, second]))
            .await
            .unwrap();

        assert_eq!(summary.scored, 2);
        assert_eq!(summary.persistence_failures.len(), 1);
        assert_eq!(summary.persistence_failures[0].candidate_id, first_id);
        assert!(!summary.ranking[0].persisted());
        assert!(summary.ranking[1].persisted());
        assert_eq!(scores.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_an_error() {
        let driver = driver(scripted_aggregator(&[]), Arc::new(InMemoryScoreStore::new()));
        let session = Uuid::new_v4();
        let err = driver
            .rank_session(request(session, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, RankingError::NoCandidates(id) if id == session));
    }

    #[tokio::test]
    async fn test_uses_stored_weights_without_override() {
        let weights = Arc::new(InMemoryWeightStore::new());
        let session = Uuid::new_v4();
        weights
            .update(
                session,
                WeightSet {
                    skills: 0.0,
                    experience: 0.0,
                    education: 0.0,
                    culture: 1.0,
                },
            )
            .await
            .unwrap();
        let aggregator = Aggregator::new(
            Arc::new(FixedEvaluator::new(mock::skills(10.0))),
            Arc::new(FixedEvaluator::new(mock::experience(10.0))),
            Arc::new(FixedEvaluator::new(mock::education(10.0))),
            Arc::new(FixedEvaluator::new(mock::culture(88.0))),
        );
        let driver = RankingDriver::new(aggregator, weights, Arc::new(InMemoryScoreStore::new()));

        let mut req = request(session, vec![candidate("alpha")]);
        req.weight_override = None;
        let summary = driver.rank_session(req).await.unwrap();

        assert_eq!(summary.ranking[0].overall, 88);
        assert_eq!(summary.weights.culture, 1.0);
    }

    #[tokio::test]
    async fn test_override_is_normalized_and_stored() {
        let weights = Arc::new(InMemoryWeightStore::new());
        let session = Uuid::new_v4();
        let driver = RankingDriver::new(
            scripted_aggregator(&[]),
            weights.clone(),
            Arc::new(InMemoryScoreStore::new()),
        );

        let mut req = request(session, vec![candidate("alpha")]);
        req.weight_override = Some(PartialWeights {
            skills: Some(3.0),
            experience: Some(1.0),
            education: Some(0.0),
            culture: Some(0.0),
        });
        let summary = driver.rank_session(req).await.unwrap();

        assert_eq!(summary.weights.skills, 0.75);
        assert_eq!(weights.get_or_create(session).await.unwrap(), summary.weights);
    }

    #[tokio::test]
    async fn test_huge_override_still_scores_candidates() {
        let weights = Arc::new(InMemoryWeightStore::new());
        let session = Uuid::new_v4();
        let driver = RankingDriver::new(
            scripted_aggregator(&[("alpha", 90.0)]),
            weights.clone(),
            Arc::new(InMemoryScoreStore::new()),
        );

        let mut req = request(session, vec![candidate("alpha")]);
        req.weight_override = Some(PartialWeights {
            skills: Some(f64::MAX),
            experience: Some(f64::MAX),
            education: Some(0.0),
            culture: Some(0.0),
        });
        let summary = driver.rank_session(req).await.unwrap();

        assert!(summary.weights.is_normalized());
        // 0.5 * 90 + 0.5 * 50
        assert_eq!(summary.ranking[0].overall, 70);
        assert_eq!(weights.get_or_create(session).await.unwrap(), summary.weights);
    }

    #[tokio::test]
    async fn test_unavailable_weight_store_falls_back_to_defaults() {
        let driver = RankingDriver::new(
            scripted_aggregator(&[]),
            Arc::new(InMemoryWeightStore::unavailable()),
            Arc::new(InMemoryScoreStore::new()),
        );
        let mut req = request(Uuid::new_v4(), vec![candidate("alpha")]);
        req.weight_override = None;

        let summary = driver.rank_session(req).await.unwrap();

        assert_eq!(summary.weights, WeightSet::STANDARD);
        assert_eq!(summary.scored, 1);
    }

    #[tokio::test]
    async fn test_persisted_ranks_written_after_run() {
        let scores = Arc::new(InMemoryScoreStore::new());
        let driver = driver(
            scripted_aggregator(&[("alpha", 30.0), ("beta", 95.0)]),
            scores.clone(),
        )
        .with_persisted_ranks(true);
        let alpha = candidate("alpha");
        let alpha_id = alpha.candidate_id;

        driver
            .rank_session(request(Uuid::new_v4(), vec![alpha, candidate("beta")]))
            .await
            .unwrap();

        let records = scores.all().await;
        let alpha_record = records.iter().find(|r| r.candidate_id == alpha_id).unwrap();
        assert_eq!(alpha_record.rank, Some(2));
        assert!(records.iter().all(|r| r.rank.is_some()));
    }

    #[tokio::test]
    async fn test_culture_evaluator_receives_display_name() {
        struct NameCheck;

        #[async_trait::async_trait]
        impl crate::evaluation::Evaluator<CultureAssessment> for NameCheck {
            async fn evaluate(
                &self,
                request: &EvaluationRequest,
            ) -> Result<CultureAssessment, crate::errors::EvaluationFailure> {
                assert_eq!(request.candidate_name, "Unknown");
                Ok(mock::culture(50.0))
            }
        }

        let aggregator = Aggregator::new(
            Arc::new(FixedEvaluator::new(mock::skills(50.0))),
            Arc::new(FixedEvaluator::new(mock::experience(50.0))),
            Arc::new(FixedEvaluator::new(mock::education(50.0))),
            Arc::new(NameCheck),
        );
        let driver = driver(aggregator, Arc::new(InMemoryScoreStore::new()));
        let mut doc = candidate("alpha");
        doc.candidate_name = None;

        let summary = driver
            .rank_session(request(Uuid::new_v4(), vec![doc]))
            .await
            .unwrap();
        assert_eq!(summary.ranking[0].candidate_name, "Unknown");
    }
}
