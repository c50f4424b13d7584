use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::ScoreStore;
use crate::errors::PersistenceFailure;
use crate::models::score::{NewScoreRecord, ScoreRecord};

/// `candidate_scores` table. Re-ranking appends rows; reads pick the latest
/// row per candidate.
#[derive(Clone)]
pub struct PgScoreStore {
    pool: PgPool,
}

impl PgScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn save(&self, record: &NewScoreRecord) -> Result<Uuid, PersistenceFailure> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO candidate_scores
                (id, session_id, candidate_id, overall_score,
                 skills_score, experience_score, education_score, culture_score,
                 skills_details, experience_details, education_details, culture_details,
                 key_highlights, strengths, weaknesses, relevant_experience, weights)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(id)
        .bind(record.session_id)
        .bind(record.candidate_id)
        .bind(record.overall_score)
        .bind(record.skills_score)
        .bind(record.experience_score)
        .bind(record.education_score)
        .bind(record.culture_score)
        .bind(&record.skills_details)
        .bind(&record.experience_details)
        .bind(&record.education_details)
        .bind(&record.culture_details)
        .bind(&record.key_highlights)
        .bind(&record.strengths)
        .bind(&record.weaknesses)
        .bind(&record.relevant_experience)
        .bind(&record.weights)
        .execute(&self.pool)
        .await?;

        info!(
            "Saved score {id} for candidate {} in session {} (overall {})",
            record.candidate_id, record.session_id, record.overall_score
        );
        Ok(id)
    }

    async fn assign_rank(&self, record_id: Uuid, rank: i32) -> Result<(), PersistenceFailure> {
        let result =
            sqlx::query("UPDATE candidate_scores SET rank = $2 WHERE id = $1 AND rank IS NULL")
                .bind(record_id)
                .bind(rank)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceFailure::RecordNotFound(record_id));
        }
        Ok(())
    }

    async fn latest_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, PersistenceFailure> {
        Ok(sqlx::query_as::<_, ScoreRecord>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (candidate_id) *
                FROM candidate_scores
                WHERE session_id = $1
                ORDER BY candidate_id, created_at DESC
            ) latest
            ORDER BY overall_score DESC, created_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn history_for_candidate(
        &self,
        session_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, PersistenceFailure> {
        Ok(sqlx::query_as::<_, ScoreRecord>(
            r#"
            SELECT * FROM candidate_scores
            WHERE session_id = $1 AND candidate_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(session_id)
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Process-local score store. Records are kept in insertion order.
#[derive(Default)]
pub struct InMemoryScoreStore {
    records: Mutex<Vec<ScoreRecord>>,
    rejected_candidates: HashSet<Uuid>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every write for `candidate_id`, simulating a failing insert.
    pub fn rejecting(mut self, candidate_id: Uuid) -> Self {
        self.rejected_candidates.insert(candidate_id);
        self
    }

    /// Snapshot of every stored record.
    pub async fn all(&self) -> Vec<ScoreRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn save(&self, record: &NewScoreRecord) -> Result<Uuid, PersistenceFailure> {
        if self.rejected_candidates.contains(&record.candidate_id) {
            return Err(PersistenceFailure::Database(sqlx::Error::Protocol(format!(
                "insert rejected for candidate {}",
                record.candidate_id
            ))));
        }
        let id = Uuid::new_v4();
        let mut records = self.records.lock().await;
        // Keep created_at strictly increasing so "latest" is well defined.
        let now = Utc::now();
        let created_at = match records.last() {
            Some(last) if last.created_at >= now => {
                last.created_at + chrono::Duration::microseconds(1)
            }
            _ => now,
        };
        records.push(record.clone().into_record(id, created_at));
        Ok(id)
    }

    async fn assign_rank(&self, record_id: Uuid, rank: i32) -> Result<(), PersistenceFailure> {
        let mut records = self.records.lock().await;
        match records
            .iter_mut()
            .find(|r| r.id == record_id && r.rank.is_none())
        {
            Some(record) => {
                record.rank = Some(rank);
                Ok(())
            }
            None => Err(PersistenceFailure::RecordNotFound(record_id)),
        }
    }

    async fn latest_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, PersistenceFailure> {
        let records = self.records.lock().await;
        let mut seen = HashSet::new();
        let mut latest: Vec<ScoreRecord> = records
            .iter()
            .rev()
            .filter(|r| r.session_id == session_id)
            .filter(|r| seen.insert(r.candidate_id))
            .cloned()
            .collect();
        latest.sort_by(|a, b| {
            b.overall_score
                .cmp(&a.overall_score)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(latest)
    }

    async fn history_for_candidate(
        &self,
        session_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, PersistenceFailure> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.session_id == session_id && r.candidate_id == candidate_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::mock;
    use crate::scoring::{combine, WeightSet};

    fn new_record(session_id: Uuid, candidate_id: Uuid, skills: f64) -> NewScoreRecord {
        let aggregated = combine(
            mock::skills(skills),
            mock::experience(50.0),
            mock::education(50.0),
            mock::culture(50.0),
            &WeightSet::STANDARD,
        );
        NewScoreRecord::from_aggregate(session_id, candidate_id, &aggregated).unwrap()
    }

    #[tokio::test]
    async fn test_rescoring_appends_and_latest_wins() {
        let store = InMemoryScoreStore::new();
        let session = Uuid::new_v4();
        let candidate = Uuid::new_v4();

        store.save(&new_record(session, candidate, 20.0)).await.unwrap();
        store.save(&new_record(session, candidate, 90.0)).await.unwrap();

        let history = store.history_for_candidate(session, candidate).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].skills_score, 90.0);

        let latest = store.latest_for_session(session).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].skills_score, 90.0);
    }

    #[tokio::test]
    async fn test_latest_for_session_orders_by_overall() {
        let store = InMemoryScoreStore::new();
        let session = Uuid::new_v4();
        let (low, high) = (Uuid::new_v4(), Uuid::new_v4());

        store.save(&new_record(session, low, 10.0)).await.unwrap();
        store.save(&new_record(session, high, 100.0)).await.unwrap();
        store.save(&new_record(Uuid::new_v4(), low, 100.0)).await.unwrap();

        let latest = store.latest_for_session(session).await.unwrap();
        let ids: Vec<Uuid> = latest.iter().map(|r| r.candidate_id).collect();
        assert_eq!(ids, vec![high, low]);
    }

    #[tokio::test]
    async fn test_assign_rank_only_once() {
        let store = InMemoryScoreStore::new();
        let id = store
            .save(&new_record(Uuid::new_v4(), Uuid::new_v4(), 60.0))
            .await
            .unwrap();

        store.assign_rank(id, 1).await.unwrap();
        let err = store.assign_rank(id, 2).await.unwrap_err();
        assert!(matches!(err, PersistenceFailure::RecordNotFound(r) if r == id));
        assert_eq!(store.all().await[0].rank, Some(1));
    }

    #[tokio::test]
    async fn test_rejecting_store_fails_only_for_that_candidate() {
        let bad = Uuid::new_v4();
        let store = InMemoryScoreStore::new().rejecting(bad);
        let session = Uuid::new_v4();

        assert!(store.save(&new_record(session, bad, 50.0)).await.is_err());
        assert!(store.save(&new_record(session, Uuid::new_v4(), 50.0)).await.is_ok());
        assert_eq!(store.all().await.len(), 1);
    }
}
