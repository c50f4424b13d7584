use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::WeightStore;
use crate::errors::PersistenceFailure;
use crate::models::weights::ScoringWeightsRow;
use crate::scoring::{normalize, WeightSet};

/// `scoring_weights` table, one row per session (primary key on `session_id`).
#[derive(Clone)]
pub struct PgWeightStore {
    pool: PgPool,
}

impl PgWeightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, session_id: Uuid) -> Result<Option<WeightSet>, PersistenceFailure> {
        let row = sqlx::query_as::<_, ScoringWeightsRow>(
            "SELECT * FROM scoring_weights WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(WeightSet::from))
    }
}

#[async_trait]
impl WeightStore for PgWeightStore {
    async fn get_or_create(&self, session_id: Uuid) -> Result<WeightSet, PersistenceFailure> {
        if let Some(weights) = self.fetch(session_id).await? {
            return Ok(weights);
        }

        // A concurrent first access may win the insert; either way the
        // read-back below returns the single stored row.
        let defaults = WeightSet::default();
        let inserted = sqlx::query(
            r#"
            INSERT INTO scoring_weights
                (session_id, skills_weight, experience_weight, education_weight, culture_weight)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(defaults.skills)
        .bind(defaults.experience)
        .bind(defaults.education)
        .bind(defaults.culture)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            info!("Created default scoring weights for session {session_id}");
        }

        let row = sqlx::query_as::<_, ScoringWeightsRow>(
            "SELECT * FROM scoring_weights WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        session_id: Uuid,
        weights: WeightSet,
    ) -> Result<WeightSet, PersistenceFailure> {
        let normalized = normalize(&weights.into());

        sqlx::query(
            r#"
            INSERT INTO scoring_weights
                (session_id, skills_weight, experience_weight, education_weight, culture_weight)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id) DO UPDATE SET
                skills_weight = EXCLUDED.skills_weight,
                experience_weight = EXCLUDED.experience_weight,
                education_weight = EXCLUDED.education_weight,
                culture_weight = EXCLUDED.culture_weight,
                updated_at = now()
            "#,
        )
        .bind(session_id)
        .bind(normalized.skills)
        .bind(normalized.experience)
        .bind(normalized.education)
        .bind(normalized.culture)
        .execute(&self.pool)
        .await?;

        info!("Updated scoring weights for session {session_id}: {normalized:?}");
        Ok(normalized)
    }
}

/// Process-local weight store. Insert-if-absent happens under one lock.
#[derive(Default)]
pub struct InMemoryWeightStore {
    weights: Mutex<HashMap<Uuid, WeightSet>>,
    creations: Mutex<u32>,
    unavailable: bool,
}

impl InMemoryWeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, for exercising fallback paths.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of default records created so far.
    pub async fn creations(&self) -> u32 {
        *self.creations.lock().await
    }

    fn check_available(&self) -> Result<(), PersistenceFailure> {
        if self.unavailable {
            return Err(PersistenceFailure::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl WeightStore for InMemoryWeightStore {
    async fn get_or_create(&self, session_id: Uuid) -> Result<WeightSet, PersistenceFailure> {
        self.check_available()?;
        let mut weights = self.weights.lock().await;
        if let Some(existing) = weights.get(&session_id) {
            return Ok(*existing);
        }
        weights.insert(session_id, WeightSet::default());
        *self.creations.lock().await += 1;
        Ok(WeightSet::default())
    }

    async fn update(
        &self,
        session_id: Uuid,
        weights: WeightSet,
    ) -> Result<WeightSet, PersistenceFailure> {
        self.check_available()?;
        let normalized = normalize(&weights.into());
        self.weights.lock().await.insert(session_id, normalized);
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_or_create_twice_returns_same_weights() {
        let store = InMemoryWeightStore::new();
        let session = Uuid::new_v4();

        let first = store.get_or_create(session).await.unwrap();
        let second = store.get_or_create(session).await.unwrap();

        assert_eq!(first, WeightSet::STANDARD);
        assert_eq!(first, second);
        assert_eq!(store.creations().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_creates_once() {
        let store = Arc::new(InMemoryWeightStore::new());
        let session = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get_or_create(session).await.unwrap() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), WeightSet::STANDARD);
        }
        assert_eq!(store.creations().await, 1);
    }

    #[tokio::test]
    async fn test_update_normalizes_before_storing() {
        let store = InMemoryWeightStore::new();
        let session = Uuid::new_v4();

        let stored = store
            .update(
                session,
                WeightSet {
                    skills: 2.0,
                    experience: 1.0,
                    education: 1.0,
                    culture: 0.0,
                },
            )
            .await
            .unwrap();

        assert!(stored.is_normalized());
        assert_eq!(stored.skills, 0.5);
        assert_eq!(store.get_or_create(session).await.unwrap(), stored);
        // update counts as creation of the row, not a default creation
        assert_eq!(store.creations().await, 0);
    }

    #[tokio::test]
    async fn test_update_is_full_replacement() {
        let store = InMemoryWeightStore::new();
        let session = Uuid::new_v4();
        store.get_or_create(session).await.unwrap();

        let replacement = WeightSet {
            skills: 0.0,
            experience: 0.0,
            education: 0.0,
            culture: 1.0,
        };
        store.update(session, replacement).await.unwrap();

        assert_eq!(store.get_or_create(session).await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = InMemoryWeightStore::unavailable();
        let err = store.get_or_create(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PersistenceFailure::Database(_)));
    }
}
