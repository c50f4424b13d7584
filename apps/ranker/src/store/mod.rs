//! Persistence seams for the ranking engine.
//!
//! Both stores are traits so the driver can run against Postgres in
//! production and against the in-memory implementations in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::PersistenceFailure;
use crate::models::score::{NewScoreRecord, ScoreRecord};
use crate::scoring::WeightSet;

pub mod scores;
pub mod weights;

pub use scores::{InMemoryScoreStore, PgScoreStore};
pub use weights::{InMemoryWeightStore, PgWeightStore};

/// One `WeightSet` per session.
#[async_trait]
pub trait WeightStore: Send + Sync {
    /// Returns the session's weights, creating the standard defaults on first access.
    /// Concurrent first calls converge on a single stored record.
    async fn get_or_create(&self, session_id: Uuid) -> Result<WeightSet, PersistenceFailure>;

    /// Replaces the session's weights. Input is always normalized before it is
    /// stored; the stored value is returned.
    async fn update(
        &self,
        session_id: Uuid,
        weights: WeightSet,
    ) -> Result<WeightSet, PersistenceFailure>;
}

/// Append-only evaluation records.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn save(&self, record: &NewScoreRecord) -> Result<Uuid, PersistenceFailure>;

    /// Sets the derived rank on a record that does not have one yet.
    async fn assign_rank(&self, record_id: Uuid, rank: i32) -> Result<(), PersistenceFailure>;

    /// Latest record per candidate, best overall score first.
    async fn latest_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, PersistenceFailure>;

    /// Every record for one candidate, newest first.
    async fn history_for_candidate(
        &self,
        session_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, PersistenceFailure>;
}
