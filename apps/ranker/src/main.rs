use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use ranker::config::Config;
use ranker::db::create_pool;
use ranker::evaluation::{
    CultureAssessment, EducationAssessment, ExperienceAssessment, LlmEvaluator, SkillsAssessment,
};
use ranker::llm_client::{self, LlmClient};
use ranker::screenings::{load_candidates, load_screening};
use ranker::store::{PgScoreStore, PgWeightStore};
use ranker::{Aggregator, RankRequest, RankingDriver};

/// Ranks every candidate of one screening session: `ranker <session-id>`.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ranker v{}", env!("CARGO_PKG_VERSION"));

    let Some(arg) = std::env::args().nth(1) else {
        bail!("usage: ranker <session-id>");
    };
    let session_id: Uuid = arg
        .parse()
        .with_context(|| format!("'{arg}' is not a valid session id"))?;

    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let aggregator = Aggregator::new(
        Arc::new(LlmEvaluator::<SkillsAssessment>::new(llm.clone())),
        Arc::new(LlmEvaluator::<ExperienceAssessment>::new(llm.clone())),
        Arc::new(LlmEvaluator::<EducationAssessment>::new(llm.clone())),
        Arc::new(LlmEvaluator::<CultureAssessment>::new(llm)),
    );
    let driver = RankingDriver::new(
        aggregator,
        Arc::new(PgWeightStore::new(db.clone())),
        Arc::new(PgScoreStore::new(db.clone())),
    )
    .with_persisted_ranks(config.persist_ranks);

    let screening = load_screening(&db, session_id)
        .await?
        .with_context(|| format!("Screening {session_id} not found"))?;
    let candidates = load_candidates(&db, session_id).await?;
    info!(
        "Loaded screening '{}' with {} resumes",
        screening.job_title,
        candidates.len()
    );

    let summary = driver
        .rank_session(RankRequest {
            session_id,
            job_description: screening.job_description,
            candidates,
            weight_override: None,
        })
        .await?;

    for candidate in &summary.ranking {
        info!(
            "#{} {} ({}): {}",
            candidate.rank, candidate.candidate_name, candidate.candidate_id, candidate.overall
        );
    }
    for skipped in &summary.skipped {
        warn!("Skipped {}: {:?}", skipped.candidate_id, skipped.reason);
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
