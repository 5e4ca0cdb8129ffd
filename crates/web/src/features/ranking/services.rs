use sqlx::PgPool;
use storage::{
    dto::ranking::{StandingEntry, StandingsFilter},
    error::Result,
    repository::ranking::RankingRepository,
};

/// Get the rating standings with filtering and pagination
pub async fn get_standings(
    pool: &PgPool,
    filter: &StandingsFilter,
) -> Result<(Vec<StandingEntry>, i64)> {
    let repo = RankingRepository::new(pool);
    repo.get_standings(filter).await
}
