use chrono::NaiveDateTime;
use sqlx::PgPool;
use storage::{
    dto::{
        competition::{AddParticipantsRequest, CompetitionDetailResponse, CreateCompetitionRequest},
        rating::{ApplyRatingsRequest, RatingPassResponse},
    },
    error::Result,
    models::Competition,
    repository::competition::CompetitionRepository,
    services::{rating::RatingCalculator, rating_pass},
};

/// List all competitions with their participants
pub async fn list_competitions(pool: &PgPool) -> Result<Vec<CompetitionDetailResponse>> {
    let repo = CompetitionRepository::new(pool);
    let competitions = repo.list_with_participants().await?;

    Ok(competitions
        .into_iter()
        .map(|(competition, participants)| {
            CompetitionDetailResponse::new(competition, participants)
        })
        .collect())
}

/// Get a competition and its participants
pub async fn get_competition(pool: &PgPool, id: i64) -> Result<CompetitionDetailResponse> {
    let repo = CompetitionRepository::new(pool);
    let competition = repo.find_by_id(id).await?;
    let participants = repo.participants(id).await?;

    Ok(CompetitionDetailResponse::new(competition, participants))
}

/// Create a competition
pub async fn create_competition(
    pool: &PgPool,
    request: &CreateCompetitionRequest,
) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    let competition = repo.create(request).await?;
    tracing::info!(
        competition_id = competition.id,
        difficulty = %competition.difficulty,
        "Competition created"
    );
    Ok(competition)
}

/// Record runners and their finish times
pub async fn add_participants(
    pool: &PgPool,
    competition_id: i64,
    request: &AddParticipantsRequest,
) -> Result<usize> {
    let repo = CompetitionRepository::new(pool);
    // 404 before touching the join table
    repo.find_by_id(competition_id).await?;
    repo.upsert_participants(competition_id, &request.runners)
        .await?;

    tracing::info!(
        competition_id,
        count = request.runners.len(),
        "Participants recorded"
    );
    Ok(request.runners.len())
}

/// Apply the rating pass for a stored competition
pub async fn apply_ratings(
    pool: &PgPool,
    calculator: &RatingCalculator,
    competition_id: i64,
    request: &ApplyRatingsRequest,
    now: NaiveDateTime,
) -> Result<RatingPassResponse> {
    rating_pass::apply_competition_ratings(pool, calculator, competition_id, request, now).await
}

/// Delete a competition and its participant entries
pub async fn delete_competition(pool: &PgPool, id: i64) -> Result<()> {
    let repo = CompetitionRepository::new(pool);
    repo.delete(id).await?;
    tracing::info!(competition_id = id, "Competition deleted");
    Ok(())
}
