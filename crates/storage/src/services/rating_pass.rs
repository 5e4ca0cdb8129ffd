use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::dto::rating::{ApplyRatingsRequest, RatingPassResponse};
use crate::error::{Result, StorageError};
use crate::models::{Competition, RatingParticipant};
use crate::repository::competition::CompetitionRepository;
use crate::repository::runner::RunnerRepository;
use crate::services::rating::{RatingCalculator, RatingContext, RatingInput, is_ratable, is_timed};

/// Rate a stored competition and persist every timed participant's new rating.
///
/// Runner updates and the competition's `rated_at` stamp commit together. A
/// field that cannot be rated (fewer than two timed runners) is
/// reported with `applied = false` and nothing is written.
pub async fn apply_competition_ratings(
    pool: &PgPool,
    calculator: &RatingCalculator,
    competition_id: i64,
    request: &ApplyRatingsRequest,
    now: NaiveDateTime,
) -> Result<RatingPassResponse> {
    let competition = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    if competition.is_rated() {
        return Err(StorageError::ConstraintViolation(
            "Ratings were already applied for this competition".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let participants = CompetitionRepository::participants_for_rating(&mut tx, competition_id).await?;
    let inputs: Vec<RatingInput> = participants.iter().map(rating_input).collect();

    let active_at = activity_instant(&competition, now);
    let context = RatingContext::new(
        competition.competition_type(),
        request.today.unwrap_or(active_at),
    )
    .with_special_runner(request.special_runner());

    let outcomes = calculator.calculate(&inputs, &context);

    if !is_ratable(&inputs) {
        tx.rollback().await?;
        tracing::info!(
            competition_id,
            participants = inputs.len(),
            "Competition cannot be rated yet, no ratings changed"
        );
        return Ok(RatingPassResponse {
            competition_id,
            applied: false,
            outcomes,
        });
    }

    // Untimed entries did not run; their rating and activity stay as they were
    for outcome in outcomes.iter().filter(|outcome| is_timed(outcome.time)) {
        RunnerRepository::apply_rating(&mut tx, outcome.id, outcome.new_rating, active_at).await?;
    }

    CompetitionRepository::mark_rated(&mut tx, competition_id).await?;
    tx.commit().await?;

    tracing::info!(
        competition_id,
        participants = outcomes.len(),
        competition_type = %context.competition_type,
        "Applied competition ratings"
    );

    Ok(RatingPassResponse {
        competition_id,
        applied: true,
        outcomes,
    })
}

fn rating_input(participant: &RatingParticipant) -> RatingInput {
    RatingInput {
        id: participant.runner_id,
        rating: participant.rating,
        time: participant.time,
        rank: None,
        last_active_date: participant.last_active_date,
    }
}

/// The instant a competition counts as activity: its date at midnight, or `now` when undated
pub fn activity_instant(competition: &Competition, now: NaiveDateTime) -> NaiveDateTime {
    competition
        .date
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}
