use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A runner's entry in a competition, joined with the runner's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompetitionParticipant {
    pub competition_id: i64,
    pub runner_id: i64,
    pub name: String,
    pub time: f64,
}

/// Participant row carrying the runner state a rating pass needs
#[derive(Debug, Clone, FromRow)]
pub struct RatingParticipant {
    pub runner_id: i64,
    pub rating: f64,
    pub time: f64,
    pub last_active_date: chrono::NaiveDateTime,
}
