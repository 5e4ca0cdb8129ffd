use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Rating given to runners created without one
pub const DEFAULT_RATING: f64 = 1000.0;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Runner {
    pub id: i64,
    pub name: String,
    pub rating: f64,
    /// Legacy manual placement, superseded by rating standings
    pub rank: Option<i32>,
    pub last_active_date: chrono::NaiveDateTime,
    pub created_at: chrono::NaiveDateTime,
}
