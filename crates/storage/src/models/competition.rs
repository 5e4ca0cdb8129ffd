use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::CompetitionType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub id: i64,
    pub name: String,
    pub date: Option<chrono::NaiveDate>,
    pub difficulty: String,
    pub rated_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
}

impl Competition {
    pub fn competition_type(&self) -> CompetitionType {
        CompetitionType::from_key(&self.difficulty)
    }

    pub fn is_rated(&self) -> bool {
        self.rated_at.is_some()
    }
}
