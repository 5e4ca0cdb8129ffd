use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Runner;

/// Response containing runner information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunnerResponse {
    pub id: i64,
    pub name: String,
    pub rating: f64,
    pub rank: Option<i32>,
    pub last_active_date: NaiveDateTime,
}

/// Request payload for adding a runner
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRunnerRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// Starting rating, 1000 when omitted
    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<f64>,

    #[validate(range(min = 1))]
    pub rank: Option<i32>,
}

/// Request payload for editing a runner; omitted fields keep their value
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRunnerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<f64>,

    #[validate(range(min = 1))]
    pub rank: Option<i32>,
}

/// Request payload for overriding a runner's rating
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRatingRequest {
    #[validate(custom(function = "validate_rating"))]
    pub rating: f64,
}

pub(crate) fn validate_rating(rating: f64) -> Result<(), validator::ValidationError> {
    if rating.is_finite() {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("non_finite_rating");
        error.message = Some("Rating must be a finite number".into());
        Err(error)
    }
}

impl From<Runner> for RunnerResponse {
    fn from(runner: Runner) -> Self {
        Self {
            id: runner.id,
            name: runner.name,
            rating: runner.rating,
            rank: runner.rank,
            last_active_date: runner.last_active_date,
        }
    }
}
