use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::competition::{validate_difficulty, validate_time};
use super::runner::validate_rating;
use crate::models::{CompetitionType, DifficultyInput};
use crate::services::rating::{RatingContext, RatingInput, RatingOutcome};

fn default_present() -> bool {
    true
}

/// Request payload for applying ratings to a timed competition
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplyRatingsRequest {
    /// Participant whose presence penalises everyone finishing behind them
    pub special_runner_id: Option<i64>,

    #[serde(default = "default_present")]
    pub special_runner_present: bool,

    /// Reference instant for inactivity decay, defaults to the competition date
    pub today: Option<NaiveDateTime>,
}

impl ApplyRatingsRequest {
    pub fn special_runner(&self) -> Option<i64> {
        self.special_runner_id.filter(|_| self.special_runner_present)
    }
}

/// Outcome of a rating pass over a stored competition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingPassResponse {
    pub competition_id: i64,
    /// False when the field was too small or untimed and nothing was written
    pub applied: bool,
    pub outcomes: Vec<RatingOutcome>,
}

/// A participant submitted for a dry-run rating computation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PreviewRunner {
    pub id: i64,

    #[validate(custom(function = "validate_rating"))]
    pub rating: f64,

    #[validate(custom(function = "validate_time"))]
    pub time: f64,

    #[validate(range(min = 1))]
    pub rank: Option<u32>,

    /// Defaults to the reference instant, meaning no decay
    pub last_active_date: Option<NaiveDateTime>,
}

/// Request payload for computing ratings without persisting them
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RatingPreviewRequest {
    #[validate(length(min = 1, message = "At least one runner is required"), nested)]
    pub runners: Vec<PreviewRunner>,

    #[serde(default)]
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: DifficultyInput,

    pub special_runner_id: Option<i64>,

    #[serde(default = "default_present")]
    pub special_runner_present: bool,

    pub today: Option<NaiveDateTime>,
}

impl RatingPreviewRequest {
    pub fn context(&self, now: NaiveDateTime) -> RatingContext {
        let special_runner = self.special_runner_id.filter(|_| self.special_runner_present);
        RatingContext::new(CompetitionType::from(&self.difficulty), self.today.unwrap_or(now))
            .with_special_runner(special_runner)
    }

    pub fn inputs(&self, today: NaiveDateTime) -> Vec<RatingInput> {
        self.runners
            .iter()
            .map(|runner| RatingInput {
                id: runner.id,
                rating: runner.rating,
                time: runner.time,
                rank: runner.rank,
                last_active_date: runner.last_active_date.unwrap_or(today),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_runner_needs_presence() {
        let request: ApplyRatingsRequest =
            serde_json::from_str(r#"{"special_runner_id": 4, "special_runner_present": false}"#)
                .unwrap();
        assert_eq!(request.special_runner(), None);

        let request: ApplyRatingsRequest =
            serde_json::from_str(r#"{"special_runner_id": 4}"#).unwrap();
        assert_eq!(request.special_runner(), Some(4));
    }

    #[test]
    fn test_preview_defaults_last_active_to_today() {
        let request: RatingPreviewRequest = serde_json::from_str(
            r#"{
                "runners": [{"id": 1, "rating": 1500, "time": 600}],
                "difficulty": "national",
                "today": "2025-06-01T00:00:00"
            }"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let now = chrono::NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let context = request.context(now);
        assert_eq!(context.competition_type, CompetitionType::National);
        assert_eq!(context.today.to_string(), "2025-06-01 00:00:00");

        let inputs = request.inputs(context.today);
        assert_eq!(inputs[0].last_active_date, context.today);
    }

    #[test]
    fn test_preview_rejects_non_finite_rating() {
        let request = RatingPreviewRequest {
            runners: vec![PreviewRunner {
                id: 1,
                rating: f64::INFINITY,
                time: 600.0,
                rank: None,
                last_active_date: None,
            }],
            difficulty: DifficultyInput::default(),
            special_runner_id: None,
            special_runner_present: true,
            today: None,
        };
        assert!(request.validate().is_err());
    }
}
