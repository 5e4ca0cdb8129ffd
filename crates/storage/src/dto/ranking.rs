use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::common::PaginationParams;

// Query strings cannot carry numbers through `#[serde(flatten)]`, so the
// pagination fields are repeated here.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StandingsFilter {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Only runners whose rating is at least this value
    pub min_rating: Option<f64>,
}

impl StandingsFilter {
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pagination().validate()?;

        if let Some(min_rating) = self.min_rating
            && !min_rating.is_finite()
        {
            return Err("min_rating must be a finite number".to_string());
        }

        Ok(())
    }
}

/// A runner's place in the rating standings; equal ratings share a rank
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StandingEntry {
    pub rank: i64,
    pub runner_id: i64,
    pub name: String,
    pub rating: f64,
    pub last_active_date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_missing_pagination() {
        let pagination = StandingsFilter::default().pagination();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 50);
    }

    #[test]
    fn test_rejects_zero_page() {
        let filter = StandingsFilter {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.validate().unwrap_err(), "page must be >= 1");
    }

    #[test]
    fn test_rejects_non_finite_floor() {
        let filter = StandingsFilter {
            min_rating: Some(f64::NAN),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }
}
