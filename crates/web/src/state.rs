use axum::extract::FromRef;
use storage::{Database, services::rating::RatingCalculator};

use crate::middleware::auth::ApiKeys;

/// Shared handler state; each field is extractable on its own via `State<T>`
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Database,
    pub calculator: RatingCalculator,
    pub api_keys: ApiKeys,
}
