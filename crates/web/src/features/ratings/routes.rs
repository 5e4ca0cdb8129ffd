use axum::{Router, routing::post};

use super::handlers::preview_ratings;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/preview", post(preview_ratings))
}
