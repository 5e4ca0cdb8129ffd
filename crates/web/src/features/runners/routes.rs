use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

use super::handlers::{
    create_runner, delete_runner, get_runner, list_runners, update_rating, update_runner,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_runner))
        .route("/:id", put(update_runner))
        .route("/:id", delete(delete_runner))
        .route("/:id/rating", patch(update_rating))
        // earlier clients patch `/elo`
        .route("/:id/elo", patch(update_rating))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_runners))
        .route("/:id", get(get_runner))
        .merge(protected)
}
