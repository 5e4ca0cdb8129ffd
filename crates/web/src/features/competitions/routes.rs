use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{
    add_participants, apply_ratings, create_competition, delete_competition, get_competition,
    list_competitions,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_competition))
        .route("/:id", delete(delete_competition))
        .route("/:id/runners", post(add_participants))
        .route("/:id/ratings", post(apply_ratings))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_competitions))
        .route("/:id", get(get_competition))
        .merge(protected)
}
