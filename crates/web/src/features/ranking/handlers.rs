use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::PaginatedResponse,
        ranking::{StandingEntry, StandingsFilter},
    },
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rankings",
    params(StandingsFilter),
    responses(
        (status = 200, description = "Standings retrieved successfully", body = PaginatedResponse<StandingEntry>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "rankings"
)]
pub async fn get_standings(
    State(db): State<Database>,
    Query(filter): Query<StandingsFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::get_standings(db.pool(), &filter).await?;

    let response = PaginatedResponse::new(entries, &filter.pagination(), total_items);

    Ok(Json(response).into_response())
}
