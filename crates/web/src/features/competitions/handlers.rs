use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::MessageResponse,
        competition::{
            AddParticipantsRequest, CompetitionDetailResponse, CompetitionResponse,
            CreateCompetitionRequest,
        },
        rating::{ApplyRatingsRequest, RatingPassResponse},
    },
    services::rating::RatingCalculator,
};
use validator::Validate;

use crate::error::WebError;
use crate::extract::{ApiJson, OptionalJson};

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "List all competitions with their participants", body = Vec<CompetitionDetailResponse>)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(State(db): State<Database>) -> Result<Response, WebError> {
    let competitions = services::list_competitions(db.pool()).await?;

    Ok(Json(competitions).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition found", body = CompetitionDetailResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let competition = services::get_competition(db.pool(), id).await?;

    Ok(Json(competition).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions",
    request_body = CreateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created successfully", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(db): State<Database>,
    ApiJson(req): ApiJson<CreateCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competition = services::create_competition(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(CompetitionResponse::from(competition))).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/runners",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    request_body = AddParticipantsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participants recorded", body = MessageResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Unknown runner"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn add_participants(
    State(db): State<Database>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<AddParticipantsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    req.validate_unique_runners().map_err(WebError::BadRequest)?;

    let count = services::add_participants(db.pool(), id, &req).await?;

    Ok(Json(MessageResponse::new(format!(
        "{count} runner(s) recorded for competition {id}"
    )))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/ratings",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    request_body = ApplyRatingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rating pass result", body = RatingPassResponse),
        (status = 400, description = "Body present but not a valid options object"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Ratings already applied")
    ),
    tag = "competitions"
)]
pub async fn apply_ratings(
    State(db): State<Database>,
    State(calculator): State<RatingCalculator>,
    Path(id): Path<i64>,
    OptionalJson(req): OptionalJson<ApplyRatingsRequest>,
) -> Result<Response, WebError> {
    let req = req.unwrap_or_default();
    req.validate()?;

    let now = chrono::Utc::now().naive_utc();
    let result = services::apply_ratings(db.pool(), &calculator, id, &req, now).await?;

    Ok(Json(result).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitions/{id}",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn delete_competition(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    services::delete_competition(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
