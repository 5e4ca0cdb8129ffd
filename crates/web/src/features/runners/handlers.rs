use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::runner::{CreateRunnerRequest, RunnerResponse, UpdateRatingRequest, UpdateRunnerRequest},
};
use validator::Validate;

use crate::error::WebError;
use crate::extract::ApiJson;

use super::services;

#[utoipa::path(
    get,
    path = "/api/runners",
    responses(
        (status = 200, description = "List all runners, highest rated first", body = Vec<RunnerResponse>)
    ),
    tag = "runners"
)]
pub async fn list_runners(State(db): State<Database>) -> Result<Response, WebError> {
    let runners = services::list_runners(db.pool()).await?;

    let response: Vec<RunnerResponse> = runners.into_iter().map(RunnerResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/runners/{id}",
    params(
        ("id" = i64, Path, description = "Runner id")
    ),
    responses(
        (status = 200, description = "Runner found", body = RunnerResponse),
        (status = 404, description = "Runner not found")
    ),
    tag = "runners"
)]
pub async fn get_runner(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let runner = services::get_runner(db.pool(), id).await?;

    Ok(Json(RunnerResponse::from(runner)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/runners",
    request_body = CreateRunnerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Runner created successfully", body = RunnerResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "runners"
)]
pub async fn create_runner(
    State(db): State<Database>,
    ApiJson(req): ApiJson<CreateRunnerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let runner = services::create_runner(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(RunnerResponse::from(runner))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/runners/{id}",
    params(
        ("id" = i64, Path, description = "Runner id")
    ),
    request_body = UpdateRunnerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Runner updated successfully", body = RunnerResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Runner not found")
    ),
    tag = "runners"
)]
pub async fn update_runner(
    State(db): State<Database>,
    Path(id): Path<i64>,
    ApiJson(update_req): ApiJson<UpdateRunnerRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_runner(db.pool(), id, &update_req).await?;

    Ok(Json(RunnerResponse::from(updated)).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/runners/{id}/rating",
    params(
        ("id" = i64, Path, description = "Runner id")
    ),
    request_body = UpdateRatingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rating overridden", body = RunnerResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Runner not found")
    ),
    tag = "runners"
)]
pub async fn update_rating(
    State(db): State<Database>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateRatingRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let updated = services::update_rating(db.pool(), id, req.rating).await?;

    Ok(Json(RunnerResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/runners/{id}",
    params(
        ("id" = i64, Path, description = "Runner id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Runner and its competition entries deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Runner not found")
    ),
    tag = "runners"
)]
pub async fn delete_runner(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    services::delete_runner(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
