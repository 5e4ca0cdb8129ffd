use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    dto::rating::RatingPreviewRequest,
    services::rating::{RatingCalculator, RatingOutcome},
};
use validator::Validate;

use crate::error::WebError;
use crate::extract::ApiJson;

/// Dry run of the rating pass; nothing is stored
#[utoipa::path(
    post,
    path = "/api/ratings/preview",
    request_body = RatingPreviewRequest,
    responses(
        (status = 200, description = "Computed outcome per runner, in input order", body = Vec<RatingOutcome>),
        (status = 400, description = "Validation error")
    ),
    tag = "ratings"
)]
pub async fn preview_ratings(
    State(calculator): State<RatingCalculator>,
    ApiJson(req): ApiJson<RatingPreviewRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let context = req.context(chrono::Utc::now().naive_utc());
    let outcomes = calculator.calculate(&req.inputs(context.today), &context);

    Ok(Json(outcomes).into_response())
}
