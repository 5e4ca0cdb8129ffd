use std::time::Duration;

use anyhow::Context;
use axum::Router;
use storage::{Database, services::rating::RatingCalculator};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod features;
mod middleware;
mod state;

use config::Config;
use features::{competitions, ranking, ratings, runners};
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        runners::handlers::list_runners,
        runners::handlers::get_runner,
        runners::handlers::create_runner,
        runners::handlers::update_runner,
        runners::handlers::update_rating,
        runners::handlers::delete_runner,
        competitions::handlers::list_competitions,
        competitions::handlers::get_competition,
        competitions::handlers::create_competition,
        competitions::handlers::add_participants,
        competitions::handlers::apply_ratings,
        competitions::handlers::delete_competition,
        ratings::handlers::preview_ratings,
        ranking::handlers::get_standings,
    ),
    components(
        schemas(
            storage::dto::runner::CreateRunnerRequest,
            storage::dto::runner::UpdateRunnerRequest,
            storage::dto::runner::UpdateRatingRequest,
            storage::dto::runner::RunnerResponse,
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::AddParticipantsRequest,
            storage::dto::competition::ParticipantTime,
            storage::dto::competition::CompetitionResponse,
            storage::dto::competition::CompetitionDetailResponse,
            storage::dto::competition::ParticipantDetail,
            storage::dto::rating::ApplyRatingsRequest,
            storage::dto::rating::RatingPassResponse,
            storage::dto::rating::RatingPreviewRequest,
            storage::dto::rating::PreviewRunner,
            storage::dto::ranking::StandingEntry,
            storage::dto::common::PaginationMeta,
            storage::dto::common::MessageResponse,
            storage::models::DifficultyInput,
            storage::services::rating::RatingOutcome,
        )
    ),
    tags(
        (name = "runners", description = "Runner endpoints"),
        (name = "competitions", description = "Competition and rating pass endpoints"),
        (name = "ratings", description = "Stateless rating calculation"),
        (name = "rankings", description = "Public standings"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let api_keys = state.api_keys.clone();

    Router::new()
        .nest("/api/runners", runners::routes::routes(api_keys.clone()))
        .nest("/api/competitions", competitions::routes::routes(api_keys))
        .nest("/api/ratings", ratings::routes::routes())
        .nest("/api/rankings", ranking::routes::routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting runner ratings API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("No API_KEYS configured; every protected route will answer 401");
    } else {
        tracing::info!("{} API key(s) loaded", api_keys.len());
    }

    let state = AppState {
        db,
        calculator: RatingCalculator::new(config.rating),
        api_keys,
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app(state, config.request_timeout))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    const KEY: &str = "test-key";

    fn test_app() -> Router {
        let state = AppState {
            db: Database::connect_lazy("postgres://localhost/runner_ratings_test").unwrap(),
            calculator: RatingCalculator::default(),
            api_keys: ApiKeys::from_comma_separated(KEY),
        };
        app(state, Duration::from_secs(30))
    }

    fn json_request(method: &str, uri: &str, body: Value, key: Option<&str>) -> Request<Body> {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_preview_is_public_and_computes_deltas() {
        let body = json!({
            "runners": [
                { "id": 1, "rating": 1500, "time": 600 },
                { "id": 2, "rating": 1500, "time": 650 },
                { "id": 3, "rating": 1500, "time": 700 }
            ],
            "difficulty": "local",
            "today": "2025-06-01T00:00:00"
        });

        let response = test_app()
            .oneshot(json_request("POST", "/api/ratings/preview", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outcomes = body_json(response).await;
        let deltas: Vec<i64> = outcomes
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["delta"].as_i64().unwrap())
            .collect();
        assert_eq!(deltas, vec![5, 1, -1]);
    }

    #[tokio::test]
    async fn test_preview_rejects_empty_field() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/ratings/preview",
                json!({ "runners": [] }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/ratings/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_writes_require_an_api_key() {
        let cases = [
            ("POST", "/api/runners", json!({ "name": "Ada" })),
            ("PUT", "/api/runners/1", json!({ "name": "Ada" })),
            ("PATCH", "/api/runners/1/rating", json!({ "rating": 1200 })),
            ("PATCH", "/api/runners/1/elo", json!({ "rating": 1200 })),
            ("POST", "/api/competitions", json!({ "name": "Spring 5k" })),
            ("POST", "/api/competitions/1/runners", json!({ "runners": [{ "id": 1, "time": 900 }] })),
            ("POST", "/api/competitions/1/ratings", json!({})),
        ];

        for (method, uri, body) in cases {
            let response = test_app()
                .oneshot(json_request(method, uri, body.clone(), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

            let response = test_app()
                .oneshot(json_request(method, uri, body, Some("wrong")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/runners/1")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_bodies_are_rejected_before_storage() {
        let response = test_app()
            .oneshot(json_request("POST", "/api/runners", json!({ "name": "" }), Some(KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Validation failed");

        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/competitions/1/runners",
                json!({ "runners": [{ "id": 1, "time": 900 }, { "id": 1, "time": 910 }] }),
                Some(KEY),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Runner 1 is listed more than once"
        );
    }

    #[tokio::test]
    async fn test_rating_pass_rejects_unreadable_options() {
        for body in [r#"{"special_runner_id":"#, r#"{"special_runner_id": "4"}"#] {
            let request = Request::builder()
                .method("POST")
                .uri("/api/competitions/1/ratings")
                .header(header::AUTHORIZATION, KEY)
                .body(Body::from(body))
                .unwrap();

            let response = test_app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert!(body_json(response).await["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_standings_reject_bad_pagination() {
        let request = Request::builder()
            .uri("/api/rankings?page=0")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = body_json(response).await;
        assert!(document["paths"]["/api/ratings/preview"].is_object());
    }
}
