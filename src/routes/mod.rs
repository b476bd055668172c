pub mod docs;
pub mod health;
pub mod interviews;
pub mod public;
pub mod questions;

use axum::{
    extract::rejection::JsonRejection,
    routing::{get, patch, post},
    Json, Router,
};

use crate::error::{Error, Result};
use crate::middleware::{auth, rate_limit};
use crate::AppState;

/// Unwraps a JSON body, turning axum's rejection into the API's error shape.
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| Error::BadRequest(rejection.body_text()))
}

/// Every route of the service. Cross-cutting layers (CORS, tracing) are added
/// by the binary.
pub fn router(state: AppState, public_rps: u32, auth_rps: u32) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/docs/openapi.json", get(docs::openapi_json));

    let public_api = Router::new()
        .route(
            "/api/public/interviews/:token",
            get(public::get_interview_by_token),
        )
        .route(
            "/api/public/interviews/:token/submit",
            post(public::submit_interview),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new("public", public_rps),
            rate_limit::rps_middleware,
        ));

    let staff_api = Router::new()
        .route(
            "/api/interviews",
            get(interviews::list_interviews).post(interviews::create_interview),
        )
        .route(
            "/api/interviews/:id",
            get(interviews::get_interview).delete(interviews::cancel_interview),
        )
        .route(
            "/api/interviews/:id/responses",
            get(interviews::get_interview_responses),
        )
        .route(
            "/api/interviews/:id/score",
            patch(interviews::update_interview_scores),
        )
        .route("/api/questions", get(questions::list_questions))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_keys.clone(),
            auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new("staff", auth_rps),
            rate_limit::rps_middleware,
        ));

    base_routes
        .merge(public_api)
        .merge(staff_api)
        .with_state(state)
}
