//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and holds the master definition for the
//! OpenAPI specification.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use vivamate_core::validation::schemas;

use crate::web::auth::{
    login_handler, logout_handler, register_handler, request_otp_handler, verify_otp_handler,
};
use crate::web::challenges::{
    challenge_by_date_handler, daily_challenge_handler, submit_challenge_handler,
};
use crate::web::insight::insight_handler;
use crate::web::middleware::require_auth;
use crate::web::profile::{get_profile_handler, update_profile_handler};
use crate::web::protocol::{
    ChallengeResponse, HealthResponse, LoginRequest, MessageResponse, OtpRequest,
    QuestionResponse, RegisterRequest, SubmissionResponse, SubmitChallengeRequest,
    UpdateProfileRequest, UserResponse, VerifyOtpRequest,
};
use crate::web::state::AppState;
use crate::web::validate::{validate, validate_body, FieldError, RequestPart, ValidationFailure};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::auth::request_otp_handler,
        crate::web::auth::verify_otp_handler,
        crate::web::profile::get_profile_handler,
        crate::web::profile::update_profile_handler,
        crate::web::challenges::daily_challenge_handler,
        crate::web::challenges::challenge_by_date_handler,
        crate::web::challenges::submit_challenge_handler,
        crate::web::insight::insight_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, OtpRequest, VerifyOtpRequest,
            UpdateProfileRequest, SubmitChallengeRequest, UserResponse,
            ChallengeResponse, QuestionResponse, SubmissionResponse,
            MessageResponse, HealthResponse, ValidationFailure, FieldError
        )
    ),
    tags(
        (name = "VivaMate API", description = "Interview practice: accounts, daily challenges and insights.")
    )
)]
pub struct ApiDoc;

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds the API router. CORS and the Swagger UI are added by the binary.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/auth/register",
            post(register_handler).layer(from_fn(validate_body(schemas::register()))),
        )
        .route(
            "/auth/login",
            post(login_handler).layer(from_fn(validate_body(schemas::login()))),
        )
        .route("/auth/logout", post(logout_handler))
        .route(
            "/auth/otp/request",
            post(request_otp_handler).layer(from_fn(validate_body(schemas::request_otp()))),
        )
        .route(
            "/auth/otp/verify",
            post(verify_otp_handler).layer(from_fn(validate_body(schemas::verify_otp()))),
        )
        .route(
            "/ai/insight",
            get(insight_handler).layer(from_fn(validate(
                schemas::insight_query(),
                RequestPart::Query,
            ))),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(get_profile_handler).merge(
                put(update_profile_handler)
                    .layer(from_fn(validate_body(schemas::update_profile()))),
            ),
        )
        .route("/challenges/daily", get(daily_challenge_handler))
        .route(
            "/challenges/submit",
            post(submit_challenge_handler)
                .layer(from_fn(validate_body(schemas::submit_challenge()))),
        )
        .route(
            "/challenges/{date}",
            get(challenge_by_date_handler).layer(from_fn(validate(
                schemas::challenge_date_params(),
                RequestPart::Params,
            ))),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
