//! services/api/src/web/challenges.rs
//!
//! Daily challenge retrieval and submission.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use vivamate_core::PortError;

use crate::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::protocol::{
    ChallengeDateParams, ChallengeResponse, SubmissionResponse, SubmitChallengeRequest,
};
use crate::web::state::AppState;
use crate::web::validate::{ValidatedParams, ValidationFailure};

/// Today's date key in UTC.
pub fn today_key() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// GET /challenges/daily - Today's challenge
#[utoipa::path(
    get,
    path = "/challenges/daily",
    responses(
        (status = 200, description = "Today's challenge", body = ChallengeResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "No challenge today")
    )
)]
#[instrument(level = "info", skip(state, _user))]
pub async fn daily_challenge_handler(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let challenge = state.db.get_daily_challenge_by_date(&today_key()).await?;
    Ok(Json(ChallengeResponse::from(challenge)))
}

/// GET /challenges/{date} - The challenge for a given day
#[utoipa::path(
    get,
    path = "/challenges/{date}",
    params(("date" = String, Path, description = "Day in YYYY-MM-DD format")),
    responses(
        (status = 200, description = "The challenge", body = ChallengeResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 404, description = "No challenge that day")
    )
)]
#[instrument(level = "info", skip(state, _user, params), fields(date = %params.date))]
pub async fn challenge_by_date_handler(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    ValidatedParams(params): ValidatedParams<ChallengeDateParams>,
) -> Result<impl IntoResponse, ApiError> {
    let challenge = state.db.get_daily_challenge_by_date(&params.date).await?;
    Ok(Json(ChallengeResponse::from(challenge)))
}

/// POST /challenges/submit - Grade a set of answers
#[utoipa::path(
    post,
    path = "/challenges/submit",
    request_body = SubmitChallengeRequest,
    responses(
        (status = 200, description = "Graded submission", body = SubmissionResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 404, description = "Unknown challenge"),
        (status = 409, description = "Already submitted")
    )
)]
#[instrument(level = "info", skip(state, req), fields(challenge_id = %req.challenge_id))]
pub async fn submit_challenge_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<SubmitChallengeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let not_found = || {
        ApiError::Port(PortError::NotFound(format!(
            "Challenge {} not found",
            req.challenge_id
        )))
    };
    let challenge_id = Uuid::parse_str(&req.challenge_id).map_err(|_| not_found())?;
    let challenge = state.db.get_daily_challenge_by_id(challenge_id).await?;

    let result = challenge.grade(&req.answers);
    state.db.record_submission(user_id, &result).await?;
    info!(
        correct = result.correct,
        total = result.total,
        xp = result.xp_awarded,
        "Challenge submitted"
    );

    Ok(Json(SubmissionResponse::from(result)))
}
