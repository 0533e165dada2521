//! services/api/src/web/profile.rs
//!
//! Endpoints for reading and editing the caller's own profile.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};
use vivamate_core::ProfileUpdate;

use crate::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::protocol::{UpdateProfileRequest, UserResponse};
use crate::web::state::AppState;
use crate::web::validate::ValidationFailure;

/// GET /users/me - The caller's profile
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in")
    )
)]
#[instrument(level = "info", skip(state))]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.get_user_by_id(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /users/me - Update the caller's profile
#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 401, description = "Not logged in")
    )
)]
#[instrument(level = "info", skip(state, req))]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = ProfileUpdate::from(req);
    let user = state.db.update_profile(user_id, &update).await?;
    info!("Profile updated");
    Ok(Json(UserResponse::from(user)))
}
