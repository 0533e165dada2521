//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: registration, password login, one-time passcode
//! login and logout. Request bodies arrive here already validated.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use vivamate_core::{OtpCode, PortError};

use crate::error::ApiError;
use crate::web::middleware::session_cookie;
use crate::web::protocol::{
    LoginRequest, MessageResponse, OtpRequest, RegisterRequest, UserResponse, VerifyOtpRequest,
};
use crate::web::state::AppState;
use crate::web::validate::ValidationFailure;

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_secret(secret: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash secret: {}", e)))
}

fn verify_secret(secret: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Failed to parse stored hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Six decimal digits, zero-padded.
fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

fn session_cookie_value(auth_session_id: &str, max_age_seconds: i64) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id, max_age_seconds
    )
}

/// Creates a server-side auth session and returns the `Set-Cookie` value for it.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);

    state
        .db
        .create_auth_session(&auth_session_id, user_id, Utc::now() + ttl)
        .await?;

    Ok(session_cookie_value(&auth_session_id, ttl.num_seconds()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(level = "info", skip(state, req), fields(email = %req.email))]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = hash_secret(&req.password)?;

    let user = state
        .db
        .create_user(&req.name, &req.email, &password_hash)
        .await?;
    let cookie = start_session(&state, user.user_id).await?;
    info!(user_id = %user.user_id, "User registered");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(level = "info", skip(state, req), fields(email = %req.email))]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user_creds = match state.db.get_user_by_email(&req.email).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    };

    if !verify_secret(&req.password, &user_creds.hashed_password)? {
        warn!("Password mismatch");
        return Err(invalid());
    }

    let user = state.db.get_user_by_id(user_creds.user_id).await?;
    let cookie = start_session(&state, user.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /auth/otp/request - Issue a one-time passcode
#[utoipa::path(
    post,
    path = "/auth/otp/request",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code issued if the account exists", body = MessageResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure)
    )
)]
#[instrument(level = "info", skip(state, req), fields(email = %req.email))]
pub async fn request_otp_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The answer is the same whether or not the account exists.
    let accepted = Json(MessageResponse {
        message: "If the email is registered, a code has been sent.".to_string(),
    });

    match state.db.get_user_by_email(&req.email).await {
        Ok(_) => {}
        Err(PortError::NotFound(_)) => return Ok(accepted),
        Err(e) => return Err(e.into()),
    }

    let code = generate_otp();
    state
        .db
        .store_otp(OtpCode {
            email: req.email.clone(),
            code_hash: hash_secret(&code)?,
            expires_at: Utc::now() + Duration::minutes(state.config.otp_ttl_minutes),
        })
        .await?;
    state.otp_delivery.deliver_otp(&req.email, &code).await?;
    info!("OTP issued");

    Ok(accepted)
}

/// POST /auth/otp/verify - Exchange a one-time passcode for a session
#[utoipa::path(
    post,
    path = "/auth/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 401, description = "Invalid or expired code")
    )
)]
#[instrument(level = "info", skip(state, req), fields(email = %req.email))]
pub async fn verify_otp_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid or expired code".to_string());

    // Taking the code consumes it, so every code allows a single attempt.
    let otp = state.db.take_otp(&req.email).await?.ok_or_else(invalid)?;
    if otp.expires_at <= Utc::now() {
        warn!("Expired OTP presented");
        return Err(invalid());
    }
    if !verify_secret(&req.otp, &otp.code_hash)? {
        warn!("OTP mismatch");
        return Err(invalid());
    }

    let user_creds = match state.db.get_user_by_email(&req.email).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    };
    let user = state.db.get_user_by_id(user_creds.user_id).await?;
    let cookie = start_session(&state, user.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth_session_id = session_cookie(&headers)
        .ok_or_else(|| ApiError::Unauthorized("No session found".to_string()))?;

    state.db.delete_auth_session(auth_session_id).await?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, session_cookie_value("", 0))]))
}
