//! crates/vivamate_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{
    DailyChallenge, Insight, InsightKind, OtpCode, ProfileUpdate, SubmissionResult, User,
    UserCredentials,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, name: &str, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<User>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- One-Time Passcodes ---
    /// Replaces any outstanding code for the same email.
    async fn store_otp(&self, otp: OtpCode) -> PortResult<()>;

    /// Removes and returns the outstanding code for `email`, if any.
    async fn take_otp(&self, email: &str) -> PortResult<Option<OtpCode>>;

    // --- Daily Challenges ---
    async fn get_daily_challenge_by_date(&self, date: &str) -> PortResult<DailyChallenge>;

    async fn get_daily_challenge_by_id(&self, challenge_id: Uuid) -> PortResult<DailyChallenge>;

    /// Stores the result and credits the awarded XP to the user.
    /// Fails with `Conflict` when the user already submitted this challenge.
    async fn record_submission(&self, user_id: Uuid, result: &SubmissionResult)
        -> PortResult<()>;
}

#[async_trait]
pub trait InsightService: Send + Sync {
    /// Produces one fresh insight of the requested kind.
    async fn generate_insight(&self, kind: InsightKind) -> PortResult<Insight>;
}

#[async_trait]
pub trait OtpDeliveryService: Send + Sync {
    /// Hands a freshly issued passcode to whatever channel reaches the user.
    async fn deliver_otp(&self, email: &str, code: &str) -> PortResult<()>;
}
