//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API server.
//! Request payloads reach these types only after the validation layer has
//! accepted and normalized them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vivamate_core::{Answers, DailyChallenge, ProfileUpdate, SubmissionResult, User};

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Absent fields are left untouched; an empty link clears it.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub career_stage: Option<String>,
    pub geo_presence: Option<String>,
    pub profile_pic: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            career_stage: req.career_stage,
            geo_presence: req.geo_presence,
            profile_pic: req.profile_pic,
            linkedin: req.linkedin,
            github: req.github,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChallengeRequest {
    pub challenge_id: String,
    /// Either a list of answers by position or a map keyed by question id.
    #[schema(value_type = Object)]
    pub answers: Answers,
}

#[derive(Deserialize)]
pub struct InsightQuery {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
pub struct ChallengeDateParams {
    pub date: String,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub career_stage: Option<String>,
    pub geo_presence: Option<String>,
    pub profile_pic: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub xp: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            career_stage: user.profile.career_stage,
            geo_presence: user.profile.geo_presence,
            profile_pic: user.profile.profile_pic,
            linkedin: user.profile.linkedin,
            github: user.profile.github,
            xp: user.xp,
            created_at: user.created_at,
        }
    }
}

/// A question as shown to the player, without its answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "type")]
    pub question_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub id: Uuid,
    pub date: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<QuestionResponse>,
    pub xp_reward: i32,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
}

impl From<DailyChallenge> for ChallengeResponse {
    fn from(challenge: DailyChallenge) -> Self {
        Self {
            id: challenge.id,
            date: challenge.date,
            title: challenge.title,
            description: challenge.description,
            questions: challenge
                .questions
                .into_iter()
                .map(|q| QuestionResponse {
                    id: q.id,
                    text: q.text,
                    options: q.options,
                    question_type: q.question_type,
                })
                .collect(),
            xp_reward: challenge.xp_reward,
            difficulty: challenge.difficulty.to_string(),
            created_at: challenge.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub challenge_id: Uuid,
    pub correct: usize,
    pub total: usize,
    pub xp_awarded: i32,
    pub results: Vec<bool>,
}

impl From<SubmissionResult> for SubmissionResponse {
    fn from(result: SubmissionResult) -> Self {
        Self {
            challenge_id: result.challenge_id,
            correct: result.correct,
            total: result.total,
            xp_awarded: result.xp_awarded,
            results: result.per_question,
        }
    }
}
