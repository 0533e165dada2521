//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;
use vivamate_core::domain::{
    DailyChallenge, OtpCode, Profile, ProfileUpdate, Question, SubmissionResult, User,
    UserCredentials,
};
use vivamate_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

const USER_COLUMNS: &str =
    "user_id, name, email, career_stage, geo_presence, profile_pic, linkedin, github, xp, created_at";

const CHALLENGE_COLUMNS: &str =
    "id, date, title, description, questions, xp_reward, difficulty, created_at, updated_at";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    name: String,
    email: String,
    career_stage: Option<String>,
    geo_presence: Option<String>,
    profile_pic: Option<String>,
    linkedin: Option<String>,
    github: Option<String>,
    xp: i64,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            profile: Profile {
                career_stage: self.career_stage,
                geo_presence: self.geo_presence,
                profile_pic: self.profile_pic,
                linkedin: self.linkedin,
                github: self.github,
            },
            xp: self.xp,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct OtpRecord {
    email: String,
    code_hash: String,
    expires_at: DateTime<Utc>,
}
impl OtpRecord {
    fn to_domain(self) -> OtpCode {
        OtpCode {
            email: self.email,
            code_hash: self.code_hash,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct ChallengeRecord {
    id: Uuid,
    date: String,
    title: String,
    description: String,
    questions: Json<Vec<Question>>,
    xp_reward: i32,
    difficulty: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl ChallengeRecord {
    fn to_domain(self) -> PortResult<DailyChallenge> {
        let difficulty = self.difficulty.parse().map_err(PortError::Unexpected)?;
        Ok(DailyChallenge {
            id: self.id,
            date: self.date,
            title: self.title,
            description: self.description,
            questions: self.questions.0,
            xp_reward: self.xp_reward,
            difficulty,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (name, email, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(name)
            .bind(email)
            .bind(hashed_password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PortError::Conflict("Email is already registered".to_string())
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<User> {
        // NULL parameters keep the stored value; an empty link clears it.
        let sql = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                career_stage = COALESCE($3, career_stage),
                geo_presence = COALESCE($4, geo_presence),
                profile_pic = CASE WHEN $5::TEXT IS NULL THEN profile_pic ELSE NULLIF($5, '') END,
                linkedin = CASE WHEN $6::TEXT IS NULL THEN linkedin ELSE NULLIF($6, '') END,
                github = CASE WHEN $7::TEXT IS NULL THEN github ELSE NULLIF($7, '') END,
                updated_at = NOW()
             WHERE user_id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(update.name.as_deref())
            .bind(update.career_stage.as_deref())
            .bind(update.geo_presence.as_deref())
            .bind(update.profile_pic.as_deref())
            .bind(update.linkedin.as_deref())
            .bind(update.github.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn store_otp(&self, otp: OtpCode) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO otp_codes (email, code_hash, expires_at) VALUES ($1, $2, $3)
             ON CONFLICT (email) DO UPDATE
             SET code_hash = EXCLUDED.code_hash, expires_at = EXCLUDED.expires_at",
        )
        .bind(&otp.email)
        .bind(&otp.code_hash)
        .bind(otp.expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn take_otp(&self, email: &str) -> PortResult<Option<OtpCode>> {
        let record = sqlx::query_as::<_, OtpRecord>(
            "DELETE FROM otp_codes WHERE email = $1 RETURNING email, code_hash, expires_at",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(OtpRecord::to_domain))
    }

    async fn get_daily_challenge_by_date(&self, date: &str) -> PortResult<DailyChallenge> {
        let sql = format!("SELECT {} FROM daily_challenges WHERE date = $1", CHALLENGE_COLUMNS);
        sqlx::query_as::<_, ChallengeRecord>(&sql)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("No challenge for {}", date)))?
            .to_domain()
    }

    async fn get_daily_challenge_by_id(&self, challenge_id: Uuid) -> PortResult<DailyChallenge> {
        let sql = format!("SELECT {} FROM daily_challenges WHERE id = $1", CHALLENGE_COLUMNS);
        sqlx::query_as::<_, ChallengeRecord>(&sql)
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Challenge {} not found", challenge_id)))?
            .to_domain()
    }

    async fn record_submission(
        &self,
        user_id: Uuid,
        result: &SubmissionResult,
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let inserted = sqlx::query(
            "INSERT INTO challenge_submissions (user_id, challenge_id, correct, total, xp_awarded)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, challenge_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(result.challenge_id)
        .bind(result.correct as i32)
        .bind(result.total as i32)
        .bind(result.xp_awarded)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        // Dropping the transaction here rolls it back.
        if inserted.rows_affected() == 0 {
            return Err(PortError::Conflict(
                "Challenge already submitted".to_string(),
            ));
        }

        sqlx::query("UPDATE users SET xp = xp + $1, updated_at = NOW() WHERE user_id = $2")
            .bind(i64::from(result.xp_awarded))
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }
}
