//! services/api/tests/support/mod.rs
//!
//! In-memory port implementations and request helpers shared by the
//! integration tests.

#![allow(dead_code)]

use api_lib::{config::Config, web::build_router, web::state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;
use vivamate_core::{
    DailyChallenge, DatabaseService, Insight, InsightKind, InsightService, OtpCode,
    OtpDeliveryService, PortError, PortResult, ProfileUpdate, SubmissionResult, User,
    UserCredentials,
};
use vivamate_core::domain::Profile;

//=========================================================================================
// Fake Database
//=========================================================================================

struct StoredUser {
    user: User,
    hashed_password: String,
}

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    otps: HashMap<String, OtpCode>,
    challenges: Vec<DailyChallenge>,
    submissions: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    pub fn with_challenges(challenges: Vec<DailyChallenge>) -> Self {
        let db = Self::default();
        db.tables.lock().unwrap().challenges = challenges;
        db
    }

    pub fn xp_of(&self, email: &str) -> Option<i64> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| u.user.xp)
    }
}

fn apply_link(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *slot = if v.is_empty() { None } else { Some(v.clone()) };
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.user.email == email) {
            return Err(PortError::Conflict("Email is already registered".to_string()));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            profile: Profile::default(),
            xp: 0,
            created_at: Utc::now(),
        };
        tables.users.push(StoredUser {
            user: user.clone(),
            hashed_password: hashed_password.to_string(),
        });
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| UserCredentials {
                user_id: u.user.user_id,
                email: u.user.email.clone(),
                hashed_password: u.hashed_password.clone(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|u| u.user.user_id == user_id)
            .map(|u| u.user.clone())
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.user.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        let user = &mut stored.user;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(stage) = &update.career_stage {
            user.profile.career_stage = Some(stage.clone());
        }
        if let Some(geo) = &update.geo_presence {
            user.profile.geo_presence = Some(geo.clone());
        }
        apply_link(&mut user.profile.profile_pic, &update.profile_pic);
        apply_link(&mut user.profile.linkedin, &update.linkedin);
        apply_link(&mut user.profile.github, &update.github);
        Ok(user.clone())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let tables = self.tables.lock().unwrap();
        match tables.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn store_otp(&self, otp: OtpCode) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .otps
            .insert(otp.email.clone(), otp);
        Ok(())
    }

    async fn take_otp(&self, email: &str) -> PortResult<Option<OtpCode>> {
        Ok(self.tables.lock().unwrap().otps.remove(email))
    }

    async fn get_daily_challenge_by_date(&self, date: &str) -> PortResult<DailyChallenge> {
        let tables = self.tables.lock().unwrap();
        tables
            .challenges
            .iter()
            .find(|c| c.date == date)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("No challenge for {}", date)))
    }

    async fn get_daily_challenge_by_id(&self, challenge_id: Uuid) -> PortResult<DailyChallenge> {
        let tables = self.tables.lock().unwrap();
        tables
            .challenges
            .iter()
            .find(|c| c.id == challenge_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Challenge {} not found", challenge_id)))
    }

    async fn record_submission(
        &self,
        user_id: Uuid,
        result: &SubmissionResult,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.submissions.insert((user_id, result.challenge_id)) {
            return Err(PortError::Conflict("Challenge already submitted".to_string()));
        }
        if let Some(stored) = tables.users.iter_mut().find(|u| u.user.user_id == user_id) {
            stored.user.xp += i64::from(result.xp_awarded);
        }
        Ok(())
    }
}

//=========================================================================================
// Fake Insight Generator & OTP Delivery
//=========================================================================================

/// Returns a canned insight, or fails when `failing` is set.
#[derive(Default)]
pub struct CannedInsights {
    pub failing: bool,
}

#[async_trait]
impl InsightService for CannedInsights {
    async fn generate_insight(&self, kind: InsightKind) -> PortResult<Insight> {
        if self.failing {
            return Err(PortError::Unexpected("model unavailable".to_string()));
        }
        Ok(Insight {
            kind,
            title: "Practice out loud".to_string(),
            content: "Rehearse answers verbally, not just in your head.".to_string(),
        })
    }
}

/// Remembers the last code handed out per email.
#[derive(Default)]
pub struct CapturedOtps {
    codes: Mutex<HashMap<String, String>>,
}

impl CapturedOtps {
    pub fn last_for(&self, email: &str) -> Option<String> {
        self.codes.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl OtpDeliveryService for CapturedOtps {
    async fn deliver_otp(&self, email: &str, code: &str) -> PortResult<()> {
        self.codes
            .lock()
            .unwrap()
            .insert(email.to_string(), code.to_string());
        Ok(())
    }
}

//=========================================================================================
// App Construction & Request Helpers
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        insight_model: "test-model".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        session_ttl_days: 30,
        otp_ttl_minutes: 10,
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<MemoryDb>,
    pub otps: Arc<CapturedOtps>,
}

impl TestApp {
    pub fn new(db: MemoryDb, insights: CannedInsights) -> Self {
        Self::with_config(db, insights, test_config())
    }

    pub fn with_config(db: MemoryDb, insights: CannedInsights, config: Config) -> Self {
        let db = Arc::new(db);
        let otps = Arc::new(CapturedOtps::default());
        let state = Arc::new(AppState {
            db: db.clone(),
            config: Arc::new(config),
            insight_adapter: Arc::new(insights),
            otp_delivery: otps.clone(),
        });
        Self {
            router: build_router(state),
            db,
            otps,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registers a user and returns the `session=...` cookie pair.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/auth/register",
                None,
                &serde_json::json!({ "name": name, "email": email, "password": password }),
            ))
            .await;
        assert_eq!(response.status(), 201);
        session_from(&response).expect("register sets a session cookie")
    }
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// The `session=<id>` pair from a `Set-Cookie` header, if one was set.
pub fn session_from(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = raw.split(';').next()?.trim();
    (pair.len() > "session=".len()).then(|| pair.to_string())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
