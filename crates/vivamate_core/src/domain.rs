//! crates/vivamate_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs are independent of any database; the ones that cross the
//! wire or are stored as embedded documents derive serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users & Auth
//=========================================================================================

/// Optional profile details a user can fill in after registering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub career_stage: Option<String>,
    pub geo_presence: Option<String>,
    pub profile_pic: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub profile: Profile,
    pub xp: i64,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// A partial profile update.
///
/// `None` leaves a field untouched. For the link fields an empty string
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub career_stage: Option<String>,
    pub geo_presence: Option<String>,
    pub profile_pic: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

/// A hashed one-time passcode waiting to be verified.
#[derive(Debug, Clone)]
pub struct OtpCode {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Daily Challenge
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Varies,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Varies => "Varies",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            "Varies" => Ok(Difficulty::Varies),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

fn default_question_type() -> String {
    "multiple-choice".to_string()
}

/// A question embedded in a daily challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(rename = "type", default = "default_question_type")]
    pub question_type: String,
}

/// The challenge of the day, keyed uniquely by its `YYYY-MM-DD` date.
#[derive(Debug, Clone)]
pub struct DailyChallenge {
    pub id: Uuid,
    pub date: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub xp_reward: i32,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A submitted set of answers, either by position or by question key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answers {
    Ordered(Vec<Option<String>>),
    Keyed(BTreeMap<String, String>),
}

/// The outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub challenge_id: Uuid,
    pub correct: usize,
    pub total: usize,
    pub xp_awarded: i32,
    pub per_question: Vec<bool>,
}

impl DailyChallenge {
    /// Grades `answers` against this challenge.
    ///
    /// Keyed answers are looked up by question id first, then by the
    /// question's zero-based position.
    pub fn grade(&self, answers: &Answers) -> SubmissionResult {
        let per_question: Vec<bool> = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let given = match answers {
                    Answers::Ordered(list) => list.get(index).and_then(|a| a.as_deref()),
                    Answers::Keyed(map) => map
                        .get(&question.id.to_string())
                        .or_else(|| map.get(&index.to_string()))
                        .map(String::as_str),
                };
                given.is_some_and(|answer| answer.trim() == question.correct_answer.trim())
            })
            .collect();

        let correct = per_question.iter().filter(|hit| **hit).count();
        let total = per_question.len();
        let xp_awarded = if total == 0 {
            0
        } else {
            (i64::from(self.xp_reward) * correct as i64 / total as i64) as i32
        };

        SubmissionResult {
            challenge_id: self.id,
            correct,
            total,
            xp_awarded,
            per_question,
        }
    }
}

//=========================================================================================
// Insights
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsightKind {
    Tip,
    Fact,
}

impl InsightKind {
    /// Even days of the year get a tip, odd days a fact.
    pub fn for_day_of_year(day: u32) -> Self {
        if day % 2 == 0 {
            InsightKind::Tip
        } else {
            InsightKind::Fact
        }
    }

    /// The lowercase form used in the `type` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            InsightKind::Tip => "tip",
            InsightKind::Fact => "fact",
        }
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tip" => Ok(InsightKind::Tip),
            "fact" => Ok(InsightKind::Fact),
            other => Err(format!("unknown insight type '{}'", other)),
        }
    }
}

/// A short piece of interview advice or trivia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub content: String,
}

/// The wire envelope of `GET /ai/insight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<Insight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
