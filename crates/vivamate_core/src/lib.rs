pub mod domain;
pub mod ports;
pub mod validation;

pub use domain::{
    Answers, DailyChallenge, Difficulty, Insight, InsightEnvelope, InsightKind,
    OtpCode, Profile, ProfileUpdate, Question, SubmissionResult, User, UserCredentials,
};
pub use ports::{
    DatabaseService, InsightService, OtpDeliveryService, PortError, PortResult,
};
pub use validation::{Issue, IssueCode, Schema, ValidationErrors};
