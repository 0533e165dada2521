//! crates/vivamate_core/src/validation/schemas.rs
//!
//! The named request schemas accepted by the API.

use super::{array, enumeration, field, literal, object, record, string, Schema, SchemaExt};
use regex::Regex;

const INVALID_EMAIL: &str = "Invalid email address";

pub fn register() -> Schema {
    object([
        field(
            "name",
            string().min(2).message("Name must be at least 2 characters"),
        ),
        field("email", string().email().message(INVALID_EMAIL)),
        field(
            "password",
            string()
                .min(6)
                .message("Password must be at least 6 characters"),
        ),
    ])
}

pub fn login() -> Schema {
    object([
        field("email", string().email().message(INVALID_EMAIL)),
        field("password", string().min(1).message("Password is required")),
    ])
}

pub fn request_otp() -> Schema {
    object([field("email", string().email().message(INVALID_EMAIL))])
}

pub fn verify_otp() -> Schema {
    object([
        field("email", string().email().message(INVALID_EMAIL)),
        field(
            "otp",
            string().length(6).message("OTP must be exactly 6 characters"),
        ),
    ])
}

/// Profile links accept the empty string as "no link", which is distinct
/// from leaving the field out.
fn profile_link() -> Schema {
    string()
        .url()
        .message("Invalid URL")
        .or(literal(""))
        .optional()
}

pub fn update_profile() -> Schema {
    object([
        field(
            "name",
            string()
                .min(2)
                .message("Name must be at least 2 characters")
                .optional(),
        ),
        field("careerStage", string().optional()),
        field("geoPresence", string().optional()),
        field("profilePic", profile_link()),
        field("linkedin", profile_link()),
        field("github", profile_link()),
    ])
}

pub fn submit_challenge() -> Schema {
    object([
        field(
            "challengeId",
            string().min(1).message("Challenge ID is required"),
        ),
        field(
            "answers",
            array(string().nullable().optional()).or(record(string())),
        ),
    ])
}

pub fn insight_query() -> Schema {
    object([field("type", enumeration(["tip", "fact"]))])
}

pub fn challenge_date_params() -> Schema {
    let date = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern compiles");
    object([field(
        "date",
        string()
            .pattern(date)
            .message("Date must be in YYYY-MM-DD format"),
    )])
}
