//! services/api/tests/challenges.rs

mod support;

use api_lib::web::challenges::today_key;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use support::{get_request, json_body, json_request, CannedInsights, MemoryDb, TestApp};
use uuid::Uuid;
use vivamate_core::{DailyChallenge, Difficulty, Question};

fn question(text: &str, correct: &str) -> Question {
    Question {
        id: Uuid::new_v4(),
        text: text.to_string(),
        options: vec!["a".into(), "b".into(), "c".into()],
        correct_answer: correct.to_string(),
        question_type: "multiple-choice".to_string(),
    }
}

fn challenge_on(date: &str) -> DailyChallenge {
    DailyChallenge {
        id: Uuid::new_v4(),
        date: date.to_string(),
        title: "Behavioural basics".to_string(),
        description: "Four quick questions".to_string(),
        questions: vec![
            question("q1", "a"),
            question("q2", "b"),
            question("q3", "c"),
            question("q4", "a"),
        ],
        xp_reward: 40,
        difficulty: Difficulty::Easy,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn todays_challenge_hides_the_answers() {
    let today = challenge_on(&today_key());
    let app = TestApp::new(MemoryDb::with_challenges(vec![today.clone()]), CannedInsights::default());
    let cookie = app.register("Grace", "grace@example.com", "hopper1").await;

    let response = app
        .send(get_request("/challenges/daily", Some(cookie.as_str())))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], today.id.to_string());
    assert_eq!(body["xpReward"], 40);
    assert_eq!(body["difficulty"], "Easy");
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 4);
    assert!(questions.iter().all(|q| q.get("correctAnswer").is_none()));
}

#[tokio::test]
async fn challenge_lookup_by_date() {
    let app = TestApp::new(
        MemoryDb::with_challenges(vec![challenge_on("2026-01-02")]),
        CannedInsights::default(),
    );
    let cookie = app.register("Grace", "grace@example.com", "hopper1").await;

    let found = app
        .send(get_request("/challenges/2026-01-02", Some(cookie.as_str())))
        .await;
    assert_eq!(found.status(), StatusCode::OK);

    let missing = app
        .send(get_request("/challenges/2026-01-03", Some(cookie.as_str())))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let malformed = app
        .send(get_request("/challenges/jan-2nd", Some(cookie.as_str())))
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submission_is_graded_and_credited_once() {
    let challenge = challenge_on("2026-01-02");
    let app = TestApp::new(
        MemoryDb::with_challenges(vec![challenge.clone()]),
        CannedInsights::default(),
    );
    let cookie = app.register("Grace", "grace@example.com", "hopper1").await;

    let submission = json!({
        "challengeId": challenge.id.to_string(),
        "answers": ["a", "b", null, "c"]
    });
    let response = app
        .send(json_request("POST", "/challenges/submit", Some(cookie.as_str()), &submission))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["correct"], 2);
    assert_eq!(body["total"], 4);
    assert_eq!(body["xpAwarded"], 20);
    assert_eq!(body["results"], json!([true, true, false, false]));
    assert_eq!(app.db.xp_of("grace@example.com"), Some(20));

    let repeat = app
        .send(json_request("POST", "/challenges/submit", Some(cookie.as_str()), &submission))
        .await;
    assert_eq!(repeat.status(), StatusCode::CONFLICT);
    assert_eq!(app.db.xp_of("grace@example.com"), Some(20));
}

#[tokio::test]
async fn keyed_answers_are_accepted() {
    let challenge = challenge_on("2026-01-02");
    let first_id = challenge.questions[0].id.to_string();
    let app = TestApp::new(
        MemoryDb::with_challenges(vec![challenge.clone()]),
        CannedInsights::default(),
    );
    let cookie = app.register("Grace", "grace@example.com", "hopper1").await;

    let response = app
        .send(json_request(
            "POST",
            "/challenges/submit",
            Some(cookie.as_str()),
            &json!({ "challengeId": challenge.id.to_string(), "answers": { first_id: "a" } }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["correct"], 1);
}

#[tokio::test]
async fn unknown_or_missing_challenge_ids() {
    let app = TestApp::new(MemoryDb::default(), CannedInsights::default());
    let cookie = app.register("Grace", "grace@example.com", "hopper1").await;

    let unknown = app
        .send(json_request(
            "POST",
            "/challenges/submit",
            Some(cookie.as_str()),
            &json!({ "challengeId": "not-a-uuid", "answers": [] }),
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let missing = app
        .send(json_request(
            "POST",
            "/challenges/submit",
            Some(cookie.as_str()),
            &json!({ "challengeId": "", "answers": [] }),
        ))
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(missing).await["errors"],
        json!([{ "field": "challengeId", "message": "Challenge ID is required" }])
    );
}

#[tokio::test]
async fn insight_endpoint_wraps_the_generator() {
    let app = TestApp::new(MemoryDb::default(), CannedInsights::default());
    let ok = app.send(get_request("/ai/insight?type=fact", None)).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body = json_body(ok).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["insight"]["type"], "FACT");

    let failing = TestApp::new(MemoryDb::default(), CannedInsights { failing: true });
    let down = failing.send(get_request("/ai/insight?type=tip", None)).await;
    assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(down).await;
    assert_eq!(body["success"], false);
    assert!(body.get("insight").is_none());
}
