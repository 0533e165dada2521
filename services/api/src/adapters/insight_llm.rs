//! services/api/src/adapters/insight_llm.rs
//!
//! This module contains the adapter for the insight-generating LLM.
//! It implements the `InsightService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;
use vivamate_core::{
    domain::{Insight, InsightKind},
    ports::{InsightService, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InsightService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiInsightAdapter {
    /// Creates a new `OpenAiInsightAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

const SYSTEM_PROMPT: &str = "You write short, practical content for people preparing for job interviews. \
Respond with a single JSON object of the form {\"title\": string, \"content\": string} and nothing else. \
The title is at most eight words. The content is one or two sentences.";

fn user_prompt(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Tip => "Give one actionable interview preparation tip.",
        InsightKind::Fact => "Share one surprising, verifiable fact about hiring or interviews.",
    }
}

#[derive(Deserialize)]
struct RawInsight {
    title: String,
    content: String,
}

/// Turns the model's reply into an `Insight`, tolerating a surrounding code fence.
fn parse_insight(kind: InsightKind, reply: &str) -> PortResult<Insight> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid fence regex")
    });

    let body = fence
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map_or(reply.trim(), |m| m.as_str());

    let raw: RawInsight = serde_json::from_str(body)
        .map_err(|e| PortError::Unexpected(format!("Insight reply was not valid JSON: {}", e)))?;

    let title = raw.title.trim();
    let content = raw.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(PortError::Unexpected(
            "Insight reply had an empty title or content.".to_string(),
        ));
    }

    Ok(Insight {
        kind,
        title: title.to_string(),
        content: content.to_string(),
    })
}

//=========================================================================================
// `InsightService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InsightService for OpenAiInsightAdapter {
    async fn generate_insight(&self, kind: InsightKind) -> PortResult<Insight> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt(kind))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Insight LLM returned no text content.".to_string())
            })?;

        debug!(kind = kind.as_query(), "Received insight reply");
        parse_insight(kind, &reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_reply_is_parsed() {
        let insight = parse_insight(
            InsightKind::Tip,
            r#"{"title": "Use STAR", "content": "Structure answers as situation, task, action, result."}"#,
        )
        .unwrap();
        assert_eq!(insight.kind, InsightKind::Tip);
        assert_eq!(insight.title, "Use STAR");
    }

    #[test]
    fn fenced_reply_is_unwrapped() {
        let reply = "```json\n{\"title\": \" Fun fact \", \"content\": \"Most interviews run long.\"}\n```";
        let insight = parse_insight(InsightKind::Fact, reply).unwrap();
        assert_eq!(insight.title, "Fun fact");
        assert_eq!(insight.content, "Most interviews run long.");
    }

    #[test]
    fn prose_or_empty_fields_are_rejected() {
        assert!(parse_insight(InsightKind::Tip, "Here is a tip: smile.").is_err());
        assert!(parse_insight(InsightKind::Tip, r#"{"title": "", "content": "x"}"#).is_err());
    }
}
