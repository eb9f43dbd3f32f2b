//! OpenAiProvider - Direct REST implementation for OpenAI-compatible APIs.
//!
//! Calls the Chat Completions API directly. The partner reply and the
//! disposition signal come back as one JSON object (the model is asked for
//! `response_format: json_object`), which keeps the whole exchange to a
//! single round trip per turn.

use async_trait::async_trait;
use kesher_core::error::{KesherError, Result};
use kesher_core::provider::{
    CriterionAssessment, DialogueProvider, DispositionSignal, GeneratedReply, PromptContext,
};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::prompt::{chat_role, system_prompt};

const DEFAULT_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Provider requests must resolve within seconds; anything slower is
/// treated as a transient upstream failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider implementation that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Creates a new provider with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `OPENAI_API_KEY` is required; `OPENAI_MODEL_NAME` defaults to
    /// `gpt-4o` if not specified.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            KesherError::upstream("OPENAI_API_KEY not found in environment variables", false)
        })?;
        let model = env::var("OPENAI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint, for OpenAI-compatible gateways.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_messages(&self, context: &PromptContext) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(context.messages.len() + 1);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system_prompt(context),
        });
        for message in &context.messages {
            messages.push(ChatMessage {
                role: chat_role(message.speaker).to_string(),
                content: message.content.clone(),
            });
        }
        messages
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                KesherError::upstream(
                    format!("generation request failed: {err}"),
                    err.is_connect() || err.is_timeout(),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers());
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            KesherError::upstream(format!("failed to parse generation response: {err}"), false)
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl DialogueProvider for OpenAiProvider {
    async fn generate(&self, context: &PromptContext) -> Result<GeneratedReply> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: self.build_messages(context),
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
        };

        let content = self.send_request(&request).await?;
        parse_reply(&content)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The JSON object the system prompt asks the model to produce.
#[derive(Deserialize)]
struct ReplyPayload {
    reply: String,
    interest: i64,
    comfort: i64,
    scores: ScoresPayload,
}

#[derive(Deserialize)]
struct ScoresPayload {
    empathy: i64,
    clarity: i64,
    respect: i64,
    engagement: i64,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| KesherError::upstream("API returned no content in the response", false))
}

/// Parses the model's JSON payload into a reply plus disposition signal.
///
/// Model output is untrusted: out-of-range levels are clamped here, and a
/// payload that is not the requested shape is a (non-retryable) upstream
/// error - regenerating the same malformed shape is not expected to help.
fn parse_reply(content: &str) -> Result<GeneratedReply> {
    let payload: ReplyPayload = serde_json::from_str(content).map_err(|err| {
        tracing::warn!(error = %err, "provider returned a malformed reply payload");
        KesherError::upstream(format!("malformed reply payload: {err}"), false)
    })?;

    if payload.reply.trim().is_empty() {
        return Err(KesherError::upstream("provider returned an empty reply", false));
    }

    Ok(GeneratedReply {
        reply_text: payload.reply,
        disposition: DispositionSignal {
            interest: payload.interest.clamp(0, 100) as u8,
            comfort: payload.comfort.clamp(0, 100) as u8,
            assessment: CriterionAssessment {
                empathy: payload.scores.empathy.clamp(0, 100) as u8,
                clarity: payload.scores.clarity.clamp(0, 100) as u8,
                respect: payload.scores.respect.clamp(0, 100) as u8,
                engagement: payload.scores.engagement.clamp(0, 100) as u8,
            },
        },
    })
}

/// Reads a `retry-after` header given in whole seconds. The HTTP-date form
/// of the header is not parsed.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn map_http_error(status: StatusCode, body: String, retry_after_secs: Option<u64>) -> KesherError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.clone());
    let message = format!("{}: {}", status.as_u16(), message);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    match (is_retryable, retry_after_secs) {
        (true, Some(secs)) => KesherError::upstream_throttled(message, secs),
        _ => KesherError::upstream(message, is_retryable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAYLOAD: &str = r#"{
        "reply": "That's lovely!",
        "interest": 180,
        "comfort": -20,
        "scores": {"empathy": 70, "clarity": 120, "respect": -4, "engagement": 60}
    }"#;

    #[test]
    fn test_parse_reply_clamps_out_of_range_levels() {
        let reply = parse_reply(FULL_PAYLOAD).unwrap();
        assert_eq!(reply.reply_text, "That's lovely!");
        assert_eq!(reply.disposition.interest, 100);
        assert_eq!(reply.disposition.comfort, 0);
        assert_eq!(reply.disposition.assessment.empathy, 70);
        assert_eq!(reply.disposition.assessment.clarity, 100);
        assert_eq!(reply.disposition.assessment.respect, 0);
        assert_eq!(reply.disposition.assessment.engagement, 60);
    }

    #[test]
    fn test_parse_reply_rejects_malformed_payload() {
        let err = parse_reply("not json at all").unwrap_err();
        assert!(err.is_upstream());
        assert!(!err.is_retryable());

        // Empty reply text.
        let err = parse_reply(
            r#"{"reply": "", "interest": 50, "comfort": 50,
                "scores": {"empathy": 50, "clarity": 50, "respect": 50, "engagement": 50}}"#,
        )
        .unwrap_err();
        assert!(err.is_upstream());

        // Missing per-criterion scores.
        let err =
            parse_reply(r#"{"reply": "hi!", "interest": 50, "comfort": 50}"#).unwrap_err();
        assert!(err.is_upstream());
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(map_http_error(StatusCode::TOO_MANY_REQUESTS, "{}".into(), None).is_retryable());
        assert!(map_http_error(StatusCode::SERVICE_UNAVAILABLE, "{}".into(), None).is_retryable());
        assert!(!map_http_error(StatusCode::UNAUTHORIZED, "{}".into(), None).is_retryable());
        assert!(!map_http_error(StatusCode::BAD_REQUEST, "{}".into(), None).is_retryable());
    }

    #[test]
    fn test_http_error_prefers_api_message() {
        let body = r#"{"error": {"message": "rate limited, slow down"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.into(), None);
        assert!(err.to_string().contains("rate limited, slow down"));
    }

    #[test]
    fn test_retry_after_carried_on_retryable_statuses_only() {
        let throttled = map_http_error(StatusCode::TOO_MANY_REQUESTS, "{}".into(), Some(12));
        assert_eq!(
            throttled.retry_after(),
            Some(std::time::Duration::from_secs(12))
        );

        // A non-retryable status never carries a delay hint.
        let rejected = map_http_error(StatusCode::BAD_REQUEST, "{}".into(), Some(12));
        assert_eq!(rejected.retry_after(), None);
    }

    #[test]
    fn test_parse_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "21".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(21));

        let mut non_numeric = HeaderMap::new();
        non_numeric.insert(RETRY_AFTER, "Wed, 21 Oct 2026 07:28:00 GMT".parse().unwrap());
        assert_eq!(parse_retry_after(&non_numeric), None);

        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }
}
