/// Text completion: the single point of entry for suggestion requests.
///
/// Handlers depend on the `TextCompletion` trait; the default backend speaks the
/// OpenAI-compatible chat-completions protocol. A failed call never reaches the
/// document: suggestions are applied in a separate, explicit step.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

pub use prompts::{apply_suggestion, PromptContext, SuggestionTarget, SYSTEM_PROMPT};

const TEMPERATURE: f32 = 0.4;
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no completion API key configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("completion returned empty content")]
    EmptyContent,
}

/// `generate(promptContext) -> suggested text`.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn generate(&self, context: &PromptContext) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Trimmed text of the first choice, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client with retry on 429 and 5xx.
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: Client,
    api_key: Option<String>,
    url: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: config.completion_api_key.clone(),
            url: config.completion_api_url.clone(),
            model: config.completion_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends the chat request, retrying transport failures, 429 and 5xx with
    /// doubling delays. Other error statuses fail at once.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential)?;

        let request_body = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = BASE_BACKOFF * 2u32.pow(attempt - 1);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying completion request");
                tokio::time::sleep(delay).await;
            }

            match self.send_once(api_key, &request_body).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retry(err) => last_error = Some(err),
            }
        }

        Err(last_error.unwrap_or(CompletionError::Exhausted {
            attempts: MAX_ATTEMPTS,
        }))
    }

    async fn send_once(
        &self,
        api_key: &str,
        request_body: &ChatRequest<'_>,
    ) -> Result<Attempt, CompletionError> {
        let response = match self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request_body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Retry(CompletionError::Http(e))),
        };

        let status = response.status();
        if status.is_success() {
            let chat_response: ChatResponse = response.json().await?;
            if let Some(usage) = &chat_response.usage {
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "completion succeeded"
                );
            }
            return Ok(Attempt::Done(chat_response));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        let err = CompletionError::Api {
            status: status.as_u16(),
            message,
        };

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!(status = status.as_u16(), error = %err, "retryable completion failure");
            Ok(Attempt::Retry(err))
        } else {
            Err(err)
        }
    }
}

/// Outcome of one request that did not fail outright.
enum Attempt {
    Done(ChatResponse),
    Retry(CompletionError),
}

#[async_trait]
impl TextCompletion for ChatCompletionClient {
    async fn generate(&self, context: &PromptContext) -> Result<String, CompletionError> {
        let response = self.call(&context.render(), SYSTEM_PROMPT).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(CompletionError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeDocument;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    fn context() -> PromptContext {
        PromptContext::build(&ResumeDocument::sample(), SuggestionTarget::Skills, None)
    }

    /// Serves `handler` on an ephemeral local port and returns its URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn client(url: String, api_key: Option<&str>) -> ChatCompletionClient {
        ChatCompletionClient::new(&Config {
            completion_api_key: api_key.map(str::to_string),
            completion_api_url: url,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_response_text_takes_first_choice_trimmed() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Rust, Go\n" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ],
            "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
        }))
        .unwrap();
        assert_eq!(response.text(), Some("Rust, Go"));
    }

    #[test]
    fn test_response_without_content_has_no_text() {
        let response: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(response.text(), None);
        let response: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": "  " } }] }))
                .unwrap();
        assert_eq!(response.text(), None);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        let err = client("http://127.0.0.1:9/unused".to_string(), None)
            .generate(&context())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential));
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_user_messages() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "gpt-4o-mini");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
                let user = body["messages"][1]["content"].as_str().unwrap_or_default();
                assert!(user.starts_with("Candidate: Jordan Reyes"));
                Json(json!({
                    "choices": [{ "message": { "content": "Rust, Kafka, Terraform" } }]
                }))
            }),
        );
        let url = serve(router).await;

        let text = client(url, Some("sk-test")).generate(&context()).await.unwrap();
        assert_eq!(text, "Rust, Kafka, Terraform");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "Incorrect API key provided" } })),
                )
            }),
        );
        let url = serve(router).await;

        let err = client(url, Some("sk-bad")).generate(&context()).await.unwrap_err();
        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let seen = seen.clone();
                async move {
                    if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                        (
                            axum::http::StatusCode::SERVICE_UNAVAILABLE,
                            Json(json!({ "error": { "message": "overloaded" } })),
                        )
                    } else {
                        (
                            axum::http::StatusCode::OK,
                            Json(json!({ "choices": [{ "message": { "content": "Go, Rust" } }] })),
                        )
                    }
                }
            }),
        );
        let url = serve(router).await;

        let text = client(url, Some("sk-test")).generate(&context()).await.unwrap();
        assert_eq!(text, "Go, Rust");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistent_rate_limit_gives_up_after_all_attempts() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    (
                        axum::http::StatusCode::TOO_MANY_REQUESTS,
                        Json(json!({ "error": { "message": "slow down" } })),
                    )
                }
            }),
        );
        let url = serve(router).await;

        let err = client(url, Some("sk-test")).generate(&context()).await.unwrap_err();
        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn test_blank_completion_is_empty_content() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [{ "message": { "content": "" } }] })) }),
        );
        let url = serve(router).await;

        let err = client(url, Some("sk-test")).generate(&context()).await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyContent));
    }
}
