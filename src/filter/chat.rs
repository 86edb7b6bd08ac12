// file: src/filter/chat.rs
// description: chat-completions client with timeout, retry, and backoff
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::GptConfig;
use crate::error::{Result, SearchError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: Option<String>,
}

/// Chat client used by the GPT filter. One judgment per request; retries
/// with exponential backoff and jitter on 429, 5xx, and transport errors.
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    max_retries: u32,
}

impl ChatClient {
    pub fn new(config: &GptConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SearchError::Config(
                "GPT filter requires an API key (set gpt.api_key or OPENAI_API_KEY)".to_string(),
            )
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("geo_search/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        })
    }

    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_url);
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: self.temperature,
        };

        debug!("Sending chat completion request ({} chars)", user.len());

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.send_once(&url, &request).await {
                Ok(reply) => return Ok(reply),
                Err((err, retryable)) => {
                    if attempt > self.max_retries || !retryable {
                        return Err(err);
                    }
                    let delay = backoff_delay(INITIAL_BACKOFF, MAX_BACKOFF, attempt - 1);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "chat request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        request: &ChatCompletionRequest,
    ) -> std::result::Result<String, (SearchError, bool)> {
        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let retryable = e.is_timeout() || e.is_connect() || e.is_request();
                (SearchError::Http(e), retryable)
            })?;

        let status = response.status();
        if !status.is_success() {
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err((
                SearchError::GptFilter(format!(
                    "Chat request failed with status {}: {}",
                    status, message
                )),
                retryable,
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            (
                SearchError::GptFilter(format!("Failed to parse chat response: {}", e)),
                false,
            )
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                (
                    SearchError::GptFilter("Chat response contained no content".to_string()),
                    false,
                )
            })
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    let jitter_ms = pseudo_jitter_ms(jitter_cap);
    Duration::from_millis(capped_ms.saturating_add(jitter_ms))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let nanos = now.subsec_nanos() as u64;
    nanos % (max_inclusive + 1)
}
