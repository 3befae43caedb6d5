use super::{CompletionClient, CompletionOutcome};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::CompletionConfig;
use async_trait::async_trait;
use rand::Rng;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Rate-limit hints above this are returned to the caller instead of being
/// waited out in-process.
const SHORT_RETRY_AFTER_SECS: u64 = 10;

/// Connection settings for the completion endpoint.
///
/// The API key is checked at construction so a missing key is a startup
/// error instead of a failure buried in the first request.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
}

pub struct OpenAiClient {
    transport: Box<dyn ChatTransport>,
}

impl OpenAiClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(AppError::ConfigError(
                "completion API key is not configured".to_string(),
            ));
        }
        Ok(Self {
            transport: Box::new(HttpTransport {
                http: reqwest::Client::new(),
                settings,
            }),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        config: &CompletionConfig,
        system: &str,
        user: &str,
    ) -> CompletionOutcome {
        run_attempts(self.transport.as_ref(), config, system, user).await
    }
}

/// Raw endpoint reply, before the retry policy interprets it.
/// Network-level failures are reported as status 0.
#[derive(Debug, Clone)]
struct RawResponse {
    status: u16,
    body: String,
    retry_after_seconds: Option<u64>,
}

#[async_trait]
trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> RawResponse;
}

struct HttpTransport {
    http: reqwest::Client,
    settings: ClientSettings,
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> RawResponse {
        let url = if self.settings.base_url.ends_with('/') {
            format!("{}chat/completions", self.settings.base_url)
        } else {
            format!("{}/chat/completions", self.settings.base_url)
        };

        let body = json!({
            "model": model,
            "messages": [
                {
                    "role": "system",
                    "content": system
                },
                {
                    "role": "user",
                    "content": user
                }
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return RawResponse {
                    status: 0,
                    body: format!("Request failed: {}", err),
                    retry_after_seconds: None,
                }
            }
        };

        let status = response.status().as_u16();
        let retry_after_seconds = parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        RawResponse {
            status,
            body,
            retry_after_seconds,
        }
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.round() as u64)
}

/// The retry policy: per model, up to the configured attempt budget.
///
/// Short, well-advertised rate limits are waited out; long or silent ones
/// are returned to the caller immediately. Server errors and network
/// failures back off exponentially with jitter. Other 4xx responses are not
/// retryable and fail at once.
async fn run_attempts(
    transport: &dyn ChatTransport,
    config: &CompletionConfig,
    system: &str,
    user: &str,
) -> CompletionOutcome {
    for model in &config.models {
        for attempt in 0..config.max_attempts_per_model {
            let response = transport
                .send(model, system, user, config.temperature, config.max_tokens)
                .await;

            if (200..300).contains(&response.status) {
                match extract_content(&response.body) {
                    Some(text) => return CompletionOutcome::Success { text },
                    None => {
                        return CompletionOutcome::Failure {
                            status: response.status,
                            message: "completion response had no message content".to_string(),
                            retry_after_seconds: None,
                        }
                    }
                }
            }

            if response.status == 429 {
                match response.retry_after_seconds {
                    Some(hint) if hint <= SHORT_RETRY_AFTER_SECS => {
                        let wait = Duration::from_millis(hint * 1000 + jitter_ms(2000));
                        debug!(
                            model = %model,
                            attempt,
                            hint,
                            "rate limited, waiting out short retry-after"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    hint => {
                        return CompletionOutcome::Failure {
                            status: 429,
                            message: "rate limited by completion endpoint (HTTP 429)".to_string(),
                            retry_after_seconds: hint,
                        }
                    }
                }
            }

            if response.status >= 500 || response.status == 0 {
                let delay = backoff_delay(config, attempt);
                warn!(
                    model = %model,
                    attempt,
                    status = response.status,
                    delay_ms = delay.as_millis() as u64,
                    "transient completion failure, backing off"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            // Remaining 4xx are not retryable: bad request, auth, validation.
            return CompletionOutcome::Failure {
                status: response.status,
                message: if response.body.is_empty() {
                    format!("completion endpoint returned HTTP {}", response.status)
                } else {
                    response.body
                },
                retry_after_seconds: response.retry_after_seconds,
            };
        }
        debug!(model = %model, "attempts exhausted, moving to next model");
    }

    CompletionOutcome::Failure {
        status: 0,
        message: "exhausted all models and attempts calling the completion endpoint".to_string(),
        retry_after_seconds: None,
    }
}

/// Exponential backoff with jitter bounded by half the computed delay.
fn backoff_delay(config: &CompletionConfig, attempt: u32) -> Duration {
    let exp = config
        .initial_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    let delay = exp.min(config.max_delay_ms);
    let jitter_bound = (delay / 2).min(1000);
    Duration::from_millis(delay + jitter_ms(jitter_bound))
}

fn jitter_ms(bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..bound)
}

fn extract_content(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|content| content.to_string())
}
