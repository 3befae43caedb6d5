pub mod openai;

use crate::domain::llm_config::CompletionConfig;
use async_trait::async_trait;

pub use openai::{ClientSettings, OpenAiClient};

/// Outcome of one completion call, after retries and model fallback.
///
/// A failure is data rather than an `Err`: the orchestrator inspects it and
/// decides whether a deterministic fallback applies.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Success {
        text: String,
    },
    Failure {
        /// HTTP status of the final response; 0 for network-level failures.
        status: u16,
        message: String,
        /// Rate-limit hint from the endpoint, when it sent one.
        retry_after_seconds: Option<u64>,
    },
}

impl CompletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionOutcome::Success { .. })
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        config: &CompletionConfig,
        system: &str,
        user: &str,
    ) -> CompletionOutcome;
}
