use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call knobs for the completion endpoint: model preference order,
/// sampling parameters, and the retry budget.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CompletionConfig {
    /// Candidate models in order of preference; the first is primary.
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Attempts per model before moving to the next fallback model.
    pub max_attempts_per_model: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "gpt-4o-mini".to_string(),
                "gpt-4o".to_string(),
                "gpt-3.5-turbo".to_string(),
            ],
            temperature: 0.2,
            max_tokens: 1500,
            max_attempts_per_model: 2,
            initial_delay_ms: 600,
            max_delay_ms: 20_000,
        }
    }
}

impl CompletionConfig {
    /// Upper bound on time spent sleeping between attempts across the whole
    /// fallback list. Callers can use this to bound worst-case latency.
    pub fn max_total_wait(&self) -> Duration {
        let attempts = self.models.len() as u64 * self.max_attempts_per_model as u64;
        Duration::from_millis(attempts.saturating_mul(self.max_delay_ms))
    }
}

/// Output-volume floor and synthetic ceiling for one generation call.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationLimits {
    /// Each scenario must end up with at least this many test cases.
    pub min_cases_per_scenario: usize,
    /// Hard cap on synthesized cases per scenario, so a dead model cannot
    /// inflate the output without bound.
    pub max_synthetic_per_scenario: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            min_cases_per_scenario: 4,
            max_synthetic_per_scenario: 8,
        }
    }
}

impl GenerationLimits {
    /// The cap can never drop below the minimum, otherwise the minimum would
    /// be unsatisfiable for a scenario the model skipped entirely.
    pub fn normalized(mut self) -> Self {
        if self.max_synthetic_per_scenario < self.min_cases_per_scenario {
            self.max_synthetic_per_scenario = self.min_cases_per_scenario;
        }
        self
    }
}
