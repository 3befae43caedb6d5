//! LLM-backed generation of QA artifacts with deterministic fallbacks.
//!
//! Every operation in this module guarantees well-typed, provenance-tagged
//! output: genuine model output is tagged `ai`, keyword-ranked fallbacks
//! `local_score`, and templated fill-ins `synthetic`. Upstream failures are
//! absorbed by the fallbacks; only invalid caller input is an error.

mod cases;
mod code;
mod processes;
mod prompts;
mod synthetic;
mod types;

use crate::domain::error::{AppError, Result};
use crate::domain::generation::ScenarioInput;
use crate::infrastructure::llm_clients::CompletionClient;
use std::sync::Arc;
use validator::Validate;

pub struct TestGenerationUseCase {
    llm_client: Arc<dyn CompletionClient>,
}

impl TestGenerationUseCase {
    pub fn new(llm_client: Arc<dyn CompletionClient>) -> Self {
        Self { llm_client }
    }

    fn require_scenarios(scenarios: &[ScenarioInput]) -> Result<()> {
        if scenarios.is_empty() {
            return Err(AppError::ValidationError(
                "No scenarios provided.".to_string(),
            ));
        }
        for scenario in scenarios {
            scenario
                .validate()
                .map_err(|err| AppError::ValidationError(format!("Invalid scenario: {}", err)))?;
            if scenario.title.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Scenario title must not be empty.".to_string(),
                ));
            }
        }
        Ok(())
    }
}
