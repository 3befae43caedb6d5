use super::prompts::{build_case_system_prompt, build_case_user_prompt};
use super::synthetic;
use super::types::CaseRow;
use super::TestGenerationUseCase;
use crate::domain::error::Result;
use crate::domain::generation::{GeneratedCase, RecordSource, ScenarioInput};
use crate::domain::llm_config::{CompletionConfig, GenerationLimits};
use crate::infrastructure::llm_clients::CompletionOutcome;
use crate::infrastructure::response::{clean_llm_response, extract_payload};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

impl TestGenerationUseCase {
    /// Generate test cases for every scenario.
    ///
    /// Scenarios are processed sequentially with at most one completion call
    /// in flight; the output order matches the input order. Each scenario
    /// ends up with at least `min_cases_per_scenario` records, topped up
    /// with synthetic templates when the model undershoots. Upstream
    /// failures never propagate; only invalid input is an error.
    pub async fn generate_test_cases(
        &self,
        config: &CompletionConfig,
        limits: &GenerationLimits,
        scenarios: &[ScenarioInput],
    ) -> Result<Vec<GeneratedCase>> {
        Self::require_scenarios(scenarios)?;
        let limits = limits.clone().normalized();

        let mut records = Vec::new();
        for (scenario_index, scenario) in scenarios.iter().enumerate() {
            let mut generated = self.model_cases_for(config, scenario, scenario_index).await;
            synthetic::top_up(&mut generated, scenario, scenario_index, &limits);
            debug!(
                scenario_index,
                count = generated.len(),
                "scenario generation complete"
            );
            records.extend(generated);
        }
        Ok(records)
    }

    /// One completion call for one scenario. Returns an empty list on any
    /// model or extraction failure so the synthetic fallback takes over.
    async fn model_cases_for(
        &self,
        config: &CompletionConfig,
        scenario: &ScenarioInput,
        scenario_index: usize,
    ) -> Vec<GeneratedCase> {
        let system_prompt = build_case_system_prompt();
        let user_prompt = build_case_user_prompt(scenario);

        match self
            .llm_client
            .complete(config, &system_prompt, &user_prompt)
            .await
        {
            CompletionOutcome::Success { text } => {
                let cleaned = clean_llm_response(&text);
                match extract_payload(&cleaned) {
                    Some(Value::Array(items)) => map_case_rows(items, scenario_index),
                    Some(_) => {
                        warn!(
                            scenario_index,
                            "model returned JSON that is not an array, falling back"
                        );
                        Vec::new()
                    }
                    None => {
                        warn!(
                            scenario_index,
                            "no JSON could be recovered from model output, falling back"
                        );
                        Vec::new()
                    }
                }
            }
            CompletionOutcome::Failure {
                status, message, ..
            } => {
                warn!(
                    scenario_index,
                    status,
                    error = %message,
                    "completion failed, falling back to synthetic cases"
                );
                Vec::new()
            }
        }
    }
}

/// Lenient mapping: every missing field gets a default. Rows that are not
/// objects, or whose title is empty, are dropped; the top-up covers them.
fn map_case_rows(items: Vec<Value>, scenario_index: usize) -> Vec<GeneratedCase> {
    let created_at = chrono::Utc::now().timestamp_millis();
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<CaseRow>(item).ok())
        .filter(|row| !row.title.trim().is_empty())
        .map(|row| GeneratedCase {
            id: Uuid::new_v4().to_string(),
            scenario_index,
            title: row.title.trim().to_string(),
            description: row.description,
            preconditions: row.preconditions,
            steps: row.steps,
            expected_result: row.expected_result,
            priority: row.priority,
            case_type: if row.case_type.trim().is_empty() {
                "functional".to_string()
            } else {
                row.case_type
            },
            source: RecordSource::Ai,
            created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm_clients::CompletionClient;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedClient {
        outcome: CompletionOutcome,
    }

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(
            &self,
            _config: &CompletionConfig,
            _system: &str,
            _user: &str,
        ) -> CompletionOutcome {
            self.outcome.clone()
        }
    }

    fn use_case_with(outcome: CompletionOutcome) -> TestGenerationUseCase {
        TestGenerationUseCase::new(Arc::new(FixedClient { outcome }))
    }

    fn scenario(title: &str) -> ScenarioInput {
        ScenarioInput {
            title: title.to_string(),
            description: String::new(),
            steps: vec!["Open app".to_string(), "Log in".to_string()],
            expected_result: "Dashboard is shown".to_string(),
        }
    }

    fn fenced_two_cases() -> CompletionOutcome {
        CompletionOutcome::Success {
            text: r#"Here are the cases:
```json
[
  {
    "title": "Valid login",
    "steps": ["Open app", "Log in with valid credentials"],
    "expected_result": "Dashboard is shown",
    "priority": "high",
    "type": "positive"
  },
  {
    "title": "Wrong password",
    "steps": ["Open app", "Log in with a wrong password"],
    "expected_result": "An error message is shown"
  }
]
```"#
                .to_string(),
        }
    }

    fn upstream_failure() -> CompletionOutcome {
        CompletionOutcome::Failure {
            status: 503,
            message: "upstream unavailable".to_string(),
            retry_after_seconds: None,
        }
    }

    #[tokio::test]
    async fn test_model_cases_are_kept_and_topped_up() {
        let use_case = use_case_with(fenced_two_cases());
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let records = use_case
            .generate_test_cases(&config, &limits, &[scenario("Login")])
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].title, "Valid login");
        assert_eq!(records[0].source, RecordSource::Ai);
        assert_eq!(records[1].source, RecordSource::Ai);
        assert_eq!(records[2].source, RecordSource::Synthetic);
        assert_eq!(records[3].source, RecordSource::Synthetic);
        // Defaults were supplied for fields the model omitted.
        assert!(records[1].preconditions.is_empty());
        assert_eq!(records[1].case_type, "functional");
    }

    #[tokio::test]
    async fn test_completion_failure_degrades_to_synthetic_cases() {
        let use_case = use_case_with(upstream_failure());
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let records = use_case
            .generate_test_cases(&config, &limits, &[scenario("Login")])
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
        assert!(records
            .iter()
            .all(|record| record.source == RecordSource::Synthetic));
    }

    #[tokio::test]
    async fn test_unparseable_output_degrades_to_synthetic_cases() {
        let use_case = use_case_with(CompletionOutcome::Success {
            text: "Sorry, I cannot help with that.".to_string(),
        });
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let records = use_case
            .generate_test_cases(&config, &limits, &[scenario("Login")])
            .await
            .unwrap();

        assert!(!records.is_empty());
        assert!(records
            .iter()
            .all(|record| record.source == RecordSource::Synthetic));
    }

    #[tokio::test]
    async fn test_non_array_payload_degrades_to_synthetic_cases() {
        let use_case = use_case_with(CompletionOutcome::Success {
            text: r#"{"cases": []}"#.to_string(),
        });
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let records = use_case
            .generate_test_cases(&config, &limits, &[scenario("Login")])
            .await
            .unwrap();

        assert!(records
            .iter()
            .all(|record| record.source == RecordSource::Synthetic));
    }

    #[tokio::test]
    async fn test_output_order_follows_input_order() {
        let use_case = use_case_with(upstream_failure());
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();
        let scenarios = [scenario("First"), scenario("Second"), scenario("Third")];

        let records = use_case
            .generate_test_cases(&config, &limits, &scenarios)
            .await
            .unwrap();

        assert_eq!(records.len(), 12);
        let indexes: Vec<usize> = records.iter().map(|record| record.scenario_index).collect();
        let mut sorted = indexes.clone();
        sorted.sort_unstable();
        assert_eq!(indexes, sorted);
        assert!(records[0].title.ends_with("First"));
        assert!(records[11].title.ends_with("Third"));
    }

    #[tokio::test]
    async fn test_model_overshoot_is_not_trimmed() {
        let rows: Vec<serde_json::Value> = (0..6)
            .map(|index| {
                serde_json::json!({
                    "title": format!("Case {}", index),
                    "steps": ["step"],
                    "expected_result": "ok"
                })
            })
            .collect();
        let use_case = use_case_with(CompletionOutcome::Success {
            text: serde_json::to_string(&rows).unwrap(),
        });
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let records = use_case
            .generate_test_cases(&config, &limits, &[scenario("Login")])
            .await
            .unwrap();

        assert_eq!(records.len(), 6);
        assert!(records
            .iter()
            .all(|record| record.source == RecordSource::Ai));
    }

    #[tokio::test]
    async fn test_unusable_rows_are_skipped_and_covered_by_top_up() {
        let use_case = use_case_with(CompletionOutcome::Success {
            text: r#"[
                {"title": "Valid login", "steps": ["Log in"], "expected_result": "ok"},
                "just a string",
                42,
                {"title": "   ", "steps": ["ignored"]}
            ]"#
            .to_string(),
        });
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let records = use_case
            .generate_test_cases(&config, &limits, &[scenario("Login")])
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].title, "Valid login");
        assert_eq!(records[0].source, RecordSource::Ai);
        assert!(records[1..]
            .iter()
            .all(|record| record.source == RecordSource::Synthetic));
    }

    #[tokio::test]
    async fn test_empty_scenario_list_is_rejected() {
        let use_case = use_case_with(fenced_two_cases());
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();

        let result = use_case.generate_test_cases(&config, &limits, &[]).await;

        assert!(matches!(
            result,
            Err(crate::domain::error::AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_scenario_title_is_rejected() {
        let use_case = use_case_with(fenced_two_cases());
        let config = CompletionConfig::default();
        let limits = GenerationLimits::default();
        let blank = ScenarioInput {
            title: "   ".to_string(),
            description: String::new(),
            steps: Vec::new(),
            expected_result: String::new(),
        };

        let result = use_case
            .generate_test_cases(&config, &limits, &[blank])
            .await;

        assert!(matches!(
            result,
            Err(crate::domain::error::AppError::ValidationError(_))
        ));
    }
}
