//! Deterministic template test cases.
//!
//! Used when the model output is absent or undershoots the per-scenario
//! minimum. Only the shortfall is synthesized; genuine model output already
//! present is never replaced.

use crate::domain::generation::{GeneratedCase, RecordSource, ScenarioInput};
use crate::domain::llm_config::GenerationLimits;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
enum TemplateKind {
    HappyPath,
    MissingRequiredField,
    MalformedInput,
    BoundaryValue,
}

const TEMPLATE_ORDER: [TemplateKind; 4] = [
    TemplateKind::HappyPath,
    TemplateKind::MissingRequiredField,
    TemplateKind::MalformedInput,
    TemplateKind::BoundaryValue,
];

/// Add synthetic cases until the scenario reaches the configured minimum,
/// bounded by the synthetic cap. Titles already present are not added twice.
pub(crate) fn top_up(
    records: &mut Vec<GeneratedCase>,
    scenario: &ScenarioInput,
    scenario_index: usize,
    limits: &GenerationLimits,
) {
    if records.len() >= limits.min_cases_per_scenario {
        return;
    }

    let mut titles: HashSet<String> = records
        .iter()
        .map(|record| record.title.to_lowercase())
        .collect();
    let created_at = chrono::Utc::now().timestamp_millis();
    let mut added = 0usize;

    for kind in TEMPLATE_ORDER {
        if records.len() >= limits.min_cases_per_scenario
            || added >= limits.max_synthetic_per_scenario
        {
            return;
        }
        let case = template_case(kind, scenario, scenario_index, created_at);
        if !titles.insert(case.title.to_lowercase()) {
            continue;
        }
        records.push(case);
        added += 1;
    }

    // Minimums above the template set are filled with numbered exploratory
    // variants.
    let mut variant = 1usize;
    while records.len() < limits.min_cases_per_scenario
        && added < limits.max_synthetic_per_scenario
    {
        let case = exploratory_case(variant, scenario, scenario_index, created_at);
        variant += 1;
        if !titles.insert(case.title.to_lowercase()) {
            continue;
        }
        records.push(case);
        added += 1;
    }
}

fn base_steps(scenario: &ScenarioInput) -> Vec<String> {
    if scenario.steps.is_empty() {
        vec!["Execute the scenario as described".to_string()]
    } else {
        scenario.steps.clone()
    }
}

fn base_expected(scenario: &ScenarioInput) -> String {
    if scenario.expected_result.trim().is_empty() {
        "The scenario completes successfully.".to_string()
    } else {
        scenario.expected_result.clone()
    }
}

fn template_case(
    kind: TemplateKind,
    scenario: &ScenarioInput,
    scenario_index: usize,
    created_at: i64,
) -> GeneratedCase {
    let mut steps = base_steps(scenario);
    let (title, expected_result, case_type, priority) = match kind {
        TemplateKind::HappyPath => (
            format!("Happy path: {}", scenario.title),
            base_expected(scenario),
            "positive",
            "high",
        ),
        TemplateKind::MissingRequiredField => {
            steps.push("Clear one required field before submitting".to_string());
            (
                format!("Missing required field: {}", scenario.title),
                "A validation message identifies the missing field and the action is blocked."
                    .to_string(),
                "negative",
                "medium",
            )
        }
        TemplateKind::MalformedInput => {
            steps.push("Replace a required value with malformed input (wrong type or format)"
                .to_string());
            (
                format!("Malformed input: {}", scenario.title),
                "The input is rejected with a format error and no partial state is saved."
                    .to_string(),
                "negative",
                "medium",
            )
        }
        TemplateKind::BoundaryValue => {
            steps.push(
                "Repeat the entry with boundary values (minimum, maximum, just outside each)"
                    .to_string(),
            );
            (
                format!("Boundary values: {}", scenario.title),
                "Values inside the bounds are accepted; values outside are rejected.".to_string(),
                "boundary",
                "medium",
            )
        }
    };

    GeneratedCase {
        id: Uuid::new_v4().to_string(),
        scenario_index,
        title,
        description: "Template case derived from the recorded scenario steps.".to_string(),
        preconditions: Vec::new(),
        steps,
        expected_result,
        priority: priority.to_string(),
        case_type: case_type.to_string(),
        source: RecordSource::Synthetic,
        created_at,
    }
}

fn exploratory_case(
    variant: usize,
    scenario: &ScenarioInput,
    scenario_index: usize,
    created_at: i64,
) -> GeneratedCase {
    let mut steps = base_steps(scenario);
    steps.push(format!(
        "Vary the inputs and ordering (variation {}) and observe the behavior",
        variant
    ));

    GeneratedCase {
        id: Uuid::new_v4().to_string(),
        scenario_index,
        title: format!("Exploratory variation {}: {}", variant, scenario.title),
        description: "Template case derived from the recorded scenario steps.".to_string(),
        preconditions: Vec::new(),
        steps,
        expected_result: "No crashes, data loss, or inconsistent state.".to_string(),
        priority: "low".to_string(),
        case_type: "exploratory".to_string(),
        source: RecordSource::Synthetic,
        created_at,
    }
}
