use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where a generated record came from. Callers rely on this tag to tell
/// genuine model output apart from local fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Ai,
    LocalScore,
    Manual,
    Synthetic,
}

/// One scenario supplied by the caller as input to generation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScenarioInput {
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
}

/// A generated test case. Every field is always present; sparse model
/// output is filled with safe defaults rather than leaving fields absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCase {
    pub id: String,
    pub scenario_index: usize,
    pub title: String,
    pub description: String,
    pub preconditions: Vec<String>,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub priority: String,
    pub case_type: String,
    pub source: RecordSource,
    pub created_at: i64,
}

/// A named business process offered for ranking against a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCandidate {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A candidate process ranked against a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMatch {
    pub id: Option<String>,
    pub name: String,
    pub score: f32,
    pub reason: String,
    pub source: RecordSource,
}

/// A sample test file generated for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub scenario_index: usize,
    pub title: String,
    pub code: String,
    pub source: RecordSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_source_wire_tags() {
        assert_eq!(
            serde_json::to_value(RecordSource::Ai).unwrap(),
            serde_json::json!("ai")
        );
        assert_eq!(
            serde_json::to_value(RecordSource::LocalScore).unwrap(),
            serde_json::json!("local_score")
        );
        assert_eq!(
            serde_json::to_value(RecordSource::Synthetic).unwrap(),
            serde_json::json!("synthetic")
        );
    }

    #[test]
    fn test_scenario_input_defaults_optional_fields() {
        let scenario: ScenarioInput =
            serde_json::from_str(r#"{"title": "Login"}"#).unwrap();
        assert_eq!(scenario.title, "Login");
        assert!(scenario.steps.is_empty());
        assert!(scenario.description.is_empty());
        assert!(scenario.expected_result.is_empty());
    }

    #[test]
    fn test_scenario_input_validation() {
        use validator::Validate;

        let empty = ScenarioInput {
            title: String::new(),
            description: String::new(),
            steps: Vec::new(),
            expected_result: String::new(),
        };
        assert!(empty.validate().is_err());

        let ok = ScenarioInput {
            title: "Login".to_string(),
            ..empty
        };
        assert!(ok.validate().is_ok());
    }
}
