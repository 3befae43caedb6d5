use crate::domain::generation::{ProcessCandidate, ScenarioInput};

pub(crate) fn build_case_system_prompt() -> String {
    "You are a QA test-case generator. Convert scenarios into structured test cases. Return ONLY a valid JSON array, no commentary.".to_string()
}

pub(crate) fn build_case_user_prompt(scenario: &ScenarioInput) -> String {
    let mut body = String::new();
    body.push_str(&format!("Scenario title: {}\n", scenario.title));
    if !scenario.description.is_empty() {
        body.push_str(&format!("Description: {}\n", scenario.description));
    }
    if !scenario.steps.is_empty() {
        body.push_str("Steps:\n");
        for (index, step) in scenario.steps.iter().enumerate() {
            body.push_str(&format!("{}. {}\n", index + 1, step));
        }
    }
    if !scenario.expected_result.is_empty() {
        body.push_str(&format!("Expected: {}\n", scenario.expected_result));
    }

    body.push_str(
        r#"
OUTPUT format (must be a valid JSON array only):
[
  {
    "title": "<short title>",
    "description": "<one-line purpose>",
    "preconditions": ["<precondition>"],
    "steps": ["Step 1", "Step 2"],
    "expected_result": "<expected result text>",
    "priority": "high|medium|low",
    "type": "positive|negative|boundary|exploratory"
  }
]

Rules:
- Return ONLY the JSON array (no explanations, no surrounding text).
- Keep steps concise and actionable.
- Cover negative and boundary behavior, not just the happy path.
"#,
    );
    body
}

pub(crate) fn build_process_system_prompt() -> String {
    "You are a business-process analyst. Rank the candidate processes by how strongly the document evidences them. Return ONLY a valid JSON array, no commentary.".to_string()
}

pub(crate) fn build_process_user_prompt(
    document_text: &str,
    candidates: &[ProcessCandidate],
) -> String {
    let mut body = String::new();
    body.push_str("Candidate processes:\n");
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.description.is_empty() {
            body.push_str(&format!("{}. {}\n", index + 1, candidate.name));
        } else {
            body.push_str(&format!(
                "{}. {} - {}\n",
                index + 1,
                candidate.name,
                candidate.description
            ));
        }
    }

    body.push_str("\nDocument:\n");
    body.push_str(document_text);

    body.push_str(
        r#"

OUTPUT format (must be a valid JSON array only):
[
  {
    "name": "<candidate name, exactly as listed>",
    "score": <0.0-1.0>,
    "reasoning": "<brief explanation>"
  }
]

Rules:
- Return ONLY the JSON array.
- Use the candidate names exactly as listed above.
- Include only candidates the document actually supports.
"#,
    );
    body
}

pub(crate) fn build_code_system_prompt(framework: &str, language: &str) -> String {
    format!(
        "You are a code generation assistant. Produce a minimal {} {} test file (no extra commentary). Output only the code inside a fenced block with the language tag.",
        framework, language
    )
}

pub(crate) fn build_code_user_prompt(scenario: &ScenarioInput) -> String {
    let mut body = String::new();
    body.push_str(&format!("Scenario title: {}\n", scenario.title));
    if !scenario.description.is_empty() {
        body.push_str(&format!("Description: {}\n", scenario.description));
    }
    body.push_str("Steps:\n");
    for (index, step) in scenario.steps.iter().enumerate() {
        body.push_str(&format!("{}. {}\n", index + 1, step));
    }
    if !scenario.expected_result.is_empty() {
        body.push_str(&format!("Expected result: {}\n", scenario.expected_result));
    }
    body.push_str(
        "\nProduce a short, runnable-looking test that follows the steps (use placeholders for selectors and values). Keep it concise, about 40-80 lines.\n",
    );
    body
}
