use serde::Deserialize;

/// One test case as emitted by the model. Every field is defaulted so a
/// sparse row still maps cleanly instead of failing the whole batch.
#[derive(Debug, Deserialize)]
pub(crate) struct CaseRow {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) preconditions: Vec<String>,
    #[serde(default)]
    pub(crate) steps: Vec<String>,
    #[serde(default)]
    pub(crate) expected_result: String,
    #[serde(default)]
    pub(crate) priority: String,
    #[serde(default, rename = "type")]
    pub(crate) case_type: String,
}

/// One ranked process as emitted by the model.
#[derive(Debug, Deserialize)]
pub(crate) struct ProcessScoreRow {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) reasoning: String,
}
