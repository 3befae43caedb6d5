use super::prompts::{build_process_system_prompt, build_process_user_prompt};
use super::types::ProcessScoreRow;
use super::TestGenerationUseCase;
use crate::application::use_cases::keyword_score;
use crate::domain::error::{AppError, Result};
use crate::domain::generation::{ProcessCandidate, ProcessMatch, RecordSource};
use crate::domain::llm_config::CompletionConfig;
use crate::infrastructure::llm_clients::CompletionOutcome;
use crate::infrastructure::response::{clean_llm_response, extract_payload};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

impl TestGenerationUseCase {
    /// Rank candidate business processes against a document.
    ///
    /// The model is asked first; whenever it fails or returns nothing
    /// usable, deterministic keyword-overlap scoring takes over, so a
    /// ranking is produced whenever any lexical overlap exists.
    pub async fn match_processes(
        &self,
        config: &CompletionConfig,
        document_text: &str,
        candidates: &[ProcessCandidate],
    ) -> Result<Vec<ProcessMatch>> {
        if document_text.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Document text must not be empty.".to_string(),
            ));
        }
        if candidates.is_empty() {
            return Err(AppError::ValidationError(
                "No candidate processes provided.".to_string(),
            ));
        }

        match self.model_ranking(config, document_text, candidates).await {
            Some(matches) if !matches.is_empty() => Ok(matches),
            _ => {
                warn!("model ranking unavailable, using keyword-overlap scoring");
                Ok(keyword_score::rank_candidates(document_text, candidates))
            }
        }
    }

    async fn model_ranking(
        &self,
        config: &CompletionConfig,
        document_text: &str,
        candidates: &[ProcessCandidate],
    ) -> Option<Vec<ProcessMatch>> {
        let system_prompt = build_process_system_prompt();
        let user_prompt = build_process_user_prompt(document_text, candidates);

        let text = match self
            .llm_client
            .complete(config, &system_prompt, &user_prompt)
            .await
        {
            CompletionOutcome::Success { text } => text,
            CompletionOutcome::Failure {
                status, message, ..
            } => {
                warn!(status, error = %message, "completion failed during process ranking");
                return None;
            }
        };

        let payload = extract_payload(&clean_llm_response(&text))?;
        let items = match payload {
            Value::Array(items) => items,
            _ => return None,
        };

        // Only names we actually offered are accepted back.
        let known: HashMap<String, &ProcessCandidate> = candidates
            .iter()
            .map(|candidate| (candidate.name.to_lowercase(), candidate))
            .collect();

        let mut matches: Vec<ProcessMatch> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<ProcessScoreRow>(item).ok())
            .filter_map(|row| {
                let candidate = known.get(&row.name.trim().to_lowercase())?;
                Some(ProcessMatch {
                    id: candidate.id.clone(),
                    name: candidate.name.clone(),
                    score: row.score.clamp(0.0, 1.0),
                    reason: if row.reasoning.trim().is_empty() {
                        "model ranking".to_string()
                    } else {
                        row.reasoning
                    },
                    source: RecordSource::Ai,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Some(matches)
    }
}
