//! Deterministic keyword-overlap scoring.
//!
//! Used when the model cannot rank candidate business processes against a
//! document: both sides are reduced to lowercase alphanumeric token sets and
//! each candidate is scored by how much of it the document covers.

use crate::domain::generation::{ProcessCandidate, ProcessMatch, RecordSource};
use std::collections::HashSet;

/// Lowercase alphanumeric tokens longer than two characters.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(|word| word.to_string())
        .collect()
}

/// Overlap ratio: candidate tokens also present in the document, over the
/// candidate's own token count.
fn overlap_score(doc_tokens: &HashSet<String>, candidate: &ProcessCandidate) -> f32 {
    let candidate_tokens = tokenize(&candidate.name);
    if candidate_tokens.is_empty() {
        return 0.0;
    }
    let shared = candidate_tokens
        .iter()
        .filter(|token| doc_tokens.contains(*token))
        .count();
    shared as f32 / candidate_tokens.len() as f32
}

/// Rank candidates against a document, highest overlap first. Candidates
/// with no overlap at all are dropped; ties keep their input order.
pub fn rank_candidates(document: &str, candidates: &[ProcessCandidate]) -> Vec<ProcessMatch> {
    let doc_tokens = tokenize(document);

    let mut matches: Vec<ProcessMatch> = candidates
        .iter()
        .map(|candidate| {
            let score = overlap_score(&doc_tokens, candidate);
            ProcessMatch {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                score,
                reason: format!("keyword overlap: {:.2}", score),
                source: RecordSource::LocalScore,
            }
        })
        .filter(|process_match| process_match.score > 0.0)
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> ProcessCandidate {
        ProcessCandidate {
            id: None,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_tokenize_drops_short_words_and_punctuation() {
        let tokens = tokenize("The loan is approved, on time!");
        assert!(tokens.contains("loan"));
        assert!(tokens.contains("approved"));
        assert!(tokens.contains("time"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("is"));
        assert!(!tokens.contains("on"));
    }

    #[test]
    fn test_overlapping_candidate_ranks_first() {
        let document =
            "The applicant submits a loan request. After the credit check, loan approval follows.";
        let candidates = vec![
            candidate("Marketing Newsletter"),
            candidate("Loan Approval Workflow"),
        ];

        let matches = rank_candidates(document, &candidates);

        // "loan" and "approval" of the three candidate tokens are covered;
        // the newsletter shares nothing and is dropped.
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Loan Approval Workflow");
        assert!((matches[0].score - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(matches[0].source, RecordSource::LocalScore);
    }

    #[test]
    fn test_ranking_is_descending() {
        let document = "customer onboarding with identity verification and credit check";
        let candidates = vec![
            candidate("Credit Check"),
            candidate("Customer Onboarding Identity Verification"),
            candidate("Archive Cleanup"),
        ];

        let matches = rank_candidates(document, &candidates);

        assert_eq!(matches.len(), 2);
        assert!(matches[0].score >= matches[1].score);
        assert_eq!(matches[0].name, "Credit Check");
    }

    #[test]
    fn test_no_overlap_yields_empty_ranking() {
        let matches = rank_candidates("completely unrelated text", &[candidate("Loan Approval")]);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let document = "payment refund";
        let candidates = vec![candidate("Payment Processing"), candidate("Refund Handling")];

        let matches = rank_candidates(document, &candidates);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Payment Processing");
        assert_eq!(matches[1].name, "Refund Handling");
    }
}
