//! LLM output recovery.
//!
//! Model responses are only loosely guaranteed to contain JSON: the payload
//! may be wrapped in prose or fenced code blocks, and near-miss syntax such
//! as trailing commas is common. This module cleans chat artifacts and then
//! recovers a JSON value on a best-effort basis. All failure paths return
//! `None`; nothing here panics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static FENCED_JSON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```json\s*([\s\S]*?)\s*```").unwrap());

static FENCED_ANY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:[A-Za-z0-9_-]+)?\s*([\s\S]*?)\s*```").unwrap());

static TRAILING_COMMA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

static LINE_END_COMMA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m),[ \t\r]*$").unwrap());

/// Cleans an LLM response by removing reasoning tags and collapsing noise.
pub fn clean_llm_response(response: &str) -> String {
    let mut cleaned = response.to_string();

    cleaned = THINK_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = cleaned.trim().to_string();
    cleaned = MULTIPLE_NEWLINES_PATTERN
        .replace_all(&cleaned, "\n\n")
        .to_string();

    cleaned
}

/// Recover a JSON value from raw model output.
///
/// Candidate selection order, most to least trustworthy: a fenced block
/// tagged `json`, any fenced block whose content starts with `[` or `{`,
/// the first greedy `[...]` span, the first greedy `{...}` span. If no
/// candidate parses, the repair pass is retried against the raw text itself.
pub fn extract_payload(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    if let Some(candidate) = extract_candidate(raw) {
        if let Some(value) = parse_lenient(&candidate) {
            return Some(value);
        }
    }
    parse_lenient(raw)
}

/// The content of the first fenced code block, with any language tag
/// stripped. Used for code generation, where the payload is source text
/// rather than JSON.
pub fn extract_fenced_block(text: &str) -> Option<String> {
    FENCED_ANY_PATTERN
        .captures(text)
        .map(|captures| captures[1].trim().to_string())
        .filter(|content| !content.is_empty())
}

fn extract_candidate(text: &str) -> Option<String> {
    if let Some(captures) = FENCED_JSON_PATTERN.captures(text) {
        return Some(captures[1].trim().to_string());
    }
    if let Some(captures) = FENCED_ANY_PATTERN.captures(text) {
        let candidate = captures[1].trim();
        if candidate.starts_with('[') || candidate.starts_with('{') {
            return Some(candidate.to_string());
        }
    }
    if let Some(span) = bracket_span(text, '[', ']') {
        return Some(span);
    }
    if let Some(span) = bracket_span(text, '{', '}') {
        return Some(span);
    }
    None
}

/// Greedy span: first opener to last closer.
fn bracket_span(text: &str, open: char, close: char) -> Option<String> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].to_string())
}

/// Strict parse first; on failure, one bounded repair pass and a re-parse.
fn parse_lenient(candidate: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }
    serde_json::from_str::<Value>(&repair(candidate)).ok()
}

fn repair(candidate: &str) -> String {
    let repaired = TRAILING_COMMA_PATTERN.replace_all(candidate, "$1");
    let repaired = LINE_END_COMMA_PATTERN.replace_all(&repaired, "");
    repaired.replace('\t', "    ")
}
