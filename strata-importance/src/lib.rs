//! # strata-importance
//!
//! Pure, deterministic importance scoring (SPEC_FULL.md §4.2). No I/O.
//! The exact markers and weights below are contractual: they drive the
//! decay-eligibility formula downstream, so changing a weight changes the
//! aging behavior of the whole system.

use regex::Regex;
use std::sync::LazyLock;

const BASELINE: f64 = 0.20;

const LENGTH_CAP: f64 = 0.25;
const QUESTION_CAP: f64 = 0.15;
const TECHNICAL_CAP: f64 = 0.20;
const CONTEXT_CAP: f64 = 0.15;
const DEPTH_CAP: f64 = 0.10;
const IMPERATIVE_CAP: f64 = 0.15;

const QUESTION_WORDS: &[&str] = &["how", "why", "what", "when", "where", "who", "which"];
const IMPERATIVE_WORDS: &[&str] = &[
    "please",
    "must",
    "should",
    "remember",
    "important",
    "always",
    "never",
    "required",
];

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[{}();=<>]|::|->|=>|\bfn\b|\bconst\b|\blet\b").unwrap());
static ACRONYM_OR_CAMEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,}|[A-Z][a-z]+[A-Z][A-Za-z]*)\b").unwrap());

/// Score `content` in context, given how much prior context was actually
/// used (`context_used` in [0, 1], a caller-supplied utilization ratio)
/// and how deep in the conversation this message sits (`message_depth`,
/// 1-indexed). Deterministic and side-effect free; callers do not need a
/// cancellation token for this call.
pub fn score_importance(content: &str, context_used: f64, message_depth: u32) -> f64 {
    let mut total = BASELINE;
    total += length_factor(content);
    total += question_factor(content);
    total += technical_factor(content);
    total += context_factor(context_used);
    total += depth_factor(message_depth);
    total += imperative_factor(content);
    total.clamp(0.1, 1.0)
}

fn length_factor(content: &str) -> f64 {
    let len = content.chars().count() as f64;
    if len <= 50.0 {
        return 0.0;
    }
    (((len - 50.0) / 600.0).max(0.0)).min(LENGTH_CAP)
}

fn question_factor(content: &str) -> f64 {
    let lower = content.to_lowercase();
    let mut count = lower.matches('?').count();
    for word in QUESTION_WORDS {
        count += word_count(&lower, word);
    }
    ((count as f64) * 0.03).min(QUESTION_CAP)
}

fn technical_factor(content: &str) -> f64 {
    let code_hits = CODE_PATTERN.find_iter(content).count();
    let token_hits = ACRONYM_OR_CAMEL.find_iter(content).count();
    ((code_hits as f64) * 0.04 + (token_hits as f64) * 0.02).min(TECHNICAL_CAP)
}

fn context_factor(context_used: f64) -> f64 {
    (context_used.clamp(0.0, 1.0) * 0.05).min(CONTEXT_CAP)
}

fn depth_factor(message_depth: u32) -> f64 {
    if message_depth == 0 {
        return 0.0;
    }
    (((message_depth - 1) as f64) * 0.02).min(DEPTH_CAP)
}

fn imperative_factor(content: &str) -> f64 {
    let lower = content.to_lowercase();
    let count: usize = IMPERATIVE_WORDS.iter().map(|w| word_count(&lower, w)).sum();
    ((count as f64) * 0.03).min(IMPERATIVE_CAP)
}

fn word_count(haystack: &str, word: &str) -> usize {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| *token == word)
        .count()
}
