//! Concept tag extraction: a deterministic pattern-matching pass over a
//! fixed vocabulary runs first; only when nothing matches does extraction
//! fall back to the LLM (SPEC_FULL.md §4.3). 3-5 tags are returned.

use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::constants::MAX_CONCEPT_TAGS;
use strata_core::errors::CortexResult;
use strata_core::traits::{ChatMessage, ChatRole, LlmClient};

const MIN_CONCEPT_TAGS: usize = 3;

const VOCABULARY: &[(&str, &[&str])] = &[
    ("personality", &["personality", "trait", "character"]),
    ("memory-context", &["remember", "context", "recall"]),
    ("emotional-intelligence", &["feel", "emotion", "empathy"]),
    ("learning", &["learn", "study", "understand"]),
    ("self-knowledge", &["self-aware", "introspect", "identity"]),
    ("strategy", &["strategy", "plan", "approach"]),
    ("communication", &["communicate", "explain", "conversation"]),
    ("problem-solving", &["solve", "debug", "fix", "troubleshoot"]),
    ("decision-making", &["decide", "choice", "choose"]),
    ("technical", &["code", "function", "api", "error"]),
    ("preferences", &["prefer", "like", "dislike", "favorite"]),
    ("goals", &["goal", "objective", "target"]),
];

const SYSTEM_PROMPT: &str = "Extract 3 to 5 short concept tags describing this memory. \
Respond with a JSON array of strings, e.g. [\"memory-context\", \"learning\"].";

pub fn extract_by_pattern(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut tags = Vec::new();
    for (tag, markers) in VOCABULARY {
        if markers.iter().any(|m| lower.contains(m)) {
            tags.push((*tag).to_string());
            if tags.len() == MAX_CONCEPT_TAGS {
                break;
            }
        }
    }
    tags
}

pub async fn extract_concepts(
    llm: &dyn LlmClient,
    content: &str,
    deadline: Duration,
    token: &CancellationToken,
) -> CortexResult<Vec<String>> {
    let patterned = extract_by_pattern(content);
    if patterned.len() >= MIN_CONCEPT_TAGS {
        return Ok(patterned);
    }

    let messages = [
        ChatMessage {
            role: ChatRole::System,
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            content: content.to_string(),
        },
    ];
    let raw = llm.complete(&messages, 0.2, deadline, token).await?;
    Ok(parse_concepts(&raw))
}

fn parse_concepts(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw.trim()) {
        Ok(tags) => sanitize_tags(tags),
        Err(_) => sanitize_tags(raw.split(',').map(str::to_string).collect()),
    }
}

fn sanitize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    for tag in tags {
        let cleaned = tag.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase();
        if cleaned.is_empty() || out.contains(&cleaned) {
            continue;
        }
        out.push(cleaned);
        if out.len() == MAX_CONCEPT_TAGS {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_match_finds_multiple_vocabulary_hits() {
        let tags = extract_by_pattern("please remember this plan and explain your strategy");
        assert!(tags.contains(&"memory-context".to_string()));
        assert!(tags.contains(&"strategy".to_string()));
    }

    #[test]
    fn parse_concepts_falls_back_to_comma_split_on_bad_json() {
        let tags = parse_concepts("Learning, Strategy , \"Goals\"");
        assert_eq!(tags, vec!["learning", "strategy", "goals"]);
    }

    #[test]
    fn parse_concepts_deduplicates_and_caps_at_five() {
        let tags = parse_concepts(r#"["a","a","b","c","d","e","f"]"#);
        assert_eq!(tags.len(), MAX_CONCEPT_TAGS);
        assert_eq!(tags, vec!["a", "b", "c", "d", "e"]);
    }
}
