//! Per-tier compression instructions (SPEC_FULL.md §4.4). Treated as const
//! data: the wording is part of the contract between the decay worker and
//! the compression LLM call.

use strata_core::record::Tier;

pub fn compression_instruction(target_tier: Tier) -> &'static str {
    match target_tier {
        Tier::Medium => "Summarize to exactly 100 words, preserving key information.",
        Tier::Long => "Extract the 20 most important words or short phrases.",
        Tier::Ancient => "Extract only the 3 most critical keywords.",
        Tier::Recent => unreachable!("recent is never a compression target"),
    }
}

/// Bound content to `max_tokens` whitespace-separated words before it is
/// handed to the compression prompt. Returns the content unchanged, and
/// `false`, if it was already within budget.
pub fn truncate_to_token_budget(content: &str, max_tokens: usize) -> (String, bool) {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.len() <= max_tokens {
        return (content.to_string(), false);
    }
    (words[..max_tokens].join(" "), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_compression_target_has_an_instruction() {
        assert!(compression_instruction(Tier::Medium).contains("100 words"));
        assert!(compression_instruction(Tier::Long).contains("20 most important"));
        assert!(compression_instruction(Tier::Ancient).contains("3 most critical"));
    }

    #[test]
    fn content_within_budget_is_unchanged() {
        let (out, truncated) = truncate_to_token_budget("a short memory", 100);
        assert_eq!(out, "a short memory");
        assert!(!truncated);
    }

    #[test]
    fn content_over_budget_is_cut_to_the_word_limit() {
        let content = (0..10).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let (out, truncated) = truncate_to_token_budget(&content, 3);
        assert_eq!(out, "word0 word1 word2");
        assert!(truncated);
    }
}
