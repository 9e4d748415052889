//! Hand-written parser for the contrastive-extraction LLM's flat
//! S-expression output (SPEC_FULL.md §4.8):
//! `(principle "..." confidence 0.xx reasoning "...")`.
//!
//! Deliberately not a general Lisp reader: the grammar is one fixed shape,
//! so a small scanner over quoted strings and the `confidence` keyword is
//! all that's needed.

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrinciple {
    pub content: String,
    pub confidence: f64,
    pub reasoning: String,
}

pub fn parse_principle_sexpr(raw: &str) -> Option<ParsedPrinciple> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix('(')?.strip_suffix(')')?.trim();
    let rest = inner.strip_prefix("principle")?.trim_start();

    let (content, after_content) = extract_quoted(rest)?;

    let confidence_rest = after_content.trim_start().strip_prefix("confidence")?.trim_start();
    let (confidence_token, after_confidence) = next_token(confidence_rest)?;
    let confidence: f64 = confidence_token.parse().ok()?;

    let reasoning_rest = after_confidence.trim_start().strip_prefix("reasoning")?.trim_start();
    let (reasoning, _) = extract_quoted(reasoning_rest)?;

    Some(ParsedPrinciple {
        content,
        confidence,
        reasoning,
    })
}

/// Extract a double-quoted string starting at `s`'s first character.
/// Returns the unescaped content and the remainder of `s` after the
/// closing quote.
fn extract_quoted(s: &str) -> Option<(String, &str)> {
    let s = s.strip_prefix('"')?;
    let end = s.find('"')?;
    let content = s[..end].to_string();
    Some((content, &s[end + 1..]))
}

/// Grab the next whitespace-delimited token from `s`.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((&s[..end], &s[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_expression() {
        let raw = r#"(principle "always verify before merging" confidence 0.82 reasoning "good outcomes verified first")"#;
        let parsed = parse_principle_sexpr(raw).unwrap();
        assert_eq!(parsed.content, "always verify before merging");
        assert_eq!(parsed.confidence, 0.82);
        assert_eq!(parsed.reasoning, "good outcomes verified first");
    }

    #[test]
    fn rejects_missing_confidence_keyword() {
        let raw = r#"(principle "x" reasoning "y")"#;
        assert!(parse_principle_sexpr(raw).is_none());
    }

    #[test]
    fn rejects_malformed_garbage() {
        assert!(parse_principle_sexpr("not an sexpr at all").is_none());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let raw = "  (principle \"x\" confidence 0.9 reasoning \"y\")  \n";
        assert!(parse_principle_sexpr(raw).is_some());
    }
}
