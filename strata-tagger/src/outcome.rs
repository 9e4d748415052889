//! Outcome analysis: classify a memory's content as good/bad/neutral via
//! the LLM. On a malformed response the classification defaults to
//! neutral with zero confidence rather than failing the whole tag pass
//! (SPEC_FULL.md §4.3).

use std::time::Duration;

use serde::Deserialize;
use strata_core::cancel::CancellationToken;
use strata_core::errors::CortexResult;
use strata_core::record::OutcomeTag;
use strata_core::traits::{ChatMessage, ChatRole, LlmClient};

const SYSTEM_PROMPT: &str = "Classify the outcome of the following memory as good, bad, or neutral. \
Respond with a JSON object: {\"outcome\": \"good\"|\"bad\"|\"neutral\", \"confidence\": 0.0-1.0}.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeAnalysis {
    pub outcome: OutcomeTag,
    pub confidence: f64,
}

#[derive(Deserialize)]
struct RawOutcome {
    outcome: String,
    confidence: f64,
}

pub async fn analyze_outcome(
    llm: &dyn LlmClient,
    content: &str,
    deadline: Duration,
    token: &CancellationToken,
) -> CortexResult<OutcomeAnalysis> {
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

    let raw = llm.complete(&messages, 0.0, deadline, token).await?;
    Ok(parse_outcome(&raw))
}

fn parse_outcome(raw: &str) -> OutcomeAnalysis {
    match serde_json::from_str::<RawOutcome>(raw.trim()) {
        Ok(parsed) => {
            let outcome = OutcomeTag::parse(&parsed.outcome).unwrap_or(OutcomeTag::Neutral);
            OutcomeAnalysis {
                outcome,
                confidence: parsed.confidence.clamp(0.0, 1.0),
            }
        }
        Err(_) => OutcomeAnalysis {
            outcome: OutcomeTag::Neutral,
            confidence: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_json() {
        let analysis = parse_outcome(r#"{"outcome": "good", "confidence": 0.9}"#);
        assert_eq!(analysis.outcome, OutcomeTag::Good);
        assert_eq!(analysis.confidence, 0.9);
    }

    #[test]
    fn malformed_json_defaults_to_neutral_zero_confidence() {
        let analysis = parse_outcome("not json at all");
        assert_eq!(analysis.outcome, OutcomeTag::Neutral);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let analysis = parse_outcome(r#"{"outcome": "bad", "confidence": 4.0}"#);
        assert_eq!(analysis.confidence, 1.0);
    }
}
