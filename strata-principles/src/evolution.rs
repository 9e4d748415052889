//! Evolution routine (SPEC_FULL.md §4.8): folds rated candidates into the
//! fixed 11-slot table by similarity against every active (non-empty)
//! slot. Local state (slot content and slot embeddings) is updated
//! in-place during the loop so one cycle can't fill the same slot twice
//! with two near-identical candidates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::constants::{
    ADMIN_SLOTS, DEFAULT_PRINCIPLE_TIMEOUT_SECS, IDENTITY_SLOT, PRINCIPLE_MERGE_THRESHOLD,
    PRINCIPLE_NEW_CONCEPT_THRESHOLD, PRINCIPLE_REPLACE_MARGIN,
};
use strata_core::errors::CortexResult;
use strata_core::principle::PrincipleTable;
use strata_core::traits::{ChatMessage, ChatRole, EmbeddingClient, LlmClient, PrincipleStore};
use tracing::info;

use crate::candidate::PrincipleCandidate;

#[derive(Clone)]
pub struct EvolutionDeps {
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub llm: Arc<dyn LlmClient>,
    pub principle_store: Arc<dyn PrincipleStore>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvolutionOutcome {
    NewConcept { slot: usize },
    Replaced { slot: usize },
    Merged { slot: usize },
    Discarded,
    NoChange,
}

pub async fn run_evolution(
    deps: &EvolutionDeps,
    mut candidates: Vec<PrincipleCandidate>,
    token: &CancellationToken,
) -> CortexResult<Vec<EvolutionOutcome>> {
    let mut table = deps.principle_store.load_all().await?;
    let mut slot_embeddings = embed_active_slots(deps, &table, token).await?;

    candidates.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));

    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let outcome = evolve_one(deps, &mut table, &mut slot_embeddings, candidate, token).await?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

async fn embed_active_slots(
    deps: &EvolutionDeps,
    table: &PrincipleTable,
    token: &CancellationToken,
) -> CortexResult<HashMap<usize, Vec<f32>>> {
    let mut map = HashMap::new();
    for slot in table.all() {
        if slot.content.is_empty() {
            continue;
        }
        let embedding = deps.embeddings.embed(&slot.content, token).await?;
        map.insert(slot.slot, embedding);
    }
    Ok(map)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot as f64) / ((norm_a as f64) * (norm_b as f64))
}

fn best_match(candidate_embedding: &[f32], slot_embeddings: &HashMap<usize, Vec<f32>>) -> Option<(usize, f64)> {
    slot_embeddings
        .iter()
        .map(|(&slot, embedding)| (slot, cosine_similarity(candidate_embedding, embedding)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

async fn evolve_one(
    deps: &EvolutionDeps,
    table: &mut PrincipleTable,
    slot_embeddings: &mut HashMap<usize, Vec<f32>>,
    candidate: &PrincipleCandidate,
    token: &CancellationToken,
) -> CortexResult<EvolutionOutcome> {
    let candidate_embedding = deps.embeddings.embed(&candidate.content, token).await?;
    let best = best_match(&candidate_embedding, slot_embeddings);

    let is_new_concept = match best {
        None => true,
        Some((_, sim)) => sim < PRINCIPLE_NEW_CONCEPT_THRESHOLD,
    };

    if is_new_concept {
        return fill_or_replace_engine_slot(deps, table, slot_embeddings, candidate, candidate_embedding, token).await;
    }

    let (matched_slot, similarity) = best.expect("best is Some when not a new concept");

    if ADMIN_SLOTS.contains(&matched_slot) || matched_slot == IDENTITY_SLOT {
        return Ok(EvolutionOutcome::Discarded);
    }

    if similarity > PRINCIPLE_MERGE_THRESHOLD {
        return merge_into_slot(deps, table, slot_embeddings, candidate, matched_slot, token).await;
    }

    contradiction_check(deps, table, slot_embeddings, candidate, candidate_embedding, matched_slot, token).await
}

async fn fill_or_replace_engine_slot(
    deps: &EvolutionDeps,
    table: &mut PrincipleTable,
    slot_embeddings: &mut HashMap<usize, Vec<f32>>,
    candidate: &PrincipleCandidate,
    candidate_embedding: Vec<f32>,
    _token: &CancellationToken,
) -> CortexResult<EvolutionOutcome> {
    let target_slot = table.first_empty_engine_slot().or_else(|| {
        table.lowest_rated_engine_slot().filter(|&slot| {
            table
                .get(slot)
                .map(|s| candidate.rating > s.rating)
                .unwrap_or(false)
        })
    });

    let Some(slot) = target_slot else {
        return Ok(EvolutionOutcome::Discarded);
    };

    table.set_engine_slot(slot, candidate.content.clone(), candidate.rating)?;
    slot_embeddings.insert(slot, candidate_embedding);
    persist_slot(deps, table, slot).await?;

    info!(slot, content = %candidate.content, "principle: filled new concept slot");
    Ok(EvolutionOutcome::NewConcept { slot })
}

async fn merge_into_slot(
    deps: &EvolutionDeps,
    table: &mut PrincipleTable,
    slot_embeddings: &mut HashMap<usize, Vec<f32>>,
    candidate: &PrincipleCandidate,
    slot: usize,
    token: &CancellationToken,
) -> CortexResult<EvolutionOutcome> {
    let existing = table
        .get(slot)
        .cloned_for_merge()
        .ok_or_else(|| strata_core::errors::CortexError::invalid_input("merge target slot missing"))?;

    let messages = [
        ChatMessage {
            role: ChatRole::System,
            content: "Merge these two behavioral rules into one rule of 25 words or fewer. \
                      Respond with only the merged rule text."
                .to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            content: format!("Rule A: \"{}\"\nRule B: \"{}\"", existing.content, candidate.content),
        },
    ];
    let merged_text = deps
        .llm
        .complete(&messages, 0.2, Duration::from_secs(DEFAULT_PRINCIPLE_TIMEOUT_SECS), token)
        .await?;
    let merged_text = merged_text.trim().trim_matches('"').to_string();

    let rating = existing.rating.max(candidate.rating);
    table.set_engine_slot(slot, merged_text.clone(), rating)?;

    let merged_embedding = deps.embeddings.embed(&merged_text, token).await?;
    slot_embeddings.insert(slot, merged_embedding);
    persist_slot(deps, table, slot).await?;

    info!(slot, "principle: merged candidate into existing slot");
    Ok(EvolutionOutcome::Merged { slot })
}

async fn contradiction_check(
    deps: &EvolutionDeps,
    table: &mut PrincipleTable,
    slot_embeddings: &mut HashMap<usize, Vec<f32>>,
    candidate: &PrincipleCandidate,
    candidate_embedding: Vec<f32>,
    slot: usize,
    token: &CancellationToken,
) -> CortexResult<EvolutionOutcome> {
    let existing = table
        .get(slot)
        .cloned_for_merge()
        .ok_or_else(|| strata_core::errors::CortexError::invalid_input("contradiction target slot missing"))?;

    let messages = [
        ChatMessage {
            role: ChatRole::System,
            content: "Do these two behavioral rules contradict each other? Answer with only \
                      \"yes\" or \"no\"."
                .to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            content: format!("Rule A: \"{}\"\nRule B: \"{}\"", existing.content, candidate.content),
        },
    ];
    let answer = deps
        .llm
        .complete(&messages, 0.0, Duration::from_secs(DEFAULT_PRINCIPLE_TIMEOUT_SECS), token)
        .await?;
    let contradicts = answer.trim().to_lowercase().starts_with("yes");

    if contradicts {
        if candidate.rating > existing.rating {
            table.set_engine_slot(slot, candidate.content.clone(), candidate.rating)?;
            slot_embeddings.insert(slot, candidate_embedding);
            persist_slot(deps, table, slot).await?;
            return Ok(EvolutionOutcome::Replaced { slot });
        }
        return Ok(EvolutionOutcome::Discarded);
    }

    if candidate.rating > existing.rating + PRINCIPLE_REPLACE_MARGIN {
        table.set_engine_slot(slot, candidate.content.clone(), candidate.rating)?;
        slot_embeddings.insert(slot, candidate_embedding);
        persist_slot(deps, table, slot).await?;
        return Ok(EvolutionOutcome::Replaced { slot });
    }

    Ok(EvolutionOutcome::NoChange)
}

async fn persist_slot(deps: &EvolutionDeps, table: &PrincipleTable, slot: usize) -> CortexResult<()> {
    let entry = table.get(slot).expect("slot index is always in range here");
    deps.principle_store.save_slot(entry).await
}

/// Small helper trait to avoid repeating the `Option<&PrincipleSlot>` to
/// owned-clone dance at every call site above.
trait ClonedForMerge {
    fn cloned_for_merge(self) -> Option<strata_core::principle::PrincipleSlot>;
}

impl ClonedForMerge for Option<&strata_core::principle::PrincipleSlot> {
    fn cloned_for_merge(self) -> Option<strata_core::principle::PrincipleSlot> {
        self.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn best_match_picks_highest_similarity_slot() {
        let mut slots = HashMap::new();
        slots.insert(4, vec![1.0, 0.0]);
        slots.insert(5, vec![0.0, 1.0]);
        let (slot, sim) = best_match(&[0.9, 0.1], &slots).unwrap();
        assert_eq!(slot, 4);
        assert!(sim > 0.5);
    }
}
