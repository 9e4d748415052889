//! The fixed 11-slot principle table (SPEC_FULL.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ADMIN_SLOTS, PRINCIPLE_SLOT_COUNT};
use crate::errors::{CortexError, CortexResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipleSlot {
    pub slot: usize,
    pub content: String,
    pub rating: f64,
    pub is_admin: bool,
    pub validation_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrincipleSlot {
    pub fn empty(slot: usize) -> CortexResult<Self> {
        if slot >= PRINCIPLE_SLOT_COUNT {
            return Err(CortexError::invalid_input(format!(
                "slot {slot} out of range 0..{PRINCIPLE_SLOT_COUNT}"
            )));
        }
        let now = Utc::now();
        Ok(Self {
            slot,
            content: String::new(),
            rating: 0.0,
            is_admin: ADMIN_SLOTS.contains(&slot),
            validation_count: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// The full 11-slot table, always fully populated (empty slots have
/// empty content, not absent rows — §6.4's startup contract).
#[derive(Debug, Clone)]
pub struct PrincipleTable {
    slots: Vec<PrincipleSlot>,
}

impl PrincipleTable {
    /// Build a table of 11 empty slots, then force-sync admin defaults.
    pub fn bootstrap(admin_defaults: &[(usize, String)]) -> CortexResult<Self> {
        let mut slots = Vec::with_capacity(PRINCIPLE_SLOT_COUNT);
        for i in 0..PRINCIPLE_SLOT_COUNT {
            slots.push(PrincipleSlot::empty(i)?);
        }
        let mut table = Self { slots };
        table.sync_admin_defaults(admin_defaults)?;
        Ok(table)
    }

    pub fn from_slots(slots: Vec<PrincipleSlot>) -> CortexResult<Self> {
        if slots.len() != PRINCIPLE_SLOT_COUNT {
            return Err(CortexError::invalid_input(format!(
                "expected {PRINCIPLE_SLOT_COUNT} principle slots, got {}",
                slots.len()
            )));
        }
        Ok(Self { slots })
    }

    pub fn get(&self, slot: usize) -> Option<&PrincipleSlot> {
        self.slots.get(slot)
    }

    pub fn all(&self) -> &[PrincipleSlot] {
        &self.slots
    }

    /// Force-update admin slots (1-3) to the configured defaults on every
    /// startup; rating and validation_count are left untouched (§4.8).
    pub fn sync_admin_defaults(&mut self, defaults: &[(usize, String)]) -> CortexResult<()> {
        for (slot, content) in defaults {
            if !ADMIN_SLOTS.contains(slot) {
                return Err(CortexError::invalid_input(format!(
                    "admin default given for non-admin slot {slot}"
                )));
            }
            let entry = self
                .slots
                .get_mut(*slot)
                .ok_or_else(|| CortexError::invalid_input(format!("slot {slot} out of range")))?;
            entry.content = content.clone();
            entry.is_admin = true;
            entry.updated_at = Utc::now();
        }
        Ok(())
    }

    /// Replace the content/rating of an engine-managed slot (4-10 only).
    /// Admin slots (1-3) reject content mutation; callers may still rate
    /// them via `rate_only`.
    pub fn set_engine_slot(&mut self, slot: usize, content: String, rating: f64) -> CortexResult<()> {
        if ADMIN_SLOTS.contains(&slot) {
            return Err(CortexError::invalid_input(
                "admin principle slots cannot have their content mutated by the engine",
            ));
        }
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or_else(|| CortexError::invalid_input(format!("slot {slot} out of range")))?;
        entry.content = content;
        entry.rating = rating.clamp(0.0, 1.0);
        entry.validation_count = entry.validation_count.saturating_add(1);
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Rate or bump validation_count on any slot, including admin slots,
    /// without touching content.
    pub fn rate_only(&mut self, slot: usize, rating: Option<f64>) -> CortexResult<()> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or_else(|| CortexError::invalid_input(format!("slot {slot} out of range")))?;
        if let Some(r) = rating {
            entry.rating = r.clamp(0.0, 1.0);
        }
        entry.validation_count = entry.validation_count.saturating_add(1);
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Find the first empty engine-managed slot (4-10), if any.
    pub fn first_empty_engine_slot(&self) -> Option<usize> {
        crate::constants::ENGINE_SLOTS
            .into_iter()
            .find(|&s| self.slots[s].content.is_empty())
    }

    /// The lowest-rated engine-managed slot, used for "survival of the
    /// fittest" replacement when all engine slots are full.
    pub fn lowest_rated_engine_slot(&self) -> Option<usize> {
        crate::constants::ENGINE_SLOTS
            .into_iter()
            .min_by(|&a, &b| {
                self.slots[a]
                    .rating
                    .partial_cmp(&self.slots[b].rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_fills_all_slots_and_syncs_admin_defaults() {
        let defaults = vec![
            (1, "rule one".to_string()),
            (2, "rule two".to_string()),
            (3, "rule three".to_string()),
        ];
        let table = PrincipleTable::bootstrap(&defaults).unwrap();
        assert_eq!(table.all().len(), 11);
        assert_eq!(table.get(1).unwrap().content, "rule one");
        assert!(table.get(1).unwrap().is_admin);
        assert!(table.get(0).unwrap().content.is_empty());
    }

    #[test]
    fn set_engine_slot_rejects_admin_slots() {
        let mut table = PrincipleTable::bootstrap(&[]).unwrap();
        let result = table.set_engine_slot(2, "hijacked".into(), 0.9);
        assert!(result.is_err());
    }

    #[test]
    fn first_empty_engine_slot_finds_lowest_index() {
        let mut table = PrincipleTable::bootstrap(&[]).unwrap();
        table.set_engine_slot(4, "a".into(), 0.5).unwrap();
        assert_eq!(table.first_empty_engine_slot(), Some(5));
    }

    #[test]
    fn lowest_rated_engine_slot_picks_the_minimum() {
        let mut table = PrincipleTable::bootstrap(&[]).unwrap();
        for (slot, rating) in [(4, 0.9), (5, 0.3), (6, 0.7)] {
            table.set_engine_slot(slot, format!("s{slot}"), rating).unwrap();
        }
        assert_eq!(table.lowest_rated_engine_slot(), Some(5));
    }
}
