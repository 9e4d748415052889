//! In-memory [`PrincipleStore`] double: a single `PrincipleTable` behind a
//! mutex, bootstrapped empty unless the test seeds it.

use async_trait::async_trait;
use strata_core::errors::CortexResult;
use strata_core::principle::{PrincipleSlot, PrincipleTable};
use strata_core::traits::PrincipleStore;
use tokio::sync::Mutex;

pub struct FakePrincipleStore {
    table: Mutex<PrincipleTable>,
}

impl FakePrincipleStore {
    /// An empty 11-slot table with no admin defaults applied.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(PrincipleTable::bootstrap(&[]).expect("empty admin defaults always bootstrap")),
        }
    }

    pub fn with_table(table: PrincipleTable) -> Self {
        Self { table: Mutex::new(table) }
    }

    pub async fn snapshot(&self) -> PrincipleTable {
        self.table.lock().await.clone()
    }
}

impl Default for FakePrincipleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipleStore for FakePrincipleStore {
    async fn load_all(&self) -> CortexResult<PrincipleTable> {
        Ok(self.table.lock().await.clone())
    }

    async fn save_slot(&self, slot: &PrincipleSlot) -> CortexResult<()> {
        let mut table = self.table.lock().await;
        let mut slots: Vec<PrincipleSlot> = table.all().to_vec();
        slots[slot.slot] = slot.clone();
        *table = PrincipleTable::from_slots(slots)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_all_starts_as_an_empty_eleven_slot_table() {
        let store = FakePrincipleStore::new();
        let table = store.load_all().await.unwrap();
        assert_eq!(table.all().len(), 11);
        assert!(table.get(4).unwrap().content.is_empty());
    }

    #[tokio::test]
    async fn save_slot_is_visible_to_a_later_load_all() {
        let store = FakePrincipleStore::new();
        let mut slot = store.load_all().await.unwrap().get(4).unwrap().clone();
        slot.content = "new principle".into();
        store.save_slot(&slot).await.unwrap();

        let reloaded = store.load_all().await.unwrap();
        assert_eq!(reloaded.get(4).unwrap().content, "new principle");
    }
}
