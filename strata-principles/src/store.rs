//! HTTP-backed `PrincipleStore` over the relational principle table
//! (SPEC_FULL.md §6.4). At startup, ensures all 11 rows exist and
//! force-syncs the admin-owned slots (1-3) to their configured defaults;
//! thereafter `load_all`/`save_slot` are plain row reads/upserts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_core::cancel::CancellationToken;
use strata_core::constants::PRINCIPLE_SLOT_COUNT;
use strata_core::errors::{CortexError, CortexResult, StorageError};
use strata_core::principle::{PrincipleSlot, PrincipleTable};
use strata_core::traits::PrincipleStore;

#[derive(Debug, Clone)]
pub struct PrincipleStoreConfig {
    pub base_url: String,
    /// Content for slots 1-3, force-synced on every `bootstrap` call.
    pub admin_defaults: Vec<(usize, String)>,
}

pub struct HttpPrincipleStore {
    http: reqwest::Client,
    config: PrincipleStoreConfig,
}

#[derive(Serialize, Deserialize)]
struct WireSlot {
    slot: usize,
    content: String,
    rating: f64,
    is_admin: bool,
    validation_count: u64,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&PrincipleSlot> for WireSlot {
    fn from(s: &PrincipleSlot) -> Self {
        Self {
            slot: s.slot,
            content: s.content.clone(),
            rating: s.rating,
            is_admin: s.is_admin,
            validation_count: s.validation_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<WireSlot> for PrincipleSlot {
    fn from(w: WireSlot) -> Self {
        Self {
            slot: w.slot,
            content: w.content,
            rating: w.rating,
            is_admin: w.is_admin,
            validation_count: w.validation_count,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

impl HttpPrincipleStore {
    pub fn new(config: PrincipleStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn cancellable<T>(
        &self,
        token: &CancellationToken,
        fut: impl std::future::Future<Output = CortexResult<T>>,
    ) -> CortexResult<T> {
        tokio::select! {
            result = fut => result,
            _ = token.cancelled() => Err(CortexError::Cancelled),
        }
    }

    async fn fetch_rows(&self, token: &CancellationToken) -> CortexResult<Vec<PrincipleSlot>> {
        let url = self.url("/principles");
        self.cancellable(token, async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(CortexError::StorageFailure(StorageError::ApiError { status, body }));
            }
            let wire: Vec<WireSlot> = response
                .json()
                .await
                .map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?;
            Ok(wire.into_iter().map(PrincipleSlot::from).collect())
        })
        .await
    }

    async fn put_row(&self, slot: &PrincipleSlot, token: &CancellationToken) -> CortexResult<()> {
        let wire = WireSlot::from(slot);
        let url = self.url(&format!("/principles/{}", slot.slot));
        self.cancellable(token, async {
            let response = self
                .http
                .put(&url)
                .json(&wire)
                .send()
                .await
                .map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(CortexError::StorageFailure(StorageError::ApiError { status, body }));
            }
            Ok(())
        })
        .await
    }

    /// Fill missing rows (a fresh row is stored as empty content, never
    /// absent) and pad the result out to all 11 slots in order.
    fn fill_gaps(existing: Vec<PrincipleSlot>) -> CortexResult<PrincipleTable> {
        let mut slots = Vec::with_capacity(PRINCIPLE_SLOT_COUNT);
        for i in 0..PRINCIPLE_SLOT_COUNT {
            match existing.iter().find(|s| s.slot == i).cloned() {
                Some(s) => slots.push(s),
                None => slots.push(PrincipleSlot::empty(i)?),
            }
        }
        PrincipleTable::from_slots(slots)
    }

    /// Ensure all 11 rows exist and force-update slots 1-3 to the
    /// configured admin defaults. Run once at process startup, before
    /// any worker starts (SPEC_FULL.md §4.9).
    pub async fn bootstrap(&self, token: &CancellationToken) -> CortexResult<PrincipleTable> {
        let existing = match self.fetch_rows(token).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "principle store unreachable on bootstrap, starting from an empty table");
                Vec::new()
            }
        };
        let mut table = Self::fill_gaps(existing)?;
        table.sync_admin_defaults(&self.config.admin_defaults)?;
        for slot in table.all() {
            self.put_row(slot, token).await?;
        }
        Ok(table)
    }
}

#[async_trait]
impl PrincipleStore for HttpPrincipleStore {
    async fn load_all(&self) -> CortexResult<PrincipleTable> {
        let token = CancellationToken::new();
        let rows = self.fetch_rows(&token).await?;
        Self::fill_gaps(rows)
    }

    async fn save_slot(&self, slot: &PrincipleSlot) -> CortexResult<()> {
        let token = CancellationToken::new();
        self.put_row(slot, &token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_slot_round_trips_field_values() {
        let slot = PrincipleSlot::empty(4).unwrap();
        let wire = WireSlot::from(&slot);
        let back: PrincipleSlot = wire.into();
        assert_eq!(back.slot, 4);
        assert!(!back.is_admin);
    }

    #[test]
    fn fill_gaps_pads_missing_rows_to_full_table() {
        let table = HttpPrincipleStore::fill_gaps(vec![PrincipleSlot::empty(4).unwrap()]).unwrap();
        assert_eq!(table.all().len(), PRINCIPLE_SLOT_COUNT);
        assert!(table.get(0).unwrap().content.is_empty());
    }
}
