//! One-time `memory_id` backfill (spec.md §4.1): points written before the
//! payload carried a mirrored `memory_id` field have only the point's own
//! id for identity. This walks the whole collection once, over the raw
//! wire payload, and patches `memory_id` in for any point missing it.

use serde_json::{json, Value};
use strata_core::cancel::CancellationToken;
use strata_core::constants::DEFAULT_MAX_SCROLL_ITERATIONS;
use strata_core::errors::{CortexError, CortexResult, StorageError};
use tracing::{info, warn};

use crate::client::VectorStoreConfig;

#[derive(Debug, Default, Clone, Copy)]
pub struct BackfillStats {
    pub scanned: usize,
    pub patched: usize,
    pub iterations: usize,
    pub halted_at_cap: bool,
}

/// Scroll every point's raw payload and patch in `memory_id` where absent.
/// Bounded by `DEFAULT_MAX_SCROLL_ITERATIONS` so a malformed or adversarial
/// continuation cursor can't loop forever; re-running a halted backfill
/// resumes from scratch since points already patched are simply no-ops.
pub async fn backfill_memory_ids(
    http: &reqwest::Client,
    config: &VectorStoreConfig,
    page_size: usize,
    token: &CancellationToken,
) -> CortexResult<BackfillStats> {
    let mut stats = BackfillStats::default();
    let base = config.base_url.trim_end_matches('/');
    let scroll_url = format!("{base}/collections/{}/points/scroll", config.collection);
    let payload_url = format!("{base}/collections/{}/points/payload", config.collection);

    let mut offset: Option<String> = None;

    loop {
        if stats.iterations >= DEFAULT_MAX_SCROLL_ITERATIONS {
            warn!(
                iterations = stats.iterations,
                "memory_id backfill halted at max_scroll_iterations; re-run to continue"
            );
            stats.halted_at_cap = true;
            break;
        }
        stats.iterations += 1;

        let body = json!({
            "limit": page_size,
            "offset": offset,
            "with_payload": true,
            "with_vector": false,
        });

        let response = tokio::select! {
            result = http.post(&scroll_url).json(&body).send() => {
                result.map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?
            }
            _ = token.cancelled() => return Err(CortexError::Cancelled),
        };
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(CortexError::StorageFailure(StorageError::ApiError { status, body: text }));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?;

        let result = body.get("result").cloned().unwrap_or(Value::Null);
        let points = result.get("points").and_then(Value::as_array).cloned().unwrap_or_default();
        stats.scanned += points.len();

        for point in &points {
            let id = match point.get("id").and_then(Value::as_str) {
                Some(id) => id,
                None => continue,
            };
            let has_memory_id = point
                .get("payload")
                .and_then(|p| p.get("memory_id"))
                .and_then(Value::as_str)
                .is_some();
            if has_memory_id {
                continue;
            }

            let patch_body = json!({ "points": [id], "payload": { "memory_id": id } });
            let patch_response = tokio::select! {
                result = http.post(&payload_url).json(&patch_body).send() => {
                    result.map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?
                }
                _ = token.cancelled() => return Err(CortexError::Cancelled),
            };
            if patch_response.status().is_success() {
                stats.patched += 1;
            } else {
                warn!(id, status = %patch_response.status(), "backfill patch failed for point");
            }
        }

        offset = result
            .get("next_page_offset")
            .and_then(Value::as_str)
            .map(str::to_string);
        if offset.is_none() {
            break;
        }
    }

    info!(
        scanned = stats.scanned,
        patched = stats.patched,
        iterations = stats.iterations,
        "memory_id backfill complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_to_zero() {
        let stats = BackfillStats::default();
        assert_eq!(stats.scanned, 0);
        assert!(!stats.halted_at_cap);
    }
}
