//! Collection bootstrap: create the index collection and its payload
//! indices if they don't already exist (spec.md §6.3).

use serde_json::{json, Value};
use strata_core::cancel::CancellationToken;
use strata_core::errors::{CortexError, CortexResult, StorageError};

use crate::client::{HttpVectorStore, VectorStoreConfig};

/// Payload fields the index must be able to filter on. Every field that
/// appears on the `must`/`should` side of a `SearchFilter` needs an index
/// or the backend falls back to an unindexed full scan per request.
const FILTERABLE_FIELDS: &[(&str, &str)] = &[
    ("memory_id", "keyword"),
    ("tier", "keyword"),
    ("user_id", "keyword"),
    ("is_collective", "bool"),
    ("created_at", "datetime"),
    ("importance_score", "float"),
    ("outcome_tag", "keyword"),
    ("trust_score", "float"),
    ("concept_tags", "keyword"),
];

/// Create the collection (if missing) and its payload indices. Idempotent:
/// safe to call on every startup.
pub async fn ensure_collection(
    http: &reqwest::Client,
    config: &VectorStoreConfig,
    token: &CancellationToken,
) -> CortexResult<()> {
    let base = config.base_url.trim_end_matches('/');
    let collection_url = format!("{base}/collections/{}", config.collection);

    let exists = tokio::select! {
        result = http.get(&collection_url).send() => {
            result.map(|r| r.status().is_success()).unwrap_or(false)
        }
        _ = token.cancelled() => return Err(CortexError::Cancelled),
    };

    if !exists {
        let body = json!({
            "vectors": { "size": config.embedding_dim, "distance": "Cosine" }
        });
        let response = tokio::select! {
            result = http.put(&collection_url).json(&body).send() => {
                result.map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?
            }
            _ = token.cancelled() => return Err(CortexError::Cancelled),
        };
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(CortexError::StorageFailure(StorageError::ApiError { status, body: text }));
        }
    }

    for (field, schema) in FILTERABLE_FIELDS {
        create_payload_index(http, &collection_url, field, schema, token).await?;
    }

    Ok(())
}

async fn create_payload_index(
    http: &reqwest::Client,
    collection_url: &str,
    field: &str,
    schema: &str,
    token: &CancellationToken,
) -> CortexResult<()> {
    let url = format!("{collection_url}/index");
    let body: Value = json!({ "field_name": field, "field_schema": schema });

    let response = tokio::select! {
        result = http.put(&url).json(&body).send() => {
            result.map_err(|e| CortexError::StorageFailure(StorageError::RequestFailed(e.to_string())))?
        }
        _ = token.cancelled() => return Err(CortexError::Cancelled),
    };

    // A conflict here means the index already exists; that's fine.
    if response.status().is_success() || response.status().as_u16() == 409 {
        Ok(())
    } else {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Err(CortexError::StorageFailure(StorageError::ApiError { status, body: text }))
    }
}

/// Convenience wrapper for constructing a ready-to-use store: ensures the
/// collection exists, then returns the client.
pub async fn open(config: VectorStoreConfig, token: &CancellationToken) -> CortexResult<HttpVectorStore> {
    let http = reqwest::Client::new();
    ensure_collection(&http, &config, token).await?;
    Ok(HttpVectorStore::new(config))
}
