//! Conversion between `MemoryRecord` and the index's JSON payload shape.
//!
//! `memory_id` is always mirrored into the payload (spec.md §4.1) so
//! scrolls can recover identity without relying on the point id, which
//! some index backends treat as an opaque, non-queryable key.

use std::collections::HashMap;

use serde_json::{json, Value};
use strata_core::errors::{CortexError, CortexResult, StorageError};
use strata_core::record::{CoRetrievalMetadata, MemoryId, MemoryRecord, Owner, OutcomeTag, Tier};

pub fn tier_to_str(tier: Tier) -> &'static str {
    tier.as_str()
}

fn tier_from_str(raw: &str) -> CortexResult<Tier> {
    match raw {
        "recent" => Ok(Tier::Recent),
        "medium" => Ok(Tier::Medium),
        "long" => Ok(Tier::Long),
        "ancient" => Ok(Tier::Ancient),
        other => Err(CortexError::StorageFailure(StorageError::RequestFailed(
            format!("unknown tier in payload: {other}"),
        ))),
    }
}

/// Build the JSON payload for an upsert. The vector travels separately
/// in the point envelope; this is the payload half only.
pub fn to_payload(record: &MemoryRecord) -> Value {
    let (owner_user_id, is_collective) = match &record.owner {
        Owner::Personal(id) => (Some(id.clone()), false),
        Owner::Collective => (None, true),
    };

    json!({
        "memory_id": record.id.0,
        "content": record.content,
        "compressed_from": record.compressed_from,
        "tier": tier_to_str(record.tier),
        "user_id": owner_user_id,
        "is_collective": is_collective,
        "created_at": record.created_at.to_rfc3339(),
        "last_accessed_at": record.last_accessed_at.to_rfc3339(),
        "access_count": record.access_count,
        "importance_score": record.importance_score,
        "outcome_tag": record.outcome_tag.as_str(),
        "trust_score": record.trust_score,
        "validation_count": record.validation_count,
        "related_memories": record.related_memories.iter().map(|m| m.0.clone()).collect::<Vec<_>>(),
        "concept_tags": record.concept_tags,
        "co_retrieval_counts": record.co_retrieval.counts,
        "co_retrieval_last": record.co_retrieval.last_increment,
    })
}

/// Reconstruct a `MemoryRecord` from a point's id, vector, and payload.
/// `embedding` is attached so internal callers can see it; adapters at
/// the API boundary are responsible for stripping it before handing the
/// record to an external caller (spec.md §3: embedding is never returned
/// to external callers).
pub fn from_point(id: &str, vector: Option<Vec<f32>>, payload: &Value) -> CortexResult<MemoryRecord> {
    let obj = payload.as_object().ok_or_else(|| {
        CortexError::StorageFailure(StorageError::RequestFailed(
            "payload was not a JSON object".into(),
        ))
    })?;

    let get_str = |key: &str| -> Option<String> {
        obj.get(key).and_then(Value::as_str).map(str::to_string)
    };

    let memory_id = get_str("memory_id").unwrap_or_else(|| id.to_string());

    let tier = tier_from_str(get_str("tier").as_deref().unwrap_or("recent"))?;

    let is_collective = obj
        .get("is_collective")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let owner = if is_collective {
        Owner::Collective
    } else {
        match get_str("user_id") {
            Some(uid) => Owner::Personal(uid),
            None => Owner::Collective,
        }
    };

    let created_at = parse_rfc3339(get_str("created_at").as_deref())?;
    let last_accessed_at = parse_rfc3339(get_str("last_accessed_at").as_deref())?;

    let outcome_tag = OutcomeTag::parse(get_str("outcome_tag").as_deref().unwrap_or("unset"))?;

    let related_memories = obj
        .get("related_memories")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(|s| MemoryId(s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let concept_tags = obj
        .get("concept_tags")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let counts: HashMap<String, u64> = obj
        .get("co_retrieval_counts")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let last_increment: HashMap<String, i64> = obj
        .get("co_retrieval_last")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    Ok(MemoryRecord {
        id: MemoryId(memory_id),
        content: get_str("content").unwrap_or_default(),
        compressed_from: get_str("compressed_from"),
        tier,
        owner,
        created_at,
        last_accessed_at,
        access_count: obj.get("access_count").and_then(Value::as_u64).unwrap_or(0),
        importance_score: obj
            .get("importance_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.2),
        outcome_tag,
        trust_score: obj.get("trust_score").and_then(Value::as_f64).unwrap_or(0.5),
        validation_count: obj
            .get("validation_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        related_memories,
        concept_tags,
        co_retrieval: CoRetrievalMetadata {
            counts,
            last_increment,
        },
        embedding: vector,
    })
}

fn parse_rfc3339(raw: Option<&str>) -> CortexResult<chrono::DateTime<chrono::Utc>> {
    match raw {
        Some(s) => chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| {
                CortexError::StorageFailure(StorageError::RequestFailed(format!(
                    "malformed timestamp {s:?}: {e}"
                )))
            }),
        None => Ok(chrono::Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::record::MemoryRecord;

    #[test]
    fn round_trips_a_collective_record() {
        let record = MemoryRecord::new("hello world".into(), Owner::Collective, 0.4);
        let payload = to_payload(&record);
        let restored = from_point(&record.id.0, None, &payload).unwrap();
        assert_eq!(restored.id, record.id);
        assert_eq!(restored.content, "hello world");
        assert_eq!(restored.tier, Tier::Recent);
        assert!(restored.owner.is_collective());
    }

    #[test]
    fn round_trips_a_personal_record() {
        let record = MemoryRecord::new("secret".into(), Owner::Personal("user-1".into()), 0.6);
        let payload = to_payload(&record);
        let restored = from_point(&record.id.0, None, &payload).unwrap();
        assert_eq!(restored.owner, Owner::Personal("user-1".into()));
    }

    #[test]
    fn missing_memory_id_falls_back_to_point_id() {
        let payload = json!({
            "content": "x",
            "tier": "recent",
            "is_collective": true,
        });
        let restored = from_point("point-123", None, &payload).unwrap();
        assert_eq!(restored.id.0, "point-123");
    }
}
