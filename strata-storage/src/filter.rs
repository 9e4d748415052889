//! Filter composition (spec.md §4.1): AND-of-must combined with an
//! OR-of-should clause set, translated to the index's wire filter shape.

use serde_json::{json, Value};
use strata_core::traits::{FilterClause, SearchFilter};

/// Translate a `SearchFilter` into the wire `{must: [...], should: [...]}`
/// shape. Each clause becomes a `match_any` (OR over its own value set);
/// the outer `must` list is ANDed, the outer `should` list is ORed.
pub fn to_wire_filter(filter: &SearchFilter) -> Value {
    let must: Vec<Value> = filter.must.iter().map(clause_to_condition).collect();
    let should: Vec<Value> = filter.should.iter().map(clause_to_condition).collect();

    let mut obj = serde_json::Map::new();
    if !must.is_empty() {
        obj.insert("must".into(), Value::Array(must));
    }
    if !should.is_empty() {
        obj.insert("should".into(), Value::Array(should));
    }
    Value::Object(obj)
}

fn clause_to_condition(clause: &FilterClause) -> Value {
    json!({
        "key": clause.field,
        "match": { "any": clause.values },
    })
}

/// Build the visibility clause set for a retrieval request (spec.md §4.1):
/// when both personal and collective are requested, visibility is an
/// OR-of-should; when exactly one side is requested, it is promoted to
/// an AND-of-must so the other side is excluded outright.
pub fn visibility_filter(owner_user_id: &str, include_personal: bool, include_collective: bool) -> SearchFilter {
    let mut filter = SearchFilter::new();

    let personal_clause = || FilterClause::new("user_id", vec![owner_user_id.to_string()]);
    let collective_clause = || FilterClause::new("is_collective", vec!["true".to_string()]);

    match (include_personal, include_collective) {
        (true, true) => {
            filter = filter.with_should(personal_clause()).with_should(collective_clause());
        }
        (true, false) => {
            filter = filter.with_must(personal_clause());
        }
        (false, true) => {
            filter = filter.with_must(collective_clause());
        }
        (false, false) => {
            // Degenerate request: nothing is visible. Encode as a must
            // clause that can never match rather than returning an
            // unconstrained (and therefore over-broad) filter.
            filter = filter.with_must(FilterClause::new("user_id", vec!["__none__".to_string()]));
        }
    }
    filter
}

/// Build an OR-of-should filter over a set of concept tags (spec.md §4.1).
pub fn concept_tag_filter(tags: &[String]) -> SearchFilter {
    if tags.is_empty() {
        return SearchFilter::new();
    }
    SearchFilter::new().with_should(FilterClause::new("concept_tags", tags.to_vec()))
}

/// Merge two filters: musts concatenate, shoulds concatenate. Used to
/// combine the visibility filter with a tier/concept/outcome filter.
pub fn merge(mut a: SearchFilter, b: SearchFilter) -> SearchFilter {
    a.must.extend(b.must);
    a.should.extend(b.should);
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_requested_is_or_of_should() {
        let filter = visibility_filter("u1", true, true);
        assert!(filter.must.is_empty());
        assert_eq!(filter.should.len(), 2);
    }

    #[test]
    fn personal_only_is_promoted_to_must() {
        let filter = visibility_filter("u1", true, false);
        assert_eq!(filter.must.len(), 1);
        assert!(filter.should.is_empty());
        assert_eq!(filter.must[0].field, "user_id");
    }

    #[test]
    fn collective_only_is_promoted_to_must() {
        let filter = visibility_filter("u1", false, true);
        assert_eq!(filter.must.len(), 1);
        assert_eq!(filter.must[0].field, "is_collective");
    }

    #[test]
    fn neither_side_matches_nothing() {
        let filter = visibility_filter("u1", false, false);
        assert_eq!(filter.must[0].values, vec!["__none__".to_string()]);
    }

    #[test]
    fn wire_filter_shape_round_trips_fields() {
        let filter = SearchFilter::new()
            .with_must(FilterClause::new("tier", vec!["recent".into()]))
            .with_should(FilterClause::new("concept_tags", vec!["a".into(), "b".into()]));
        let wire = to_wire_filter(&filter);
        assert!(wire.get("must").is_some());
        assert!(wire.get("should").is_some());
    }
}
