//! Query-time link-strength helper (SPEC_FULL.md §4.5). Given a record
//! with `access_count = n` and a co-retrieval count `c` for a neighbor:
//! established records (n > 0) use `min(1, c/n)`; fresh records (n == 0)
//! use `min(1, 0.2*c)`.

pub fn link_strength(access_count: u64, co_retrieval_count: u64) -> f64 {
    if access_count > 0 {
        (co_retrieval_count as f64 / access_count as f64).min(1.0)
    } else {
        (0.2 * co_retrieval_count as f64).min(1.0)
    }
}
