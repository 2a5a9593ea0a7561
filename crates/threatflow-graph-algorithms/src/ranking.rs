//! Score-based ranking of candidate paths

/// Keep the `k` highest-scoring items, best first.
///
/// The sort is stable, so items with equal scores keep the order in which
/// they were discovered. NaN scores sort after every real number.
pub fn top_k_by_score<T>(mut scored: Vec<(T, f64)>, k: usize) -> Vec<(T, f64)> {
    scored.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (false, false) => b.1.total_cmp(&a.1),
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (true, true) => std::cmp::Ordering::Equal,
    });
    scored.truncate(k.max(1));
    scored
}
