//! Popularity reranking for suggestion mode. Plain search trusts the
//! provider's relevance order; suggestions over-fetch and resort so that
//! well-known titles surface first in type-ahead.

use serde_json::Value;

fn popularity(game: &Value) -> f64 {
    game.get("total_rating_count")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Stable sort by rating count descending (missing counts as 0), truncated
/// to `limit`. Equal counts keep provider order.
pub fn rank_by_popularity(mut games: Vec<Value>, limit: usize) -> Vec<Value> {
    games.sort_by(|a, b| {
        popularity(b)
            .partial_cmp(&popularity(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    games.truncate(limit);
    games
}
