//! IGDB filter-clause construction.
//!
//! Game titles are short, multi-word and sometimes localized: a full AND of
//! substring matches is too brittle, a full OR too noisy. The default
//! strategy ANDs the two longest tokens (longer tokens discriminate better)
//! and widens with an anchor-token OR; the strict and loose variants remain
//! available for other call sites.

use crate::query::normalize::{filter_useful_tokens, tokenize};
use crate::query::synonyms::expand_tokens;

/// Generic marketing words that make poor anchor tokens.
const GENERIC_TERMS: &[&str] = &[
    "professeur", "version", "edition", "ultimate", "deluxe", "collection",
];

/// Escape a string for interpolation inside an IGDB double-quoted literal.
/// Backslash first, then quote. Not idempotent: re-escaping an escaped
/// string doubles the escapes.
pub fn escape_igdb_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn contains_predicate(field: &str, token: &str) -> String {
    format!("{} ~ *\"{}\"*", field, escape_igdb_string(token))
}

/// Every token must match. No dedup: duplicate inputs produce duplicate
/// predicates.
pub fn build_and_contains(field: &str, tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| contains_predicate(field, t))
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Any token may match. Widening fallback.
pub fn build_loose_contains(field: &str, tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| contains_predicate(field, t))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn uniq(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in tokens {
        let trimmed = t.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.iter().any(|existing| existing == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Loose OR over trimmed, deduplicated tokens.
pub fn build_any_contains(field: &str, tokens: &[String]) -> String {
    build_loose_contains(field, &uniq(tokens))
}

/// Char count, not byte length: expanded pools can hold accented tokens.
fn token_len(t: &str) -> usize {
    t.chars().count()
}

/// Longest-first, stable: equal lengths keep their input order.
fn pick_top_tokens(tokens: &[String], n: usize) -> Vec<String> {
    let mut sorted = tokens.to_vec();
    sorted.sort_by(|a, b| token_len(b).cmp(&token_len(a)));
    sorted.truncate(n);
    sorted
}

/// AND of the two longest tokens; with fewer than two tokens, degrade to a
/// loose OR over everything.
pub fn build_min2_contains(field: &str, tokens: &[String]) -> String {
    let top2 = pick_top_tokens(tokens, 2);
    if top2.len() < 2 {
        return build_loose_contains(field, tokens);
    }
    top2.iter()
        .map(|t| contains_predicate(field, t))
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Choose a single must-have anchor token: prefer non-generic tokens,
/// longest wins, stable on ties. An all-generic pool falls back to the
/// full pool.
pub fn pick_must_token(tokens: &[String]) -> Option<String> {
    let candidates: Vec<&String> = tokens
        .iter()
        .filter(|t| !GENERIC_TERMS.contains(&t.as_str()))
        .collect();
    let pool: Vec<&String> = if candidates.is_empty() {
        tokens.iter().collect()
    } else {
        candidates
    };
    if pool.is_empty() {
        return None;
    }
    let mut sorted = pool;
    sorted.sort_by(|a, b| token_len(b).cmp(&token_len(a)));
    Some(sorted[0].clone())
}

/// Join clause fragments with `|`, dropping blanks.
pub fn join_or(clauses: &[String]) -> String {
    clauses
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Full token pipeline for a title `where` clause: tokenize, drop noise,
/// expand synonyms, then AND the two best tokens widened by an anchor-token
/// match. `None` when nothing useful survives (caller must fall back to a
/// looser strategy, e.g. the provider's native search).
pub fn build_title_where(field: &str, raw_query: &str) -> Option<String> {
    let useful = filter_useful_tokens(&tokenize(raw_query));
    if useful.is_empty() {
        return None;
    }
    let expanded = expand_tokens(&useful);

    let strict = build_min2_contains(field, &expanded);
    let anchor = pick_must_token(&expanded)
        .map(|t| contains_predicate(field, &t))
        .unwrap_or_default();

    Some(join_or(&[strict, anchor]))
}
