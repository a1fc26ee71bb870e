//! Free-text query processing: normalization, synonym expansion and
//! IGDB filter-clause construction.

pub mod clause;
pub mod normalize;
pub mod synonyms;

pub use clause::{
    build_and_contains, build_any_contains, build_loose_contains, build_min2_contains,
    build_title_where, escape_igdb_string, join_or, pick_must_token,
};
pub use normalize::{filter_useful_tokens, normalize_query, strip_diacritics, tokenize};
pub use synonyms::expand_tokens;
