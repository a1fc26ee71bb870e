use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Hard cap on the number of tokens kept from a query. Bounds clause size
/// and upstream query cost; tokens past the cap are silently discarded.
const MAX_TOKENS: usize = 6;

/// Bilingual (FR/EN) grammatical noise. Checked before the length
/// exemption, so 4-letter stopwords like "avec" still drop.
const STOPWORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des",
    "de", "du", "d", "l", "et", "ou", "a", "au", "aux",
    "en", "dans", "sur", "pour", "par", "avec", "sans",
    "the", "of", "and", "or",
];

/// Sequel markers stay useful even when short ("final fantasy vii").
const ROMAN_NUMERALS: &[&str] = &["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

/// NFD-decompose and drop combining marks: "Pokémon" -> "Pokemon".
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Accent-stripped, trimmed copy of the query. Used for the retry when an
/// accented query comes back empty from IGDB.
pub fn normalize_query(q: &str) -> String {
    strip_diacritics(q).trim().to_string()
}

/// Lowercase, strip diacritics, squash everything outside `[a-z0-9\s]` to
/// spaces, split, and keep the first [`MAX_TOKENS`] fragments.
pub fn tokenize(q: &str) -> Vec<String> {
    let stripped = strip_diacritics(&q.to_lowercase());
    let cleaned: String = stripped
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .take(MAX_TOKENS)
        .map(str::to_string)
        .collect()
}

/// Drop grammatical noise while keeping short but meaningful tokens:
/// numerals, roman sequel markers, and anything 4+ chars long.
pub fn filter_useful_tokens(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| {
            if t.is_empty() {
                return false;
            }
            if STOPWORDS.contains(&t.as_str()) {
                return false;
            }
            if t.len() >= 4 {
                return true;
            }
            if t.chars().all(|c| c.is_ascii_digit()) {
                return true;
            }
            ROMAN_NUMERALS.contains(&t.as_str())
        })
        .cloned()
        .collect()
}
