//! Static FR -> EN token synonyms, mostly localized proper-noun variants
//! (Pokémon version words). Expansion is purely additive: it widens the
//! candidate pool and never narrows it.

const TOKEN_SYNONYMS: &[(&str, &[&str])] = &[
    // Pokémon versions (FR -> EN)
    ("emeraude", &["emerald"]),
    ("rubis", &["ruby"]),
    ("saphir", &["sapphire"]),
    ("rouge", &["red"]),
    ("bleu", &["blue"]),
    ("jaune", &["yellow"]),
    ("or", &["gold"]),
    ("argent", &["silver"]),
    ("cristal", &["crystal"]),
    ("diamant", &["diamond"]),
    ("perle", &["pearl"]),
    ("platine", &["platinum"]),
    ("noir", &["black"]),
    ("blanc", &["white"]),
    ("lune", &["moon"]),
    ("soleil", &["sun"]),
    ("ecarlate", &["scarlet"]),
    ("violet", &["violet"]),
    ("epee", &["sword"]),
    ("bouclier", &["shield"]),
    // General titles
    ("pokemon", &["pokémon"]),
    ("pokémon", &["pokemon"]),
];

fn synonyms_for(token: &str) -> Option<&'static [&'static str]> {
    TOKEN_SYNONYMS
        .iter()
        .find(|(key, _)| *key == token)
        .map(|(_, syns)| *syns)
}

/// Keep every input token and append its table entries, deduplicated in
/// first-seen order.
pub fn expand_tokens(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |t: &str, out: &mut Vec<String>| {
        if !out.iter().any(|existing| existing == t) {
            out.push(t.to_string());
        }
    };

    for token in tokens {
        push(token, &mut out);
        if let Some(syns) = synonyms_for(token) {
            for syn in syns {
                push(syn, &mut out);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_adds_synonyms() {
        let out = expand_tokens(&toks(&["pokemon", "epee"]));
        assert_eq!(out, vec!["pokemon", "pokémon", "epee", "sword"]);
    }

    #[test]
    fn test_expand_never_removes() {
        let input = toks(&["zelda", "breath"]);
        let out = expand_tokens(&input);
        for t in &input {
            assert!(out.contains(t));
        }
    }

    #[test]
    fn test_expand_dedupes() {
        let out = expand_tokens(&toks(&["rouge", "red"]));
        assert_eq!(out, vec!["rouge", "red"]);
    }
}
