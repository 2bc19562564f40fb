//! Text folding for fuzzy matching of routes, page names and keywords.
//!
//! Page names come from a Spanish-language backend ("Calificación",
//! "Años lectivos") while routes and keyword tables are usually written without
//! accents. Folding lowercases and strips diacritics so both sides compare
//! equal.

/// Fold `input` into its matching key: lowercase, diacritics removed,
/// surrounding whitespace trimmed.
pub fn fold_key(input: &str) -> String {
    input
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .map(strip_diacritic)
        .collect()
}

/// True iff `needle` folds to a non-empty key contained in the already-folded
/// `haystack_key`.
///
/// A blank needle matches nothing, so an empty fragment can never act as a
/// wildcard.
pub fn contains_folded(haystack_key: &str, needle: &str) -> bool {
    let needle = fold_key(needle);
    !needle.is_empty() && haystack_key.contains(&needle)
}

/// Combining diacritical marks (U+0300..U+036F), as sent by clients that
/// emit decomposed text.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}
