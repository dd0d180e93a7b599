//! Answer evaluation for typed mode and the shared normalization key.

use indexmap::IndexMap;

use crate::types::Term;

/// Canonical comparison key.
///
/// Lowercases, treats runs of `_`/`-` as a space, then trims and collapses
/// whitespace. Trimming happens last so the function is idempotent even when
/// the input starts or ends with a separator.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `input` matches the term's English answer or one of its synonyms.
pub fn is_correct(input: &str, term: &Term) -> bool {
    let typed = normalize(input);
    std::iter::once(&term.en)
        .chain(term.synonyms.iter())
        .any(|candidate| normalize(candidate) == typed)
}

/// Deduplicate by normalized `ko`. A later duplicate replaces the earlier
/// value but keeps the earlier position.
pub fn dedupe_by_ko(terms: Vec<Term>) -> Vec<Term> {
    let mut by_key: IndexMap<String, Term> = IndexMap::with_capacity(terms.len());
    for term in terms {
        by_key.insert(term.key(), term);
    }
    by_key.into_values().collect()
}
