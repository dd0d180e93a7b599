//! Term catalog: levels indexed by id, with local overrides applied.

use std::collections::HashMap;

use crate::error::SourceError;
use crate::types::{CatalogDocument, Level, Overrides, Term};

const SEED_JSON: &str = include_str!("../data/seed_catalog.json");

/// Parse a catalog document.
pub fn parse_document(json: &str) -> Result<CatalogDocument, SourceError> {
    Ok(serde_json::from_str(json)?)
}

/// The catalog shipped inside the binary.
pub fn seed_document() -> CatalogDocument {
    parse_document(SEED_JSON).unwrap_or_else(|e| {
        tracing::error!(error = %e, "embedded seed catalog is invalid");
        CatalogDocument::default()
    })
}

/// Replace `terms` of every level present in `overrides`.
pub fn apply_overrides(document: &mut CatalogDocument, overrides: &Overrides) {
    for level in &mut document.levels {
        if let Some(terms) = overrides.get(&level.id) {
            tracing::debug!(level = %level.id, terms = terms.len(), "applying term override");
            level.terms = terms.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    levels: Vec<Level>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build from a fetched document, degrading to the seed if the fetch
    /// failed. Overrides are applied before indexing.
    pub fn load(fetched: Result<CatalogDocument, SourceError>, overrides: &Overrides) -> Self {
        let mut document = fetched.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "catalog source unavailable; using embedded seed");
            seed_document()
        });
        apply_overrides(&mut document, overrides);
        Self::from_document(document)
    }

    /// Index a document. Later levels reusing an id are dropped.
    pub fn from_document(document: CatalogDocument) -> Self {
        let mut levels = Vec::with_capacity(document.levels.len());
        let mut by_id = HashMap::with_capacity(document.levels.len());
        for level in document.levels {
            if by_id.contains_key(&level.id) {
                tracing::warn!(level = %level.id, "duplicate level id ignored");
                continue;
            }
            by_id.insert(level.id.clone(), levels.len());
            levels.push(level);
        }
        Self { levels, by_id }
    }

    pub fn lookup(&self, id: &str) -> Option<&Level> {
        self.by_id.get(id).map(|&idx| &self.levels[idx])
    }

    /// Levels in document order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Replace a level's terms wholesale. Returns false for an unknown id.
    pub fn replace_terms(&mut self, id: &str, terms: Vec<Term>) -> bool {
        match self.by_id.get(id) {
            Some(&idx) => {
                self.levels[idx].terms = terms;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document() -> CatalogDocument {
        parse_document(
            r#"{"levels":[
                {"id":"a","name":"A","description":"first","terms":[{"ko":"정수","en":"integer","hint":""}]},
                {"id":"b","name":"B","terms":[]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn seed_has_both_levels() {
        let seed = seed_document();
        let ids: Vec<_> = seed.levels.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["ms-1-1", "hs-1-1"]);
        assert!(seed.levels.iter().all(|l| !l.terms.is_empty()));
    }

    #[test]
    fn load_uses_fetched_document() {
        let catalog = Catalog::load(Ok(document()), &Overrides::new());
        assert_eq!(catalog.levels().len(), 2);
        assert_eq!(catalog.lookup("a").unwrap().terms.len(), 1);
        assert!(catalog.lookup("b").unwrap().terms.is_empty());
        assert!(catalog.lookup("c").is_none());
    }

    #[test]
    fn load_falls_back_to_seed() {
        let catalog = Catalog::load(
            Err(SourceError::Unavailable("offline".into())),
            &Overrides::new(),
        );
        assert!(catalog.lookup("ms-1-1").is_some());
    }

    #[test]
    fn overrides_replace_terms_before_indexing() {
        let mut overrides = Overrides::new();
        overrides.insert("b".into(), vec![Term::new("원점", "origin")]);
        overrides.insert("zzz".into(), vec![Term::new("x", "y")]);
        let catalog = Catalog::load(Ok(document()), &overrides);
        assert_eq!(catalog.lookup("b").unwrap().terms, vec![Term::new("원점", "origin")]);
        assert_eq!(catalog.lookup("a").unwrap().terms[0].en, "integer");
        assert!(catalog.lookup("zzz").is_none());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut doc = document();
        let mut dup = doc.levels[0].clone();
        dup.name = "Other".into();
        doc.levels.push(dup);
        let catalog = Catalog::from_document(doc);
        assert_eq!(catalog.levels().len(), 2);
        assert_eq!(catalog.lookup("a").unwrap().name, "A");
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(matches!(parse_document("{"), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn replace_terms_unknown_level() {
        let mut catalog = Catalog::from_document(document());
        assert!(!catalog.replace_terms("nope", vec![]));
        assert!(catalog.replace_terms("a", vec![]));
        assert!(catalog.lookup("a").unwrap().terms.is_empty());
    }
}
