//! Catalog fixtures.

use drill_core::{CatalogDocument, Level, Term};

/// The two-term level used by the typed-recall scenarios.
pub fn numbers_level() -> Level {
    Level {
        id: "numbers".to_string(),
        name: "Numbers".to_string(),
        description: "Number systems".to_string(),
        terms: vec![
            Term::new("정수", "integer"),
            Term::new("유리수", "rational number"),
        ],
    }
}

/// A level with `n` generated terms, each with a hint.
pub fn generated_level(id: &str, n: usize) -> Level {
    Level {
        id: id.to_string(),
        name: format!("Generated {}", id),
        description: String::new(),
        terms: (0..n)
            .map(|i| {
                Term::new(format!("단어{}", i), format!("word {}", i)).with_hint(format!("hint {}", i))
            })
            .collect(),
    }
}

pub fn document(levels: Vec<Level>) -> CatalogDocument {
    CatalogDocument { levels }
}
