//! CSV codec for term lists.
//!
//! # Format
//! ```text
//! ko,en,hint,synonyms
//! 집합,set,,group|collection
//! "좌표","coordinate","(x, y) 순서쌍",
//! ```
//!
//! Fields may be quoted; a quote inside a quoted field is doubled. Synonyms
//! are separated by `|`. Header names are matched exactly against a small
//! alias set per column.

use indexmap::IndexMap;

use crate::error::{CsvError, ImportError};
use crate::types::{ImportMode, Level, Term};

/// Header written on export.
pub const HEADER: &str = "ko,en,hint,synonyms";

const KO_ALIASES: &[&str] = &["ko", "KO", "Ko"];
const EN_ALIASES: &[&str] = &["en", "EN", "En"];
const HINT_ALIASES: &[&str] = &["hint", "HINT", "Hint"];
const SYNONYM_ALIASES: &[&str] = &["synonyms", "Synonyms", "SYNONYMS"];

/// Rows read from CSV text, plus any syntax problems.
///
/// A dangling quote is reported in `errors` while the partial row is still
/// kept in `rows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub rows: Vec<Vec<String>>,
    pub errors: Vec<CsvError>,
}

impl ParsedCsv {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse CSV text into rows of fields. A leading byte-order mark is ignored.
pub fn parse(text: &str) -> ParsedCsv {
    let mut parser = Parser::default();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if parser.in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    parser.field.push('"');
                    chars.next();
                } else {
                    parser.in_quotes = false;
                }
            } else {
                parser.field.push(ch);
            }
            continue;
        }

        match ch {
            '"' => parser.in_quotes = true,
            ',' => parser.end_field(),
            '\r' => {}
            '\n' => parser.end_row(),
            _ => parser.field.push(ch),
        }
    }

    parser.finish()
}

#[derive(Default)]
struct Parser {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    field: String,
    in_quotes: bool,
}

impl Parser {
    fn end_field(&mut self) {
        self.row.push(std::mem::take(&mut self.field));
    }

    fn end_row(&mut self) {
        self.end_field();
        self.rows.push(std::mem::take(&mut self.row));
    }

    fn finish(mut self) -> ParsedCsv {
        let mut errors = Vec::new();
        if !self.field.is_empty() || self.in_quotes || !self.row.is_empty() {
            if self.in_quotes {
                errors.push(CsvError::UnclosedQuote);
            }
            self.end_row();
        }
        if self.rows.is_empty() {
            errors.push(CsvError::Empty);
        }
        ParsedCsv {
            rows: self.rows,
            errors,
        }
    }
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub ko: Option<usize>,
    pub en: Option<usize>,
    pub hint: Option<usize>,
    pub synonyms: Option<usize>,
}

impl Columns {
    /// Resolve columns. First matching header cell wins.
    pub fn resolve(header: &[String]) -> Self {
        Self {
            ko: find_header_index(header, KO_ALIASES),
            en: find_header_index(header, EN_ALIASES),
            hint: find_header_index(header, HINT_ALIASES),
            synonyms: find_header_index(header, SYNONYM_ALIASES),
        }
    }
}

fn find_header_index(header: &[String], candidates: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|cell| candidates.contains(&cell.trim()))
}

/// Build terms from parsed rows. `rows[0]` is the header.
///
/// Any row missing `ko` or `en` rejects the whole list; every such row is
/// reported.
pub fn build_terms(rows: &[Vec<String>]) -> Result<Vec<Term>, ImportError> {
    let header = rows.first().map(Vec::as_slice).unwrap_or_default();
    let columns = Columns::resolve(header);
    let (Some(ko_col), Some(en_col)) = (columns.ko, columns.en) else {
        return Err(ImportError::Validation(vec![CsvError::MissingColumns]));
    };

    let cell = |row: &[String], col: Option<usize>| -> String {
        col.and_then(|c| row.get(c))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut terms = Vec::with_capacity(rows.len().saturating_sub(1));
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate().skip(1) {
        let ko = cell(row, Some(ko_col));
        let en = cell(row, Some(en_col));
        if ko.is_empty() || en.is_empty() {
            errors.push(CsvError::MissingField { row: idx + 1 });
            continue;
        }
        let synonyms = cell(row, columns.synonyms)
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        terms.push(Term {
            ko,
            en,
            hint: cell(row, columns.hint),
            synonyms,
        });
    }

    if errors.is_empty() {
        Ok(terms)
    } else {
        Err(ImportError::Validation(errors))
    }
}

/// Parse and validate CSV text in one step.
pub fn import_terms(text: &str) -> Result<Vec<Term>, ImportError> {
    let parsed = parse(text);
    if !parsed.is_ok() {
        return Err(ImportError::Syntax(parsed.errors));
    }
    build_terms(&parsed.rows)
}

/// Merge imported terms into an existing list.
///
/// Both policies key terms by normalized `ko`; a later term replaces an
/// earlier one in place.
pub fn merge_terms(existing: &[Term], incoming: Vec<Term>, mode: ImportMode) -> Vec<Term> {
    let mut by_key: IndexMap<String, Term> = IndexMap::new();
    if mode == ImportMode::Append {
        for term in existing {
            by_key.insert(term.key(), term.clone());
        }
    }
    for term in incoming {
        by_key.insert(term.key(), term);
    }
    by_key.into_values().collect()
}

/// Serialize a level's terms with the standard header.
pub fn serialize(level: &Level) -> String {
    serialize_terms(&level.terms)
}

/// Serialize terms with the standard header. No trailing newline.
pub fn serialize_terms(terms: &[Term]) -> String {
    let mut lines = Vec::with_capacity(terms.len() + 1);
    lines.push(HEADER.to_string());
    for term in terms {
        let synonyms = term.synonyms.join("|");
        lines.push(
            [&term.ko, &term.en, &term.hint, &synonyms]
                .iter()
                .map(|field| escape_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Quote a field if it contains `"`, `,` or a newline.
pub fn escape_field(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Download name for a level export.
pub fn export_file_name(level_id: &str) -> String {
    format!("{}-terms.csv", level_id)
}
