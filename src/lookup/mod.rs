//! Fault-code lookup against the record store
//!
//! Every front end shares the same `search` entry point. Two query grammars
//! exist, and each walks its own fallback chain until something matches:
//!
//! | Grammar | Accepts | Chain |
//! |---------|---------|-------|
//! | `Numeric` | 1-5 digits | zero-pad to 5, exact, substring |
//! | `Alphanumeric` | 1-8 ASCII letters/digits | upper-case, exact, cleaned exact, substring, 3-char suffix |
//!
//! Queries are validated before the store is touched.

use crate::storage::{FaultCodeRecord, FaultCodeStore};
use crate::HarvestError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Width numeric codes are zero-padded to
pub const NUMERIC_CODE_WIDTH: usize = 5;

/// Trailing characters compared by the suffix fallback
pub const SUFFIX_LENGTH: usize = 3;

/// Most rows the suffix fallback returns
pub const SUFFIX_RESULT_LIMIT: usize = 10;

static NUMERIC_QUERY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,5}$").unwrap());
static ALPHANUMERIC_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,8}$").unwrap());
static CODE_DECORATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\]\s]+").unwrap());

/// A query rejected by its grammar; the message is shown to the user as is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Accepted query syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryGrammar {
    /// 1-5 digit numeral, zero-padded on the left
    #[default]
    Numeric,

    /// 1-8 letters or digits, upper-cased
    Alphanumeric,
}

impl QueryGrammar {
    /// Checks `query` against the grammar and returns the code to look up
    pub fn normalize(&self, query: &str) -> Result<String, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError("Please enter a fault code".to_string()));
        }

        match self {
            Self::Numeric => {
                if !NUMERIC_QUERY.is_match(query) {
                    return Err(ValidationError(
                        "Please enter a valid fault code (1-5 digits)".to_string(),
                    ));
                }
                Ok(format!("{:0>width$}", query, width = NUMERIC_CODE_WIDTH))
            }
            Self::Alphanumeric => {
                if !ALPHANUMERIC_QUERY.is_match(query) {
                    return Err(ValidationError(
                        "Please enter a valid fault code (1-8 alphanumeric characters)"
                            .to_string(),
                    ));
                }
                Ok(query.to_uppercase())
            }
        }
    }
}

impl fmt::Display for QueryGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Alphanumeric => write!(f, "alphanumeric"),
        }
    }
}

impl FromStr for QueryGrammar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "numeric" => Ok(Self::Numeric),
            "alphanumeric" => Ok(Self::Alphanumeric),
            other => Err(format!("unknown query grammar: {}", other)),
        }
    }
}

/// Result of a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    SingleMatch(FaultCodeRecord),

    /// Several candidates, ordered by code within each fallback step
    MultipleMatches {
        records: Vec<FaultCodeRecord>,
        /// Explains a loosened match, such as the suffix fallback
        note: Option<String>,
    },

    NoMatch { message: String },
}

impl SearchOutcome {
    /// Number of records carried
    pub fn len(&self) -> usize {
        match self {
            Self::SingleMatch(_) => 1,
            Self::MultipleMatches { records, .. } => records.len(),
            Self::NoMatch { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Looks up `query` in `store` using `grammar`
///
/// # Errors
///
/// `HarvestError::Validation` when the query fails its grammar (the store is
/// not touched), `HarvestError::Store` when a read fails.
///
/// # Example
///
/// ```
/// use fault_harvest::lookup::{search, QueryGrammar, SearchOutcome};
/// use fault_harvest::storage::{FaultCodeRecord, FaultCodeStore, SqliteStore};
///
/// let mut store = SqliteStore::new_in_memory().unwrap();
/// store.upsert(&FaultCodeRecord::new("00532")).unwrap();
///
/// let outcome = search(&store, "532", QueryGrammar::Numeric).unwrap();
/// assert!(matches!(outcome, SearchOutcome::SingleMatch(r) if r.code == "00532"));
/// ```
pub fn search<S: FaultCodeStore + ?Sized>(
    store: &S,
    query: &str,
    grammar: QueryGrammar,
) -> Result<SearchOutcome, HarvestError> {
    let code = grammar.normalize(query)?;
    tracing::debug!("Searching for {} ({} grammar)", code, grammar);

    let outcome = match grammar {
        QueryGrammar::Numeric => search_numeric(store, &code)?,
        QueryGrammar::Alphanumeric => search_alphanumeric(store, query.trim(), &code)?,
    };
    Ok(outcome)
}

fn search_numeric<S: FaultCodeStore + ?Sized>(
    store: &S,
    code: &str,
) -> Result<SearchOutcome, HarvestError> {
    if let Some(record) = store.get_by_code(code)? {
        return Ok(SearchOutcome::SingleMatch(record));
    }

    let records = store.get_by_code_substring(code)?;
    if records.is_empty() {
        return Ok(SearchOutcome::NoMatch {
            message: format!(
                "No results found for fault code '{}'. \
                 Fault codes are typically 5-digit numbers (e.g., 00532).",
                code
            ),
        });
    }

    Ok(SearchOutcome::MultipleMatches {
        records,
        note: None,
    })
}

fn search_alphanumeric<S: FaultCodeStore + ?Sized>(
    store: &S,
    query: &str,
    code: &str,
) -> Result<SearchOutcome, HarvestError> {
    if let Some(record) = store.get_by_code(code)? {
        return Ok(SearchOutcome::SingleMatch(record));
    }

    let cleaned = CODE_DECORATION.replace_all(code, "").into_owned();
    if cleaned != code {
        if let Some(record) = store.get_by_code(&cleaned)? {
            return Ok(SearchOutcome::SingleMatch(record));
        }
    }

    let mut records = store.get_by_code_substring(code)?;
    if cleaned != code && !cleaned.is_empty() {
        records.extend(store.get_by_code_substring(&cleaned)?);
    }
    if !records.is_empty() {
        return Ok(SearchOutcome::MultipleMatches {
            records,
            note: None,
        });
    }

    let length = code.chars().count();
    if length >= SUFFIX_LENGTH {
        let suffix: String = code.chars().skip(length - SUFFIX_LENGTH).collect();
        let similar = store.get_by_code_suffix(&suffix, SUFFIX_RESULT_LIMIT)?;
        if !similar.is_empty() {
            return Ok(SearchOutcome::MultipleMatches {
                records: similar,
                note: Some(format!(
                    "No exact match for '{}', but found similar codes ending in '{}':",
                    query, suffix
                )),
            });
        }
    }

    Ok(SearchOutcome::NoMatch {
        message: format!(
            "No results found for '{}'. Try searching for just the code number \
             (e.g., 'P1757' instead of 'P1757 00 [237]').",
            query
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{RecordField, SqliteStore, StoreResult};
    use std::cell::Cell;

    fn store_with(codes: &[&str]) -> SqliteStore {
        let mut store = SqliteStore::new_in_memory().unwrap();
        for code in codes {
            let mut record = FaultCodeRecord::new(*code);
            record.title = Some(format!("Title {}", code));
            store.upsert(&record).unwrap();
        }
        store
    }

    fn codes(outcome: &SearchOutcome) -> Vec<&str> {
        match outcome {
            SearchOutcome::SingleMatch(record) => vec![record.code.as_str()],
            SearchOutcome::MultipleMatches { records, .. } => {
                records.iter().map(|r| r.code.as_str()).collect()
            }
            SearchOutcome::NoMatch { .. } => vec![],
        }
    }

    /// Store that counts every read, to prove validation happens first
    #[derive(Default)]
    struct CountingStore {
        reads: Cell<usize>,
    }

    impl CountingStore {
        fn touch(&self) {
            self.reads.set(self.reads.get() + 1);
        }
    }

    impl FaultCodeStore for CountingStore {
        fn upsert(&mut self, _record: &FaultCodeRecord) -> StoreResult<()> {
            Ok(())
        }
        fn get_by_code(&self, _code: &str) -> StoreResult<Option<FaultCodeRecord>> {
            self.touch();
            Ok(None)
        }
        fn get_by_code_substring(&self, _fragment: &str) -> StoreResult<Vec<FaultCodeRecord>> {
            self.touch();
            Ok(vec![])
        }
        fn get_by_code_suffix(
            &self,
            _suffix: &str,
            _limit: usize,
        ) -> StoreResult<Vec<FaultCodeRecord>> {
            self.touch();
            Ok(vec![])
        }
        fn count(&self) -> StoreResult<u64> {
            self.touch();
            Ok(0)
        }
        fn count_populated(&self, _field: RecordField) -> StoreResult<u64> {
            self.touch();
            Ok(0)
        }
        fn count_content_containing(&self, _needle: &str) -> StoreResult<u64> {
            self.touch();
            Ok(0)
        }
        fn sample_with_content(&self) -> StoreResult<Option<FaultCodeRecord>> {
            self.touch();
            Ok(None)
        }
    }

    #[test]
    fn test_numeric_query_is_zero_padded() {
        assert_eq!(QueryGrammar::Numeric.normalize("532").unwrap(), "00532");
        assert_eq!(QueryGrammar::Numeric.normalize(" 01314 ").unwrap(), "01314");
    }

    #[test]
    fn test_numeric_exact_match() {
        let store = store_with(&["00532", "00533"]);
        let outcome = search(&store, "532", QueryGrammar::Numeric).unwrap();
        assert!(matches!(outcome, SearchOutcome::SingleMatch(ref r) if r.code == "00532"));
    }

    #[test]
    fn test_numeric_substring_fallback() {
        let store = store_with(&["100532", "005321", "01314"]);
        let outcome = search(&store, "532", QueryGrammar::Numeric).unwrap();
        assert_eq!(codes(&outcome), vec!["005321", "100532"]);
    }

    #[test]
    fn test_numeric_no_match() {
        let store = store_with(&["01314"]);
        let outcome = search(&store, "532", QueryGrammar::Numeric).unwrap();
        match outcome {
            SearchOutcome::NoMatch { message } => assert!(message.contains("00532")),
            other => panic!("expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_rejects_before_store_access() {
        let store = CountingStore::default();
        for query in ["abcde", "123456", "", "5 32"] {
            let result = search(&store, query, QueryGrammar::Numeric);
            assert!(matches!(result, Err(HarvestError::Validation(_))), "{}", query);
        }
        assert_eq!(store.reads.get(), 0);
    }

    #[test]
    fn test_alphanumeric_rejects_before_store_access() {
        let store = CountingStore::default();
        for query in ["P1757 00", "P1757-00", "ABCDEFGHI", "[237]"] {
            let result = search(&store, query, QueryGrammar::Alphanumeric);
            assert!(matches!(result, Err(HarvestError::Validation(_))), "{}", query);
        }
        assert_eq!(store.reads.get(), 0);
    }

    #[test]
    fn test_alphanumeric_exact_match_is_upper_cased() {
        let store = store_with(&["P1757", "P1758"]);
        let outcome = search(&store, "p1757", QueryGrammar::Alphanumeric).unwrap();
        assert!(matches!(outcome, SearchOutcome::SingleMatch(ref r) if r.code == "P1757"));
    }

    #[test]
    fn test_alphanumeric_substring_fallback() {
        let store = store_with(&["P175700", "XP1757", "P1758"]);
        let outcome = search(&store, "p1757", QueryGrammar::Alphanumeric).unwrap();
        match &outcome {
            SearchOutcome::MultipleMatches { note, .. } => assert!(note.is_none()),
            other => panic!("expected MultipleMatches, got {:?}", other),
        }
        assert_eq!(codes(&outcome), vec!["P175700", "XP1757"]);
    }

    #[test]
    fn test_alphanumeric_suffix_fallback() {
        let store = store_with(&["P0757", "P2757", "U1757", "P1758"]);
        let outcome = search(&store, "p1757", QueryGrammar::Alphanumeric).unwrap();
        match &outcome {
            SearchOutcome::MultipleMatches { note, .. } => {
                assert_eq!(
                    note.as_deref(),
                    Some("No exact match for 'p1757', but found similar codes ending in '757':")
                );
            }
            other => panic!("expected MultipleMatches, got {:?}", other),
        }
        assert_eq!(codes(&outcome), vec!["P0757", "P2757", "U1757"]);
    }

    #[test]
    fn test_alphanumeric_suffix_fallback_is_capped() {
        let many: Vec<String> = (0..15).map(|i| format!("A{:02}757", i)).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let store = store_with(&refs);

        let outcome = search(&store, "P1757", QueryGrammar::Alphanumeric).unwrap();
        assert_eq!(outcome.len(), SUFFIX_RESULT_LIMIT);
        assert_eq!(codes(&outcome)[0], "A00757");
    }

    #[test]
    fn test_alphanumeric_short_query_skips_suffix() {
        let store = store_with(&["P0012"]);
        let outcome = search(&store, "9Z", QueryGrammar::Alphanumeric).unwrap();
        match outcome {
            SearchOutcome::NoMatch { message } => assert!(message.contains("'9Z'")),
            other => panic!("expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_decorated_code_retried_cleaned() {
        // Callers that skip grammar validation can still pass wiki-style codes
        let store = store_with(&["P175700"]);
        let outcome = search_alphanumeric(&store, "P1757 [00]", "P1757 [00]").unwrap();
        assert!(matches!(outcome, SearchOutcome::SingleMatch(ref r) if r.code == "P175700"));
    }

    #[test]
    fn test_decorated_code_substring_uses_cleaned_form() {
        let store = store_with(&["P175700", "P1758"]);
        let outcome = search_alphanumeric(&store, "P1757 [0]", "P1757 [0]").unwrap();
        match &outcome {
            SearchOutcome::MultipleMatches { note, .. } => assert!(note.is_none()),
            other => panic!("expected MultipleMatches, got {:?}", other),
        }
        assert_eq!(codes(&outcome), vec!["P175700"]);
    }

    #[test]
    fn test_grammar_from_str() {
        assert_eq!("numeric".parse::<QueryGrammar>().unwrap(), QueryGrammar::Numeric);
        assert_eq!(
            "Alphanumeric".parse::<QueryGrammar>().unwrap(),
            QueryGrammar::Alphanumeric
        );
        assert!("hex".parse::<QueryGrammar>().is_err());
    }
}
