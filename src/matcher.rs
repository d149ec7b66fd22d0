//! Name matching for keep, exclude and action allow-lists.
//!
//! A list of search terms compiles to one regular expression. In wildcard
//! mode each term is a literal name where `?` stands for one character and
//! `*` for any run of characters, and the whole name must match. In regex
//! mode each term is used as-is and may match anywhere in the name.
//!
//! ```
//! use edmx_trimmer::matcher::NamePattern;
//!
//! let airports = NamePattern::compile(&["Air*"], false).unwrap();
//! assert!(airports.matches("Airlines"));
//! assert!(airports.matches("Airports"));
//! assert!(!airports.matches("Photos"));
//! ```

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::TrimError;

/// A compiled list of search terms.
#[derive(Clone, Debug)]
pub struct NamePattern {
    /// `None` when the term list was empty; such a pattern matches nothing.
    regex: Option<Regex>,
}

impl NamePattern {
    /// Compile search terms into a single alternation.
    ///
    /// Terms are trimmed and empty terms are skipped.
    pub fn compile<S: AsRef<str>>(terms: &[S], treat_as_regex: bool) -> Result<Self, TrimError> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|term| term.as_ref().trim())
            .filter(|term| !term.is_empty())
            .map(|term| {
                if treat_as_regex {
                    format!("(?:{term})")
                } else {
                    format!("^(?:{})$", wildcard_to_regex(term))
                }
            })
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }

        let pattern = alternatives.join("|");
        let regex = Regex::new(&pattern)
            .map_err(|source| TrimError::InvalidPattern { pattern, source })?;
        Ok(Self { regex: Some(regex) })
    }

    /// Whether `name` matches any of the terms. Case-sensitive.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Whether the pattern was compiled from an empty term list.
    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    /// The combined regular expression, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }
}

/// Escape a term literally, then turn `?` and `*` back into wildcards.
fn wildcard_to_regex(term: &str) -> String {
    regex::escape(term).replace(r"\?", ".").replace(r"\*", ".*")
}

/// Compiled patterns for one pruning run.
///
/// Keyed by the exact term list and the matcher mode, so the same terms in
/// regex and wildcard mode never share an entry.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: FxHashMap<(Vec<String>, bool), NamePattern>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled pattern for `terms`, compiling it on first use.
    pub fn get_or_compile<S: AsRef<str>>(
        &mut self,
        terms: &[S],
        treat_as_regex: bool,
    ) -> Result<NamePattern, TrimError> {
        let key = (
            terms.iter().map(|t| t.as_ref().to_owned()).collect::<Vec<_>>(),
            treat_as_regex,
        );
        if let Some(pattern) = self.compiled.get(&key) {
            return Ok(pattern.clone());
        }
        let pattern = NamePattern::compile(terms, treat_as_regex)?;
        tracing::trace!("Compiled name pattern {:?}", pattern.as_str());
        self.compiled.insert(key, pattern.clone());
        Ok(pattern)
    }

    /// Number of distinct compiled patterns.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
