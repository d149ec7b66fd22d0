//! Trim configuration.
//!
//! [`TrimOptions`] is the fully validated configuration handed to the
//! trimmer. It can be built in code or read from a JSON file:
//!
//! ```json
//! {
//!   "entitiesToKeep": ["Photos", "People"],
//!   "entitiesToExclude": ["People"],
//!   "removeActionImports": true
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrimError;

/// What to keep, what to drop, and how to report it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrimOptions {
    /// Entity set or entity type name patterns to keep. Empty keeps all.
    pub entities_to_keep: Vec<String>,

    /// Entity set or entity type name patterns to drop after the keep filter.
    pub entities_to_exclude: Vec<String>,

    /// Treat entity and action patterns as regular expressions instead of wildcards.
    pub entities_are_regular_expressions: bool,

    /// When non-empty, exactly the actions whose names match survive.
    pub actions_to_include: Vec<String>,

    /// Drop `Annotations` targeting this schema.
    pub remove_primary_annotations: bool,

    pub remove_action_imports: bool,

    pub remove_function_imports: bool,

    pub remove_complex_types: bool,

    /// Report entity set counts before and after trimming.
    pub verbose: bool,
}

impl TrimOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON file. Missing fields take their defaults.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, TrimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TrimError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| TrimError::Options {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Whether any entity-level pruning is requested.
    pub fn prunes_entities(&self) -> bool {
        !self.entities_to_keep.is_empty() || !self.entities_to_exclude.is_empty()
    }

    pub fn with_entities_to_keep<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities_to_keep = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_entities_to_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities_to_exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_actions_to_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions_to_include = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regular_expressions(mut self, value: bool) -> Self {
        self.entities_are_regular_expressions = value;
        self
    }

    pub fn with_remove_primary_annotations(mut self, value: bool) -> Self {
        self.remove_primary_annotations = value;
        self
    }

    pub fn with_remove_action_imports(mut self, value: bool) -> Self {
        self.remove_action_imports = value;
        self
    }

    pub fn with_remove_function_imports(mut self, value: bool) -> Self {
        self.remove_function_imports = value;
        self
    }

    pub fn with_remove_complex_types(mut self, value: bool) -> Self {
        self.remove_complex_types = value;
        self
    }

    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }
}
