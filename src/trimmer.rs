//! Trim facade: load, prune, save.

use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::TrimError;
use crate::namespace::SchemaNamespace;
use crate::options::TrimOptions;
use crate::prune::{GraphPruner, PruneOutcome};
use crate::report::{Reporter, TracingReporter, TrimEvent};

/// What a completed trim run did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrimSummary {
    pub destination: PathBuf,
    pub outcome: PruneOutcome,
}

/// Trims EDMX documents with one set of options.
///
/// A trimmer holds no per-document state, so one instance can process any
/// number of files, each with its own tree and pattern cache.
#[derive(Clone, Debug, Default)]
pub struct EdmxTrimmer {
    options: TrimOptions,
}

impl EdmxTrimmer {
    pub fn new(options: TrimOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    /// Prune an already loaded document in place.
    pub fn trim_document(&self, document: &mut Document) -> Result<PruneOutcome, TrimError> {
        let namespace = SchemaNamespace::resolve(document)?;
        GraphPruner::new(document, &namespace, &self.options).run()
    }

    /// Trim `source` into `destination`, overwriting it.
    ///
    /// The destination is only written once pruning has succeeded. When
    /// `verbose` is set, entity set counts go to `reporter`.
    pub fn trim_file(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        reporter: &mut dyn Reporter,
    ) -> Result<TrimSummary, TrimError> {
        let source = source.as_ref();
        let destination = destination.as_ref();
        let verbose = self.options.verbose;

        let mut document = Document::load(source)?;
        if verbose {
            let entity_sets = document.count("EntitySet");
            reporter.report(&TrimEvent::Loaded {
                path: source,
                entity_sets,
            });
        }

        let outcome = self.trim_document(&mut document)?;
        if verbose {
            reporter.report(&TrimEvent::Pruned {
                entity_sets: outcome.entity_sets_after,
                removed: &outcome.removed,
            });
        }

        document.save(destination)?;
        if verbose {
            reporter.report(&TrimEvent::Saved { path: destination });
        }

        Ok(TrimSummary {
            destination: destination.to_path_buf(),
            outcome,
        })
    }
}

/// Trim `source` into `destination`, reporting through `tracing`.
pub fn run(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &TrimOptions,
) -> Result<TrimSummary, TrimError> {
    EdmxTrimmer::new(options.clone()).trim_file(source, destination, &mut TracingReporter)
}
