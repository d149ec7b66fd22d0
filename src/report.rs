//! Verbose reporting sinks.
//!
//! The trimmer reports through a [`Reporter`] only when verbose output is
//! enabled. Reporting is observational and never affects the result.

use std::path::Path;

use crate::prune::RemovalTally;

/// Something the trimmer has to say about a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimEvent<'a> {
    /// The source was loaded; `entity_sets` is the count before pruning.
    Loaded { path: &'a Path, entity_sets: usize },
    /// Pruning finished.
    Pruned {
        entity_sets: usize,
        removed: &'a RemovalTally,
    },
    /// The destination was written.
    Saved { path: &'a Path },
}

/// Receives [`TrimEvent`]s from a trim run.
pub trait Reporter {
    fn report(&mut self, event: &TrimEvent<'_>);
}

/// Reports through `tracing` at `info` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: &TrimEvent<'_>) {
        match event {
            TrimEvent::Loaded { path, entity_sets } => {
                tracing::info!("{}: {} entity sets before trimming", path.display(), entity_sets);
            }
            TrimEvent::Pruned {
                entity_sets,
                removed,
            } => {
                tracing::info!(
                    "{} entity sets after trimming ({} elements removed)",
                    entity_sets,
                    removed.total()
                );
            }
            TrimEvent::Saved { path } => tracing::info!("Wrote {}", path.display()),
        }
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: &TrimEvent<'_>) {}
}

/// Collects the entity set counts it is told about.
///
/// Handy for callers that want the numbers rather than log lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountingReporter {
    pub before: Option<usize>,
    pub after: Option<usize>,
    pub saved: bool,
}

impl Reporter for CountingReporter {
    fn report(&mut self, event: &TrimEvent<'_>) {
        match event {
            TrimEvent::Loaded { entity_sets, .. } => self.before = Some(*entity_sets),
            TrimEvent::Pruned { entity_sets, .. } => self.after = Some(*entity_sets),
            TrimEvent::Saved { .. } => self.saved = true,
        }
    }
}
