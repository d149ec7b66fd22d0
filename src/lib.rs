//! # edmx-trimmer
//!
//! Shrinks OData CSDL (EDMX) metadata documents to the entity sets a client
//! actually needs, together with everything still reachable from them.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! trimmer   → Facade: load, prune, save, report
//!   ↓
//! prune     → Schema-graph reachability and flat strips
//!   ↓
//! matcher, namespace, options, report
//!   ↓
//! document  → Arena XML tree with span-preserving rendering
//!   ↓
//! error     → TrimError
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use edmx_trimmer::{run, TrimOptions};
//!
//! let options = TrimOptions::new()
//!     .with_entities_to_keep(["Photos", "People"])
//!     .with_remove_action_imports(true);
//! let summary = run("Metadata.edmx", "Output.edmx", &options)?;
//! println!("{} entity sets left", summary.outcome.entity_sets_after);
//! # Ok::<(), edmx_trimmer::TrimError>(())
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Arena XML tree: parse, query, remove, render
pub mod document;

/// Crate-wide error type
pub mod error;

/// Wildcard and regex name patterns
pub mod matcher;

/// Schema namespace and alias handling for qualified names
pub mod namespace;

/// Trim configuration
pub mod options;

/// Reachability pruning over the schema graph
pub mod prune;

/// Verbose reporting sinks
pub mod report;

/// Load, prune and save in one call
pub mod trimmer;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use document::{Document, NodeId};
pub use error::TrimError;
pub use matcher::{NamePattern, PatternCache};
pub use namespace::SchemaNamespace;
pub use options::TrimOptions;
pub use prune::{ElementKind, GraphPruner, PruneOutcome, RemovalTally};
pub use report::{CountingReporter, NullReporter, Reporter, TracingReporter, TrimEvent};
pub use trimmer::{run, EdmxTrimmer, TrimSummary};
