//! Schema-graph reachability filter.
//!
//! Given keep and exclude patterns, the pruner decides which entity sets
//! survive, derives the entity types they need, and then deletes every
//! navigation property, entity type, operation, operation import and enum
//! type that is no longer reachable from the survivors.
//!
//! ## Phases
//!
//! ```text
//! keep filter ──▶ exclude filter ──▶ bindings ──▶ base types
//!                                                    │
//!     enums ◀── imports ◀── actions, functions ◀── entity types ◀── navigation
//!       │
//!       ▼
//!  flat strips (annotations, imports, complex types)
//! ```
//!
//! The exclude filter re-queries the tree after the keep filter ran, so it
//! only ever narrows the selection. When neither keep nor exclude patterns
//! are given, only the flat strips run. The action allow-list is compiled
//! up front either way, so a bad pattern fails every run.

mod entities;
mod enums;
mod operations;
mod strip;

use std::fmt;

use indexmap::IndexMap;

use crate::document::{Document, NodeId};
use crate::error::TrimError;
use crate::matcher::{NamePattern, PatternCache};
use crate::namespace::SchemaNamespace;
use crate::options::TrimOptions;

pub use enums::BUILT_IN_ENUM;

/// Element kinds the pruner removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    EntitySet,
    EntityType,
    NavigationProperty,
    NavigationPropertyBinding,
    Action,
    Function,
    ActionImport,
    FunctionImport,
    EnumType,
    ComplexType,
    Annotations,
}

impl ElementKind {
    /// Local tag name of the element.
    pub fn tag(self) -> &'static str {
        match self {
            Self::EntitySet => "EntitySet",
            Self::EntityType => "EntityType",
            Self::NavigationProperty => "NavigationProperty",
            Self::NavigationPropertyBinding => "NavigationPropertyBinding",
            Self::Action => "Action",
            Self::Function => "Function",
            Self::ActionImport => "ActionImport",
            Self::FunctionImport => "FunctionImport",
            Self::EnumType => "EnumType",
            Self::ComplexType => "ComplexType",
            Self::Annotations => "Annotations",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Number of elements removed, per kind, in order of first removal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalTally {
    counts: IndexMap<ElementKind, usize>,
}

impl RemovalTally {
    fn record(&mut self, kind: ElementKind) {
        *self.counts.entry(kind).or_default() += 1;
    }

    pub fn get(&self, kind: ElementKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

/// Result of a pruning run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PruneOutcome {
    pub entity_sets_before: usize,
    pub entity_sets_after: usize,
    pub removed: RemovalTally,
}

/// One pruning run over one document.
///
/// Owns the pattern cache for the run, so nothing compiled here leaks into
/// another run.
pub struct GraphPruner<'a> {
    document: &'a mut Document,
    namespace: &'a SchemaNamespace,
    options: &'a TrimOptions,
    patterns: PatternCache,
    removed: RemovalTally,
}

impl<'a> GraphPruner<'a> {
    pub fn new(
        document: &'a mut Document,
        namespace: &'a SchemaNamespace,
        options: &'a TrimOptions,
    ) -> Self {
        Self {
            document,
            namespace,
            options,
            patterns: PatternCache::new(),
            removed: RemovalTally::default(),
        }
    }

    /// Run every requested phase and report what was removed.
    pub fn run(mut self) -> Result<PruneOutcome, TrimError> {
        let entity_sets_before = self.document.count(ElementKind::EntitySet.tag());
        let action_allow_list = self.compile_action_allow_list()?;

        if self.options.prunes_entities() {
            self.prune_entities(action_allow_list.as_ref())?;
        } else {
            tracing::debug!("No keep or exclude patterns; entity graph left as is");
        }
        self.strip_flat();

        let entity_sets_after = self.document.count(ElementKind::EntitySet.tag());
        tracing::info!(
            "Pruned {} of {} entity sets, {} elements removed",
            entity_sets_before - entity_sets_after,
            entity_sets_before,
            self.removed.total()
        );
        Ok(PruneOutcome {
            entity_sets_before,
            entity_sets_after,
            removed: self.removed,
        })
    }

    fn prune_entities(&mut self, action_allow_list: Option<&NamePattern>) -> Result<(), TrimError> {
        let options = self.options;
        let regex = options.entities_are_regular_expressions;

        let mut kept = None;
        if !options.entities_to_keep.is_empty() {
            let pattern = self
                .patterns
                .get_or_compile(options.entities_to_keep.as_slice(), regex)?;
            kept = Some(self.apply_keep_filter(&pattern)?);
        }
        if !options.entities_to_exclude.is_empty() {
            let pattern = self
                .patterns
                .get_or_compile(options.entities_to_exclude.as_slice(), regex)?;
            kept = Some(self.apply_exclude_filter(&pattern, kept)?);
        }
        let Some(mut kept) = kept else {
            return Ok(());
        };

        self.prune_navigation_bindings(&kept.removed_sets);
        self.close_over_base_types(&mut kept.type_names);
        tracing::info!("Keeping {} entity types", kept.type_names.len());

        self.prune_navigation_properties(&kept.type_names);
        self.prune_entity_types(&kept.type_names)?;

        let removed_actions =
            self.prune_operations(ElementKind::Action, &kept.type_names, action_allow_list);
        self.prune_operation_imports(
            ElementKind::ActionImport,
            "Action",
            &removed_actions,
            &kept.removed_sets,
        );
        let removed_functions = self.prune_operations(ElementKind::Function, &kept.type_names, None);
        self.prune_operation_imports(
            ElementKind::FunctionImport,
            "Function",
            &removed_functions,
            &kept.removed_sets,
        );

        let enums = self.collect_enum_references();
        self.prune_enum_types(&enums);
        Ok(())
    }

    /// Remove an element and record it. Already removed elements are skipped.
    fn remove(&mut self, id: NodeId, kind: ElementKind) {
        if self.document.is_removed(id) {
            return;
        }
        let element = self.document.element(id);
        let label = element
            .attribute("Name")
            .or_else(|| element.attribute("Target"))
            .unwrap_or("<unnamed>");
        tracing::debug!("Removing {} {}", kind, label);

        self.document.remove(id);
        self.removed.record(kind);
    }

    /// Remove every live element of `kind`.
    fn remove_all(&mut self, kind: ElementKind) {
        let doomed: Vec<NodeId> = self.document.elements_by_tag(kind.tag()).collect();
        for id in doomed {
            self.remove(id, kind);
        }
    }
}
