//! Entity set selection and entity type reachability.

use rustc_hash::FxHashSet;

use super::{ElementKind, GraphPruner};
use crate::document::NodeId;
use crate::error::TrimError;
use crate::matcher::NamePattern;

/// Entity type names that survive the keep and exclude filters.
#[derive(Debug, Default)]
pub(super) struct KeptEntities {
    /// Bare names of every entity type to keep.
    pub type_names: FxHashSet<String>,
    /// Entity type names matched by name rather than through an entity set.
    direct_matches: FxHashSet<String>,
    /// Names of entity sets removed so far.
    pub removed_sets: FxHashSet<String>,
}

/// What a filter decided about one entity set.
struct SetDecision {
    id: NodeId,
    name: String,
    /// Bare entity type name when the set survives and its type is local.
    entity_type: Option<String>,
    survives: bool,
}

impl GraphPruner<'_> {
    /// Keep the entity sets and entity types whose names match `pattern`.
    pub(super) fn apply_keep_filter(
        &mut self,
        pattern: &NamePattern,
    ) -> Result<KeptEntities, TrimError> {
        let mut kept = KeptEntities::default();
        self.filter_entity_sets(|name| pattern.matches(name), &mut kept)?;

        let entity_types: Vec<NodeId> = self
            .document
            .elements_by_tag(ElementKind::EntityType.tag())
            .collect();
        for id in entity_types {
            let name = self.document.required_attribute(id, "Name")?;
            if pattern.matches(name) {
                kept.direct_matches.insert(name.to_owned());
            }
        }
        kept.type_names.extend(kept.direct_matches.iter().cloned());

        tracing::info!(
            "Keep filter: {} entity sets, {} entity types",
            self.document.count(ElementKind::EntitySet.tag()),
            kept.type_names.len()
        );
        Ok(kept)
    }

    /// Drop the surviving entity sets whose names match `pattern`.
    ///
    /// Runs on whatever the keep filter left in the tree. Directly matched
    /// entity types from the keep filter stay only if the exclude pattern
    /// does not match them too.
    pub(super) fn apply_exclude_filter(
        &mut self,
        pattern: &NamePattern,
        previous: Option<KeptEntities>,
    ) -> Result<KeptEntities, TrimError> {
        let previous = previous.unwrap_or_default();
        let mut kept = KeptEntities {
            removed_sets: previous.removed_sets,
            ..KeptEntities::default()
        };
        self.filter_entity_sets(|name| !pattern.matches(name), &mut kept)?;

        kept.direct_matches = previous
            .direct_matches
            .into_iter()
            .filter(|name| !pattern.matches(name))
            .collect();
        kept.type_names.extend(kept.direct_matches.iter().cloned());

        tracing::info!(
            "Exclude filter: {} entity sets, {} entity types",
            self.document.count(ElementKind::EntitySet.tag()),
            kept.type_names.len()
        );
        Ok(kept)
    }

    /// Remove entity sets that fail `survives` and collect the entity
    /// types of the rest.
    fn filter_entity_sets(
        &mut self,
        survives: impl Fn(&str) -> bool,
        kept: &mut KeptEntities,
    ) -> Result<(), TrimError> {
        let mut decisions = Vec::new();
        for id in self.document.elements_by_tag(ElementKind::EntitySet.tag()) {
            let name = self.document.required_attribute(id, "Name")?;
            let entity_type = self.document.required_attribute(id, "EntityType")?;
            let survives = survives(name);
            let bare = if survives {
                let bare = self.namespace.strip(entity_type);
                if bare.is_none() {
                    tracing::warn!(
                        "Entity set {} uses type {} from another schema",
                        name,
                        entity_type
                    );
                }
                bare.map(str::to_owned)
            } else {
                None
            };
            decisions.push(SetDecision {
                id,
                name: name.to_owned(),
                entity_type: bare,
                survives,
            });
        }

        for decision in decisions {
            if decision.survives {
                kept.type_names.extend(decision.entity_type);
                let navigation: Vec<NodeId> = self
                    .document
                    .children_by_tag(decision.id, ElementKind::NavigationProperty.tag())
                    .collect();
                for nav in navigation {
                    self.remove(nav, ElementKind::NavigationProperty);
                }
            } else {
                self.remove(decision.id, ElementKind::EntitySet);
                kept.removed_sets.insert(decision.name);
            }
        }
        Ok(())
    }

    /// Remove bindings whose target entity set was removed.
    pub(super) fn prune_navigation_bindings(&mut self, removed_sets: &FxHashSet<String>) {
        if removed_sets.is_empty() {
            return;
        }
        let doomed: Vec<NodeId> = self
            .document
            .elements_by_tag(ElementKind::NavigationPropertyBinding.tag())
            .filter(|&id| {
                self.document
                    .attribute(id, "Target")
                    .and_then(|target| target.rsplit('/').next())
                    .is_some_and(|set| removed_sets.contains(set))
            })
            .collect();
        for id in doomed {
            self.remove(id, ElementKind::NavigationPropertyBinding);
        }
    }

    /// Add the base types of kept entity types until nothing changes.
    pub(super) fn close_over_base_types(&self, type_names: &mut FxHashSet<String>) {
        let derived: Vec<(&str, &str)> = self
            .document
            .elements_by_tag(ElementKind::EntityType.tag())
            .filter_map(|id| {
                let name = self.document.attribute(id, "Name")?;
                let base = self.document.attribute(id, "BaseType")?;
                Some((name, self.namespace.strip(base)?))
            })
            .collect();

        loop {
            let mut grew = false;
            for &(name, base) in &derived {
                if type_names.contains(name) && !type_names.contains(base) {
                    tracing::debug!("Keeping {} as base type of {}", base, name);
                    type_names.insert(base.to_owned());
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
    }

    /// Remove navigation properties that do not point at a kept entity type.
    ///
    /// A navigation property without a `Type` points at nothing and goes too.
    pub(super) fn prune_navigation_properties(&mut self, type_names: &FxHashSet<String>) {
        let doomed: Vec<NodeId> = self
            .document
            .elements_by_tag(ElementKind::NavigationProperty.tag())
            .filter(|&id| !self.references_kept_type(id, type_names))
            .collect();
        for id in doomed {
            self.remove(id, ElementKind::NavigationProperty);
        }
    }

    /// Remove entity types that are not kept.
    pub(super) fn prune_entity_types(
        &mut self,
        type_names: &FxHashSet<String>,
    ) -> Result<(), TrimError> {
        let mut doomed = Vec::new();
        for id in self.document.elements_by_tag(ElementKind::EntityType.tag()) {
            let name = self.document.required_attribute(id, "Name")?;
            if !type_names.contains(name) {
                doomed.push(id);
            }
        }
        for id in doomed {
            self.remove(id, ElementKind::EntityType);
        }
        Ok(())
    }

    /// Whether the `Type` attribute of `id` references a kept entity type.
    pub(super) fn references_kept_type(&self, id: NodeId, type_names: &FxHashSet<String>) -> bool {
        self.document
            .attribute(id, "Type")
            .and_then(|type_ref| self.namespace.referenced_name(type_ref))
            .is_some_and(|name| type_names.contains(name))
    }
}
