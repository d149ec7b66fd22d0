//! Enum type reachability.

use rustc_hash::FxHashSet;

use super::{ElementKind, GraphPruner};
use crate::document::NodeId;
use crate::namespace::unwrap_collection;

/// The built-in enumeration every schema keeps.
pub const BUILT_IN_ENUM: &str = "AXType";

impl GraphPruner<'_> {
    /// Bare names of local types used by surviving properties and operations.
    ///
    /// Sources are the `Property` children of entity types (and of complex
    /// types, unless those are being stripped) and the `Parameter` and
    /// `ReturnType` children of actions and functions.
    pub(super) fn collect_enum_references(&self) -> FxHashSet<String> {
        let mut owners: Vec<&str> = vec![ElementKind::EntityType.tag()];
        if !self.options.remove_complex_types {
            owners.push(ElementKind::ComplexType.tag());
        }

        let mut typed: Vec<NodeId> = owners
            .into_iter()
            .flat_map(|owner| self.document.elements_by_tag(owner))
            .flat_map(|owner| self.document.children_by_tag(owner, "Property"))
            .collect();
        typed.extend(
            [ElementKind::Action, ElementKind::Function]
                .into_iter()
                .flat_map(|kind| self.document.elements_by_tag(kind.tag()))
                .flat_map(|operation| self.typed_children(operation)),
        );

        typed
            .into_iter()
            .filter_map(|id| self.document.attribute(id, "Type"))
            .filter_map(|type_ref| self.namespace.strip(unwrap_collection(type_ref)))
            .map(str::to_owned)
            .collect()
    }

    /// Remove enum types nobody references, except the built-in one.
    pub(super) fn prune_enum_types(&mut self, referenced: &FxHashSet<String>) {
        let doomed: Vec<NodeId> = self
            .document
            .elements_by_tag(ElementKind::EnumType.tag())
            .filter(|&id| {
                !self
                    .document
                    .attribute(id, "Name")
                    .is_some_and(|name| name == BUILT_IN_ENUM || referenced.contains(name))
            })
            .collect();
        for id in doomed {
            self.remove(id, ElementKind::EnumType);
        }
    }
}
