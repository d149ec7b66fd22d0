//! Strips that remove whole element kinds regardless of reachability.

use super::{ElementKind, GraphPruner};
use crate::document::NodeId;

impl GraphPruner<'_> {
    /// Apply the `remove_*` options.
    pub(super) fn strip_flat(&mut self) {
        let options = self.options;
        if options.remove_primary_annotations {
            self.strip_primary_annotations();
        }
        if options.remove_action_imports {
            self.remove_all(ElementKind::ActionImport);
        }
        if options.remove_function_imports {
            self.remove_all(ElementKind::FunctionImport);
        }
        if options.remove_complex_types {
            self.remove_all(ElementKind::ComplexType);
        }
    }

    /// Remove `Annotations` blocks of the schema that target its own
    /// namespace. Inline annotations and external targets stay.
    fn strip_primary_annotations(&mut self) {
        let doomed: Vec<NodeId> = self
            .document
            .elements_by_tag(ElementKind::Annotations.tag())
            .filter(|&id| {
                let in_schema = self
                    .document
                    .parent(id)
                    .is_some_and(|parent| self.document.element(parent).local_name() == "Schema");
                in_schema
                    && self
                        .document
                        .attribute(id, "Target")
                        .is_some_and(|target| self.namespace.is_local_target(target))
            })
            .collect();
        for id in doomed {
            self.remove(id, ElementKind::Annotations);
        }
    }
}
