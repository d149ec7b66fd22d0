//! Operation reachability: actions, functions and their imports.

use rustc_hash::FxHashSet;

use super::{ElementKind, GraphPruner};
use crate::document::NodeId;
use crate::error::TrimError;
use crate::matcher::NamePattern;

/// Child elements of an operation that carry a `Type`.
pub(super) const TYPED_OPERATION_CHILDREN: [&str; 2] = ["Parameter", "ReturnType"];

impl GraphPruner<'_> {
    /// Compile the `actions_to_include` allow-list, if one is configured.
    pub(super) fn compile_action_allow_list(&mut self) -> Result<Option<NamePattern>, TrimError> {
        let options = self.options;
        if options.actions_to_include.is_empty() {
            return Ok(None);
        }
        let pattern = self.patterns.get_or_compile(
            options.actions_to_include.as_slice(),
            options.entities_are_regular_expressions,
        )?;
        Ok(Some(pattern))
    }

    /// Remove operations of `kind` that no longer touch a kept entity type.
    ///
    /// An operation survives when one of its parameters or its return type
    /// references a kept entity type. An `allow_list` replaces that rule:
    /// then exactly the operations whose names match survive. Returns the
    /// names of removed operations that have no surviving overload.
    pub(super) fn prune_operations(
        &mut self,
        kind: ElementKind,
        type_names: &FxHashSet<String>,
        allow_list: Option<&NamePattern>,
    ) -> FxHashSet<String> {
        let mut doomed = Vec::new();
        let mut surviving_names = FxHashSet::default();
        let mut removed_names = FxHashSet::default();
        for id in self.document.elements_by_tag(kind.tag()) {
            let name = self.document.attribute(id, "Name");
            let survives = match allow_list {
                Some(pattern) => name.is_some_and(|n| pattern.matches(n)),
                None => self
                    .typed_children(id)
                    .any(|child| self.references_kept_type(child, type_names)),
            };
            if survives {
                surviving_names.extend(name.map(str::to_owned));
            } else {
                removed_names.extend(name.map(str::to_owned));
                doomed.push(id);
            }
        }

        for id in doomed {
            self.remove(id, kind);
        }
        removed_names.retain(|name| !surviving_names.contains(name));
        removed_names
    }

    /// Remove imports whose operation or entity set was removed.
    ///
    /// `kind` is `ActionImport` or `FunctionImport`; `operation_attribute`
    /// names the attribute holding the qualified operation name.
    pub(super) fn prune_operation_imports(
        &mut self,
        kind: ElementKind,
        operation_attribute: &str,
        removed_operations: &FxHashSet<String>,
        removed_sets: &FxHashSet<String>,
    ) {
        let doomed: Vec<NodeId> = self
            .document
            .elements_by_tag(kind.tag())
            .filter(|&id| {
                let operation_gone = self
                    .document
                    .attribute(id, operation_attribute)
                    .and_then(|operation| self.namespace.strip(operation))
                    .is_some_and(|operation| removed_operations.contains(operation));
                let set_gone = self
                    .document
                    .attribute(id, "EntitySet")
                    .is_some_and(|set| removed_sets.contains(set));
                operation_gone || set_gone
            })
            .collect();
        for id in doomed {
            self.remove(id, kind);
        }
    }

    /// Live `Parameter` and `ReturnType` children of an operation.
    pub(super) fn typed_children(&self, operation: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.document
            .element(operation)
            .children()
            .iter()
            .copied()
            .filter(|&child| {
                let element = self.document.element(child);
                !element.is_removed() && TYPED_OPERATION_CHILDREN.contains(&element.local_name())
            })
    }
}
