//! Schema namespace and alias resolution.
//!
//! EDMX type references are qualified, either with the schema namespace
//! (`Microsoft.Dynamics.DataEntities.CustomerV3`) or with its alias
//! (`mscrm.account`), and may be wrapped as `Collection(...)`. The pruner
//! compares bare names, so every reference goes through this module.

use crate::document::Document;
use crate::error::TrimError;

/// Namespace and optional alias of the first `Schema` in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaNamespace {
    namespace: String,
    alias: Option<String>,
}

impl SchemaNamespace {
    /// Build from explicit values. A blank alias means no alias.
    pub fn new(namespace: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            namespace: namespace.into().trim().to_owned(),
            alias: alias
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_owned),
        }
    }

    /// Read the namespace and alias from the first `Schema` element.
    pub fn resolve(document: &Document) -> Result<Self, TrimError> {
        let schema = document
            .elements_by_tag("Schema")
            .next()
            .ok_or(TrimError::MissingElement("Schema"))?;
        let namespace = document.required_attribute(schema, "Namespace")?;
        let resolved = Self::new(namespace, document.attribute(schema, "Alias"));
        tracing::debug!(
            "Schema namespace {} (alias {:?})",
            resolved.namespace,
            resolved.alias
        );
        Ok(resolved)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Prefixes a local reference may carry, alias first.
    fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.alias
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.namespace.as_str()))
    }

    /// Strip the alias or namespace prefix from a qualified name.
    ///
    /// Returns `None` for names from other schemas (`Edm.String`, ...).
    pub fn strip<'a>(&self, qualified: &'a str) -> Option<&'a str> {
        self.prefixes().find_map(|prefix| {
            qualified
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
        })
    }

    /// The bare name a type reference points at, if it is local.
    ///
    /// A reference names `Foo` when it ends with `<alias>.Foo` or
    /// `<namespace>.Foo`, optionally followed by one `)`. This accepts both
    /// `Namespace.Foo` and `Collection(Namespace.Foo)`.
    pub fn referenced_name<'a>(&self, type_ref: &'a str) -> Option<&'a str> {
        let unwrapped = type_ref.strip_suffix(')').unwrap_or(type_ref);
        let (qualifier, bare) = unwrapped.rsplit_once('.')?;
        if bare.is_empty() {
            return None;
        }
        self.prefixes()
            .any(|prefix| qualifier.ends_with(prefix))
            .then_some(bare)
    }

    /// Whether an annotation target lies inside this schema.
    pub fn is_local_target(&self, target: &str) -> bool {
        target.starts_with(self.namespace.as_str())
            || self.alias.as_deref().is_some_and(|alias| {
                target
                    .strip_prefix(alias)
                    .is_some_and(|rest| rest.starts_with('.'))
            })
    }
}

/// Remove a `Collection(...)` wrapper, if present.
pub fn unwrap_collection(type_ref: &str) -> &str {
    type_ref
        .strip_prefix("Collection(")
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(type_ref)
}
