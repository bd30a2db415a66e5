//! Node model for JSON-Schema-shaped documents
//!
//! A [`Schema`] holds its child branches as arena indices, never as owned
//! subtrees. Reference identity of a node therefore is its `Index`: one index
//! reachable through two edges is one shared node (aliasing), two indices with
//! equal field values are two distinct nodes.

use std::collections::BTreeMap;
use std::fmt;

use generational_arena::Index;

/// Conditional single branch: `additionalProperties` / `additionalItems`.
///
/// Three observable states: the field is absent (`None` on [`Schema`]),
/// present but disabled (`allows == false`), or present and enabled with an
/// embedded subschema. Only the enabled form with a schema is traversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalBranch {
    pub allows: bool,
    pub schema: Option<Index>,
}

impl AdditionalBranch {
    /// Plain boolean gate, no embedded subschema.
    pub fn allowed(allows: bool) -> Self {
        Self {
            allows,
            schema: None,
        }
    }

    /// Enabled gate with an embedded subschema.
    pub fn schema(idx: Index) -> Self {
        Self {
            allows: true,
            schema: Some(idx),
        }
    }

    /// The child edge to follow, if any.
    pub fn traversable(&self) -> Option<Index> {
        if self.allows {
            self.schema
        } else {
            None
        }
    }
}

/// Exclusive-variant branch: `items` is either one subschema or an ordered
/// list of subschemas, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    Single(Index),
    List(Vec<Index>),
}

/// One node of the recursive schema document.
///
/// Scalar fields are opaque to the walker and freely mutable by a mutator
/// callback. Branch fields are the edges the walker follows, in the fixed
/// order documented on [`Schema::child_edges`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Type tags (`"object"`, `"string"`, ...); descriptive only.
    pub schema_type: Vec<String>,
    /// Unexpanded `$ref` marker, consumed by the reference expander.
    pub reference: Option<String>,

    // Ordered branches
    pub any_of: Vec<Index>,
    pub all_of: Vec<Index>,
    pub one_of: Vec<Index>,

    // Keyed branches; cross-key iteration order is not a contract
    pub properties: BTreeMap<String, Index>,
    pub pattern_properties: BTreeMap<String, Index>,

    // Conditional single branches
    pub additional_properties: Option<AdditionalBranch>,
    pub additional_items: Option<AdditionalBranch>,

    // Exclusive-variant branch
    pub items: Option<Items>,

    /// Named subschemas addressable via `#/definitions/<name>`.
    /// Resolved by the expander, never traversed by the walker.
    pub definitions: BTreeMap<String, Index>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, schema_type: impl Into<String>) -> Self {
        self.schema_type.push(schema_type.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Collects this node's child edges in traversal order:
    /// `anyOf`, `allOf`, `oneOf`, `properties`, `patternProperties`,
    /// `additionalProperties` (enabled only), `additionalItems` (enabled
    /// only), `items` (single form, else list elements in sequence order).
    pub fn child_edges(&self) -> Vec<Index> {
        let mut edges = Vec::new();
        edges.extend(self.any_of.iter().copied());
        edges.extend(self.all_of.iter().copied());
        edges.extend(self.one_of.iter().copied());
        edges.extend(self.properties.values().copied());
        edges.extend(self.pattern_properties.values().copied());
        if let Some(branch) = &self.additional_properties {
            edges.extend(branch.traversable());
        }
        if let Some(branch) = &self.additional_items {
            edges.extend(branch.traversable());
        }
        match &self.items {
            Some(Items::Single(idx)) => edges.push(*idx),
            Some(Items::List(indices)) => edges.extend(indices.iter().copied()),
            None => {}
        }
        edges
    }

    /// Mutable handles to the same edges as [`Schema::child_edges`], for
    /// in-place rewrites such as reference expansion. `definitions` entries
    /// are not traversal edges and are not included.
    pub fn child_edges_mut(&mut self) -> Vec<&mut Index> {
        let mut edges: Vec<&mut Index> = Vec::new();
        edges.extend(self.any_of.iter_mut());
        edges.extend(self.all_of.iter_mut());
        edges.extend(self.one_of.iter_mut());
        edges.extend(self.properties.values_mut());
        edges.extend(self.pattern_properties.values_mut());
        if let Some(branch) = self.additional_properties.as_mut() {
            edges.extend(branch.schema.as_mut());
        }
        if let Some(branch) = self.additional_items.as_mut() {
            edges.extend(branch.schema.as_mut());
        }
        match self.items.as_mut() {
            Some(Items::Single(idx)) => edges.push(idx),
            Some(Items::List(indices)) => edges.extend(indices.iter_mut()),
            None => {}
        }
        edges
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "schema '{}'", title),
            None => write!(f, "schema <untitled>"),
        }
    }
}
