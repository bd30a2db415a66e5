//! rswalk: depth-first traversal of recursive, JSON-Schema-shaped documents
//!
//! Documents live in an arena ([`SchemaArena`]); the arena `Index` of a node
//! is its reference identity, so the same index reachable through two edges
//! is one shared node and two equal-looking nodes at different indices stay
//! distinct. The [`Walker`] visits every reachable node strictly post-order
//! and applies a caller-supplied [`Mutator`] in place. A node reachable as
//! its own still-open ancestor is a back-edge: it is skipped, logged as a
//! [`CycleEvent`], and traversal continues. Aliasing without a back-edge is
//! walked once per path.
//!
//! The codec, the `$ref` expander and the equivalence checker are plain
//! collaborator functions around the walker; the walker itself never calls
//! them.
//!
//! ```
//! use rswalk::{codec, Schema, Walker};
//!
//! let mut doc = codec::read_schema(r#"{"properties": {"foo": {"title": "x"}}}"#).unwrap();
//! let mut visited = Vec::new();
//! let mut walker = Walker::new();
//! walker
//!     .depth_first(&mut doc, &mut |s: &mut Schema| {
//!         visited.push(s.title.clone());
//!         s.description = Some("seen".to_string());
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(visited.len(), 2, "leaf before its parent");
//! ```

pub mod codec;
pub mod document;
pub mod equiv;
pub mod errors;
pub mod expand;
pub mod schema;
mod tracker;
pub mod util;
pub mod walker;

pub use codec::{read_schema, write_schema, write_schema_pretty};
pub use document::SchemaArena;
pub use equiv::schemas_are_equivalent;
pub use errors::{DocumentError, DocumentResult, WalkError, WalkResult};
pub use expand::expand_references;
pub use schema::{AdditionalBranch, Items, Schema};
pub use walker::{CycleEvent, Mutator, Walker};
