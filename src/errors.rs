//! Error types for traversal and document handling

use generational_arena::Index;
use thiserror::Error;

/// Errors raised during a depth-first traversal.
///
/// `CycleDetected` is an internal signal: the walker recovers it locally and
/// records the event, it never surfaces as the result of `depth_first`.
/// Every other variant is fatal and aborts the traversal at the point of
/// failure.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("depth-first walk called on a document without a root schema")]
    NilRoot,

    #[error("cycle detected: open ancestor re-entered at depth {depth}")]
    CycleDetected { depth: i64 },

    #[error("schema node {0:?} is not stored in this document")]
    NodeNotFound(Index),

    #[error("mutator failed: {0}")]
    Mutator(String),
}

pub type WalkResult<T> = Result<T, WalkError>;

/// Errors raised by the codec and the reference expander.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no root schema")]
    EmptyDocument,

    #[error("dangling edge to removed node {0:?}")]
    DanglingEdge(Index),

    #[error("unsupported reference format: {0}")]
    UnsupportedReference(String),

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("reference chain never reaches a concrete schema: {0}")]
    ReferenceLoop(String),
}

pub type DocumentResult<T> = Result<T, DocumentError>;
