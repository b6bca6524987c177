//! Error types for catalog construction and emission
//!
//! Every error here is fatal: generation stops before any output is written,
//! so a broken catalog can never produce a partially valid source file.

use thiserror::Error;

/// Errors raised while building the catalog or emitting call sites
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A native type outside the fixed enumeration was referenced
    #[error("unknown native type: {native} has no logical type mapping")]
    UnknownType { native: String },

    /// An operation declared an argument count with no execution strategy
    #[error("unsupported arity {arity} for operation {operation}: no executor exists")]
    UnsupportedArity { operation: String, arity: usize },

    /// An overlay step required per-algorithm data the algorithm does not define
    #[error("missing overlay data for sketch {sketch} in overlay '{overlay}'")]
    MissingOverlayData { sketch: String, overlay: String },
}
