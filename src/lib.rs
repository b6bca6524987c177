//! sketch-bindgen - generator for the DataSketches function layer
//!
//! This library turns a fixed, in-code catalog of sketch algorithms into the
//! fully type-specialized C++ source of a DuckDB extension's function layer:
//! the scalar functions that query serialized sketches, and the aggregate
//! functions that create and merge them. Hand-writing one function per
//! (algorithm, operation, element type) combination would mean hundreds of
//! near-duplicate definitions; the catalog plus expansion rules here produce
//! all of them deterministically.
//!
//! # Example
//!
//! ```rust
//! use sketch_bindgen::generate;
//!
//! let source = generate().unwrap();
//! assert!(source.contains("LoadSketchFunctions"));
//! ```

pub mod catalog;
pub mod config;
pub mod emitter;
pub mod error;
pub mod payload;
pub mod render;
pub mod resolver;

pub use catalog::{operations_for, LogicalType, OperationDescriptor, SketchCategory, SketchType};
pub use config::{ConfigError, GeneratorConfig};
pub use emitter::{invocation_block, registration_args, Executor};
pub use error::CatalogError;
pub use payload::{build_payload, GenerationPayload};
pub use render::render_source;

use thiserror::Error;

/// Errors that can occur during the generation pipeline
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Error while building the catalog or emitting fragments
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error while loading configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Generate the full source file with default naming
///
/// This is the main entry point for the library. It traverses the catalog,
/// resolves and emits every (sketch, operation, element type) expansion, and
/// renders one complete translation unit. Generation either succeeds fully
/// or fails with no output; there is no partial result.
pub fn generate() -> Result<String, GenerateError> {
    generate_with_config(&GeneratorConfig::default())
}

/// Generate the full source file with custom naming configuration
pub fn generate_with_config(config: &GeneratorConfig) -> Result<String, GenerateError> {
    let payload = build_payload()?;
    Ok(render_source(&payload, config))
}
