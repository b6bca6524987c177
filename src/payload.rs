//! Generation payload assembly
//!
//! The driver walks the cross product of sketch algorithms, their operations,
//! and their allowed element types, collecting every emitted fragment into
//! one serializable payload. The payload is the boundary handed to the
//! rendering layer: it is write-once and assembled fully before any output
//! is produced, so a failure anywhere leaves nothing behind.

use serde::Serialize;

use crate::catalog::{operations_for, LogicalType, SketchType};
use crate::emitter::{invocation_block, registration_args};
use crate::error::CatalogError;

/// One (operation, element type) expansion
#[derive(Debug, Clone, Serialize)]
pub struct VariantPayload {
    pub element_type: LogicalType,
    pub registration_args: String,
    pub invocation_block: String,
}

/// One operation, expanded over every allowed element type
#[derive(Debug, Clone, Serialize)]
pub struct FunctionPayload {
    pub name: &'static str,
    pub arity: usize,
    pub argument_names: Vec<&'static str>,
    pub description: &'static str,
    pub variants: Vec<VariantPayload>,
}

/// One sketch algorithm with its full generated surface
#[derive(Debug, Clone, Serialize)]
pub struct SketchPayload {
    pub sketch: SketchType,
    pub display_name: &'static str,
    pub struct_name: &'static str,
    pub allowed_types: Vec<LogicalType>,
    pub functions: Vec<FunctionPayload>,
}

/// The complete payload for one generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPayload {
    pub sketches: Vec<SketchPayload>,
}

/// Build the full payload by traversing the fixed catalog in declaration order
pub fn build_payload() -> Result<GenerationPayload, CatalogError> {
    let mut sketches = Vec::with_capacity(SketchType::ALL.len());

    for sketch in SketchType::ALL {
        let mut functions = Vec::new();

        for op in operations_for(sketch)? {
            let mut variants = Vec::with_capacity(sketch.allowed_types().len());
            for elem in sketch.allowed_types() {
                variants.push(VariantPayload {
                    element_type: *elem,
                    registration_args: registration_args(&op, *elem)?,
                    invocation_block: invocation_block(&op, *elem)?,
                });
            }

            functions.push(FunctionPayload {
                name: op.name,
                arity: op.arity(),
                argument_names: op.arguments.iter().map(|a| a.name).collect(),
                description: op.description,
                variants,
            });
        }

        sketches.push(SketchPayload {
            sketch,
            display_name: sketch.display_name(),
            struct_name: sketch.struct_name(),
            allowed_types: sketch.allowed_types().to_vec(),
            functions,
        });
    }

    Ok(GenerationPayload { sketches })
}
