//! Declarative catalog of sketch algorithms and their operations
//!
//! The catalog is fixed in code: no external configuration feeds it. It is
//! rebuilt from scratch on every generation run and nothing persists across
//! runs.

mod operations;
mod types;

pub use operations::{
    operations_for, ArgumentDescriptor, OperationDescriptor, ReturnKind, TypeKind,
};
pub use types::{LogicalType, SketchCategory, SketchType};
