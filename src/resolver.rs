//! Argument and return type resolution
//!
//! For a given operation and the element type currently being expanded over,
//! the resolver produces two parallel type lists: the registration types that
//! appear in `ScalarFunction(...)` arguments and the execution types that
//! parameterize the elementwise executor call.

use crate::catalog::{ArgumentDescriptor, LogicalType, OperationDescriptor, ReturnKind, TypeKind};
use crate::error::CatalogError;

/// A single binding resolved against a concrete element type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Registration type text, e.g. `LogicalType::DOUBLE`
    pub registration: String,
    /// Execution (native) type text, e.g. `double`
    pub execution: String,
}

/// The full resolved signature of one (operation, element type) expansion
#[derive(Debug, Clone)]
pub struct ResolvedSignature {
    pub arguments: Vec<ResolvedType>,
    pub ret: ResolvedType,
}

/// Resolve one argument against the expansion element type
pub fn resolve_argument(
    arg: &ArgumentDescriptor,
    elem: LogicalType,
) -> Result<ResolvedType, CatalogError> {
    match &arg.kind {
        TypeKind::Fixed { native } => Ok(ResolvedType {
            registration: LogicalType::from_native(native)?.sql_name().to_string(),
            execution: native.to_string(),
        }),
        TypeKind::Derived {
            native,
            registration,
        } => Ok(ResolvedType {
            registration: registration(elem),
            execution: native.to_string(),
        }),
        TypeKind::Generic => Ok(ResolvedType {
            registration: elem.sql_name().to_string(),
            execution: elem.native().to_string(),
        }),
        TypeKind::ListOfGeneric => Ok(ResolvedType {
            registration: format!("LogicalType::LIST({})", elem.sql_name()),
            execution: "list_entry_t".to_string(),
        }),
    }
}

/// Resolve the return binding against the expansion element type
pub fn resolve_return(ret: ReturnKind, elem: LogicalType) -> ResolvedType {
    match ret {
        ReturnKind::Fixed(lt) => ResolvedType {
            registration: lt.sql_name().to_string(),
            execution: lt.native().to_string(),
        },
        ReturnKind::Generic => ResolvedType {
            registration: elem.sql_name().to_string(),
            execution: elem.native().to_string(),
        },
        ReturnKind::DynamicList => ResolvedType {
            registration: format!("LogicalType::LIST({})", elem.sql_name()),
            execution: "list_entry_t".to_string(),
        },
    }
}

/// Resolve the whole operation signature, argument order preserved
pub fn resolve_signature(
    op: &OperationDescriptor,
    elem: LogicalType,
) -> Result<ResolvedSignature, CatalogError> {
    let arguments = op
        .arguments
        .iter()
        .map(|arg| resolve_argument(arg, elem))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedSignature {
        arguments,
        ret: resolve_return(op.ret, elem),
    })
}
