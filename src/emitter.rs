//! Call-site emission
//!
//! For one (operation, element type) expansion the emitter produces the two
//! text fragments the renderer needs: the registration-argument list and the
//! executable invocation block. The execution strategy is purely a function
//! of argument count; any arity without a strategy is a fatal error raised
//! here, never silently truncated.

use crate::catalog::{LogicalType, OperationDescriptor};
use crate::error::CatalogError;
use crate::resolver::resolve_signature;

/// The elementwise execution strategy, selected by argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    Unary,
    Binary,
    Ternary,
}

impl Executor {
    /// Select the strategy for an operation's arity
    pub fn for_operation(op: &OperationDescriptor) -> Result<Executor, CatalogError> {
        match op.arity() {
            1 => Ok(Executor::Unary),
            2 => Ok(Executor::Binary),
            3 => Ok(Executor::Ternary),
            arity => Err(CatalogError::UnsupportedArity {
                operation: op.name.to_string(),
                arity,
            }),
        }
    }

    /// The host engine executor this strategy invokes
    pub fn name(&self) -> &'static str {
        match self {
            Executor::Unary => "UnaryExecutor",
            Executor::Binary => "BinaryExecutor",
            Executor::Ternary => "TernaryExecutor",
        }
    }
}

/// Substitute named placeholders in a body/processing template
fn bind(template: &str, elem: LogicalType) -> String {
    template.replace("{elem}", elem.native())
}

/// Registration-argument text: each argument's registration type in declared
/// order, braced, followed by the return registration type.
pub fn registration_args(
    op: &OperationDescriptor,
    elem: LogicalType,
) -> Result<String, CatalogError> {
    let sig = resolve_signature(op, elem)?;
    let args = sig
        .arguments
        .iter()
        .map(|arg| arg.registration.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("{{{}}}, {}", args, sig.ret.registration))
}

/// The executable invocation block: staged pre-processing, the executor call
/// parameterized over the full execution type tuple, and the per-row callback.
pub fn invocation_block(
    op: &OperationDescriptor,
    elem: LogicalType,
) -> Result<String, CatalogError> {
    let executor = Executor::for_operation(op)?;
    let sig = resolve_signature(op, elem)?;

    let mut out = String::new();

    for arg in &op.arguments {
        if let Some(pre) = &arg.pre_process {
            out.push_str(&bind(pre, elem));
            out.push_str("\n\n");
        }
    }

    let mut exec_types: Vec<&str> = sig
        .arguments
        .iter()
        .map(|arg| arg.execution.as_str())
        .collect();
    exec_types.push(sig.ret.execution.as_str());

    let mut exec_args: Vec<String> = op
        .arguments
        .iter()
        .map(|arg| format!("{}_vector", arg.name))
        .collect();
    exec_args.push("result".to_string());
    exec_args.push("args.size()".to_string());

    let lambda_params = op
        .arguments
        .iter()
        .zip(&sig.arguments)
        .map(|(arg, resolved)| format!("{} {}_data", resolved.execution, arg.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lambda_body = String::new();
    for arg in &op.arguments {
        if let Some(process) = &arg.process {
            lambda_body.push_str(&bind(process, elem));
            lambda_body.push('\n');
        }
    }
    lambda_body.push_str(&bind(&op.body, elem));

    out.push_str(&format!(
        "{}::Execute<{}>(\n    {},\n    [&]({}) {{\n{}\n    }});",
        executor.name(),
        exec_types.join(", "),
        exec_args.join(", "),
        lambda_params,
        indent(&lambda_body, 8)
    ));

    Ok(out)
}

/// Indent every non-empty line of a fragment by `width` spaces
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{operations_for, ReturnKind, SketchType};

    fn operation(sketch: SketchType, name: &str) -> OperationDescriptor {
        operations_for(sketch)
            .unwrap()
            .into_iter()
            .find(|op| op.name == name)
            .unwrap()
    }

    #[test]
    fn test_executor_selection_by_arity() {
        assert_eq!(
            Executor::for_operation(&operation(SketchType::Hll, "is_empty")).unwrap(),
            Executor::Unary
        );
        assert_eq!(
            Executor::for_operation(&operation(SketchType::Hll, "lower_bound")).unwrap(),
            Executor::Binary
        );
        assert_eq!(
            Executor::for_operation(&operation(SketchType::Kll, "cdf")).unwrap(),
            Executor::Ternary
        );
    }

    #[test]
    fn test_unsupported_arity_is_fatal() {
        let op = OperationDescriptor {
            name: "broken",
            arguments: vec![],
            body: String::new(),
            ret: ReturnKind::Fixed(LogicalType::Boolean),
            description: "",
        };
        let err = Executor::for_operation(&op).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnsupportedArity {
                operation: "broken".to_string(),
                arity: 0,
            }
        );
    }

    #[test]
    fn test_hll_estimate_registration_args() {
        let op = operation(SketchType::Hll, "estimate");
        let args = registration_args(&op, LogicalType::Integer).unwrap();
        assert_eq!(args, "{sketch_type}, LogicalType::DOUBLE");
    }

    #[test]
    fn test_hll_estimate_invocation_block() {
        let op = operation(SketchType::Hll, "estimate");
        let block = invocation_block(&op, LogicalType::Integer).unwrap();
        assert!(block.contains("UnaryExecutor::Execute<string_t, double>("));
        assert!(block.contains("return sketch.get_estimate();"));
        // Counting sketches deserialize without an element type parameter
        assert!(block.contains("datasketches::hll_sketch::deserialize"));
        assert!(!block.contains("UnifiedVectorFormat"));
    }

    #[test]
    fn test_tdigest_cdf_is_binary_with_preprocessing() {
        let op = operation(SketchType::TDigest, "cdf");
        let args = registration_args(&op, LogicalType::Double).unwrap();
        assert_eq!(
            args,
            "{sketch_map_types[LogicalTypeId::DOUBLE], LogicalType::LIST(LogicalType::DOUBLE)}, \
             LogicalType::LIST(LogicalType::DOUBLE)"
        );

        let block = invocation_block(&op, LogicalType::Double).unwrap();
        assert_eq!(block.matches("UnifiedVectorFormat unified_split_points").count(), 1);
        assert!(block.contains("BinaryExecutor::Execute<string_t, list_entry_t, list_entry_t>("));
        assert!(block.contains("double *passing_points"));
        assert!(block.contains("sketch.get_CDF(passing_points, split_points_data.length);"));
        // Pre-processing is staged before the executor call
        assert!(
            block.find("unified_split_points").unwrap()
                < block.find("BinaryExecutor").unwrap()
        );
    }

    #[test]
    fn test_kll_cdf_is_ternary_with_inclusive() {
        let op = operation(SketchType::Kll, "cdf");
        let block = invocation_block(&op, LogicalType::Integer).unwrap();
        assert!(block.contains(
            "TernaryExecutor::Execute<string_t, list_entry_t, bool, list_entry_t>("
        ));
        assert!(block.contains("bool inclusive_data"));
        assert!(block.contains(
            "sketch.get_CDF(passing_points, split_points_data.length, inclusive_data);"
        ));
        assert!(block.contains("int32_t *passing_points"));
    }

    #[test]
    fn test_generic_deserialize_binds_element_type() {
        let op = operation(SketchType::Quantiles, "is_empty");
        let block = invocation_block(&op, LogicalType::Float).unwrap();
        assert!(block.contains("datasketches::quantiles_sketch<float>::deserialize"));
    }

    #[test]
    fn test_vector_references_in_declared_order() {
        let op = operation(SketchType::Kll, "cdf");
        let block = invocation_block(&op, LogicalType::Double).unwrap();
        assert!(block.contains("sketch_vector, split_points_vector, inclusive_vector, result, args.size()"));
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 4), "    a\n\n    b");
    }
}
