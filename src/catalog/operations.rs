//! Operation catalog builder
//!
//! The catalog is an ordered list of additive overlay rules. Each overlay is
//! a (predicate, builder) pair evaluated once per sketch algorithm; later
//! overlays append operations and never replace earlier ones, so the emitted
//! operation order for a given algorithm is fixed across runs.
//!
//! Body and processing fields are plain template text. Names that look like
//! `<argument>_data` refer to the row-local bindings generated by the
//! emitter; `{elem}` is the one placeholder substituted at expansion time.

use crate::catalog::types::{LogicalType, SketchCategory, SketchType};
use crate::error::CatalogError;

/// How an argument's type is bound during expansion
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A concrete native type, independent of the expansion element type
    Fixed { native: &'static str },
    /// Native type is fixed; registration type is a function of the element type
    Derived {
        native: &'static str,
        registration: fn(LogicalType) -> String,
    },
    /// Both types equal the expansion element type
    Generic,
    /// A list over the expansion element type
    ListOfGeneric,
}

/// One parameter of a generated function
#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    pub name: &'static str,
    pub kind: TypeKind,
    /// Staged once before the elementwise pass
    pub pre_process: Option<String>,
    /// Executed inside the per-row callback, before the operation body
    pub process: Option<String>,
}

impl ArgumentDescriptor {
    fn fixed(name: &'static str, native: &'static str) -> Self {
        Self {
            name,
            kind: TypeKind::Fixed { native },
            pre_process: None,
            process: None,
        }
    }

    fn flag(name: &'static str) -> Self {
        Self::fixed(name, "bool")
    }

    fn generic(name: &'static str) -> Self {
        Self {
            name,
            kind: TypeKind::Generic,
            pre_process: None,
            process: None,
        }
    }
}

/// How an operation's return type is bound during expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Fixed(LogicalType),
    Generic,
    DynamicList,
}

/// One callable unit to be generated
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub arguments: Vec<ArgumentDescriptor>,
    /// Body template; placeholders bound by the emitter
    pub body: String,
    pub ret: ReturnKind,
    /// One-line catalog description attached at registration
    pub description: &'static str,
}

impl OperationDescriptor {
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

fn counting_handle_registration(_elem: LogicalType) -> String {
    "sketch_type".to_string()
}

fn typed_handle_registration(elem: LogicalType) -> String {
    format!("sketch_map_types[{}]", elem.id_name())
}

/// The sketch handle: always the first argument, serialized-blob native type,
/// deserialized per row into the underlying structure.
fn sketch_argument(sketch: SketchType) -> ArgumentDescriptor {
    let (registration, process): (fn(LogicalType) -> String, String) =
        if sketch.category() == SketchCategory::Counting {
            (
                counting_handle_registration,
                format!(
                    "auto sketch = {}::deserialize(sketch_data.GetDataUnsafe(), sketch_data.GetSize());",
                    sketch.struct_name()
                ),
            )
        } else {
            (
                typed_handle_registration,
                format!(
                    "auto sketch = {}<{{elem}}>::deserialize(sketch_data.GetDataUnsafe(), sketch_data.GetSize());",
                    sketch.struct_name()
                ),
            )
        };

    ArgumentDescriptor {
        name: "sketch",
        kind: TypeKind::Derived {
            native: "string_t",
            registration,
        },
        pre_process: None,
        process: Some(process),
    }
}

/// Unifies the split-point list vector into flat per-row data, once.
const SPLIT_POINTS_PRE: &str = "\
UnifiedVectorFormat unified_split_points;
split_points_vector.ToUnifiedFormat(args.size(), unified_split_points);

auto &split_points_list_children = ListVector::GetEntry(split_points_vector);

UnifiedVectorFormat split_points_children_unified;
split_points_list_children.ToUnifiedFormat(args.size(), split_points_children_unified);

const {elem} *split_points_list_children_data = UnifiedVectorFormat::GetData<{elem}>(split_points_children_unified);";

/// Materializes a transient native array of split points for one row.
const SPLIT_POINTS_PROCESS: &str = "\
{elem} *passing_points = ({elem} *)duckdb_malloc(sizeof({elem}) * split_points_data.length);
for (idx_t i = 0; i < split_points_data.length; i++)
{
    passing_points[i] = split_points_list_children_data[i + split_points_data.offset];
}";

fn split_points_argument() -> ArgumentDescriptor {
    ArgumentDescriptor {
        name: "split_points",
        kind: TypeKind::ListOfGeneric,
        pre_process: Some(SPLIT_POINTS_PRE.to_string()),
        process: Some(SPLIT_POINTS_PROCESS.to_string()),
    }
}

/// Copies a sketch result vector into the list-typed output column.
const LIST_COPY_TAIL: &str = "\
duckdb_free(passing_points);
auto current_size = ListVector::GetListSize(result);
auto new_size = current_size + {res}.size();
if (ListVector::GetListCapacity(result) < new_size)
{
    ListVector::Reserve(result, new_size);
}

auto &child_entry = ListVector::GetEntry(result);
auto child_vals = FlatVector::GetData<{child}>(child_entry);
for (idx_t i = 0; i < {res}.size(); i++)
{
    child_vals[current_size + i] = {res}[i];
}
ListVector::SetListSize(result, new_size);
return list_entry_t{current_size, {res}.size()};";

fn list_copy_tail(result_name: &str, child_native: &str) -> String {
    LIST_COPY_TAIL
        .replace("{res}", result_name)
        .replace("{child}", child_native)
}

/// cdf/pmf share their argument shape: sketch, split points, and (outside the
/// Digest category) an `inclusive` flag.
fn distribution_operation(
    sketch: SketchType,
    name: &'static str,
    description: &'static str,
    getter: &str,
    result_name: &str,
    child_native: &str,
) -> OperationDescriptor {
    let digest = sketch.category() == SketchCategory::Digest;

    let method = if digest {
        format!("auto {result_name} = sketch.{getter}(passing_points, split_points_data.length);")
    } else {
        format!(
            "auto {result_name} = sketch.{getter}(passing_points, split_points_data.length, inclusive_data);"
        )
    };

    let mut arguments = vec![sketch_argument(sketch), split_points_argument()];
    if !digest {
        arguments.push(ArgumentDescriptor::flag("inclusive"));
    }

    OperationDescriptor {
        name,
        arguments,
        body: format!("{}\n{}", method, list_copy_tail(result_name, child_native)),
        ret: ReturnKind::DynamicList,
        description,
    }
}

fn simple(
    sketch: SketchType,
    name: &'static str,
    description: &'static str,
    body: &str,
    ret: ReturnKind,
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        arguments: vec![sketch_argument(sketch)],
        body: body.to_string(),
        ret,
        description,
    }
}

/// Fixed per-algorithm retention of `normalized_rank_error`. The exclusion is
/// not derivable from any categorical property; it is an explicit table, and
/// a rank-retaining algorithm absent from it is a fatal configuration error.
const RANK_ERROR_RETENTION: &[(SketchType, bool)] = &[
    (SketchType::Quantiles, true),
    (SketchType::Kll, false),
    (SketchType::Req, false),
];

fn rank_error_entry(
    table: &[(SketchType, bool)],
    sketch: SketchType,
) -> Result<bool, CatalogError> {
    table
        .iter()
        .find(|(s, _)| *s == sketch)
        .map(|(_, keep)| *keep)
        .ok_or_else(|| CatalogError::MissingOverlayData {
            sketch: sketch.display_name().to_string(),
            overlay: "normalized_rank_error".to_string(),
        })
}

fn retains_rank_error(sketch: SketchType) -> Result<bool, CatalogError> {
    rank_error_entry(RANK_ERROR_RETENTION, sketch)
}

/// One additive rule in the catalog
struct Overlay {
    applies: fn(SketchType) -> Result<bool, CatalogError>,
    append: fn(SketchType, &mut Vec<OperationDescriptor>),
}

fn always(_: SketchType) -> Result<bool, CatalogError> {
    Ok(true)
}

fn non_counting(s: SketchType) -> Result<bool, CatalogError> {
    Ok(s.category() != SketchCategory::Counting)
}

fn hll_only(s: SketchType) -> Result<bool, CatalogError> {
    Ok(s == SketchType::Hll)
}

fn cpc_only(s: SketchType) -> Result<bool, CatalogError> {
    Ok(s == SketchType::Cpc)
}

fn counting(s: SketchType) -> Result<bool, CatalogError> {
    Ok(s.category() == SketchCategory::Counting)
}

fn digest_only(s: SketchType) -> Result<bool, CatalogError> {
    Ok(s.category() == SketchCategory::Digest)
}

fn rank_error_applies(s: SketchType) -> Result<bool, CatalogError> {
    if s.category() != SketchCategory::RankRetaining {
        return Ok(false);
    }
    retains_rank_error(s)
}

fn rank_retaining(s: SketchType) -> Result<bool, CatalogError> {
    Ok(s.category() == SketchCategory::RankRetaining)
}

fn append_base(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(simple(
        sketch,
        "is_empty",
        "Return a boolean indicating if the sketch is empty",
        "return sketch.is_empty();",
        ReturnKind::Fixed(LogicalType::Boolean),
    ));
}

fn append_quantile_common(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(simple(
        sketch,
        "k",
        "Return the value of K for this sketch",
        "return sketch.get_k();",
        ReturnKind::Fixed(LogicalType::USmallInt),
    ));
    ops.push(distribution_operation(
        sketch,
        "cdf",
        "Return the Cumulative Distribution Function (CDF) of the sketch for a series of points",
        "get_CDF",
        "cdf_result",
        "{elem}",
    ));
    ops.push(distribution_operation(
        sketch,
        "pmf",
        "Return the Probability Mass Function (PMF) of the sketch for a series of points",
        "get_PMF",
        "pmf_result",
        "double",
    ));
}

fn append_hll(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(simple(
        sketch,
        "lg_config_k",
        "Return the value of log base 2 K for this sketch",
        "return sketch.get_lg_config_k();",
        ReturnKind::Fixed(LogicalType::UTinyInt),
    ));
    ops.push(simple(
        sketch,
        "is_compact",
        "Return whether the sketch is in compact form",
        "return sketch.is_compact();",
        ReturnKind::Fixed(LogicalType::Boolean),
    ));
    ops.push(OperationDescriptor {
        name: "describe",
        arguments: vec![
            sketch_argument(sketch),
            ArgumentDescriptor::flag("summary"),
            ArgumentDescriptor::flag("detail"),
        ],
        body: "return StringVector::AddString(result, sketch.to_string(summary_data, detail_data, false, false));"
            .to_string(),
        ret: ReturnKind::Fixed(LogicalType::Varchar),
        description: "Return a description of this sketch",
    });
}

fn append_cpc(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(simple(
        sketch,
        "describe",
        "Return a description of this sketch",
        "return StringVector::AddString(result, sketch.to_string());",
        ReturnKind::Fixed(LogicalType::Varchar),
    ));
}

fn append_counting(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(simple(
        sketch,
        "estimate",
        "Return the estimate of the number of distinct items seen by the sketch",
        "return sketch.get_estimate();",
        ReturnKind::Fixed(LogicalType::Double),
    ));
    for (name, description, body) in [
        (
            "lower_bound",
            "Return the lower bound of the number of distinct items seen by the sketch",
            "return sketch.get_lower_bound(std_dev_data);",
        ),
        (
            "upper_bound",
            "Return the upper bound of the number of distinct items seen by the sketch",
            "return sketch.get_upper_bound(std_dev_data);",
        ),
    ] {
        ops.push(OperationDescriptor {
            name,
            arguments: vec![
                sketch_argument(sketch),
                ArgumentDescriptor::fixed("std_dev", "uint8_t"),
            ],
            body: body.to_string(),
            ret: ReturnKind::Fixed(LogicalType::Double),
            description,
        });
    }
}

fn append_digest(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(OperationDescriptor {
        name: "describe",
        arguments: vec![
            sketch_argument(sketch),
            ArgumentDescriptor::flag("include_centroids"),
        ],
        body: "return StringVector::AddString(result, sketch.to_string(include_centroids_data));"
            .to_string(),
        ret: ReturnKind::Fixed(LogicalType::Varchar),
        description: "Return a description of this sketch",
    });
    ops.push(OperationDescriptor {
        name: "rank",
        arguments: vec![sketch_argument(sketch), ArgumentDescriptor::generic("item")],
        body: "return sketch.get_rank(item_data);".to_string(),
        ret: ReturnKind::Fixed(LogicalType::Double),
        description: "Return the rank of an item in the sketch",
    });
    ops.push(simple(
        sketch,
        "total_weight",
        "Return the total weight of this sketch",
        "return sketch.get_total_weight();",
        ReturnKind::Fixed(LogicalType::UBigInt),
    ));
    ops.push(OperationDescriptor {
        name: "quantile",
        arguments: vec![
            sketch_argument(sketch),
            ArgumentDescriptor::fixed("rank", "double"),
        ],
        body: "return sketch.get_quantile(rank_data);".to_string(),
        ret: ReturnKind::Generic,
        description: "Return the quantile of a rank in the sketch",
    });
}

fn append_rank_error(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(OperationDescriptor {
        name: "normalized_rank_error",
        arguments: vec![sketch_argument(sketch), ArgumentDescriptor::flag("is_pmf")],
        body: "return sketch.get_normalized_rank_error(is_pmf_data);".to_string(),
        ret: ReturnKind::Fixed(LogicalType::Double),
        description: "Return the normalized rank error of the sketch",
    });
}

fn append_rank_retaining(sketch: SketchType, ops: &mut Vec<OperationDescriptor>) {
    ops.push(OperationDescriptor {
        name: "describe",
        arguments: vec![
            sketch_argument(sketch),
            ArgumentDescriptor::flag("include_levels"),
            ArgumentDescriptor::flag("include_items"),
        ],
        body: "return StringVector::AddString(result, sketch.to_string(include_levels_data, include_items_data));"
            .to_string(),
        ret: ReturnKind::Fixed(LogicalType::Varchar),
        description: "Return a description of this sketch",
    });
    ops.push(OperationDescriptor {
        name: "rank",
        arguments: vec![
            sketch_argument(sketch),
            ArgumentDescriptor::generic("item"),
            ArgumentDescriptor::flag("inclusive"),
        ],
        body: "return sketch.get_rank(item_data, inclusive_data);".to_string(),
        ret: ReturnKind::Fixed(LogicalType::Double),
        description: "Return the rank of an item in the sketch",
    });
    ops.push(OperationDescriptor {
        name: "quantile",
        arguments: vec![
            sketch_argument(sketch),
            ArgumentDescriptor::fixed("rank", "double"),
            ArgumentDescriptor::flag("inclusive"),
        ],
        body: "return sketch.get_quantile(rank_data, inclusive_data);".to_string(),
        ret: ReturnKind::Generic,
        description: "Return the quantile of a rank in the sketch",
    });
    ops.push(simple(
        sketch,
        "n",
        "Return the number of items contained in the sketch",
        "return sketch.get_n();",
        ReturnKind::Fixed(LogicalType::UBigInt),
    ));
    ops.push(simple(
        sketch,
        "is_estimation_mode",
        "Return a boolean indicating if the sketch is in estimation mode",
        "return sketch.is_estimation_mode();",
        ReturnKind::Fixed(LogicalType::Boolean),
    ));
    ops.push(simple(
        sketch,
        "num_retained",
        "Return the number of retained items in the sketch",
        "return sketch.get_num_retained();",
        ReturnKind::Fixed(LogicalType::UBigInt),
    ));
    ops.push(simple(
        sketch,
        "min_item",
        "Return the minimum item in the sketch",
        "return sketch.get_min_item();",
        ReturnKind::Generic,
    ));
    ops.push(simple(
        sketch,
        "max_item",
        "Return the maximum item in the sketch",
        "return sketch.get_max_item();",
        ReturnKind::Generic,
    ));
}

/// The authoritative overlay order. Evaluated top to bottom; each matching
/// overlay appends to the operation list.
static OVERLAYS: &[Overlay] = &[
    Overlay {
        applies: always,
        append: append_base,
    },
    Overlay {
        applies: non_counting,
        append: append_quantile_common,
    },
    Overlay {
        applies: hll_only,
        append: append_hll,
    },
    Overlay {
        applies: cpc_only,
        append: append_cpc,
    },
    Overlay {
        applies: counting,
        append: append_counting,
    },
    Overlay {
        applies: digest_only,
        append: append_digest,
    },
    Overlay {
        applies: rank_error_applies,
        append: append_rank_error,
    },
    Overlay {
        applies: rank_retaining,
        append: append_rank_retaining,
    },
];

/// Build the ordered operation list for one sketch algorithm
pub fn operations_for(sketch: SketchType) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let mut ops = Vec::new();
    for overlay in OVERLAYS {
        if (overlay.applies)(sketch)? {
            (overlay.append)(sketch, &mut ops);
        }
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(sketch: SketchType) -> Vec<&'static str> {
        operations_for(sketch)
            .unwrap()
            .iter()
            .map(|op| op.name)
            .collect()
    }

    #[test]
    fn test_hll_operation_set() {
        assert_eq!(
            names(SketchType::Hll),
            vec![
                "is_empty",
                "lg_config_k",
                "is_compact",
                "describe",
                "estimate",
                "lower_bound",
                "upper_bound",
            ]
        );
    }

    #[test]
    fn test_cpc_operation_set() {
        assert_eq!(
            names(SketchType::Cpc),
            vec!["is_empty", "describe", "estimate", "lower_bound", "upper_bound"]
        );
    }

    #[test]
    fn test_tdigest_operation_set() {
        assert_eq!(
            names(SketchType::TDigest),
            vec![
                "is_empty",
                "k",
                "cdf",
                "pmf",
                "describe",
                "rank",
                "total_weight",
                "quantile",
            ]
        );
    }

    #[test]
    fn test_quantiles_retains_normalized_rank_error() {
        assert!(names(SketchType::Quantiles).contains(&"normalized_rank_error"));
    }

    #[test]
    fn test_kll_and_req_exclude_normalized_rank_error() {
        assert!(!names(SketchType::Kll).contains(&"normalized_rank_error"));
        assert!(!names(SketchType::Req).contains(&"normalized_rank_error"));
    }

    #[test]
    fn test_rank_retaining_operation_set() {
        let expected_tail = vec![
            "describe",
            "rank",
            "quantile",
            "n",
            "is_estimation_mode",
            "num_retained",
            "min_item",
            "max_item",
        ];
        let kll = names(SketchType::Kll);
        assert_eq!(&kll[..4], &["is_empty", "k", "cdf", "pmf"]);
        assert_eq!(&kll[4..], &expected_tail[..]);

        let quantiles = names(SketchType::Quantiles);
        assert_eq!(quantiles[4], "normalized_rank_error");
        assert_eq!(&quantiles[5..], &expected_tail[..]);
    }

    #[test]
    fn test_all_arities_have_an_executor() {
        for sketch in SketchType::ALL {
            for op in operations_for(sketch).unwrap() {
                assert!(
                    (1..=3).contains(&op.arity()),
                    "{} {} has arity {}",
                    sketch.display_name(),
                    op.name,
                    op.arity()
                );
            }
        }
    }

    #[test]
    fn test_sketch_handle_is_always_first() {
        for sketch in SketchType::ALL {
            for op in operations_for(sketch).unwrap() {
                assert_eq!(op.arguments[0].name, "sketch");
                assert!(matches!(op.arguments[0].kind, TypeKind::Derived { .. }));
            }
        }
    }

    #[test]
    fn test_digest_cdf_has_no_inclusive_flag() {
        let ops = operations_for(SketchType::TDigest).unwrap();
        let cdf = ops.iter().find(|op| op.name == "cdf").unwrap();
        assert_eq!(cdf.arity(), 2);
        assert!(!cdf.body.contains("inclusive_data"));
    }

    #[test]
    fn test_rank_retaining_cdf_carries_inclusive_flag() {
        let ops = operations_for(SketchType::Kll).unwrap();
        let cdf = ops.iter().find(|op| op.name == "cdf").unwrap();
        assert_eq!(cdf.arity(), 3);
        assert_eq!(cdf.arguments[2].name, "inclusive");
        assert!(cdf.body.contains("inclusive_data"));
    }

    #[test]
    fn test_rank_error_table_covers_all_rank_variants() {
        for sketch in [SketchType::Quantiles, SketchType::Kll, SketchType::Req] {
            retains_rank_error(sketch).unwrap();
        }
    }

    #[test]
    fn test_rank_variant_missing_from_retention_table_is_fatal() {
        let truncated = &RANK_ERROR_RETENTION[..2];
        let err = rank_error_entry(truncated, SketchType::Req).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MissingOverlayData {
                sketch: "req".to_string(),
                overlay: "normalized_rank_error".to_string(),
            }
        );
    }

    #[test]
    fn test_every_operation_carries_a_description() {
        for sketch in SketchType::ALL {
            for op in operations_for(sketch).unwrap() {
                assert!(
                    !op.description.is_empty(),
                    "{} {} has no description",
                    sketch.display_name(),
                    op.name
                );
            }
        }
    }

    #[test]
    fn test_distribution_descriptions_name_the_function_family() {
        let ops = operations_for(SketchType::Kll).unwrap();
        let cdf = ops.iter().find(|op| op.name == "cdf").unwrap();
        assert!(cdf.description.contains("Cumulative Distribution Function"));
        let pmf = ops.iter().find(|op| op.name == "pmf").unwrap();
        assert!(pmf.description.contains("Probability Mass Function"));
    }

    #[test]
    fn test_counting_sketch_handle_registration_is_fixed() {
        let ops = operations_for(SketchType::Hll).unwrap();
        let TypeKind::Derived { registration, .. } = &ops[0].arguments[0].kind else {
            panic!("sketch handle must be a derived binding");
        };
        assert_eq!(registration(LogicalType::Integer), "sketch_type");
        assert_eq!(registration(LogicalType::Double), "sketch_type");
    }

    #[test]
    fn test_typed_sketch_handle_registration_follows_element() {
        let ops = operations_for(SketchType::Kll).unwrap();
        let TypeKind::Derived { registration, .. } = &ops[0].arguments[0].kind else {
            panic!("sketch handle must be a derived binding");
        };
        assert_eq!(
            registration(LogicalType::Integer),
            "sketch_map_types[LogicalTypeId::INTEGER]"
        );
    }
}
