//! Logical type registry and sketch algorithm identifiers
//!
//! The registry is a fixed bidirectional mapping between abstract element
//! types and their native DuckDB representations, plus per-category filters
//! that decide which element types a sketch algorithm is expanded over.
//! Iteration order of the allowed-type slices is part of the contract:
//! downstream emission walks them in declaration order so repeated runs
//! produce byte-identical output.

use serde::Serialize;

use crate::error::CatalogError;

/// An abstract scalar element type recognized by the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    Float,
    Double,
    Varchar,
    Blob,
}

impl LogicalType {
    /// All logical types, in registration order
    pub const ALL: [LogicalType; 13] = [
        LogicalType::Boolean,
        LogicalType::TinyInt,
        LogicalType::SmallInt,
        LogicalType::Integer,
        LogicalType::BigInt,
        LogicalType::Float,
        LogicalType::Double,
        LogicalType::UTinyInt,
        LogicalType::USmallInt,
        LogicalType::UInteger,
        LogicalType::UBigInt,
        LogicalType::Varchar,
        LogicalType::Blob,
    ];

    /// The `LogicalType::X` spelling used in registration text
    pub fn sql_name(&self) -> &'static str {
        match self {
            LogicalType::Boolean => "LogicalType::BOOLEAN",
            LogicalType::TinyInt => "LogicalType::TINYINT",
            LogicalType::SmallInt => "LogicalType::SMALLINT",
            LogicalType::Integer => "LogicalType::INTEGER",
            LogicalType::BigInt => "LogicalType::BIGINT",
            LogicalType::UTinyInt => "LogicalType::UTINYINT",
            LogicalType::USmallInt => "LogicalType::USMALLINT",
            LogicalType::UInteger => "LogicalType::UINTEGER",
            LogicalType::UBigInt => "LogicalType::UBIGINT",
            LogicalType::Float => "LogicalType::FLOAT",
            LogicalType::Double => "LogicalType::DOUBLE",
            LogicalType::Varchar => "LogicalType::VARCHAR",
            LogicalType::Blob => "LogicalType::BLOB",
        }
    }

    /// The `LogicalTypeId::X` spelling used for type-keyed lookups
    pub fn id_name(&self) -> &'static str {
        match self {
            LogicalType::Boolean => "LogicalTypeId::BOOLEAN",
            LogicalType::TinyInt => "LogicalTypeId::TINYINT",
            LogicalType::SmallInt => "LogicalTypeId::SMALLINT",
            LogicalType::Integer => "LogicalTypeId::INTEGER",
            LogicalType::BigInt => "LogicalTypeId::BIGINT",
            LogicalType::UTinyInt => "LogicalTypeId::UTINYINT",
            LogicalType::USmallInt => "LogicalTypeId::USMALLINT",
            LogicalType::UInteger => "LogicalTypeId::UINTEGER",
            LogicalType::UBigInt => "LogicalTypeId::UBIGINT",
            LogicalType::Float => "LogicalTypeId::FLOAT",
            LogicalType::Double => "LogicalTypeId::DOUBLE",
            LogicalType::Varchar => "LogicalTypeId::VARCHAR",
            LogicalType::Blob => "LogicalTypeId::BLOB",
        }
    }

    /// The concrete native representation used in execution text
    pub fn native(&self) -> &'static str {
        match self {
            LogicalType::Boolean => "bool",
            LogicalType::TinyInt => "int8_t",
            LogicalType::SmallInt => "int16_t",
            LogicalType::Integer => "int32_t",
            LogicalType::BigInt => "int64_t",
            LogicalType::UTinyInt => "uint8_t",
            LogicalType::USmallInt => "uint16_t",
            LogicalType::UInteger => "uint32_t",
            LogicalType::UBigInt => "uint64_t",
            LogicalType::Float => "float",
            LogicalType::Double => "double",
            // Varchar and Blob intentionally share a representation;
            // the inverse mapping resolves string_t to Varchar.
            LogicalType::Varchar => "string_t",
            LogicalType::Blob => "string_t",
        }
    }

    /// Lowercase suffix used in generated identifiers
    pub fn suffix(&self) -> &'static str {
        match self {
            LogicalType::Boolean => "boolean",
            LogicalType::TinyInt => "tinyint",
            LogicalType::SmallInt => "smallint",
            LogicalType::Integer => "integer",
            LogicalType::BigInt => "bigint",
            LogicalType::UTinyInt => "utinyint",
            LogicalType::USmallInt => "usmallint",
            LogicalType::UInteger => "uinteger",
            LogicalType::UBigInt => "ubigint",
            LogicalType::Float => "float",
            LogicalType::Double => "double",
            LogicalType::Varchar => "varchar",
            LogicalType::Blob => "blob",
        }
    }

    /// Inverse of [`LogicalType::native`]
    ///
    /// `string_t` resolves to Varchar. Natives outside the fixed enumeration
    /// are a fatal configuration error.
    pub fn from_native(native: &str) -> Result<LogicalType, CatalogError> {
        match native {
            "bool" => Ok(LogicalType::Boolean),
            "int8_t" => Ok(LogicalType::TinyInt),
            "int16_t" => Ok(LogicalType::SmallInt),
            "int32_t" => Ok(LogicalType::Integer),
            "int64_t" => Ok(LogicalType::BigInt),
            "uint8_t" => Ok(LogicalType::UTinyInt),
            "uint16_t" => Ok(LogicalType::USmallInt),
            "uint32_t" => Ok(LogicalType::UInteger),
            "uint64_t" => Ok(LogicalType::UBigInt),
            "float" => Ok(LogicalType::Float),
            "double" => Ok(LogicalType::Double),
            "string_t" => Ok(LogicalType::Varchar),
            other => Err(CatalogError::UnknownType {
                native: other.to_string(),
            }),
        }
    }
}

/// The behavioral family a sketch algorithm belongs to
///
/// Category is fixed per [`SketchType`] and drives both the allowed element
/// types and the applicable operation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SketchCategory {
    /// Cardinality estimation; the sketch handle is the only generic-ish argument
    Counting,
    /// Keeps representative items, generic over the element type
    RankRetaining,
    /// Rank/quantile estimation restricted to floating-point element types
    Digest,
}

/// One of the six supported sketch algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SketchType {
    Quantiles,
    Kll,
    Req,
    TDigest,
    Hll,
    Cpc,
}

const NUMERIC_TYPES: [LogicalType; 10] = [
    LogicalType::TinyInt,
    LogicalType::SmallInt,
    LogicalType::Integer,
    LogicalType::BigInt,
    LogicalType::Float,
    LogicalType::Double,
    LogicalType::UTinyInt,
    LogicalType::USmallInt,
    LogicalType::UInteger,
    LogicalType::UBigInt,
];

const COUNTING_TYPES: [LogicalType; 12] = [
    LogicalType::TinyInt,
    LogicalType::SmallInt,
    LogicalType::Integer,
    LogicalType::BigInt,
    LogicalType::Float,
    LogicalType::Double,
    LogicalType::UTinyInt,
    LogicalType::USmallInt,
    LogicalType::UInteger,
    LogicalType::UBigInt,
    LogicalType::Varchar,
    LogicalType::Blob,
];

const RANK_TYPES: [LogicalType; 11] = [
    LogicalType::TinyInt,
    LogicalType::SmallInt,
    LogicalType::Integer,
    LogicalType::BigInt,
    LogicalType::Float,
    LogicalType::Double,
    LogicalType::UTinyInt,
    LogicalType::USmallInt,
    LogicalType::UInteger,
    LogicalType::UBigInt,
    LogicalType::Varchar,
];

const DIGEST_TYPES: [LogicalType; 2] = [LogicalType::Float, LogicalType::Double];

impl SketchType {
    /// All sketch algorithms, in generation order
    pub const ALL: [SketchType; 6] = [
        SketchType::Quantiles,
        SketchType::Kll,
        SketchType::Req,
        SketchType::TDigest,
        SketchType::Hll,
        SketchType::Cpc,
    ];

    /// The category this algorithm belongs to
    pub fn category(&self) -> SketchCategory {
        match self {
            SketchType::Quantiles | SketchType::Kll | SketchType::Req => {
                SketchCategory::RankRetaining
            }
            SketchType::TDigest => SketchCategory::Digest,
            SketchType::Hll | SketchType::Cpc => SketchCategory::Counting,
        }
    }

    /// Display name used in SQL-facing function names and identifiers
    pub fn display_name(&self) -> &'static str {
        match self {
            SketchType::Quantiles => "quantiles",
            SketchType::Kll => "kll",
            SketchType::Req => "req",
            SketchType::TDigest => "tdigest",
            SketchType::Hll => "hll",
            SketchType::Cpc => "cpc",
        }
    }

    /// CamelCase name used in generated C++ identifiers
    pub fn cpp_name(&self) -> &'static str {
        match self {
            SketchType::Quantiles => "Quantiles",
            SketchType::Kll => "KLL",
            SketchType::Req => "REQ",
            SketchType::TDigest => "TDigest",
            SketchType::Hll => "HLL",
            SketchType::Cpc => "CPC",
        }
    }

    /// The underlying DataSketches structure this algorithm wraps
    pub fn struct_name(&self) -> &'static str {
        match self {
            SketchType::Quantiles => "datasketches::quantiles_sketch",
            SketchType::Kll => "datasketches::kll_sketch",
            SketchType::Req => "datasketches::req_sketch",
            SketchType::TDigest => "datasketches::tdigest",
            SketchType::Hll => "datasketches::hll_sketch",
            SketchType::Cpc => "datasketches::cpc_sketch",
        }
    }

    /// Native type of the K parameter the underlying constructor accepts
    pub fn k_native(&self) -> &'static str {
        match self {
            SketchType::Quantiles | SketchType::Kll | SketchType::Req => "int32_t",
            SketchType::TDigest | SketchType::Hll => "uint16_t",
            SketchType::Cpc => "uint8_t",
        }
    }

    /// Element types this algorithm is expanded over, in emission order
    pub fn allowed_types(&self) -> &'static [LogicalType] {
        match self.category() {
            SketchCategory::Counting => &COUNTING_TYPES,
            SketchCategory::RankRetaining => &RANK_TYPES,
            SketchCategory::Digest => &DIGEST_TYPES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_round_trip() {
        for lt in LogicalType::ALL {
            if lt == LogicalType::Blob {
                continue; // Blob aliases Varchar's representation
            }
            assert_eq!(LogicalType::from_native(lt.native()).unwrap(), lt);
        }
    }

    #[test]
    fn test_blob_aliases_varchar_representation() {
        assert_eq!(LogicalType::Blob.native(), LogicalType::Varchar.native());
        assert_eq!(
            LogicalType::from_native(LogicalType::Blob.native()).unwrap(),
            LogicalType::Varchar
        );
    }

    #[test]
    fn test_unknown_native_is_error() {
        let err = LogicalType::from_native("list_entry_t").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownType { .. }));
    }

    #[test]
    fn test_no_shared_representations_outside_alias() {
        let natives: Vec<&str> = LogicalType::ALL
            .iter()
            .filter(|lt| **lt != LogicalType::Blob)
            .map(|lt| lt.native())
            .collect();
        let mut deduped = natives.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), natives.len());
    }

    #[test]
    fn test_counting_allows_varchar_and_blob() {
        let types = SketchType::Hll.allowed_types();
        assert!(types.contains(&LogicalType::Varchar));
        assert!(types.contains(&LogicalType::Blob));
        assert!(!types.contains(&LogicalType::Boolean));
    }

    #[test]
    fn test_digest_allows_only_floats() {
        assert_eq!(
            SketchType::TDigest.allowed_types(),
            &[LogicalType::Float, LogicalType::Double]
        );
    }

    #[test]
    fn test_rank_retaining_excludes_blob() {
        for sketch in [SketchType::Quantiles, SketchType::Kll, SketchType::Req] {
            let types = sketch.allowed_types();
            assert!(types.contains(&LogicalType::Varchar));
            assert!(!types.contains(&LogicalType::Blob));
            assert!(!types.contains(&LogicalType::Boolean));
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(SketchType::Quantiles.category(), SketchCategory::RankRetaining);
        assert_eq!(SketchType::Kll.category(), SketchCategory::RankRetaining);
        assert_eq!(SketchType::Req.category(), SketchCategory::RankRetaining);
        assert_eq!(SketchType::TDigest.category(), SketchCategory::Digest);
        assert_eq!(SketchType::Hll.category(), SketchCategory::Counting);
        assert_eq!(SketchType::Cpc.category(), SketchCategory::Counting);
    }

    #[test]
    fn test_k_parameter_widths() {
        assert_eq!(SketchType::Quantiles.k_native(), "int32_t");
        assert_eq!(SketchType::TDigest.k_native(), "uint16_t");
        assert_eq!(SketchType::Hll.k_native(), "uint16_t");
        assert_eq!(SketchType::Cpc.k_native(), "uint8_t");
    }

    #[test]
    fn test_struct_names() {
        assert_eq!(SketchType::TDigest.struct_name(), "datasketches::tdigest");
        assert_eq!(
            SketchType::Quantiles.struct_name(),
            "datasketches::quantiles_sketch"
        );
    }
}
