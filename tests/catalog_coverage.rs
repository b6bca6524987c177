//! Catalog-wide property tests
//!
//! These enumerate the full catalog and assert the inclusion table, arity
//! bounds, and type-filter invariants that every generation run depends on.

use sketch_bindgen::{
    build_payload, operations_for, LogicalType, SketchCategory, SketchType,
};

fn operation_names(sketch: SketchType) -> Vec<&'static str> {
    operations_for(sketch)
        .expect("catalog should build")
        .iter()
        .map(|op| op.name)
        .collect()
}

#[test]
fn hll_matches_inclusion_table() {
    assert_eq!(
        operation_names(SketchType::Hll),
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
fn cpc_matches_inclusion_table() {
    assert_eq!(
        operation_names(SketchType::Cpc),
        vec!["is_empty", "describe", "estimate", "lower_bound", "upper_bound"]
    );
}

#[test]
fn tdigest_matches_inclusion_table() {
    assert_eq!(
        operation_names(SketchType::TDigest),
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
fn quantiles_matches_inclusion_table() {
    assert_eq!(
        operation_names(SketchType::Quantiles),
        vec![
            "is_empty",
            "k",
            "cdf",
            "pmf",
            "normalized_rank_error",
            "describe",
            "rank",
            "quantile",
            "n",
            "is_estimation_mode",
            "num_retained",
            "min_item",
            "max_item",
        ]
    );
}

#[test]
fn kll_and_req_match_inclusion_table() {
    let expected = vec![
        "is_empty",
        "k",
        "cdf",
        "pmf",
        "describe",
        "rank",
        "quantile",
        "n",
        "is_estimation_mode",
        "num_retained",
        "min_item",
        "max_item",
    ];
    assert_eq!(operation_names(SketchType::Kll), expected);
    assert_eq!(operation_names(SketchType::Req), expected);
}

#[test]
fn every_operation_has_a_supported_arity() {
    for sketch in SketchType::ALL {
        for op in operations_for(sketch).expect("catalog should build") {
            assert!(
                (1..=3).contains(&op.arity()),
                "{}::{} declares arity {}",
                sketch.display_name(),
                op.name,
                op.arity()
            );
        }
    }
}

#[test]
fn expansion_never_leaves_the_allowed_type_set() {
    let payload = build_payload().expect("payload should build");
    for sketch in &payload.sketches {
        let allowed = sketch.sketch.allowed_types();
        for function in &sketch.functions {
            for variant in &function.variants {
                assert!(
                    allowed.contains(&variant.element_type),
                    "{}::{} expanded over {:?}, which is outside its category",
                    sketch.display_name,
                    function.name,
                    variant.element_type
                );
            }
        }
    }
}

#[test]
fn digest_expansion_is_floating_point_only() {
    let payload = build_payload().expect("payload should build");
    let tdigest = payload
        .sketches
        .iter()
        .find(|s| s.sketch == SketchType::TDigest)
        .unwrap();
    for function in &tdigest.functions {
        for variant in &function.variants {
            assert!(matches!(
                variant.element_type,
                LogicalType::Float | LogicalType::Double
            ));
        }
    }
}

#[test]
fn representation_mapping_round_trips() {
    for lt in LogicalType::ALL {
        let native = lt.native();
        let back = LogicalType::from_native(native).expect("known native");
        if lt == LogicalType::Blob {
            // Blob shares Varchar's representation by design
            assert_eq!(back, LogicalType::Varchar);
        } else {
            assert_eq!(back, lt);
        }
    }
}

#[test]
fn category_determines_allowed_types() {
    for sketch in SketchType::ALL {
        match sketch.category() {
            SketchCategory::Counting => {
                assert_eq!(sketch.allowed_types().len(), 12);
                assert!(sketch.allowed_types().contains(&LogicalType::Blob));
            }
            SketchCategory::RankRetaining => {
                assert_eq!(sketch.allowed_types().len(), 11);
                assert!(!sketch.allowed_types().contains(&LogicalType::Blob));
            }
            SketchCategory::Digest => {
                assert_eq!(sketch.allowed_types().len(), 2);
            }
        }
        assert!(!sketch.allowed_types().contains(&LogicalType::Boolean));
    }
}
