//! Property-based tests for the datatype hierarchy.
//!
//! Chains and trees are generated as parent indices, so every generated
//! schema is acyclic by construction.

use proptest::prelude::*;
use shoin_datatypes::{DatatypeDeclaration, DatatypeError, DatatypeModel, Ordered};

fn uri(i: usize) -> String {
    format!("http://example.org/dt#T{}", i)
}

/// Node 0 is a root; node i > 0 restricts one of the nodes before it
fn tree(parents: &[usize]) -> Vec<DatatypeDeclaration> {
    let mut declarations = vec![DatatypeDeclaration::new(uri(0))];
    for (i, parent) in parents.iter().enumerate() {
        let child = i + 1;
        declarations.push(DatatypeDeclaration::new(uri(child)).with_base(uri(parent % child)));
    }
    declarations
}

// =============================================================================
// Subtype Relation
// =============================================================================

proptest! {
    /// isSubtypeOf(X, X) for every declared X
    #[test]
    fn prop_subtype_reflexive(parents in prop::collection::vec(0usize..64, 0..24)) {
        let model = DatatypeModel::build(&tree(&parents)).unwrap();
        for i in 0..=parents.len() {
            prop_assert!(model.is_subtype_of(&uri(i), &uri(i)));
        }
    }

    /// isSubtypeOf(A, B) and isSubtypeOf(B, C) imply isSubtypeOf(A, C)
    #[test]
    fn prop_subtype_transitive(parents in prop::collection::vec(0usize..64, 1..16)) {
        let model = DatatypeModel::build(&tree(&parents)).unwrap();
        let n = parents.len() + 1;
        for a in 0..n {
            for b in 0..n {
                for c in 0..n {
                    if model.is_subtype_of(&uri(a), &uri(b)) && model.is_subtype_of(&uri(b), &uri(c)) {
                        prop_assert!(
                            model.is_subtype_of(&uri(a), &uri(c)),
                            "T{} <= T{} <= T{} but not T{} <= T{}", a, b, c, a, c
                        );
                    }
                }
            }
        }
    }

    /// Compatibility is symmetric outside the numeric rules too
    #[test]
    fn prop_compatibility_symmetric(parents in prop::collection::vec(0usize..64, 1..16)) {
        let model = DatatypeModel::build(&tree(&parents)).unwrap();
        let n = parents.len() + 1;
        for a in 0..n {
            for b in 0..n {
                prop_assert_eq!(
                    model.is_compatible(&uri(a), &uri(b)),
                    model.is_compatible(&uri(b), &uri(a))
                );
            }
        }
    }
}

// =============================================================================
// Property Inheritance
// =============================================================================

#[test]
fn test_numeric_override_inherits_down_the_chain() {
    let model = DatatypeModel::build(&[
        DatatypeDeclaration::new("http://example.org/dt#root"),
        DatatypeDeclaration::new("http://example.org/dt#mid")
            .with_base("http://example.org/dt#root")
            .with_property("numeric", "true"),
        DatatypeDeclaration::new("http://example.org/dt#leaf").with_base("http://example.org/dt#mid"),
    ])
    .unwrap();

    let leaf = "http://example.org/dt#leaf";
    assert!(model.numeric(leaf), "leaf inherits numeric from mid");
    assert_eq!(model.ordered(leaf), model.ordered("http://example.org/dt#root"));
    assert_eq!(model.ordered(leaf), Ordered::False);
    assert!(!model.numeric("http://example.org/dt#root"));
}

#[test]
fn test_facet_values_prefer_nearest_override() {
    let model = DatatypeModel::build(&[
        DatatypeDeclaration::new("http://example.org/dt#code")
            .with_facet("maxLength")
            .with_facet_value("maxLength", "8"),
        DatatypeDeclaration::new("http://example.org/dt#shortCode")
            .with_base("http://example.org/dt#code")
            .with_facet("pattern")
            .with_facet_value("maxLength", "4"),
    ])
    .unwrap();

    let short = "http://example.org/dt#shortCode";
    assert_eq!(model.facets(short).len(), 2, "explicit facets are unioned with inherited ones");
    assert_eq!(
        model.facet_value(short, shoin_datatypes::Facet::MaxLength),
        Some("4")
    );
    assert_eq!(
        model.facet_value(short, shoin_datatypes::Facet::Pattern),
        None
    );
}

#[test]
fn test_self_restriction_is_a_cycle() {
    let result = DatatypeModel::build(&[
        DatatypeDeclaration::new("http://example.org/dt#loop").with_base("http://example.org/dt#loop"),
    ]);
    assert!(matches!(result, Err(DatatypeError::CyclicRestriction(_))));
}

#[test]
fn test_schema_json_loading() -> anyhow::Result<()> {
    let model = DatatypeModel::from_json_str(
        r#"[
            {"name": "http://example.org/dt#age", "base": "xs:anySimpleType",
             "properties": {"numeric": "true", "ordered": "total"},
             "facet_values": {"minInclusive": "0", "maxInclusive": "150"}}
        ]"#,
    )?;
    assert!(model.numeric("http://example.org/dt#age"));
    assert!(model.is_in_value_space("http://example.org/dt#age", "42"));
    assert!(!model.is_in_value_space("http://example.org/dt#age", "200"));
    Ok(())
}
