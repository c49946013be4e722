//! Property-based tests for the expression space and the structural kernel.

use proptest::prelude::*;
use shoin_core::Iri;
use shoin_kernel::{AxiomBody, ExprId, ExpressionManager, KernelOracle, StructuralKernel, TaxonomyActor};

#[derive(Default)]
struct Collect(Vec<Vec<ExprId>>);

impl TaxonomyActor for Collect {
    fn apply(&mut self, vertex: &[ExprId], _em: &ExpressionManager) -> bool {
        self.0.push(vertex.to_vec());
        true
    }
}

fn concept(kernel: &mut StructuralKernel, i: usize) -> ExprId {
    kernel
        .expression_manager_mut()
        .concept(Iri::new(format!("http://example.org/C{}", i)))
}

// =============================================================================
// Expression Space
// =============================================================================

proptest! {
    /// Conjunction is interned independently of operand order and repetition
    #[test]
    fn prop_and_is_canonical(names in prop::collection::vec(0usize..6, 1..8)) {
        let mut em = ExpressionManager::new();
        let ids: Vec<ExprId> = names
            .iter()
            .map(|i| em.concept(Iri::new(format!("http://example.org/C{}", i))))
            .collect();
        let forward = em.and(ids.clone());
        let mut reversed = ids.clone();
        reversed.reverse();
        reversed.extend(ids.iter().copied());
        prop_assert_eq!(forward, em.and(reversed));
    }

    /// Double negation collapses to the same handle
    #[test]
    fn prop_double_negation(i in 0usize..16) {
        let mut em = ExpressionManager::new();
        let c = em.concept(Iri::new(format!("http://example.org/C{}", i)));
        let not = em.not(c);
        prop_assert_eq!(em.not(not), c);
    }
}

// =============================================================================
// Told Hierarchy
// =============================================================================

proptest! {
    /// C_i below C_j along a told chain exactly when i <= j
    #[test]
    fn prop_chain_subsumption(len in 1usize..10) {
        let mut kernel = StructuralKernel::new().unwrap();
        let ids: Vec<ExprId> = (0..=len).map(|i| concept(&mut kernel, i)).collect();
        for pair in ids.windows(2) {
            kernel.load_axiom(AxiomBody::ConceptInclusion { sub: pair[0], sup: pair[1] }).unwrap();
        }
        for (i, a) in ids.iter().enumerate() {
            for (j, b) in ids.iter().enumerate() {
                prop_assert_eq!(kernel.is_subsumed_by(*a, *b).unwrap(), i <= j, "C{} <= C{}", i, j);
            }
        }
    }

    /// Sub-concept queries never report the queried concept's own vertex
    #[test]
    fn prop_subs_exclude_self(edges in prop::collection::vec((0usize..6, 0usize..6), 0..12)) {
        let mut kernel = StructuralKernel::new().unwrap();
        let ids: Vec<ExprId> = (0..6).map(|i| concept(&mut kernel, i)).collect();
        for (a, b) in edges.iter().filter(|(a, b)| a != b) {
            kernel.load_axiom(AxiomBody::ConceptInclusion { sub: ids[*a], sup: ids[*b] }).unwrap();
        }
        prop_assert!(kernel.is_consistent().unwrap());

        for id in &ids {
            let mut subs = Collect::default();
            kernel.sub_concepts(*id, false, &mut subs).unwrap();
            for vertex in subs.0 {
                prop_assert!(!vertex.contains(id));
            }
        }
    }
}
