//! Property-based tests for change log diffing.
//!
//! Logs are drawn from a small pool of subclass axioms so that adds and
//! removes of the same axiom collide often.

use indexmap::IndexSet;
use proptest::prelude::*;
use shoin_core::{Axiom, ClassExpression, OntologyChange};
use shoin_reasoner::compute_diff;
use std::collections::BTreeSet;
use std::sync::Arc;

const POOL: usize = 6;

fn axiom(i: usize) -> Axiom {
    let class = |name: String| ClassExpression::named(format!("http://example.org/{}", name));
    Axiom::SubClassOf(class(format!("C{}", i)), class(format!("C{}", i + 1)))
}

fn change_strategy() -> impl Strategy<Value = OntologyChange> {
    (any::<bool>(), 0..POOL).prop_map(|(add, i)| {
        if add {
            OntologyChange::AddAxiom(axiom(i).into())
        } else {
            OntologyChange::RemoveAxiom(axiom(i).into())
        }
    })
}

fn committed_strategy() -> impl Strategy<Value = IndexSet<Arc<Axiom>>> {
    prop::collection::btree_set(0..POOL, 0..POOL)
        .prop_map(|indices| indices.into_iter().map(|i| Arc::new(axiom(i))).collect())
}

fn as_set(axioms: &IndexSet<Arc<Axiom>>) -> BTreeSet<String> {
    axioms.iter().map(|a| format!("{:?}", a)).collect()
}

proptest! {
    /// Additions are never already committed
    #[test]
    fn prop_added_not_committed(
        log in prop::collection::vec(change_strategy(), 0..24),
        committed in committed_strategy(),
    ) {
        let diff = compute_diff(&log, &committed);
        for a in &diff.added {
            prop_assert!(!committed.contains(a));
        }
    }

    /// No axiom is both added and removed
    #[test]
    fn prop_added_and_removed_disjoint(
        log in prop::collection::vec(change_strategy(), 0..24),
        committed in committed_strategy(),
    ) {
        let diff = compute_diff(&log, &committed);
        for a in &diff.added {
            prop_assert!(!diff.removed.contains(a));
        }
    }

    /// Every diff entry is mentioned by the log
    #[test]
    fn prop_diff_only_mentions_logged_axioms(
        log in prop::collection::vec(change_strategy(), 0..24),
        committed in committed_strategy(),
    ) {
        let diff = compute_diff(&log, &committed);
        let mentioned: IndexSet<Arc<Axiom>> = log.iter().map(|c| c.axiom().without_annotations()).collect();
        for a in diff.added.iter().chain(diff.removed.iter()) {
            prop_assert!(mentioned.contains(a));
        }
    }

    /// The diff depends on which changes occur, not their order
    #[test]
    fn prop_diff_ignores_log_order(
        log in prop::collection::vec(change_strategy(), 0..24),
        committed in committed_strategy(),
    ) {
        let forward = compute_diff(&log, &committed);
        let reversed: Vec<OntologyChange> = log.iter().rev().cloned().collect();
        let backward = compute_diff(&reversed, &committed);
        prop_assert_eq!(as_set(&forward.added), as_set(&backward.added));
        prop_assert_eq!(as_set(&forward.removed), as_set(&backward.removed));
    }

    /// A log of additions only, once applied, diffs to nothing
    #[test]
    fn prop_applied_additions_are_idempotent(
        indices in prop::collection::vec(0..POOL, 0..12),
        committed in committed_strategy(),
    ) {
        let log: Vec<OntologyChange> = indices
            .iter()
            .map(|i| OntologyChange::AddAxiom(axiom(*i).into()))
            .collect();
        let diff = compute_diff(&log, &committed);
        let mut applied = committed.clone();
        applied.extend(diff.added.iter().cloned());
        prop_assert!(compute_diff(&log, &applied).is_empty());
    }
}
