//! 変更ログから最小の追加/削除差分を計算

use indexmap::IndexSet;
use shoin_core::{Axiom, OntologyChange};
use std::sync::Arc;

/// Net effect of a change log on the committed axiom set. Both sets hold
/// annotation-stripped axioms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeDiff {
    pub added: IndexSet<Arc<Axiom>>,
    pub removed: IndexSet<Arc<Axiom>>,
}

impl ChangeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Diffs `changes` against `committed`.
///
/// An added axiom counts only when it is not committed yet. Every removed
/// axiom counts, committed or not, and wins over an addition of the same
/// axiom. An uncommitted axiom that is both added and removed within the
/// log is a no-op in either order.
pub fn compute_diff<'a>(
    changes: impl IntoIterator<Item = &'a OntologyChange>,
    committed: &IndexSet<Arc<Axiom>>,
) -> ChangeDiff {
    let mut added = IndexSet::new();
    let mut mentioned_as_added = IndexSet::new();
    let mut removed = IndexSet::new();

    for change in changes {
        let axiom = change.axiom().without_annotations();
        match change {
            OntologyChange::AddAxiom(_) => {
                if !committed.contains(&axiom) {
                    added.insert(Arc::clone(&axiom));
                }
                mentioned_as_added.insert(axiom);
            }
            OntologyChange::RemoveAxiom(_) => {
                removed.insert(axiom);
            }
        }
    }

    added.retain(|axiom| !removed.contains(axiom));
    removed.retain(|axiom| committed.contains(axiom) || !mentioned_as_added.contains(axiom));
    ChangeDiff { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::{AnnotatedAxiom, Annotation, ClassExpression};

    fn subclass(sub: &str, sup: &str) -> Axiom {
        Axiom::SubClassOf(
            ClassExpression::named(format!("http://example.org/{}", sub)),
            ClassExpression::named(format!("http://example.org/{}", sup)),
        )
    }

    fn add(axiom: &Axiom) -> OntologyChange {
        OntologyChange::AddAxiom(AnnotatedAxiom::new(axiom.clone()))
    }

    fn remove(axiom: &Axiom) -> OntologyChange {
        OntologyChange::RemoveAxiom(AnnotatedAxiom::new(axiom.clone()))
    }

    #[test]
    fn test_empty_log_is_empty_diff() {
        let log: Vec<OntologyChange> = Vec::new();
        let diff = compute_diff(&log, &IndexSet::new());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_committed_axiom_is_not_added_again() {
        let cat = subclass("Cat", "Animal");
        let committed: IndexSet<Arc<Axiom>> = [Arc::new(cat.clone())].into_iter().collect();

        let annotated = OntologyChange::AddAxiom(
            AnnotatedAxiom::new(cat).with_annotation(Annotation::new("http://example.org/note", "again")),
        );
        let diff = compute_diff(&[annotated], &committed);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_add_then_remove_cancels_out() {
        let dog = subclass("Dog", "Animal");
        let diff = compute_diff(&[add(&dog), remove(&dog)], &IndexSet::new());
        assert!(diff.is_empty());

        let diff = compute_diff(&[remove(&dog), add(&dog)], &IndexSet::new());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_removal_of_committed_axiom_survives_readd() {
        let cat = subclass("Cat", "Animal");
        let committed: IndexSet<Arc<Axiom>> = [Arc::new(cat.clone())].into_iter().collect();
        let noted = AnnotatedAxiom::new(cat.clone()).with_annotation(Annotation::new("http://example.org/note", "x"));

        let log = [
            OntologyChange::AddAxiom(noted.clone()),
            remove(&cat),
            OntologyChange::RemoveAxiom(noted),
        ];
        let diff = compute_diff(&log, &committed);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert!(diff.removed.contains(&cat));

        let diff = compute_diff(&[add(&cat), remove(&cat)], &committed);
        assert!(diff.removed.contains(&cat));
    }

    #[test]
    fn test_removal_is_by_axiom_identity() {
        let cat = subclass("Cat", "Animal");
        let dog = subclass("Dog", "Animal");
        let committed: IndexSet<Arc<Axiom>> = [Arc::new(cat.clone())].into_iter().collect();

        let annotated_removal = OntologyChange::RemoveAxiom(
            AnnotatedAxiom::new(cat.clone()).with_annotation(Annotation::new("http://example.org/note", "x")),
        );
        let diff = compute_diff(&[annotated_removal, add(&dog)], &committed);
        assert_eq!(diff.added.len(), 1);
        assert!(diff.added.contains(&dog));
        assert_eq!(diff.removed.len(), 1);
        assert!(diff.removed.contains(&cat));
    }
}
