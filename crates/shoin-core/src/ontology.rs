//! OWL オントロジー (ホスト側) と変更レコード

use crate::axiom::AnnotatedAxiom;
use crate::model::{Entity, Iri};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A raw change record, as the host ontology emits it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OntologyChange {
    AddAxiom(AnnotatedAxiom),
    RemoveAxiom(AnnotatedAxiom),
}

impl OntologyChange {
    pub fn is_add_axiom(&self) -> bool {
        matches!(self, OntologyChange::AddAxiom(_))
    }

    pub fn is_remove_axiom(&self) -> bool {
        matches!(self, OntologyChange::RemoveAxiom(_))
    }

    pub fn axiom(&self) -> &AnnotatedAxiom {
        match self {
            OntologyChange::AddAxiom(axiom) | OntologyChange::RemoveAxiom(axiom) => axiom,
        }
    }
}

/// Host ontology: the axiom occurrences a reasoner is built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ontology {
    /// Ontology IRI
    pub iri: Option<Iri>,

    /// All axiom occurrences, in insertion order
    axioms: IndexSet<AnnotatedAxiom>,
}

impl Ontology {
    pub fn new() -> Self {
        Self {
            iri: None,
            axioms: IndexSet::new(),
        }
    }

    pub fn with_iri(iri: Iri) -> Self {
        Self {
            iri: Some(iri),
            axioms: IndexSet::new(),
        }
    }

    /// Adds an axiom occurrence; returns the change record, or `None` if the
    /// exact occurrence (annotations included) was already present
    pub fn add_axiom(&mut self, axiom: impl Into<AnnotatedAxiom>) -> Option<OntologyChange> {
        let axiom = axiom.into();
        if self.axioms.insert(axiom.clone()) {
            Some(OntologyChange::AddAxiom(axiom))
        } else {
            None
        }
    }

    pub fn remove_axiom(&mut self, axiom: &AnnotatedAxiom) -> Option<OntologyChange> {
        if self.axioms.shift_remove(axiom) {
            Some(OntologyChange::RemoveAxiom(axiom.clone()))
        } else {
            None
        }
    }

    pub fn axioms(&self) -> impl Iterator<Item = &AnnotatedAxiom> {
        self.axioms.iter()
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    /// All entities mentioned by any axiom
    pub fn signature(&self) -> BTreeSet<Entity> {
        self.axioms
            .iter()
            .flat_map(|axiom| axiom.axiom().signature())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::{Annotation, Axiom};
    use crate::model::ClassExpression;

    #[test]
    fn test_add_and_remove_emit_change_records() {
        let mut ontology = Ontology::new();
        let axiom = AnnotatedAxiom::new(Axiom::SubClassOf(
            ClassExpression::named("http://example.org/Cat"),
            ClassExpression::named("http://example.org/Animal"),
        ));

        let added = ontology.add_axiom(axiom.clone());
        assert!(matches!(added, Some(OntologyChange::AddAxiom(_))));
        assert!(ontology.add_axiom(axiom.clone()).is_none());

        // same logical axiom, different annotations: a distinct occurrence
        let annotated = axiom.clone().with_annotation(Annotation::new("http://example.org/note", "x"));
        assert!(ontology.add_axiom(annotated).is_some());
        assert_eq!(ontology.len(), 2);

        let removed = ontology.remove_axiom(&axiom);
        assert!(removed.map(|c| c.is_remove_axiom()).unwrap_or(false));
        assert_eq!(ontology.len(), 1);
        assert_eq!(ontology.signature().len(), 2);
    }
}
