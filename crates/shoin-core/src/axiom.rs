//! OWL 公理 (注釈付き公理を含む)

use crate::model::{
    ClassExpression, DataProperty, DataRange, Entity, Individual, Iri, Literal,
    ObjectPropertyExpression,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// OWL axiom, compared structurally. Annotations live on [`AnnotatedAxiom`],
/// never here, so two axioms differing only in annotations are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axiom {
    /// Declaration(E)
    Declaration(Entity),

    /// SubClassOf(C1 C2)
    SubClassOf(ClassExpression, ClassExpression),

    /// EquivalentClasses(C1 ... Cn)
    EquivalentClasses(Vec<ClassExpression>),

    /// DisjointClasses(C1 ... Cn)
    DisjointClasses(Vec<ClassExpression>),

    /// SubObjectPropertyOf(P1 P2)
    SubObjectPropertyOf(ObjectPropertyExpression, ObjectPropertyExpression),

    /// EquivalentObjectProperties(P1 ... Pn)
    EquivalentObjectProperties(Vec<ObjectPropertyExpression>),

    /// DisjointObjectProperties(P1 ... Pn)
    DisjointObjectProperties(Vec<ObjectPropertyExpression>),

    /// InverseObjectProperties(P Q)
    InverseObjectProperties(ObjectPropertyExpression, ObjectPropertyExpression),

    /// ObjectPropertyDomain(P C)
    ObjectPropertyDomain(ObjectPropertyExpression, ClassExpression),

    /// ObjectPropertyRange(P C)
    ObjectPropertyRange(ObjectPropertyExpression, ClassExpression),

    /// FunctionalObjectProperty(P)
    FunctionalObjectProperty(ObjectPropertyExpression),

    /// InverseFunctionalObjectProperty(P)
    InverseFunctionalObjectProperty(ObjectPropertyExpression),

    /// TransitiveObjectProperty(P)
    TransitiveObjectProperty(ObjectPropertyExpression),

    /// SymmetricObjectProperty(P)
    SymmetricObjectProperty(ObjectPropertyExpression),

    /// SubDataPropertyOf(D1 D2)
    SubDataPropertyOf(DataProperty, DataProperty),

    /// EquivalentDataProperties(D1 ... Dn)
    EquivalentDataProperties(Vec<DataProperty>),

    /// DisjointDataProperties(D1 ... Dn)
    DisjointDataProperties(Vec<DataProperty>),

    /// DataPropertyDomain(D C)
    DataPropertyDomain(DataProperty, ClassExpression),

    /// DataPropertyRange(D R)
    DataPropertyRange(DataProperty, DataRange),

    /// FunctionalDataProperty(D)
    FunctionalDataProperty(DataProperty),

    /// ClassAssertion(C i)
    ClassAssertion(ClassExpression, Individual),

    /// ObjectPropertyAssertion(P i1 i2)
    ObjectPropertyAssertion(ObjectPropertyExpression, Individual, Individual),

    /// NegativeObjectPropertyAssertion(P i1 i2)
    NegativeObjectPropertyAssertion(ObjectPropertyExpression, Individual, Individual),

    /// DataPropertyAssertion(D i v)
    DataPropertyAssertion(DataProperty, Individual, Literal),

    /// NegativeDataPropertyAssertion(D i v)
    NegativeDataPropertyAssertion(DataProperty, Individual, Literal),

    /// SameIndividual(i1 ... in)
    SameIndividual(Vec<Individual>),

    /// DifferentIndividuals(i1 ... in)
    DifferentIndividuals(Vec<Individual>),

    /// SWRL rule, kept opaque (body and head atoms as written)
    Rule { body: Vec<String>, head: Vec<String> },
}

/// Axiom kinds, used for the entailment support matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AxiomType {
    Declaration,
    SubClassOf,
    EquivalentClasses,
    DisjointClasses,
    SubObjectPropertyOf,
    EquivalentObjectProperties,
    DisjointObjectProperties,
    InverseObjectProperties,
    ObjectPropertyDomain,
    ObjectPropertyRange,
    FunctionalObjectProperty,
    InverseFunctionalObjectProperty,
    TransitiveObjectProperty,
    SymmetricObjectProperty,
    SubDataPropertyOf,
    EquivalentDataProperties,
    DisjointDataProperties,
    DataPropertyDomain,
    DataPropertyRange,
    FunctionalDataProperty,
    ClassAssertion,
    ObjectPropertyAssertion,
    NegativeObjectPropertyAssertion,
    DataPropertyAssertion,
    NegativeDataPropertyAssertion,
    SameIndividual,
    DifferentIndividuals,
    SwrlRule,
}

impl std::fmt::Display for AxiomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Axiom {
    pub fn axiom_type(&self) -> AxiomType {
        match self {
            Axiom::Declaration(_) => AxiomType::Declaration,
            Axiom::SubClassOf(..) => AxiomType::SubClassOf,
            Axiom::EquivalentClasses(_) => AxiomType::EquivalentClasses,
            Axiom::DisjointClasses(_) => AxiomType::DisjointClasses,
            Axiom::SubObjectPropertyOf(..) => AxiomType::SubObjectPropertyOf,
            Axiom::EquivalentObjectProperties(_) => AxiomType::EquivalentObjectProperties,
            Axiom::DisjointObjectProperties(_) => AxiomType::DisjointObjectProperties,
            Axiom::InverseObjectProperties(..) => AxiomType::InverseObjectProperties,
            Axiom::ObjectPropertyDomain(..) => AxiomType::ObjectPropertyDomain,
            Axiom::ObjectPropertyRange(..) => AxiomType::ObjectPropertyRange,
            Axiom::FunctionalObjectProperty(_) => AxiomType::FunctionalObjectProperty,
            Axiom::InverseFunctionalObjectProperty(_) => AxiomType::InverseFunctionalObjectProperty,
            Axiom::TransitiveObjectProperty(_) => AxiomType::TransitiveObjectProperty,
            Axiom::SymmetricObjectProperty(_) => AxiomType::SymmetricObjectProperty,
            Axiom::SubDataPropertyOf(..) => AxiomType::SubDataPropertyOf,
            Axiom::EquivalentDataProperties(_) => AxiomType::EquivalentDataProperties,
            Axiom::DisjointDataProperties(_) => AxiomType::DisjointDataProperties,
            Axiom::DataPropertyDomain(..) => AxiomType::DataPropertyDomain,
            Axiom::DataPropertyRange(..) => AxiomType::DataPropertyRange,
            Axiom::FunctionalDataProperty(_) => AxiomType::FunctionalDataProperty,
            Axiom::ClassAssertion(..) => AxiomType::ClassAssertion,
            Axiom::ObjectPropertyAssertion(..) => AxiomType::ObjectPropertyAssertion,
            Axiom::NegativeObjectPropertyAssertion(..) => AxiomType::NegativeObjectPropertyAssertion,
            Axiom::DataPropertyAssertion(..) => AxiomType::DataPropertyAssertion,
            Axiom::NegativeDataPropertyAssertion(..) => AxiomType::NegativeDataPropertyAssertion,
            Axiom::SameIndividual(_) => AxiomType::SameIndividual,
            Axiom::DifferentIndividuals(_) => AxiomType::DifferentIndividuals,
            Axiom::Rule { .. } => AxiomType::SwrlRule,
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, Axiom::Declaration(_))
    }

    /// Named entities mentioned by the axiom
    pub fn signature(&self) -> BTreeSet<Entity> {
        let mut signature = BTreeSet::new();

        match self {
            Axiom::Declaration(entity) => {
                signature.insert(entity.clone());
            }
            Axiom::SubClassOf(ce1, ce2) => {
                ce1.collect_signature(&mut signature);
                ce2.collect_signature(&mut signature);
            }
            Axiom::EquivalentClasses(expressions) | Axiom::DisjointClasses(expressions) => {
                for expr in expressions {
                    expr.collect_signature(&mut signature);
                }
            }
            Axiom::SubObjectPropertyOf(pe1, pe2) | Axiom::InverseObjectProperties(pe1, pe2) => {
                signature.insert(pe1.entity());
                signature.insert(pe2.entity());
            }
            Axiom::EquivalentObjectProperties(expressions)
            | Axiom::DisjointObjectProperties(expressions) => {
                signature.extend(expressions.iter().map(ObjectPropertyExpression::entity));
            }
            Axiom::ObjectPropertyDomain(pe, ce) | Axiom::ObjectPropertyRange(pe, ce) => {
                signature.insert(pe.entity());
                ce.collect_signature(&mut signature);
            }
            Axiom::FunctionalObjectProperty(pe)
            | Axiom::InverseFunctionalObjectProperty(pe)
            | Axiom::TransitiveObjectProperty(pe)
            | Axiom::SymmetricObjectProperty(pe) => {
                signature.insert(pe.entity());
            }
            Axiom::SubDataPropertyOf(dp1, dp2) => {
                signature.insert(dp1.entity());
                signature.insert(dp2.entity());
            }
            Axiom::EquivalentDataProperties(properties)
            | Axiom::DisjointDataProperties(properties) => {
                signature.extend(properties.iter().map(DataProperty::entity));
            }
            Axiom::DataPropertyDomain(dp, ce) => {
                signature.insert(dp.entity());
                ce.collect_signature(&mut signature);
            }
            Axiom::DataPropertyRange(dp, _) | Axiom::FunctionalDataProperty(dp) => {
                signature.insert(dp.entity());
            }
            Axiom::ClassAssertion(ce, i) => {
                ce.collect_signature(&mut signature);
                signature.insert(i.entity());
            }
            Axiom::ObjectPropertyAssertion(pe, i1, i2)
            | Axiom::NegativeObjectPropertyAssertion(pe, i1, i2) => {
                signature.insert(pe.entity());
                signature.insert(i1.entity());
                signature.insert(i2.entity());
            }
            Axiom::DataPropertyAssertion(dp, i, _) | Axiom::NegativeDataPropertyAssertion(dp, i, _) => {
                signature.insert(dp.entity());
                signature.insert(i.entity());
            }
            Axiom::SameIndividual(individuals) | Axiom::DifferentIndividuals(individuals) => {
                signature.extend(individuals.iter().map(Individual::entity));
            }
            Axiom::Rule { .. } => {}
        }

        signature
    }
}

/// Annotation attached to an axiom occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub property: Iri,
    pub value: String,
}

impl Annotation {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: Iri::new(property),
            value: value.into(),
        }
    }
}

/// An axiom occurrence as the host ontology stores it. The logical axiom is
/// shared by reference; annotations ride alongside and do not take part in
/// axiom identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotatedAxiom {
    axiom: Arc<Axiom>,
    annotations: Vec<Annotation>,
}

impl AnnotatedAxiom {
    pub fn new(axiom: Axiom) -> Self {
        Self {
            axiom: Arc::new(axiom),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn axiom(&self) -> &Axiom {
        &self.axiom
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The annotation-stripped axiom, shared with every other occurrence
    pub fn without_annotations(&self) -> Arc<Axiom> {
        Arc::clone(&self.axiom)
    }
}

impl From<Axiom> for AnnotatedAxiom {
    fn from(axiom: Axiom) -> Self {
        AnnotatedAxiom::new(axiom)
    }
}

impl From<Arc<Axiom>> for AnnotatedAxiom {
    fn from(axiom: Arc<Axiom>) -> Self {
        Self {
            axiom,
            annotations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Class;

    fn cat_subclass_of_animal() -> Axiom {
        Axiom::SubClassOf(
            ClassExpression::named("http://example.org/Cat"),
            ClassExpression::named("http://example.org/Animal"),
        )
    }

    #[test]
    fn test_annotations_do_not_affect_axiom_identity() {
        let plain = AnnotatedAxiom::new(cat_subclass_of_animal());
        let annotated = AnnotatedAxiom::new(cat_subclass_of_animal())
            .with_annotation(Annotation::new("http://www.w3.org/2000/01/rdf-schema#comment", "cats"));

        assert_ne!(plain, annotated);
        assert_eq!(plain.without_annotations(), annotated.without_annotations());
    }

    #[test]
    fn test_signature_includes_builtins_used() {
        let axiom = Axiom::SubClassOf(ClassExpression::named("http://example.org/Cat"), ClassExpression::Thing);
        let signature = axiom.signature();
        assert!(signature.contains(&Class::Thing.entity()));
        assert!(signature.contains(&Class::named("http://example.org/Cat").entity()));
    }

    #[test]
    fn test_rule_has_empty_signature() {
        let rule = Axiom::Rule {
            body: vec!["Person(?x)".to_string()],
            head: vec!["Agent(?x)".to_string()],
        };
        assert!(rule.signature().is_empty());
        assert_eq!(rule.axiom_type(), AxiomType::SwrlRule);
    }
}
