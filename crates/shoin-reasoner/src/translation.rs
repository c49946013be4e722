//! ホストモデルとカーネル式ハンドルの相互変換

use shoin_core::vocabulary;
use shoin_core::{
    Axiom, Class, ClassExpression, DataProperty, DataRange, Entity, Individual, Iri, Literal,
    ObjectPropertyExpression,
};
use shoin_kernel::{AxiomBody, Expr, ExprId, ExpressionManager};

/// Host-to-kernel translation. Interns into the oracle's expression space.
pub(crate) struct Translator<'a> {
    em: &'a mut ExpressionManager,
}

impl<'a> Translator<'a> {
    pub fn new(em: &'a mut ExpressionManager) -> Self {
        Self { em }
    }

    pub fn class(&mut self, ce: &ClassExpression) -> ExprId {
        match ce {
            ClassExpression::Named(iri) => match Class::from_iri(iri.clone()) {
                Class::Thing => ExprId::TOP,
                Class::Nothing => ExprId::BOTTOM,
                Class::Named(iri) => self.em.concept(iri),
            },
            ClassExpression::Thing => ExprId::TOP,
            ClassExpression::Nothing => ExprId::BOTTOM,
            ClassExpression::IntersectionOf(items) => {
                let items = items.iter().map(|c| self.class(c)).collect();
                self.em.and(items)
            }
            ClassExpression::UnionOf(items) => {
                let items = items.iter().map(|c| self.class(c)).collect();
                self.em.or(items)
            }
            ClassExpression::ComplementOf(inner) => {
                let inner = self.class(inner);
                self.em.not(inner)
            }
            ClassExpression::OneOf(individuals) => {
                let individuals = individuals.iter().map(|i| self.individual(i)).collect();
                self.em.one_of(individuals)
            }
            ClassExpression::SomeValuesFrom { property, class } => {
                let role = self.object_property(property);
                let filler = self.class(class);
                self.em.some(role, filler)
            }
            ClassExpression::AllValuesFrom { property, class } => {
                let role = self.object_property(property);
                let filler = self.class(class);
                self.em.all(role, filler)
            }
            ClassExpression::HasValue { property, individual } => {
                let role = self.object_property(property);
                let individual = self.individual(individual);
                self.em.has_value(role, individual)
            }
            ClassExpression::MinCardinality { cardinality, property, class } => {
                let role = self.object_property(property);
                let filler = self.filler(class.as_deref());
                self.em.min(*cardinality, role, filler)
            }
            ClassExpression::MaxCardinality { cardinality, property, class } => {
                let role = self.object_property(property);
                let filler = self.filler(class.as_deref());
                self.em.max(*cardinality, role, filler)
            }
            ClassExpression::ExactCardinality { cardinality, property, class } => {
                let role = self.object_property(property);
                let filler = self.filler(class.as_deref());
                self.em.exact(*cardinality, role, filler)
            }
            ClassExpression::DataSomeValuesFrom { property, range } => {
                let role = self.data_property(property);
                let range = self.data_range(range);
                self.em.data_some(role, range)
            }
            ClassExpression::DataAllValuesFrom { property, range } => {
                let role = self.data_property(property);
                let range = self.data_range(range);
                self.em.data_all(role, range)
            }
            ClassExpression::DataHasValue { property, value } => {
                let role = self.data_property(property);
                let value = self.literal(value);
                self.em.data_has_value(role, value)
            }
        }
    }

    fn filler(&mut self, class: Option<&ClassExpression>) -> ExprId {
        class.map(|c| self.class(c)).unwrap_or(ExprId::TOP)
    }

    pub fn object_property(&mut self, pe: &ObjectPropertyExpression) -> ExprId {
        let named = match pe.named_property().as_str() {
            vocabulary::OWL_TOP_OBJECT_PROPERTY => ExprId::TOP_OBJECT_ROLE,
            vocabulary::OWL_BOTTOM_OBJECT_PROPERTY => ExprId::BOTTOM_OBJECT_ROLE,
            _ => self.em.object_role(pe.named_property().clone()),
        };
        if pe.is_anonymous() {
            self.em.inverse(named)
        } else {
            named
        }
    }

    pub fn data_property(&mut self, dp: &DataProperty) -> ExprId {
        match dp.0.as_str() {
            vocabulary::OWL_TOP_DATA_PROPERTY => ExprId::TOP_DATA_ROLE,
            vocabulary::OWL_BOTTOM_DATA_PROPERTY => ExprId::BOTTOM_DATA_ROLE,
            _ => self.em.data_role(dp.0.clone()),
        }
    }

    pub fn individual(&mut self, individual: &Individual) -> ExprId {
        self.em.individual(individual.0.clone())
    }

    pub fn literal(&mut self, literal: &Literal) -> ExprId {
        self.em.literal(literal.lexical.clone(), literal.datatype.clone())
    }

    pub fn data_range(&mut self, range: &DataRange) -> ExprId {
        match range {
            DataRange::Datatype(iri) => self.em.datatype(iri.clone()),
            DataRange::OneOf(values) => {
                let values = values.iter().map(|v| self.literal(v)).collect();
                self.em.data_one_of(values)
            }
            DataRange::Restriction { datatype, facets } => {
                let facets = facets
                    .iter()
                    .map(|(facet, value)| (facet.clone(), self.literal(value)))
                    .collect();
                self.em.datatype_restriction(datatype.clone(), facets)
            }
            DataRange::ComplementOf(inner) => {
                let inner = self.data_range(inner);
                self.em.data_not(inner)
            }
        }
    }

    pub fn entity(&mut self, entity: &Entity) -> ExprId {
        match entity {
            Entity::Class(iri) => self.class(&ClassExpression::Named(iri.clone())),
            Entity::ObjectProperty(iri) => {
                self.object_property(&ObjectPropertyExpression::ObjectProperty(iri.clone()))
            }
            Entity::DataProperty(iri) => self.data_property(&DataProperty(iri.clone())),
            Entity::Individual(iri) => self.em.individual(iri.clone()),
        }
    }

    /// Kernel form of a logical axiom; `None` for rules, which the kernel
    /// does not load
    pub fn axiom(&mut self, axiom: &Axiom) -> Option<AxiomBody> {
        let body = match axiom {
            Axiom::Declaration(entity) => AxiomBody::Declaration(self.entity(entity)),
            Axiom::SubClassOf(sub, sup) => AxiomBody::ConceptInclusion {
                sub: self.class(sub),
                sup: self.class(sup),
            },
            Axiom::EquivalentClasses(items) => {
                AxiomBody::EquivalentConcepts(items.iter().map(|c| self.class(c)).collect())
            }
            Axiom::DisjointClasses(items) => {
                AxiomBody::DisjointConcepts(items.iter().map(|c| self.class(c)).collect())
            }
            Axiom::SubObjectPropertyOf(sub, sup) => AxiomBody::ObjectRoleInclusion {
                sub: self.object_property(sub),
                sup: self.object_property(sup),
            },
            Axiom::EquivalentObjectProperties(items) => AxiomBody::EquivalentObjectRoles(
                items.iter().map(|p| self.object_property(p)).collect(),
            ),
            Axiom::DisjointObjectProperties(items) => AxiomBody::DisjointObjectRoles(
                items.iter().map(|p| self.object_property(p)).collect(),
            ),
            Axiom::InverseObjectProperties(p, q) => {
                AxiomBody::InverseObjectRoles(self.object_property(p), self.object_property(q))
            }
            Axiom::ObjectPropertyDomain(p, c) => AxiomBody::ObjectRoleDomain {
                role: self.object_property(p),
                domain: self.class(c),
            },
            Axiom::ObjectPropertyRange(p, c) => AxiomBody::ObjectRoleRange {
                role: self.object_property(p),
                range: self.class(c),
            },
            Axiom::FunctionalObjectProperty(p) => AxiomBody::FunctionalObjectRole(self.object_property(p)),
            Axiom::InverseFunctionalObjectProperty(p) => {
                AxiomBody::InverseFunctionalObjectRole(self.object_property(p))
            }
            Axiom::TransitiveObjectProperty(p) => AxiomBody::TransitiveObjectRole(self.object_property(p)),
            Axiom::SymmetricObjectProperty(p) => AxiomBody::SymmetricObjectRole(self.object_property(p)),
            Axiom::SubDataPropertyOf(sub, sup) => AxiomBody::DataRoleInclusion {
                sub: self.data_property(sub),
                sup: self.data_property(sup),
            },
            Axiom::EquivalentDataProperties(items) => {
                AxiomBody::EquivalentDataRoles(items.iter().map(|d| self.data_property(d)).collect())
            }
            Axiom::DisjointDataProperties(items) => {
                AxiomBody::DisjointDataRoles(items.iter().map(|d| self.data_property(d)).collect())
            }
            Axiom::DataPropertyDomain(d, c) => AxiomBody::DataRoleDomain {
                role: self.data_property(d),
                domain: self.class(c),
            },
            Axiom::DataPropertyRange(d, r) => AxiomBody::DataRoleRange {
                role: self.data_property(d),
                range: self.data_range(r),
            },
            Axiom::FunctionalDataProperty(d) => AxiomBody::FunctionalDataRole(self.data_property(d)),
            Axiom::ClassAssertion(c, i) => AxiomBody::InstanceOf {
                individual: self.individual(i),
                concept: self.class(c),
            },
            Axiom::ObjectPropertyAssertion(p, from, to) => AxiomBody::RelatedTo {
                from: self.individual(from),
                role: self.object_property(p),
                to: self.individual(to),
            },
            Axiom::NegativeObjectPropertyAssertion(p, from, to) => AxiomBody::NotRelatedTo {
                from: self.individual(from),
                role: self.object_property(p),
                to: self.individual(to),
            },
            Axiom::DataPropertyAssertion(d, i, v) => AxiomBody::ValueOf {
                individual: self.individual(i),
                role: self.data_property(d),
                value: self.literal(v),
            },
            Axiom::NegativeDataPropertyAssertion(d, i, v) => AxiomBody::NotValueOf {
                individual: self.individual(i),
                role: self.data_property(d),
                value: self.literal(v),
            },
            Axiom::SameIndividual(items) => {
                AxiomBody::SameIndividuals(items.iter().map(|i| self.individual(i)).collect())
            }
            Axiom::DifferentIndividuals(items) => {
                AxiomBody::DifferentIndividuals(items.iter().map(|i| self.individual(i)).collect())
            }
            Axiom::Rule { .. } => return None,
        };
        Some(body)
    }
}

// ---- kernel to host ----

pub(crate) fn class_of(em: &ExpressionManager, id: ExprId) -> Option<Class> {
    match em.get(id) {
        Expr::Top => Some(Class::Thing),
        Expr::Bottom => Some(Class::Nothing),
        Expr::Concept(iri) => Some(Class::from_iri(iri.clone())),
        _ => None,
    }
}

pub(crate) fn object_property_of(em: &ExpressionManager, id: ExprId) -> Option<ObjectPropertyExpression> {
    match em.get(id) {
        Expr::TopObjectRole => Some(ObjectPropertyExpression::top()),
        Expr::BottomObjectRole => Some(ObjectPropertyExpression::bottom()),
        Expr::ObjectRole(iri) => Some(ObjectPropertyExpression::ObjectProperty(iri.clone())),
        Expr::Inverse(inner) => object_property_of(em, *inner).map(|p| p.inverse()),
        _ => None,
    }
}

pub(crate) fn data_property_of(em: &ExpressionManager, id: ExprId) -> Option<DataProperty> {
    match em.get(id) {
        Expr::TopDataRole => Some(DataProperty::top()),
        Expr::BottomDataRole => Some(DataProperty::bottom()),
        Expr::DataRole(iri) => Some(DataProperty(iri.clone())),
        _ => None,
    }
}

pub(crate) fn individual_of(em: &ExpressionManager, id: ExprId) -> Option<Individual> {
    match em.get(id) {
        Expr::Individual(iri) => Some(Individual(iri.clone())),
        _ => None,
    }
}

pub(crate) fn literal_of(em: &ExpressionManager, id: ExprId) -> Option<Literal> {
    match em.get(id) {
        Expr::Literal { lexical, datatype } => Some(Literal::new(lexical.clone(), datatype.clone())),
        _ => None,
    }
}

pub(crate) fn data_range_of(em: &ExpressionManager, id: ExprId) -> Option<DataRange> {
    match em.get(id) {
        Expr::DataTop => Some(DataRange::top()),
        Expr::Datatype(iri) => Some(DataRange::Datatype(iri.clone())),
        Expr::Literal { .. } => literal_of(em, id).map(|l| DataRange::OneOf(vec![l])),
        Expr::DataOneOf(values) => values
            .iter()
            .map(|v| literal_of(em, *v))
            .collect::<Option<Vec<_>>>()
            .map(DataRange::OneOf),
        Expr::DataNot(inner) => data_range_of(em, *inner).map(|r| DataRange::ComplementOf(Box::new(r))),
        Expr::DatatypeRestriction { datatype, facets } => facets
            .iter()
            .map(|(facet, value)| literal_of(em, *value).map(|v| (facet.clone(), v)))
            .collect::<Option<Vec<_>>>()
            .map(|facets| DataRange::Restriction {
                datatype: datatype.clone(),
                facets,
            }),
        _ => None,
    }
}

/// IRI that the kernel reported as fresh, resolved against an axiom signature
pub(crate) fn entities_named(signature: impl IntoIterator<Item = Entity>, iri: &Iri) -> Vec<Entity> {
    signature.into_iter().filter(|e| e.iri() == iri).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_map_to_reserved_handles() {
        let mut em = ExpressionManager::new();
        let mut translator = Translator::new(&mut em);
        assert_eq!(translator.class(&ClassExpression::named(vocabulary::OWL_THING)), ExprId::TOP);
        assert_eq!(
            translator.class(&ClassExpression::Named(Iri::new(vocabulary::OWL_NOTHING))),
            ExprId::BOTTOM
        );
        assert_eq!(
            translator.object_property(&ObjectPropertyExpression::top()),
            ExprId::TOP_OBJECT_ROLE
        );
        assert_eq!(translator.data_property(&DataProperty::bottom()), ExprId::BOTTOM_DATA_ROLE);
        assert_eq!(translator.data_range(&DataRange::top()), ExprId::DATA_TOP);
    }

    #[test]
    fn test_inverse_property_round_trips() {
        let mut em = ExpressionManager::new();
        let has_child = ObjectPropertyExpression::named("http://example.org/hasChild");
        let id = Translator::new(&mut em).object_property(&has_child.inverse());
        assert_eq!(object_property_of(&em, id), Some(has_child.inverse()));
    }

    #[test]
    fn test_rules_are_not_loaded() {
        let mut em = ExpressionManager::new();
        let rule = Axiom::Rule {
            body: vec!["Person(?x)".to_string()],
            head: vec!["Agent(?x)".to_string()],
        };
        assert!(Translator::new(&mut em).axiom(&rule).is_none());
    }

    #[test]
    fn test_data_range_back_translation() {
        let mut em = ExpressionManager::new();
        let range = DataRange::Restriction {
            datatype: vocabulary::xsd("integer"),
            facets: vec![("minInclusive".to_string(), Literal::xsd("0", "integer"))],
        };
        let id = Translator::new(&mut em).data_range(&range);
        assert_eq!(data_range_of(&em, id), Some(range));
        assert_eq!(data_range_of(&em, ExprId::TOP), None);
    }
}
