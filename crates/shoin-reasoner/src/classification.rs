//! 分類アクセサ
//!
//! クラス・オブジェクトプロパティ・データプロパティ・個体の各タクソノミー問い合わせ。
//! 新規実体の扱い, 一貫性ガード, ドメイン/レンジの合成をここで行います。

use crate::config::FreshEntityPolicy;
use crate::session::{named_class, named_object_property, KnowledgeBase, Reasoner};
use crate::taxonomy::{
    Actor, ClassPolicy, DataPropertyPolicy, HierarchyPolicy, IndividualPolicy, Node, NodeSet,
    ObjectPropertyPolicy,
};
use crate::translation::{self, Translator};
use crate::{ReasonerError, Result};
use serde::{Deserialize, Serialize};
use shoin_core::{
    Class, ClassExpression, DataProperty, DataRange, Entity, Individual, Literal,
    ObjectPropertyExpression,
};
use shoin_kernel::{ExprId, KernelOracle};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::Write;

/// Comparison between two data property values of the same individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataComparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl DataComparison {
    /// Numeric when both lexical forms parse as numbers, lexical otherwise
    pub fn holds(self, left: &Literal, right: &Literal) -> bool {
        let ordering = match (left.lexical.trim().parse::<f64>(), right.lexical.trim().parse::<f64>()) {
            (Ok(l), Ok(r)) => match l.partial_cmp(&r) {
                Some(ordering) => ordering,
                None => return self == DataComparison::Ne,
            },
            _ => left.lexical.cmp(&right.lexical),
        };
        match self {
            DataComparison::Eq => ordering == Ordering::Equal,
            DataComparison::Ne => ordering != Ordering::Equal,
            DataComparison::Lt => ordering == Ordering::Less,
            DataComparison::Le => ordering != Ordering::Greater,
            DataComparison::Gt => ordering == Ordering::Greater,
            DataComparison::Ge => ordering != Ordering::Less,
        }
    }
}

enum Direction {
    Sub,
    Super,
}

impl<O: KernelOracle> KnowledgeBase<O> {
    fn is_fresh_query(&self, entity: Option<&Entity>) -> bool {
        entity.is_some_and(|entity| self.is_fresh(entity))
    }

    /// Synonyms of `id`. Callers have ruled out fresh entities already.
    pub(crate) fn equivalents<P: HierarchyPolicy>(&mut self, policy: P, id: ExprId) -> Result<Node<P::Entity>> {
        self.check_consistency()?;
        let mut actor = Actor::new(policy);
        policy.equivalents(&mut self.oracle, id, &mut actor)?;
        Ok(actor.into_node())
    }

    /// Equivalents of a possibly named entity. A fresh entity yields the
    /// empty Node before anything is translated into the oracle.
    fn named_equivalents<P: HierarchyPolicy>(
        &mut self,
        policy: P,
        entity: Option<Entity>,
        translate: impl FnOnce(&mut Translator<'_>) -> ExprId,
    ) -> Result<Node<P::Entity>> {
        if self.is_fresh_query(entity.as_ref()) {
            return Ok(Node::empty());
        }
        let id = translate(&mut self.translator());
        self.equivalents(policy, id)
    }

    fn hierarchy<P: HierarchyPolicy>(
        &mut self,
        policy: P,
        entity: Option<Entity>,
        direction: Direction,
        direct: bool,
        translate: impl FnOnce(&mut Translator<'_>) -> ExprId,
    ) -> Result<NodeSet<P::Entity>> {
        if let Some(fresh) = entity.filter(|e| self.is_fresh(e)) {
            return match direction {
                Direction::Sub if self.fresh_entity_policy == FreshEntityPolicy::Disallow => {
                    Err(ReasonerError::FreshEntities { entities: vec![fresh] })
                }
                Direction::Sub => Ok(NodeSet::singleton(self.equivalents(policy, policy.bottom_id())?)),
                Direction::Super => Ok(NodeSet::singleton(self.equivalents(policy, policy.top_id())?)),
            };
        }
        self.check_consistency()?;
        let id = translate(&mut self.translator());
        let mut actor = Actor::new(policy);
        match direction {
            Direction::Sub => policy.subs(&mut self.oracle, id, direct, &mut actor)?,
            Direction::Super => policy.supers(&mut self.oracle, id, direct, &mut actor)?,
        }
        Ok(actor.into_node_set())
    }

    pub(crate) fn sub_classes(&mut self, ce: &ClassExpression, direct: bool) -> Result<NodeSet<Class>> {
        self.hierarchy(ClassPolicy, named_class(ce), Direction::Sub, direct, |t| t.class(ce))
    }

    pub(crate) fn super_classes(&mut self, ce: &ClassExpression, direct: bool) -> Result<NodeSet<Class>> {
        self.hierarchy(ClassPolicy, named_class(ce), Direction::Super, direct, |t| t.class(ce))
    }

    pub(crate) fn equivalent_classes(&mut self, ce: &ClassExpression) -> Result<Node<Class>> {
        self.named_equivalents(ClassPolicy, named_class(ce), |t| t.class(ce))
    }

    /// Property disjointness is answered with the bottom Node only
    fn bottom_only<P: HierarchyPolicy>(&mut self, policy: P) -> Result<NodeSet<P::Entity>> {
        self.check_consistency()?;
        let bottom = self.equivalents(policy, policy.bottom_id())?;
        Ok(NodeSet::singleton(bottom))
    }

    pub(crate) fn instances(&mut self, ce: &ClassExpression, direct: bool) -> Result<NodeSet<Individual>> {
        self.check_consistency()?;
        let concept = self.translator().class(ce);
        let mut actor = Actor::new(IndividualPolicy {
            merge_same_as: self.merge_same_as,
        });
        self.oracle.instances(concept, direct, &mut actor)?;
        Ok(actor.into_node_set())
    }

    fn same_as_node(&mut self, individual: ExprId) -> Result<Node<Individual>> {
        let mut actor = Actor::new(IndividualPolicy { merge_same_as: true });
        self.oracle.same_as(individual, &mut actor)?;
        Ok(actor.into_node())
    }

    fn literals(&mut self, individual: &Individual, property: &DataProperty) -> Result<BTreeSet<Literal>> {
        let mut translator = self.translator();
        let ind = translator.individual(individual);
        let role = translator.data_property(property);
        let values = self.oracle.data_fillers(ind, role)?;
        let em = self.oracle.expression_manager();
        Ok(values
            .into_iter()
            .filter_map(|value| translation::literal_of(em, value))
            .collect())
    }

    fn dump_subclasses(
        &mut self,
        node: Node<Class>,
        writer: &mut dyn Write,
        depth: usize,
        include_bottom: bool,
    ) -> Result<()> {
        if !include_bottom && node.is_bottom() {
            return Ok(());
        }
        let names: Vec<String> = node.entities().map(|class| class.iri().to_string()).collect();
        writeln!(writer, "{}Node({})", "    ".repeat(depth), names.join(", "))?;

        let Some(representative) = node.representative().cloned() else {
            return Ok(());
        };
        for sub in self.sub_classes(&ClassExpression::from(representative), true)? {
            self.dump_subclasses(sub, writer, depth + 1, include_bottom)?;
        }
        Ok(())
    }
}

impl<O: KernelOracle> Reasoner<O> {
    // ---- classes ----

    pub fn top_class_node(&self) -> Result<Node<Class>> {
        self.equivalent_classes(&ClassExpression::Thing)
    }

    pub fn bottom_class_node(&self) -> Result<Node<Class>> {
        self.equivalent_classes(&ClassExpression::Nothing)
    }

    /// Classes equivalent to owl:Nothing
    pub fn unsatisfiable_classes(&self) -> Result<Node<Class>> {
        self.bottom_class_node()
    }

    #[tracing::instrument(skip(self))]
    pub fn equivalent_classes(&self, ce: &ClassExpression) -> Result<Node<Class>> {
        self.state.lock().equivalent_classes(ce)
    }

    /// Subclasses of `ce`. A fresh class yields the bottom Node, or an error
    /// when fresh entities are disallowed.
    #[tracing::instrument(skip(self))]
    pub fn sub_classes(&self, ce: &ClassExpression, direct: bool) -> Result<NodeSet<Class>> {
        self.state.lock().sub_classes(ce, direct)
    }

    /// Superclasses of `ce`; the top Node for a fresh class
    #[tracing::instrument(skip(self))]
    pub fn super_classes(&self, ce: &ClassExpression, direct: bool) -> Result<NodeSet<Class>> {
        self.state.lock().super_classes(ce, direct)
    }

    #[tracing::instrument(skip(self))]
    pub fn disjoint_classes(&self, ce: &ClassExpression) -> Result<NodeSet<Class>> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        let id = kb.translator().class(ce);
        let mut actor = Actor::new(ClassPolicy);
        kb.oracle.disjoint_concepts(id, &mut actor)?;
        Ok(actor.into_node_set())
    }

    // ---- object properties ----

    pub fn top_object_property_node(&self) -> Result<Node<ObjectPropertyExpression>> {
        self.equivalent_object_properties(&ObjectPropertyExpression::top())
    }

    pub fn bottom_object_property_node(&self) -> Result<Node<ObjectPropertyExpression>> {
        self.equivalent_object_properties(&ObjectPropertyExpression::bottom())
    }

    #[tracing::instrument(skip(self))]
    pub fn equivalent_object_properties(
        &self,
        pe: &ObjectPropertyExpression,
    ) -> Result<Node<ObjectPropertyExpression>> {
        self.state
            .lock()
            .named_equivalents(ObjectPropertyPolicy, named_object_property(pe), |t| t.object_property(pe))
    }

    #[tracing::instrument(skip(self))]
    pub fn sub_object_properties(
        &self,
        pe: &ObjectPropertyExpression,
        direct: bool,
    ) -> Result<NodeSet<ObjectPropertyExpression>> {
        self.state.lock().hierarchy(
            ObjectPropertyPolicy,
            named_object_property(pe),
            Direction::Sub,
            direct,
            |t| t.object_property(pe),
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn super_object_properties(
        &self,
        pe: &ObjectPropertyExpression,
        direct: bool,
    ) -> Result<NodeSet<ObjectPropertyExpression>> {
        self.state.lock().hierarchy(
            ObjectPropertyPolicy,
            named_object_property(pe),
            Direction::Super,
            direct,
            |t| t.object_property(pe),
        )
    }

    /// Always the bottom Node alone; non-bottom disjoint properties are not
    /// reported
    #[tracing::instrument(skip(self))]
    pub fn disjoint_object_properties(
        &self,
        _pe: &ObjectPropertyExpression,
    ) -> Result<NodeSet<ObjectPropertyExpression>> {
        self.state.lock().bottom_only(ObjectPropertyPolicy)
    }

    /// Properties equivalent to the inverse of `pe`
    pub fn inverse_object_properties(
        &self,
        pe: &ObjectPropertyExpression,
    ) -> Result<Node<ObjectPropertyExpression>> {
        self.equivalent_object_properties(&pe.inverse())
    }

    /// Superclasses of ∃pe.⊤
    #[tracing::instrument(skip(self))]
    pub fn object_property_domains(&self, pe: &ObjectPropertyExpression, direct: bool) -> Result<NodeSet<Class>> {
        self.super_classes(&ClassExpression::some(pe.clone(), ClassExpression::Thing), direct)
    }

    /// Superclasses of ∃pe⁻.⊤
    #[tracing::instrument(skip(self))]
    pub fn object_property_ranges(&self, pe: &ObjectPropertyExpression, direct: bool) -> Result<NodeSet<Class>> {
        self.super_classes(&ClassExpression::some(pe.inverse(), ClassExpression::Thing), direct)
    }

    // ---- data properties ----

    pub fn top_data_property_node(&self) -> Result<Node<DataProperty>> {
        self.equivalent_data_properties(&DataProperty::top())
    }

    pub fn bottom_data_property_node(&self) -> Result<Node<DataProperty>> {
        self.equivalent_data_properties(&DataProperty::bottom())
    }

    #[tracing::instrument(skip(self))]
    pub fn equivalent_data_properties(&self, dp: &DataProperty) -> Result<Node<DataProperty>> {
        self.state
            .lock()
            .named_equivalents(DataPropertyPolicy, Some(dp.entity()), |t| t.data_property(dp))
    }

    #[tracing::instrument(skip(self))]
    pub fn sub_data_properties(&self, dp: &DataProperty, direct: bool) -> Result<NodeSet<DataProperty>> {
        self.state
            .lock()
            .hierarchy(DataPropertyPolicy, Some(dp.entity()), Direction::Sub, direct, |t| t.data_property(dp))
    }

    #[tracing::instrument(skip(self))]
    pub fn super_data_properties(&self, dp: &DataProperty, direct: bool) -> Result<NodeSet<DataProperty>> {
        self.state
            .lock()
            .hierarchy(DataPropertyPolicy, Some(dp.entity()), Direction::Super, direct, |t| t.data_property(dp))
    }

    #[tracing::instrument(skip(self))]
    pub fn disjoint_data_properties(&self, _dp: &DataProperty) -> Result<NodeSet<DataProperty>> {
        self.state.lock().bottom_only(DataPropertyPolicy)
    }

    /// Superclasses of ∃dp.rdfs:Literal
    #[tracing::instrument(skip(self))]
    pub fn data_property_domains(&self, dp: &DataProperty, direct: bool) -> Result<NodeSet<Class>> {
        let some = ClassExpression::DataSomeValuesFrom {
            property: dp.clone(),
            range: DataRange::top(),
        };
        self.super_classes(&some, direct)
    }

    // ---- individuals ----

    #[tracing::instrument(skip(self))]
    pub fn types(&self, individual: &Individual, direct: bool) -> Result<NodeSet<Class>> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        let id = kb.translator().individual(individual);
        let mut actor = Actor::new(ClassPolicy);
        kb.oracle.types(id, direct, &mut actor)?;
        Ok(actor.into_node_set())
    }

    /// Instances of `ce`, grouped by the individual node set policy
    #[tracing::instrument(skip(self))]
    pub fn instances(&self, ce: &ClassExpression, direct: bool) -> Result<NodeSet<Individual>> {
        self.state.lock().instances(ce, direct)
    }

    #[tracing::instrument(skip(self))]
    pub fn same_individuals(&self, individual: &Individual) -> Result<Node<Individual>> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        let id = kb.translator().individual(individual);
        kb.same_as_node(id)
    }

    /// Instances of ¬{individual}
    #[tracing::instrument(skip(self))]
    pub fn different_individuals(&self, individual: &Individual) -> Result<NodeSet<Individual>> {
        let complement = ClassExpression::complement(ClassExpression::OneOf(vec![individual.clone()]));
        self.state.lock().instances(&complement, false)
    }

    #[tracing::instrument(skip(self))]
    pub fn object_property_values(
        &self,
        individual: &Individual,
        pe: &ObjectPropertyExpression,
    ) -> Result<NodeSet<Individual>> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        let mut translator = kb.translator();
        let ind = translator.individual(individual);
        let role = translator.object_property(pe);
        let fillers = kb.oracle.role_fillers(ind, role)?;

        let mut values = NodeSet::new();
        for filler in fillers {
            let node = if kb.merge_same_as {
                kb.same_as_node(filler)?
            } else {
                Node::new(translation::individual_of(kb.oracle.expression_manager(), filler))
            };
            values.add_node(node);
        }
        Ok(values)
    }

    /// Literals asserted for `individual` through `dp` or a sub-property
    #[tracing::instrument(skip(self))]
    pub fn data_property_values(&self, individual: &Individual, dp: &DataProperty) -> Result<BTreeSet<Literal>> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        kb.literals(individual, dp)
    }

    /// Members of `individuals` with an `r` value and an `s` value standing
    /// in `comparison`
    #[tracing::instrument(skip(self, individuals))]
    pub fn data_related_individuals(
        &self,
        individuals: &[Individual],
        r: &DataProperty,
        s: &DataProperty,
        comparison: DataComparison,
    ) -> Result<Vec<Individual>> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        let mut related = Vec::new();
        for individual in individuals {
            let left = kb.literals(individual, r)?;
            if left.is_empty() {
                continue;
            }
            let right = kb.literals(individual, s)?;
            if left.iter().any(|lv| right.iter().any(|rv| comparison.holds(lv, rv))) {
                related.push(individual.clone());
            }
        }
        Ok(related)
    }

    // ---- hierarchy dump ----

    /// Writes the class taxonomy depth-first from the top Node, one Node per
    /// line, four spaces per level
    pub fn dump_class_hierarchy(&self, writer: &mut dyn Write, include_bottom: bool) -> Result<()> {
        let mut kb = self.state.lock();
        let top = kb.equivalent_classes(&ClassExpression::Thing)?;
        kb.dump_subclasses(top, writer, 0, include_bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison() {
        let three = Literal::xsd("3", "integer");
        let ten = Literal::xsd("10", "integer");
        assert!(DataComparison::Lt.holds(&three, &ten));
        assert!(DataComparison::Le.holds(&three, &three));
        assert!(DataComparison::Ne.holds(&three, &ten));
        assert!(!DataComparison::Ge.holds(&three, &ten));

        let decimal = Literal::xsd("3.0", "decimal");
        assert!(DataComparison::Eq.holds(&three, &decimal));
    }

    #[test]
    fn test_lexical_comparison_fallback() {
        let apple = Literal::xsd("apple", "string");
        let banana = Literal::xsd("banana", "string");
        assert!(DataComparison::Lt.holds(&apple, &banana));
        assert!(DataComparison::Gt.holds(&banana, &apple));
        assert!(DataComparison::Eq.holds(&apple, &apple.clone()));
    }
}
