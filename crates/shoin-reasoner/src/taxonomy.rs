//! タクソノミー問い合わせプロトコル
//!
//! 種別ごとのポリシーと汎用アクターで、4 種類の実体すべてに同じ走査を使います。

use crate::translation;
use shoin_core::{Class, DataProperty, EntityKind, Individual, ObjectPropertyExpression};
use shoin_kernel::{ExprId, ExpressionManager, KernelOracle, TaxonomyActor};
use std::collections::BTreeSet;
use std::fmt;

/// Mutually equivalent entities of one kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node<E> {
    entities: BTreeSet<E>,
}

impl<E: Ord> Node<E> {
    pub fn new(entities: impl IntoIterator<Item = E>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            entities: BTreeSet::new(),
        }
    }

    pub fn contains(&self, entity: &E) -> bool {
        self.entities.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.entities.len() == 1
    }

    pub fn entities(&self) -> impl Iterator<Item = &E> {
        self.entities.iter()
    }

    /// Smallest member, stable across calls
    pub fn representative(&self) -> Option<&E> {
        self.entities.iter().next()
    }
}

impl Node<Class> {
    pub fn is_top(&self) -> bool {
        self.contains(&Class::Thing)
    }

    pub fn is_bottom(&self) -> bool {
        self.contains(&Class::Nothing)
    }
}

impl<E: Ord> IntoIterator for Node<E> {
    type Item = E;
    type IntoIter = std::collections::btree_set::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<E: fmt::Debug> fmt::Display for Node<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(")?;
        for (i, entity) in self.entities.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", entity)?;
        }
        write!(f, ")")
    }
}

/// One hierarchy level: Nodes in the order the oracle reported them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet<E> {
    nodes: Vec<Node<E>>,
}

impl<E: Ord> NodeSet<E> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn singleton(node: Node<E>) -> Self {
        Self { nodes: vec![node] }
    }

    /// Appends `node` unless it is empty or already present
    pub fn add_node(&mut self, node: Node<E>) {
        if !node.is_empty() && !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    pub fn nodes(&self) -> &[Node<E>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_entity(&self, entity: &E) -> bool {
        self.nodes.iter().any(|node| node.contains(entity))
    }

    /// All entities across the set's nodes
    pub fn flattened(&self) -> BTreeSet<&E> {
        self.nodes.iter().flat_map(|node| node.entities()).collect()
    }
}

impl<E: Ord> Default for NodeSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> IntoIterator for NodeSet<E> {
    type Item = Node<E>;
    type IntoIter = std::vec::IntoIter<Node<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a NodeSet<E> {
    type Item = &'a Node<E>;
    type IntoIter = std::slice::Iter<'a, Node<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Kind-specific knowledge: how handles map back to entities, and how a
/// vertex reported by the oracle splits into nodes
pub trait Policy {
    type Entity: Clone + Ord + fmt::Debug;

    const KIND: EntityKind;

    /// Named entity behind `id`; `None` for anonymous handles
    fn entity(&self, em: &ExpressionManager, id: ExprId) -> Option<Self::Entity>;

    /// Whether one oracle vertex becomes one node (synonyms collapse) or
    /// one node per member
    fn merges_synonyms(&self) -> bool {
        true
    }
}

/// Policy of a kind with its own taxonomy in the oracle
pub trait HierarchyPolicy: Policy + Copy {
    fn top(&self) -> Self::Entity;

    fn bottom(&self) -> Self::Entity;

    /// Reserved kernel handles of the top and bottom entity
    fn top_id(&self) -> ExprId;

    fn bottom_id(&self) -> ExprId;

    fn equivalents(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()>;

    fn subs(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()>;

    fn supers(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()>;

    fn disjoints(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassPolicy;

impl Policy for ClassPolicy {
    type Entity = Class;
    const KIND: EntityKind = EntityKind::Class;

    fn entity(&self, em: &ExpressionManager, id: ExprId) -> Option<Class> {
        translation::class_of(em, id)
    }
}

impl HierarchyPolicy for ClassPolicy {
    fn top(&self) -> Class {
        Class::Thing
    }

    fn bottom(&self) -> Class {
        Class::Nothing
    }

    fn top_id(&self) -> ExprId {
        ExprId::TOP
    }

    fn bottom_id(&self) -> ExprId {
        ExprId::BOTTOM
    }

    fn equivalents(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.equivalent_concepts(id, actor)
    }

    fn subs(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.sub_concepts(id, direct, actor)
    }

    fn supers(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.super_concepts(id, direct, actor)
    }

    fn disjoints(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.disjoint_concepts(id, actor)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectPropertyPolicy;

impl Policy for ObjectPropertyPolicy {
    type Entity = ObjectPropertyExpression;
    const KIND: EntityKind = EntityKind::ObjectProperty;

    fn entity(&self, em: &ExpressionManager, id: ExprId) -> Option<ObjectPropertyExpression> {
        translation::object_property_of(em, id)
    }
}

impl HierarchyPolicy for ObjectPropertyPolicy {
    fn top(&self) -> ObjectPropertyExpression {
        ObjectPropertyExpression::top()
    }

    fn bottom(&self) -> ObjectPropertyExpression {
        ObjectPropertyExpression::bottom()
    }

    fn top_id(&self) -> ExprId {
        ExprId::TOP_OBJECT_ROLE
    }

    fn bottom_id(&self) -> ExprId {
        ExprId::BOTTOM_OBJECT_ROLE
    }

    fn equivalents(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.equivalent_object_roles(id, actor)
    }

    fn subs(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.sub_object_roles(id, direct, actor)
    }

    fn supers(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.super_object_roles(id, direct, actor)
    }

    fn disjoints(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.disjoint_object_roles(id, actor)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataPropertyPolicy;

impl Policy for DataPropertyPolicy {
    type Entity = DataProperty;
    const KIND: EntityKind = EntityKind::DataProperty;

    fn entity(&self, em: &ExpressionManager, id: ExprId) -> Option<DataProperty> {
        translation::data_property_of(em, id)
    }
}

impl HierarchyPolicy for DataPropertyPolicy {
    fn top(&self) -> DataProperty {
        DataProperty::top()
    }

    fn bottom(&self) -> DataProperty {
        DataProperty::bottom()
    }

    fn top_id(&self) -> ExprId {
        ExprId::TOP_DATA_ROLE
    }

    fn bottom_id(&self) -> ExprId {
        ExprId::BOTTOM_DATA_ROLE
    }

    fn equivalents(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.equivalent_data_roles(id, actor)
    }

    fn subs(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.sub_data_roles(id, direct, actor)
    }

    fn supers(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.super_data_roles(id, direct, actor)
    }

    fn disjoints(
        &self,
        oracle: &mut dyn KernelOracle,
        id: ExprId,
        actor: &mut dyn TaxonomyActor,
    ) -> shoin_kernel::Result<()> {
        oracle.disjoint_data_roles(id, actor)
    }
}

/// Individuals have no taxonomy of their own; the flag decides whether
/// same-as individuals share a node
#[derive(Debug, Clone, Copy)]
pub struct IndividualPolicy {
    pub merge_same_as: bool,
}

impl Policy for IndividualPolicy {
    type Entity = Individual;
    const KIND: EntityKind = EntityKind::Individual;

    fn entity(&self, em: &ExpressionManager, id: ExprId) -> Option<Individual> {
        translation::individual_of(em, id)
    }

    fn merges_synonyms(&self) -> bool {
        self.merge_same_as
    }
}

/// Collects the vertices an oracle query streams out, translated through
/// the policy
pub struct Actor<P: Policy> {
    policy: P,
    vertices: Vec<Vec<P::Entity>>,
}

impl<P: Policy> Actor<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            vertices: Vec::new(),
        }
    }

    /// Synonyms of an equivalence query: the first vertex reported
    pub fn into_node(self) -> Node<P::Entity> {
        self.vertices
            .into_iter()
            .next()
            .map(Node::new)
            .unwrap_or_else(Node::empty)
    }

    pub fn into_node_set(self) -> NodeSet<P::Entity> {
        let merge = self.policy.merges_synonyms();
        let mut set = NodeSet::new();
        for vertex in self.vertices {
            if merge {
                set.add_node(Node::new(vertex));
            } else {
                for entity in vertex {
                    set.add_node(Node::new([entity]));
                }
            }
        }
        set
    }
}

impl<P: Policy> TaxonomyActor for Actor<P> {
    fn apply(&mut self, vertex: &[ExprId], em: &ExpressionManager) -> bool {
        let entities: Vec<P::Entity> = vertex
            .iter()
            .filter_map(|id| self.policy.entity(em, *id))
            .collect();
        if entities.is_empty() {
            return false;
        }
        self.vertices.push(entities);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::Iri;

    #[test]
    fn test_actor_skips_anonymous_vertices() {
        let mut em = ExpressionManager::new();
        let animal = em.concept(Iri::new("http://example.org/Animal"));
        let role = em.object_role(Iri::new("http://example.org/eats"));
        let anonymous = em.some(role, animal);

        let mut actor = Actor::new(ClassPolicy);
        assert!(!actor.apply(&[anonymous], &em));
        assert!(actor.apply(&[animal, anonymous], &em));
        assert!(actor.apply(&[ExprId::TOP], &em));

        let set = actor.into_node_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set.nodes()[0], Node::new([Class::named("http://example.org/Animal")]));
        assert!(set.nodes()[1].is_top());
    }

    #[test]
    fn test_individual_policy_splits_same_as_vertices() {
        let mut em = ExpressionManager::new();
        let a = em.individual(Iri::new("http://example.org/a"));
        let b = em.individual(Iri::new("http://example.org/b"));

        let mut merged = Actor::new(IndividualPolicy { merge_same_as: true });
        merged.apply(&[a, b], &em);
        assert_eq!(merged.into_node_set().len(), 1);

        let mut split = Actor::new(IndividualPolicy { merge_same_as: false });
        split.apply(&[a, b], &em);
        let set = split.into_node_set();
        assert_eq!(set.len(), 2);
        assert!(set.nodes().iter().all(Node::is_singleton));
    }

    #[test]
    fn test_equivalence_takes_first_vertex() {
        let em = ExpressionManager::new();
        let mut actor = Actor::new(ObjectPropertyPolicy);
        actor.apply(&[ExprId::TOP_OBJECT_ROLE], &em);
        let node = actor.into_node();
        assert_eq!(node.representative(), Some(&ObjectPropertyExpression::top()));

        let empty: Node<DataProperty> = Actor::new(DataPropertyPolicy).into_node();
        assert!(empty.is_empty());
    }
}
