//! 知識探索 API
//!
//! オラクル内部の証明グラフのノードを不透明なハンドルとして公開します。

use crate::session::Reasoner;
use crate::taxonomy::{ClassPolicy, DataPropertyPolicy, Node, ObjectPropertyPolicy, Policy};
use crate::translation;
use crate::Result;
use serde::{Deserialize, Serialize};
use shoin_core::{Class, ClassExpression, DataProperty, DataRange, ObjectPropertyExpression};
use shoin_kernel::{ExprId, ExpressionManager, KernelOracle, ProofNodeId};

/// Opaque handle of a proof graph node. Valid until the next change to the
/// knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RootNode(ProofNodeId);

impl RootNode {
    pub fn id(&self) -> ProofNodeId {
        self.0
    }
}

fn node_of<P: Policy>(policy: P, em: &ExpressionManager, ids: Vec<ExprId>) -> Node<P::Entity> {
    Node::new(ids.into_iter().filter_map(|id| policy.entity(em, id)))
}

impl<O: KernelOracle> Reasoner<O> {
    /// Builds the proof structure for `ce` and returns its root
    #[tracing::instrument(skip(self))]
    pub fn root_node(&self, ce: &ClassExpression) -> Result<RootNode> {
        let mut kb = self.state.lock();
        let concept = kb.translator().class(ce);
        Ok(RootNode(kb.oracle.build_proof_node(concept)?))
    }

    /// Object properties labelling the outgoing edges of `node`
    pub fn object_neighbours(
        &self,
        node: RootNode,
        deterministic_only: bool,
    ) -> Result<Node<ObjectPropertyExpression>> {
        let kb = self.state.lock();
        let roles = kb.oracle.object_roles(node.0, deterministic_only)?;
        Ok(node_of(ObjectPropertyPolicy, kb.oracle.expression_manager(), roles))
    }

    pub fn data_neighbours(&self, node: RootNode, deterministic_only: bool) -> Result<Node<DataProperty>> {
        let kb = self.state.lock();
        let roles = kb.oracle.data_roles(node.0, deterministic_only)?;
        Ok(node_of(DataPropertyPolicy, kb.oracle.expression_manager(), roles))
    }

    /// Nodes reached from `node` through `pe` or one of its sub-properties
    pub fn object_successors(&self, node: RootNode, pe: &ObjectPropertyExpression) -> Result<Vec<RootNode>> {
        let mut kb = self.state.lock();
        let role = kb.translator().object_property(pe);
        let successors = kb.oracle.neighbours(node.0, role)?;
        Ok(successors.into_iter().map(RootNode).collect())
    }

    pub fn data_successors(&self, node: RootNode, dp: &DataProperty) -> Result<Vec<RootNode>> {
        let mut kb = self.state.lock();
        let role = kb.translator().data_property(dp);
        let successors = kb.oracle.neighbours(node.0, role)?;
        Ok(successors.into_iter().map(RootNode).collect())
    }

    /// Named classes in the concept label of `node`
    pub fn object_label(&self, node: RootNode, deterministic_only: bool) -> Result<Node<Class>> {
        let kb = self.state.lock();
        let label = kb.oracle.object_label(node.0, deterministic_only)?;
        Ok(node_of(ClassPolicy, kb.oracle.expression_manager(), label))
    }

    pub fn data_label(&self, node: RootNode, deterministic_only: bool) -> Result<Vec<DataRange>> {
        let kb = self.state.lock();
        let label = kb.oracle.data_label(node.0, deterministic_only)?;
        let em = kb.oracle.expression_manager();
        Ok(label
            .into_iter()
            .filter_map(|id| translation::data_range_of(em, id))
            .collect())
    }

    /// The node blocking `node`, if expansion stopped there
    pub fn blocker(&self, node: RootNode) -> Result<Option<RootNode>> {
        let kb = self.state.lock();
        Ok(kb.oracle.blocker(node.0)?.map(RootNode))
    }
}
