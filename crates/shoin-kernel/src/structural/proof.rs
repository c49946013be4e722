//! 完了グラフ (証明グラフ) の構築と探索

use super::closure::{Context, Label};
use crate::expr::{Expr, ExprId};
use crate::oracle::ProofNodeId;
use crate::{OracleError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Upper bound on nodes per graph; expansion stops beyond it
const MAX_NODES: usize = 4096;

#[derive(Debug, Clone)]
struct ProofEdge {
    role: ExprId,
    target: usize,
    deterministic: bool,
}

#[derive(Debug, Clone, Default)]
struct ProofNode {
    /// Label items, flagged true when derived without a choice
    label: BTreeMap<ExprId, bool>,
    parent: Option<usize>,
    edges: Vec<ProofEdge>,
    blocker: Option<usize>,
    data: bool,
}

/// Arena of completion-graph nodes. Handles stay valid until the knowledge
/// base changes.
#[derive(Debug, Default)]
pub(crate) struct ProofGraph {
    nodes: Vec<ProofNode>,
}

impl ProofGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Builds the graph for `concept` and returns its root
    pub fn build(&mut self, ctx: &Context<'_>, saturated: &HashMap<ExprId, Label>, concept: ExprId) -> Result<ProofNodeId> {
        let root_label = ctx.close([concept], saturated);
        if root_label.is_unsatisfiable() {
            return Err(OracleError::NoProofNode(format!(
                "{} is unsatisfiable",
                ctx.em.display(concept)
            )));
        }

        let root = self.push(ProofNode {
            label: root_label.items.iter().map(|item| (*item, true)).collect(),
            ..ProofNode::default()
        });
        self.choose_disjuncts(ctx, saturated, root);

        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            if self.nodes.len() >= MAX_NODES {
                debug!("Proof graph reached {} nodes, expansion stopped", MAX_NODES);
                break;
            }
            queue.extend(self.expand(ctx, saturated, node));
        }

        Ok(ProofNodeId(root))
    }

    fn push(&mut self, node: ProofNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Picks the first satisfiable disjunct of every open disjunction.
    /// Everything a choice adds is non-deterministic.
    fn choose_disjuncts(&mut self, ctx: &Context<'_>, saturated: &HashMap<ExprId, Label>, node: usize) {
        loop {
            let items: BTreeSet<ExprId> = self.nodes[node].label.keys().copied().collect();
            let open = items.iter().find_map(|item| match ctx.em.get(*item) {
                Expr::Or(disjuncts) if !disjuncts.iter().any(|d| items.contains(d)) => Some(disjuncts.clone()),
                _ => None,
            });
            let Some(disjuncts) = open else {
                return;
            };

            let mut chosen = None;
            for disjunct in &disjuncts {
                let mut seeds = items.clone();
                seeds.insert(*disjunct);
                let closed = ctx.close(seeds, saturated);
                if !closed.is_unsatisfiable() {
                    chosen = Some(closed);
                    break;
                }
            }
            let Some(closed) = chosen else {
                return;
            };
            let label = &mut self.nodes[node].label;
            for item in closed.items {
                label.entry(item).or_insert(false);
            }
        }
    }

    fn expand(&mut self, ctx: &Context<'_>, saturated: &HashMap<ExprId, Label>, node: usize) -> Vec<usize> {
        let em = ctx.em;
        if self.nodes[node].data || self.nodes[node].blocker.is_some() {
            return Vec::new();
        }

        let label = self.nodes[node].label.clone();
        let mut created = Vec::new();
        for (item, deterministic) in &label {
            let successor = match em.get(*item) {
                Expr::ObjectSome { role, filler } => Some((*role, *filler, false)),
                Expr::ObjectMin { n, role, filler } | Expr::ObjectExact { n, role, filler } if *n >= 1 => {
                    Some((*role, *filler, false))
                }
                Expr::DataSome { role, range } => Some((*role, *range, true)),
                Expr::DataHasValue { role, value } => Some((*role, *value, true)),
                _ => None,
            };
            let Some((role, filler, data)) = successor else {
                continue;
            };

            let target = if data {
                self.push(ProofNode {
                    label: BTreeMap::from([(filler, *deterministic)]),
                    parent: Some(node),
                    data: true,
                    ..ProofNode::default()
                })
            } else {
                let mut seeds = vec![filler];
                for other in label.keys() {
                    if let Expr::ObjectAll { role: r, filler: f } = em.get(*other) {
                        if ctx.roles.is_sub(em, role, *r) {
                            seeds.push(*f);
                        }
                    }
                }
                let closed = ctx.close(seeds, saturated);
                let successor = self.push(ProofNode {
                    label: closed.items.iter().map(|i| (*i, *deterministic)).collect(),
                    parent: Some(node),
                    ..ProofNode::default()
                });
                self.choose_disjuncts(ctx, saturated, successor);
                self.nodes[successor].blocker = self.find_blocker(successor);
                created.push(successor);
                successor
            };

            self.nodes[node].edges.push(ProofEdge {
                role,
                target,
                deterministic: *deterministic,
            });
        }
        created
    }

    /// Nearest ancestor whose label contains the node's label
    fn find_blocker(&self, node: usize) -> Option<usize> {
        let items: BTreeSet<&ExprId> = self.nodes[node].label.keys().collect();
        let mut ancestor = self.nodes[node].parent;
        while let Some(candidate) = ancestor {
            let label = &self.nodes[candidate].label;
            if items.iter().all(|item| label.contains_key(*item)) {
                return Some(candidate);
            }
            ancestor = self.nodes[candidate].parent;
        }
        None
    }

    fn node(&self, id: ProofNodeId) -> Result<&ProofNode> {
        self.nodes.get(id.0).ok_or(OracleError::UnknownProofNode(id))
    }

    fn edge_roles(&self, id: ProofNodeId, deterministic_only: bool, data: bool) -> Result<Vec<ExprId>> {
        let node = self.node(id)?;
        let roles: BTreeSet<ExprId> = node
            .edges
            .iter()
            .filter(|e| self.nodes[e.target].data == data && (e.deterministic || !deterministic_only))
            .map(|e| e.role)
            .collect();
        Ok(roles.into_iter().collect())
    }

    pub fn object_roles(&self, id: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>> {
        self.edge_roles(id, deterministic_only, false)
    }

    pub fn data_roles(&self, id: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>> {
        self.edge_roles(id, deterministic_only, true)
    }

    /// Targets of edges whose role satisfies `matches`
    pub fn neighbours(&self, id: ProofNodeId, matches: impl Fn(ExprId) -> bool) -> Result<Vec<ProofNodeId>> {
        let node = self.node(id)?;
        Ok(node
            .edges
            .iter()
            .filter(|e| matches(e.role))
            .map(|e| ProofNodeId(e.target))
            .collect())
    }

    /// Concept items of the node, or its data items when `data` is set
    pub fn label(
        &self,
        id: ProofNodeId,
        deterministic_only: bool,
        data: bool,
        is_concept: impl Fn(ExprId) -> bool,
    ) -> Result<Vec<ExprId>> {
        let node = self.node(id)?;
        Ok(node
            .label
            .iter()
            .filter(|(item, deterministic)| {
                (**deterministic || !deterministic_only) && is_concept(**item) != data && **item != ExprId::TOP
            })
            .map(|(item, _)| *item)
            .collect())
    }

    pub fn blocker(&self, id: ProofNodeId) -> Result<Option<ProofNodeId>> {
        Ok(self.node(id)?.blocker.map(ProofNodeId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::{AxiomBody, AxiomId};
    use crate::expr::ExpressionManager;
    use crate::structural::closure::TBox;
    use crate::structural::roles::RoleHierarchy;
    use crate::structural::Budget;
    use shoin_core::Iri;
    use shoin_datatypes::DatatypeModel;

    #[test]
    fn test_cyclic_existential_is_blocked() {
        let mut em = ExpressionManager::new();
        let person = em.concept(Iri::new("http://example.org/Person"));
        let has_parent = em.object_role(Iri::new("http://example.org/hasParent"));
        let some_parent = em.some(has_parent, person);
        let axioms = vec![(AxiomId(0), AxiomBody::ConceptInclusion { sub: person, sup: some_parent })];

        let roles = RoleHierarchy::build(&em, axioms.iter().map(|(id, b)| (*id, b)));
        let tbox = TBox::build(&em, axioms.iter().map(|(id, b)| (*id, b)));
        let datatypes = DatatypeModel::xsd().unwrap();
        let ctx = Context { em: &em, roles: &roles, tbox: &tbox, datatypes: &datatypes, provenance: false };
        let concepts: Vec<ExprId> = em.ids().filter(|id| em.is_concept(*id)).collect();
        let saturated = ctx.saturate(&concepts, &Budget::unlimited()).unwrap();

        let mut graph = ProofGraph::default();
        let root = graph.build(&ctx, &saturated, person).unwrap();
        assert_eq!(graph.object_roles(root, true).unwrap(), vec![has_parent]);

        let successors = graph.neighbours(root, |r| r == has_parent).unwrap();
        assert_eq!(successors.len(), 1);
        assert_eq!(graph.blocker(successors[0]).unwrap(), Some(root));
        assert!(graph.neighbours(successors[0], |_| true).unwrap().is_empty());

        assert!(matches!(
            graph.build(&ctx, &saturated, ExprId::BOTTOM),
            Err(OracleError::NoProofNode(_))
        ));
        assert!(matches!(
            graph.blocker(ProofNodeId(999)),
            Err(OracleError::UnknownProofNode(_))
        ));
    }
}
