//! オラクル契約

use crate::axiom::{AxiomBody, AxiomId};
use crate::expr::{ExprId, ExpressionManager};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation token. Cloned into the session at construction
/// and into the oracle; setting it from any thread makes every subsequent
/// consistency-dependent call fail with an interruption.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Locality notion used for module extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    /// ⊤-locality
    Top,
    /// ⊥-locality
    Bottom,
    /// ⊥ and ⊤ alternated to a fixpoint
    Star,
}

/// Handle of a node in the oracle's proof graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ProofNodeId(pub usize);

impl std::fmt::Display for ProofNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Receives taxonomy vertices (synonym sets) from a hierarchy query.
/// Returns true if the vertex was accepted.
pub trait TaxonomyActor {
    fn apply(&mut self, vertex: &[ExprId], em: &ExpressionManager) -> bool;
}

/// What the session requires from the decision procedure.
///
/// Taxonomy queries stream their results into a [`TaxonomyActor`]; the
/// caller never sees the oracle's internal hierarchy. `direct` selects the
/// immediate level instead of the transitive closure.
pub trait KernelOracle: Send {
    /// Drops every loaded axiom and all derived state
    fn clear(&mut self);

    fn load_axiom(&mut self, body: AxiomBody) -> Result<AxiomId>;

    fn load_axioms(&mut self, bodies: Vec<AxiomBody>) -> Result<Vec<AxiomId>> {
        bodies.into_iter().map(|body| self.load_axiom(body)).collect()
    }

    fn retract_axiom(&mut self, id: AxiomId) -> Result<()>;

    /// `Ok(false)` or `Err(Inconsistent)` both report an inconsistent KB
    fn is_consistent(&mut self) -> Result<bool>;

    fn is_satisfiable(&mut self, concept: ExprId) -> Result<bool>;

    fn is_subsumed_by(&mut self, sub: ExprId, sup: ExprId) -> Result<bool>;

    // concept taxonomy
    fn equivalent_concepts(&mut self, concept: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn sub_concepts(&mut self, concept: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn super_concepts(&mut self, concept: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn disjoint_concepts(&mut self, concept: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;

    // object role taxonomy
    fn equivalent_object_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn sub_object_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn super_object_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn disjoint_object_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;

    // data role taxonomy
    fn equivalent_data_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn sub_data_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn super_data_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn disjoint_data_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;

    // individuals
    fn instances(&mut self, concept: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn types(&mut self, individual: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn same_as(&mut self, individual: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()>;
    fn role_fillers(&mut self, individual: ExprId, role: ExprId) -> Result<Vec<ExprId>>;
    /// Literal handles related to `individual` through `role` or a sub-role
    fn data_fillers(&mut self, individual: ExprId, role: ExprId) -> Result<Vec<ExprId>>;
    fn realize(&mut self) -> Result<()>;
    fn is_realized(&self) -> bool;

    /// Entailment of an axiom that is not necessarily loaded.
    /// `Err(Unsupported)` when the axiom kind has no query.
    fn is_entailed(&mut self, body: &AxiomBody) -> Result<bool>;

    // proof graph exploration
    fn build_proof_node(&mut self, concept: ExprId) -> Result<ProofNodeId>;
    /// Roles labelling the outgoing object edges of `node`
    fn object_roles(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>>;
    /// Roles labelling the outgoing data edges of `node`
    fn data_roles(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>>;
    /// Successors via `role` or one of its sub-roles
    fn neighbours(&self, node: ProofNodeId, role: ExprId) -> Result<Vec<ProofNodeId>>;
    fn object_label(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>>;
    fn data_label(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>>;
    fn blocker(&self, node: ProofNodeId) -> Result<Option<ProofNodeId>>;

    // modules and atomic decomposition
    fn module(&mut self, signature: &[ExprId], use_semantic: bool, module_type: ModuleType) -> Result<Vec<AxiomId>>;
    fn non_local(&mut self, signature: &[ExprId], use_semantic: bool, module_type: ModuleType) -> Result<Vec<AxiomId>>;
    fn atomic_decomposition_size(&mut self, use_semantic: bool, module_type: ModuleType) -> Result<usize>;
    fn atom_axioms(&self, index: usize) -> Result<Vec<AxiomId>>;
    fn atom_module(&self, index: usize) -> Result<Vec<AxiomId>>;
    /// Atoms the atom at `index` depends on
    fn atom_dependents(&self, index: usize) -> Result<Vec<usize>>;
    fn tautologies(&self) -> Result<Vec<AxiomId>>;
    fn loc_check_number(&self) -> u64;

    // justification of the last entailment
    fn need_tracing(&mut self);
    fn trace(&self) -> Vec<AxiomId>;

    fn set_interrupt_flag(&mut self, flag: InterruptFlag);
    fn set_timeout(&mut self, timeout_ms: Option<u64>);

    fn expression_manager(&self) -> &ExpressionManager;
    fn expression_manager_mut(&mut self) -> &mut ExpressionManager;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_flag_is_shared() {
        let flag = InterruptFlag::new();
        let other = flag.clone();
        assert!(!other.is_set());
        flag.interrupt();
        assert!(other.is_set(), "clones observe the same flag");
    }
}
