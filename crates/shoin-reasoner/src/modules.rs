//! モジュール抽出と原子分解
//!
//! 構文的な操作なので不整合な知識ベースでも使えます。割り込みだけを確認します。

use crate::session::{KnowledgeBase, Reasoner};
use crate::{ReasonerError, Result};
use shoin_core::{Axiom, Entity};
use shoin_kernel::{AxiomId, ExprId, KernelOracle, ModuleType};
use std::sync::Arc;
use tracing::info;

impl<O: KernelOracle> KnowledgeBase<O> {
    fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.is_set() {
            return Err(ReasonerError::Interrupted);
        }
        Ok(())
    }

    fn signature_handles(&mut self, signature: &[Entity]) -> Vec<ExprId> {
        let mut translator = self.translator();
        signature.iter().map(|entity| translator.entity(entity)).collect()
    }
}

impl<O: KernelOracle> Reasoner<O> {
    /// Committed axioms preserving every entailment over `signature`
    #[tracing::instrument(skip(self))]
    pub fn module(&self, signature: &[Entity], use_semantic: bool, module_type: ModuleType) -> Result<Vec<Arc<Axiom>>> {
        let mut kb = self.state.lock();
        kb.check_interrupt()?;
        let handles = kb.signature_handles(signature);
        let ids = kb.oracle.module(&handles, use_semantic, module_type)?;
        info!("Module over {} entities has {} axioms", signature.len(), ids.len());
        Ok(kb.host_axioms(ids))
    }

    /// Committed axioms not local with respect to `signature`
    #[tracing::instrument(skip(self))]
    pub fn non_local(
        &self,
        signature: &[Entity],
        use_semantic: bool,
        module_type: ModuleType,
    ) -> Result<Vec<Arc<Axiom>>> {
        let mut kb = self.state.lock();
        kb.check_interrupt()?;
        let handles = kb.signature_handles(signature);
        let ids = kb.oracle.non_local(&handles, use_semantic, module_type)?;
        Ok(kb.host_axioms(ids))
    }

    /// Computes the atomic decomposition the atom accessors read from
    #[tracing::instrument(skip(self))]
    pub fn atomic_decomposition_size(&self, use_semantic: bool, module_type: ModuleType) -> Result<usize> {
        let mut kb = self.state.lock();
        kb.check_interrupt()?;
        let size = kb.oracle.atomic_decomposition_size(use_semantic, module_type)?;
        info!("Atomic decomposition has {} atoms", size);
        Ok(size)
    }

    pub fn atom_axioms(&self, index: usize) -> Result<Vec<Arc<Axiom>>> {
        let kb = self.state.lock();
        let ids = kb.oracle.atom_axioms(index)?;
        Ok(kb.host_axioms(ids))
    }

    pub fn atom_module(&self, index: usize) -> Result<Vec<Arc<Axiom>>> {
        let kb = self.state.lock();
        let ids = kb.oracle.atom_module(index)?;
        Ok(kb.host_axioms(ids))
    }

    /// Indices of the atoms the atom at `index` depends on
    pub fn atom_dependents(&self, index: usize) -> Result<Vec<usize>> {
        Ok(self.state.lock().oracle.atom_dependents(index)?)
    }

    pub fn tautologies(&self) -> Result<Vec<Arc<Axiom>>> {
        let kb = self.state.lock();
        let ids: Vec<AxiomId> = kb.oracle.tautologies()?;
        Ok(kb.host_axioms(ids))
    }

    /// Locality checks performed while decomposing
    pub fn locality_check_count(&self) -> u64 {
        self.state.lock().oracle.loc_check_number()
    }
}
