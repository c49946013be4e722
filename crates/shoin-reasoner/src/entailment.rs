//! 含意判定
//!
//! コミット済み集合による高速経路, 新規実体ポリシー, 追跡 (正当化) を扱います。

use crate::config::FreshEntityPolicy;
use crate::session::{KnowledgeBase, Reasoner};
use crate::translation;
use crate::{ReasonerError, Result};
use shoin_core::{Axiom, AxiomType, Entity, Iri};
use shoin_kernel::{KernelOracle, OracleError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

impl<O: KernelOracle> KnowledgeBase<O> {
    /// Fresh vocabulary in an entailment query: `false` when allowed,
    /// an error naming the matching signature entities otherwise
    fn fresh_entailment(&self, iri: &Iri, signature: BTreeSet<Entity>) -> Result<bool> {
        match self.fresh_entity_policy {
            FreshEntityPolicy::Allow => {
                warn!("Entailment over fresh entity <{}> answered as not entailed", iri);
                Ok(false)
            }
            FreshEntityPolicy::Disallow => {
                let mut entities = translation::entities_named(signature.iter().cloned(), iri);
                if entities.is_empty() {
                    entities = signature.into_iter().collect();
                }
                Err(ReasonerError::FreshEntities { entities })
            }
        }
    }

    pub(crate) fn is_entailed(&mut self, axiom: &Axiom, trace: bool) -> Result<bool> {
        self.check_consistency()?;
        self.last_trace.clear();

        if let Some(committed) = self.committed.get(axiom) {
            debug!("Entailment answered from the committed axioms");
            if trace {
                self.last_trace = vec![Arc::clone(committed)];
            }
            return Ok(true);
        }

        let axiom_type = axiom.axiom_type();
        if axiom_type == AxiomType::SwrlRule {
            return Err(ReasonerError::UnsupportedEntailment(axiom_type));
        }

        let signature = axiom.signature();
        if let Some(fresh) = signature.iter().find(|entity| self.is_fresh(entity)) {
            let iri = fresh.iri().clone();
            return self.fresh_entailment(&iri, signature);
        }
        if axiom_type == AxiomType::Declaration {
            return Ok(true);
        }

        let Some(body) = self.translator().axiom(axiom) else {
            return Err(ReasonerError::UnsupportedEntailment(axiom_type));
        };
        if trace {
            self.oracle.need_tracing();
        }
        let entailed = match self.oracle.is_entailed(&body) {
            Ok(entailed) => entailed,
            Err(OracleError::Unsupported(_)) => return Err(ReasonerError::UnsupportedEntailment(axiom_type)),
            Err(OracleError::FreshEntity { iri }) => return self.fresh_entailment(&Iri::new(iri), signature),
            Err(e) => return Err(e.into()),
        };
        if trace && entailed {
            let trace = self.oracle.trace();
            self.last_trace = self.host_axioms(trace);
        }
        Ok(entailed)
    }
}

impl<O: KernelOracle> Reasoner<O> {
    /// Whether `axiom` follows from the committed axioms. Annotations are
    /// ignored.
    #[tracing::instrument(skip(self))]
    pub fn is_entailed(&self, axiom: &Axiom) -> Result<bool> {
        let tracing = self.configuration().tracing;
        self.state.lock().is_entailed(axiom, tracing)
    }

    /// Conjunction over `axioms`, stopping at the first one not entailed
    pub fn is_entailed_all<'a>(&self, axioms: impl IntoIterator<Item = &'a Axiom>) -> Result<bool> {
        let tracing = self.configuration().tracing;
        let mut kb = self.state.lock();
        for axiom in axioms {
            if !kb.is_entailed(axiom, tracing)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every axiom type except SWRL rules
    pub fn is_entailment_checking_supported(&self, axiom_type: AxiomType) -> bool {
        axiom_type != AxiomType::SwrlRule
    }

    /// Committed axioms justifying `axiom`; empty when it is not entailed
    #[tracing::instrument(skip(self))]
    pub fn trace(&self, axiom: &Axiom) -> Result<Vec<Arc<Axiom>>> {
        let mut kb = self.state.lock();
        if kb.is_entailed(axiom, true)? {
            Ok(kb.last_trace.clone())
        } else {
            Ok(Vec::new())
        }
    }

    /// Justification recorded by the most recent traced entailment
    pub fn last_trace(&self) -> Vec<Arc<Axiom>> {
        self.state.lock().last_trace.clone()
    }
}
