//! 構文的局所性に基づくモジュール抽出と原子分解

use crate::axiom::{AxiomBody, AxiomId};
use crate::expr::{Expr, ExprId, ExpressionManager};
use crate::oracle::ModuleType;
use crate::{OracleError, Result};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Locality interpretation: symbols outside the signature are read as the
/// empty concept/role (`Bottom`) or as the universal one (`Top`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Bottom,
    Top,
}

struct Checker<'a> {
    em: &'a ExpressionManager,
    signature: &'a BTreeSet<ExprId>,
    mode: Mode,
}

impl Checker<'_> {
    fn outside(&self, id: ExprId) -> bool {
        match self.em.get(id) {
            Expr::Inverse(inner) => self.outside(*inner),
            Expr::Concept(_) | Expr::ObjectRole(_) | Expr::DataRole(_) => !self.signature.contains(&id),
            _ => false,
        }
    }

    fn bot_role(&self, role: ExprId) -> bool {
        match self.em.get(role) {
            Expr::BottomObjectRole | Expr::BottomDataRole => true,
            Expr::TopObjectRole | Expr::TopDataRole => false,
            _ => self.mode == Mode::Bottom && self.outside(role),
        }
    }

    fn top_role(&self, role: ExprId) -> bool {
        match self.em.get(role) {
            Expr::TopObjectRole | Expr::TopDataRole => true,
            Expr::BottomObjectRole | Expr::BottomDataRole => false,
            _ => self.mode == Mode::Top && self.outside(role),
        }
    }

    /// Concept is ⊥ under the interpretation
    fn bot(&self, concept: ExprId) -> bool {
        match self.em.get(concept) {
            Expr::Bottom => true,
            Expr::Concept(_) => self.mode == Mode::Bottom && self.outside(concept),
            Expr::Not(inner) => self.top(*inner),
            Expr::And(items) => items.iter().any(|c| self.bot(*c)),
            Expr::Or(items) => items.iter().all(|c| self.bot(*c)),
            Expr::ObjectSome { role, filler } => self.bot_role(*role) || self.bot(*filler),
            Expr::ObjectMin { n, role, filler } | Expr::ObjectExact { n, role, filler } => {
                *n >= 1 && (self.bot_role(*role) || self.bot(*filler))
            }
            Expr::ObjectHasValue { role, .. } | Expr::DataSome { role, .. } | Expr::DataHasValue { role, .. } => {
                self.bot_role(*role)
            }
            _ => false,
        }
    }

    /// Concept is ⊤ under the interpretation
    fn top(&self, concept: ExprId) -> bool {
        match self.em.get(concept) {
            Expr::Top => true,
            Expr::Concept(_) => self.mode == Mode::Top && self.outside(concept),
            Expr::Not(inner) => self.bot(*inner),
            Expr::And(items) => items.iter().all(|c| self.top(*c)),
            Expr::Or(items) => items.iter().any(|c| self.top(*c)),
            Expr::ObjectAll { role, filler } => self.bot_role(*role) || self.top(*filler),
            Expr::ObjectMax { role, filler, .. } => self.bot_role(*role) || self.bot(*filler),
            Expr::ObjectSome { role, filler } => self.top_role(*role) && self.top(*filler),
            Expr::ObjectMin { n: 1, role, filler } => self.top_role(*role) && self.top(*filler),
            Expr::DataAll { role, range } => self.bot_role(*role) || *range == ExprId::DATA_TOP,
            Expr::DataSome { role, range } => self.top_role(*role) && *range == ExprId::DATA_TOP,
            _ => false,
        }
    }

    fn is_local(&self, body: &AxiomBody) -> bool {
        let all_bot = |items: &[ExprId]| items.iter().all(|c| self.bot(*c));
        let all_top = |items: &[ExprId]| items.iter().all(|c| self.top(*c));
        match body {
            AxiomBody::Declaration(_) => true,
            AxiomBody::ConceptInclusion { sub, sup } => self.bot(*sub) || self.top(*sup),
            AxiomBody::EquivalentConcepts(items) => all_bot(items) || all_top(items),
            AxiomBody::DisjointConcepts(items) => items.iter().filter(|c| !self.bot(**c)).count() <= 1,

            AxiomBody::ObjectRoleInclusion { sub, sup } | AxiomBody::DataRoleInclusion { sub, sup } => {
                self.bot_role(*sub) || self.top_role(*sup)
            }
            AxiomBody::EquivalentObjectRoles(roles) | AxiomBody::EquivalentDataRoles(roles) => {
                roles.iter().all(|r| self.bot_role(*r)) || roles.iter().all(|r| self.top_role(*r))
            }
            AxiomBody::DisjointObjectRoles(roles) | AxiomBody::DisjointDataRoles(roles) => {
                roles.iter().filter(|r| !self.bot_role(**r)).count() <= 1
            }
            AxiomBody::InverseObjectRoles(a, b) => {
                (self.bot_role(*a) && self.bot_role(*b)) || (self.top_role(*a) && self.top_role(*b))
            }
            AxiomBody::ObjectRoleDomain { role, domain } | AxiomBody::DataRoleDomain { role, domain } => {
                self.bot_role(*role) || self.top(*domain)
            }
            AxiomBody::ObjectRoleRange { role, range } => self.bot_role(*role) || self.top(*range),
            AxiomBody::DataRoleRange { role, range } => self.bot_role(*role) || *range == ExprId::DATA_TOP,
            AxiomBody::FunctionalObjectRole(role)
            | AxiomBody::InverseFunctionalObjectRole(role)
            | AxiomBody::FunctionalDataRole(role) => self.bot_role(*role),
            AxiomBody::TransitiveObjectRole(role) | AxiomBody::SymmetricObjectRole(role) => {
                self.bot_role(*role) || self.top_role(*role)
            }

            AxiomBody::InstanceOf { concept, .. } => self.top(*concept),
            AxiomBody::RelatedTo { role, .. } | AxiomBody::ValueOf { role, .. } => self.top_role(*role),
            AxiomBody::NotRelatedTo { role, .. } | AxiomBody::NotValueOf { role, .. } => self.bot_role(*role),
            AxiomBody::SameIndividuals(_) | AxiomBody::DifferentIndividuals(_) => false,
        }
    }
}

/// Syntactic-locality module extractor. Counts every locality check.
#[derive(Debug, Default)]
pub(crate) struct Modularizer {
    pub checks: u64,
}

impl Modularizer {
    fn local(&mut self, em: &ExpressionManager, body: &AxiomBody, signature: &BTreeSet<ExprId>, mode: Mode) -> bool {
        self.checks += 1;
        Checker { em, signature, mode }.is_local(body)
    }

    fn extract_with(
        &mut self,
        em: &ExpressionManager,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        candidates: &BTreeSet<AxiomId>,
        signature: &BTreeSet<ExprId>,
        mode: Mode,
    ) -> BTreeSet<AxiomId> {
        let mut signature = signature.clone();
        let mut module = BTreeSet::new();
        loop {
            let mut changed = false;
            for (id, body) in axioms {
                if !candidates.contains(id) || module.contains(id) {
                    continue;
                }
                if !self.local(em, body, &signature, mode) {
                    module.insert(*id);
                    signature.extend(body.signature(em));
                    changed = true;
                }
            }
            if !changed {
                return module;
            }
        }
    }

    /// Module for `signature`; the signature grows with every non-local axiom
    pub fn extract(
        &mut self,
        em: &ExpressionManager,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        signature: &BTreeSet<ExprId>,
        module_type: ModuleType,
    ) -> BTreeSet<AxiomId> {
        let all: BTreeSet<AxiomId> = axioms.keys().copied().collect();
        match module_type {
            ModuleType::Bottom => self.extract_with(em, axioms, &all, signature, Mode::Bottom),
            ModuleType::Top => self.extract_with(em, axioms, &all, signature, Mode::Top),
            ModuleType::Star => {
                let mut current = all;
                loop {
                    let bottom = self.extract_with(em, axioms, &current, signature, Mode::Bottom);
                    let next = self.extract_with(em, axioms, &bottom, signature, Mode::Top);
                    if next == current {
                        return current;
                    }
                    current = next;
                }
            }
        }
    }

    /// Axioms non-local for exactly `signature`, without growing it
    pub fn non_local(
        &mut self,
        em: &ExpressionManager,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        signature: &BTreeSet<ExprId>,
        module_type: ModuleType,
    ) -> Vec<AxiomId> {
        let mut result = Vec::new();
        for (id, body) in axioms {
            let non_local = match module_type {
                ModuleType::Bottom => !self.local(em, body, signature, Mode::Bottom),
                ModuleType::Top => !self.local(em, body, signature, Mode::Top),
                ModuleType::Star => {
                    !self.local(em, body, signature, Mode::Bottom) || !self.local(em, body, signature, Mode::Top)
                }
            };
            if non_local {
                result.push(*id);
            }
        }
        result
    }
}

#[derive(Debug, Clone)]
struct Atom {
    axioms: Vec<AxiomId>,
    module: Vec<AxiomId>,
    dependents: Vec<usize>,
}

/// Partition of the non-tautological axioms into atoms: axioms with equal
/// modules of their own signature
#[derive(Debug, Clone, Default)]
pub(crate) struct AtomicDecomposition {
    atoms: Vec<Atom>,
    tautologies: Vec<AxiomId>,
}

impl AtomicDecomposition {
    pub fn build(
        modularizer: &mut Modularizer,
        em: &ExpressionManager,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        module_type: ModuleType,
    ) -> Self {
        let mut decomposition = AtomicDecomposition::default();
        let mut by_module: BTreeMap<Vec<AxiomId>, usize> = BTreeMap::new();

        for (id, body) in axioms {
            let module = modularizer.extract(em, axioms, &body.signature(em), module_type);
            if !module.contains(id) {
                decomposition.tautologies.push(*id);
                continue;
            }
            let module: Vec<AxiomId> = module.into_iter().collect();
            let index = *by_module.entry(module.clone()).or_insert_with(|| {
                decomposition.atoms.push(Atom {
                    axioms: Vec::new(),
                    module,
                    dependents: Vec::new(),
                });
                decomposition.atoms.len() - 1
            });
            decomposition.atoms[index].axioms.push(*id);
        }

        let atoms = decomposition.atoms.clone();
        for (i, atom) in decomposition.atoms.iter_mut().enumerate() {
            atom.dependents = atoms
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.axioms.iter().all(|a| atom.module.contains(a)))
                .map(|(j, _)| j)
                .collect();
        }

        debug!(
            "Atomic decomposition: {} atoms, {} tautologies",
            decomposition.atoms.len(),
            decomposition.tautologies.len()
        );
        decomposition
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    fn atom(&self, index: usize) -> Result<&Atom> {
        self.atoms.get(index).ok_or(OracleError::AtomIndexOutOfRange {
            index,
            size: self.atoms.len(),
        })
    }

    pub fn atom_axioms(&self, index: usize) -> Result<Vec<AxiomId>> {
        Ok(self.atom(index)?.axioms.clone())
    }

    pub fn atom_module(&self, index: usize) -> Result<Vec<AxiomId>> {
        Ok(self.atom(index)?.module.clone())
    }

    pub fn atom_dependents(&self, index: usize) -> Result<Vec<usize>> {
        Ok(self.atom(index)?.dependents.clone())
    }

    pub fn tautologies(&self) -> &[AxiomId] {
        &self.tautologies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::Iri;

    fn chain() -> (ExpressionManager, IndexMap<AxiomId, AxiomBody>, [ExprId; 3]) {
        let mut em = ExpressionManager::new();
        let a = em.concept(Iri::new("http://example.org/A"));
        let b = em.concept(Iri::new("http://example.org/B"));
        let c = em.concept(Iri::new("http://example.org/C"));
        let mut axioms = IndexMap::new();
        axioms.insert(AxiomId(0), AxiomBody::ConceptInclusion { sub: a, sup: b });
        axioms.insert(AxiomId(1), AxiomBody::ConceptInclusion { sub: b, sup: c });
        axioms.insert(AxiomId(2), AxiomBody::Declaration(c));
        (em, axioms, [a, b, c])
    }

    #[test]
    fn test_bottom_module_follows_superclasses() {
        let (em, axioms, [a, b, c]) = chain();
        let mut modularizer = Modularizer::default();

        let module = modularizer.extract(&em, &axioms, &BTreeSet::from([a]), ModuleType::Bottom);
        assert_eq!(module, BTreeSet::from([AxiomId(0), AxiomId(1)]));

        let module = modularizer.extract(&em, &axioms, &BTreeSet::from([c]), ModuleType::Bottom);
        assert!(module.is_empty(), "nothing below C is in the signature");

        let module = modularizer.extract(&em, &axioms, &BTreeSet::from([b]), ModuleType::Top);
        assert_eq!(module, BTreeSet::from([AxiomId(0)]));
        assert!(modularizer.checks > 0);
    }

    #[test]
    fn test_decomposition_dependencies() {
        let (em, axioms, _) = chain();
        let mut modularizer = Modularizer::default();
        let ad = AtomicDecomposition::build(&mut modularizer, &em, &axioms, ModuleType::Bottom);

        assert_eq!(ad.tautologies(), &[AxiomId(2)]);
        assert_eq!(ad.len(), 2);
        // atom of A ⊑ B depends on the atom of B ⊑ C
        assert_eq!(ad.atom_axioms(0).unwrap(), vec![AxiomId(0)]);
        assert_eq!(ad.atom_dependents(0).unwrap(), vec![1]);
        assert!(ad.atom_dependents(1).unwrap().is_empty());
        assert!(matches!(ad.atom_module(5), Err(OracleError::AtomIndexOutOfRange { index: 5, size: 2 })));
    }
}
