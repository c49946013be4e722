//! ロール階層

use crate::axiom::{AxiomBody, AxiomId};
use crate::expr::{Expr, ExprId, ExpressionManager};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Told role hierarchy over object and data roles. Inverse edges are added
/// for every object role inclusion, so R ⊑ S also yields R⁻ ⊑ S⁻.
#[derive(Debug, Default)]
pub(crate) struct RoleHierarchy {
    edges: HashMap<ExprId, Vec<(ExprId, AxiomId)>>,
    /// Reflexive-transitive super-roles
    supers: HashMap<ExprId, BTreeSet<ExprId>>,
    pub transitive: BTreeSet<ExprId>,
    pub functional: BTreeSet<ExprId>,
    pub data_functional: BTreeSet<ExprId>,
    pub disjoint: BTreeSet<(ExprId, ExprId)>,
    /// Told data ranges per data role
    pub data_ranges: HashMap<ExprId, Vec<(ExprId, AxiomId)>>,
}

impl RoleHierarchy {
    pub fn build<'a>(
        em: &ExpressionManager,
        axioms: impl Iterator<Item = (AxiomId, &'a AxiomBody)>,
    ) -> Self {
        let mut hierarchy = RoleHierarchy::default();
        let inv = |r: ExprId| em.inverse_of(r);

        for (id, body) in axioms {
            match body {
                AxiomBody::ObjectRoleInclusion { sub, sup } => {
                    hierarchy.add_object_edge(em, *sub, *sup, id);
                }
                AxiomBody::EquivalentObjectRoles(roles) => {
                    for a in roles {
                        for b in roles {
                            if a != b {
                                hierarchy.add_object_edge(em, *a, *b, id);
                            }
                        }
                    }
                }
                AxiomBody::InverseObjectRoles(a, b) => {
                    if let Some(inv_b) = inv(*b) {
                        hierarchy.add_object_edge(em, *a, inv_b, id);
                        hierarchy.add_object_edge(em, inv_b, *a, id);
                    }
                }
                AxiomBody::SymmetricObjectRole(r) => {
                    if let Some(inv_r) = inv(*r) {
                        hierarchy.add_object_edge(em, *r, inv_r, id);
                        hierarchy.add_object_edge(em, inv_r, *r, id);
                    }
                }
                AxiomBody::TransitiveObjectRole(r) => {
                    hierarchy.transitive.insert(*r);
                    if let Some(inv_r) = inv(*r) {
                        hierarchy.transitive.insert(inv_r);
                    }
                }
                AxiomBody::FunctionalObjectRole(r) => {
                    hierarchy.functional.insert(*r);
                }
                AxiomBody::InverseFunctionalObjectRole(r) => {
                    if let Some(inv_r) = inv(*r) {
                        hierarchy.functional.insert(inv_r);
                    }
                }
                AxiomBody::DisjointObjectRoles(roles) | AxiomBody::DisjointDataRoles(roles) => {
                    for a in roles {
                        for b in roles {
                            if a != b {
                                hierarchy.disjoint.insert((*a, *b));
                            }
                        }
                    }
                }
                AxiomBody::DataRoleInclusion { sub, sup } => {
                    hierarchy.add_edge(*sub, *sup, id);
                }
                AxiomBody::EquivalentDataRoles(roles) => {
                    for a in roles {
                        for b in roles {
                            if a != b {
                                hierarchy.add_edge(*a, *b, id);
                            }
                        }
                    }
                }
                AxiomBody::FunctionalDataRole(r) => {
                    hierarchy.data_functional.insert(*r);
                }
                AxiomBody::DataRoleRange { role, range } => {
                    hierarchy.data_ranges.entry(*role).or_default().push((*range, id));
                }
                _ => {}
            }
        }

        let roles: Vec<ExprId> = em
            .ids()
            .filter(|id| em.is_object_role(*id) || em.is_data_role(*id))
            .collect();
        for role in roles {
            let closure = hierarchy.reachable(role);
            hierarchy.supers.insert(role, closure);
        }

        hierarchy
    }

    fn add_object_edge(&mut self, em: &ExpressionManager, sub: ExprId, sup: ExprId, id: AxiomId) {
        self.add_edge(sub, sup, id);
        if let (Some(inv_sub), Some(inv_sup)) = (em.inverse_of(sub), em.inverse_of(sup)) {
            self.add_edge(inv_sub, inv_sup, id);
        }
    }

    fn add_edge(&mut self, sub: ExprId, sup: ExprId, id: AxiomId) {
        self.edges.entry(sub).or_default().push((sup, id));
    }

    fn reachable(&self, role: ExprId) -> BTreeSet<ExprId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([role]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            for (sup, _) in self.edges.get(&current).into_iter().flatten() {
                queue.push_back(*sup);
            }
        }
        seen
    }

    /// R ⊑ S over the told hierarchy, with the universal and empty roles
    pub fn is_sub(&self, em: &ExpressionManager, sub: ExprId, sup: ExprId) -> bool {
        if sub == sup {
            return true;
        }
        match (em.get(sub), em.get(sup)) {
            (_, Expr::TopObjectRole) | (_, Expr::TopDataRole) => return true,
            (Expr::BottomObjectRole, _) | (Expr::BottomDataRole, _) => return true,
            _ => {}
        }
        match self.supers.get(&sub) {
            Some(supers) => {
                supers.contains(&sup)
                    || supers.contains(&ExprId::BOTTOM_OBJECT_ROLE)
                    || supers.contains(&ExprId::BOTTOM_DATA_ROLE)
            }
            None => self.reachable(sub).contains(&sup),
        }
    }

    /// Reflexive-transitive super-roles of `role`
    pub fn supers_of(&self, role: ExprId) -> BTreeSet<ExprId> {
        self.supers
            .get(&role)
            .cloned()
            .unwrap_or_else(|| self.reachable(role))
    }

    /// Axioms along one inclusion path from `sub` to `sup`
    pub fn path(&self, sub: ExprId, sup: ExprId) -> Vec<AxiomId> {
        let mut parent: HashMap<ExprId, (ExprId, AxiomId)> = HashMap::new();
        let mut seen = BTreeSet::from([sub]);
        let mut queue = VecDeque::from([sub]);
        while let Some(current) = queue.pop_front() {
            if current == sup {
                let mut trace = Vec::new();
                let mut at = current;
                while let Some((prev, axiom)) = parent.get(&at) {
                    trace.push(*axiom);
                    at = *prev;
                }
                trace.reverse();
                return trace;
            }
            for (next, axiom) in self.edges.get(&current).into_iter().flatten() {
                if seen.insert(*next) {
                    parent.insert(*next, (current, *axiom));
                    queue.push_back(*next);
                }
            }
        }
        Vec::new()
    }

    pub fn is_functional(&self, em: &ExpressionManager, role: ExprId) -> bool {
        self.functional
            .iter()
            .chain(self.data_functional.iter())
            .any(|f| self.is_sub(em, role, *f))
    }

    pub fn is_transitive(&self, em: &ExpressionManager, role: ExprId) -> bool {
        self.transitive
            .iter()
            .any(|t| self.is_sub(em, role, *t) && self.is_sub(em, *t, role))
    }

    /// Told disjointness inherited down the hierarchy
    pub fn are_disjoint(&self, em: &ExpressionManager, a: ExprId, b: ExprId) -> bool {
        self.disjoint
            .iter()
            .any(|(x, y)| self.is_sub(em, a, *x) && self.is_sub(em, b, *y))
    }

    /// Told ranges of `role` and of every super-role
    pub fn ranges_of(&self, role: ExprId) -> Vec<(ExprId, AxiomId)> {
        self.supers_of(role)
            .iter()
            .flat_map(|r| self.data_ranges.get(r).into_iter().flatten().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::Iri;

    #[test]
    fn test_inclusion_is_mirrored_on_inverses() {
        let mut em = ExpressionManager::new();
        let r = em.object_role(Iri::new("http://example.org/hasParent"));
        let s = em.object_role(Iri::new("http://example.org/hasAncestor"));
        let inv_r = em.inverse(r);
        let inv_s = em.inverse(s);

        let axioms = vec![(AxiomId(0), AxiomBody::ObjectRoleInclusion { sub: r, sup: s })];
        let roles = RoleHierarchy::build(&em, axioms.iter().map(|(id, body)| (*id, body)));

        assert!(roles.is_sub(&em, r, s));
        assert!(roles.is_sub(&em, inv_r, inv_s));
        assert!(!roles.is_sub(&em, s, r));
        assert!(roles.is_sub(&em, s, ExprId::TOP_OBJECT_ROLE));
        assert_eq!(roles.path(r, s), vec![AxiomId(0)]);
    }

    #[test]
    fn test_symmetric_role_is_its_own_inverse() {
        let mut em = ExpressionManager::new();
        let r = em.object_role(Iri::new("http://example.org/marriedTo"));
        let inv_r = em.inverse(r);

        let axioms = vec![(AxiomId(7), AxiomBody::SymmetricObjectRole(r))];
        let roles = RoleHierarchy::build(&em, axioms.iter().map(|(id, body)| (*id, body)));
        assert!(roles.is_sub(&em, r, inv_r) && roles.is_sub(&em, inv_r, r));
    }
}
