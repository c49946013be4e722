//! カーネル公理

use crate::expr::{ExprId, ExpressionManager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Handle of a loaded kernel axiom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AxiomId(pub u64);

impl std::fmt::Display for AxiomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ax{}", self.0)
    }
}

/// Logical content of a kernel axiom, over interned expressions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxiomBody {
    Declaration(ExprId),

    ConceptInclusion { sub: ExprId, sup: ExprId },
    EquivalentConcepts(Vec<ExprId>),
    DisjointConcepts(Vec<ExprId>),

    ObjectRoleInclusion { sub: ExprId, sup: ExprId },
    EquivalentObjectRoles(Vec<ExprId>),
    DisjointObjectRoles(Vec<ExprId>),
    InverseObjectRoles(ExprId, ExprId),
    ObjectRoleDomain { role: ExprId, domain: ExprId },
    ObjectRoleRange { role: ExprId, range: ExprId },
    FunctionalObjectRole(ExprId),
    InverseFunctionalObjectRole(ExprId),
    TransitiveObjectRole(ExprId),
    SymmetricObjectRole(ExprId),

    DataRoleInclusion { sub: ExprId, sup: ExprId },
    EquivalentDataRoles(Vec<ExprId>),
    DisjointDataRoles(Vec<ExprId>),
    DataRoleDomain { role: ExprId, domain: ExprId },
    DataRoleRange { role: ExprId, range: ExprId },
    FunctionalDataRole(ExprId),

    InstanceOf { individual: ExprId, concept: ExprId },
    RelatedTo { from: ExprId, role: ExprId, to: ExprId },
    NotRelatedTo { from: ExprId, role: ExprId, to: ExprId },
    ValueOf { individual: ExprId, role: ExprId, value: ExprId },
    NotValueOf { individual: ExprId, role: ExprId, value: ExprId },
    SameIndividuals(Vec<ExprId>),
    DifferentIndividuals(Vec<ExprId>),
}

impl AxiomBody {
    /// Top-level expressions the axiom mentions
    pub fn operands(&self) -> Vec<ExprId> {
        match self {
            AxiomBody::Declaration(e)
            | AxiomBody::FunctionalObjectRole(e)
            | AxiomBody::InverseFunctionalObjectRole(e)
            | AxiomBody::TransitiveObjectRole(e)
            | AxiomBody::SymmetricObjectRole(e)
            | AxiomBody::FunctionalDataRole(e) => vec![*e],
            AxiomBody::ConceptInclusion { sub, sup }
            | AxiomBody::ObjectRoleInclusion { sub, sup }
            | AxiomBody::DataRoleInclusion { sub, sup } => vec![*sub, *sup],
            AxiomBody::EquivalentConcepts(items)
            | AxiomBody::DisjointConcepts(items)
            | AxiomBody::EquivalentObjectRoles(items)
            | AxiomBody::DisjointObjectRoles(items)
            | AxiomBody::EquivalentDataRoles(items)
            | AxiomBody::DisjointDataRoles(items)
            | AxiomBody::SameIndividuals(items)
            | AxiomBody::DifferentIndividuals(items) => items.clone(),
            AxiomBody::InverseObjectRoles(a, b) => vec![*a, *b],
            AxiomBody::ObjectRoleDomain { role, domain }
            | AxiomBody::DataRoleDomain { role, domain } => vec![*role, *domain],
            AxiomBody::ObjectRoleRange { role, range }
            | AxiomBody::DataRoleRange { role, range } => vec![*role, *range],
            AxiomBody::InstanceOf { individual, concept } => vec![*individual, *concept],
            AxiomBody::RelatedTo { from, role, to } | AxiomBody::NotRelatedTo { from, role, to } => {
                vec![*from, *role, *to]
            }
            AxiomBody::ValueOf { individual, role, value }
            | AxiomBody::NotValueOf { individual, role, value } => vec![*individual, *role, *value],
        }
    }

    /// Named entities of the axiom, as handles
    pub fn signature(&self, em: &ExpressionManager) -> BTreeSet<ExprId> {
        let mut signature = BTreeSet::new();
        for operand in self.operands() {
            em.collect_signature(operand, &mut signature);
        }
        signature
    }

    /// Object roles whose inverses the kernel needs interned
    pub fn object_roles(&self, em: &ExpressionManager) -> Vec<ExprId> {
        self.signature(em)
            .into_iter()
            .filter(|id| em.is_object_role(*id))
            .collect()
    }
}
