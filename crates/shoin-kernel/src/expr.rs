//! 重複排除された式空間

use serde::{Deserialize, Serialize};
use shoin_core::Iri;
use std::collections::{BTreeSet, HashMap};

/// Handle of an interned expression. Two handles from the same manager are
/// equal iff the expressions are structurally equal after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ExprId(u32);

impl ExprId {
    pub const TOP: ExprId = ExprId(0);
    pub const BOTTOM: ExprId = ExprId(1);
    pub const TOP_OBJECT_ROLE: ExprId = ExprId(2);
    pub const BOTTOM_OBJECT_ROLE: ExprId = ExprId(3);
    pub const TOP_DATA_ROLE: ExprId = ExprId(4);
    pub const BOTTOM_DATA_ROLE: ExprId = ExprId(5);
    pub const DATA_TOP: ExprId = ExprId(6);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kernel-level expression. Children are handles into the same manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    // concepts
    Top,
    Bottom,
    Concept(Iri),
    Not(ExprId),
    And(Vec<ExprId>),
    Or(Vec<ExprId>),
    OneOf(Vec<ExprId>),
    ObjectSome { role: ExprId, filler: ExprId },
    ObjectAll { role: ExprId, filler: ExprId },
    ObjectHasValue { role: ExprId, individual: ExprId },
    ObjectMin { n: u32, role: ExprId, filler: ExprId },
    ObjectMax { n: u32, role: ExprId, filler: ExprId },
    ObjectExact { n: u32, role: ExprId, filler: ExprId },
    DataSome { role: ExprId, range: ExprId },
    DataAll { role: ExprId, range: ExprId },
    DataHasValue { role: ExprId, value: ExprId },

    // individuals
    Individual(Iri),

    // object roles
    TopObjectRole,
    BottomObjectRole,
    ObjectRole(Iri),
    Inverse(ExprId),

    // data roles
    TopDataRole,
    BottomDataRole,
    DataRole(Iri),

    // data ranges and values
    DataTop,
    Datatype(Iri),
    DataOneOf(Vec<ExprId>),
    Literal { lexical: String, datatype: Iri },
    DataNot(ExprId),
    DatatypeRestriction { datatype: Iri, facets: Vec<(String, ExprId)> },
}

/// Arena of interned expressions
#[derive(Debug, Clone)]
pub struct ExpressionManager {
    exprs: Vec<Expr>,
    index: HashMap<Expr, ExprId>,
}

impl Default for ExpressionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionManager {
    pub fn new() -> Self {
        let mut em = Self {
            exprs: Vec::new(),
            index: HashMap::new(),
        };
        // order matches the ExprId constants
        em.intern(Expr::Top);
        em.intern(Expr::Bottom);
        em.intern(Expr::TopObjectRole);
        em.intern(Expr::BottomObjectRole);
        em.intern(Expr::TopDataRole);
        em.intern(Expr::BottomDataRole);
        em.intern(Expr::DataTop);
        em
    }

    /// Interns `expr` as is; prefer the normalizing constructors below
    pub fn intern(&mut self, expr: Expr) -> ExprId {
        if let Some(id) = self.index.get(&expr) {
            return *id;
        }
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr.clone());
        self.index.insert(expr, id);
        id
    }

    pub fn find(&self, expr: &Expr) -> Option<ExprId> {
        self.index.get(expr).copied()
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ExprId> {
        (0..self.exprs.len() as u32).map(ExprId)
    }

    // ---- concepts ----

    pub fn top(&self) -> ExprId {
        ExprId::TOP
    }

    pub fn bottom(&self) -> ExprId {
        ExprId::BOTTOM
    }

    pub fn concept(&mut self, iri: Iri) -> ExprId {
        self.intern(Expr::Concept(iri))
    }

    pub fn not(&mut self, concept: ExprId) -> ExprId {
        match self.get(concept) {
            Expr::Top => ExprId::BOTTOM,
            Expr::Bottom => ExprId::TOP,
            Expr::Not(inner) => *inner,
            _ => self.intern(Expr::Not(concept)),
        }
    }

    pub fn and(&mut self, concepts: Vec<ExprId>) -> ExprId {
        let mut flat = BTreeSet::new();
        for c in concepts {
            match self.get(c) {
                Expr::Top => {}
                Expr::Bottom => return ExprId::BOTTOM,
                Expr::And(inner) => flat.extend(inner.iter().copied()),
                _ => {
                    flat.insert(c);
                }
            }
        }
        match flat.len() {
            0 => ExprId::TOP,
            1 => flat.into_iter().next().unwrap_or(ExprId::TOP),
            _ => self.intern(Expr::And(flat.into_iter().collect())),
        }
    }

    pub fn or(&mut self, concepts: Vec<ExprId>) -> ExprId {
        let mut flat = BTreeSet::new();
        for c in concepts {
            match self.get(c) {
                Expr::Bottom => {}
                Expr::Top => return ExprId::TOP,
                Expr::Or(inner) => flat.extend(inner.iter().copied()),
                _ => {
                    flat.insert(c);
                }
            }
        }
        match flat.len() {
            0 => ExprId::BOTTOM,
            1 => flat.into_iter().next().unwrap_or(ExprId::BOTTOM),
            _ => self.intern(Expr::Or(flat.into_iter().collect())),
        }
    }

    pub fn one_of(&mut self, individuals: Vec<ExprId>) -> ExprId {
        let set: BTreeSet<ExprId> = individuals.into_iter().collect();
        if set.is_empty() {
            return ExprId::BOTTOM;
        }
        self.intern(Expr::OneOf(set.into_iter().collect()))
    }

    pub fn some(&mut self, role: ExprId, filler: ExprId) -> ExprId {
        if filler == ExprId::BOTTOM || role == ExprId::BOTTOM_OBJECT_ROLE {
            return ExprId::BOTTOM;
        }
        self.intern(Expr::ObjectSome { role, filler })
    }

    pub fn all(&mut self, role: ExprId, filler: ExprId) -> ExprId {
        if filler == ExprId::TOP || role == ExprId::BOTTOM_OBJECT_ROLE {
            return ExprId::TOP;
        }
        self.intern(Expr::ObjectAll { role, filler })
    }

    pub fn has_value(&mut self, role: ExprId, individual: ExprId) -> ExprId {
        self.intern(Expr::ObjectHasValue { role, individual })
    }

    pub fn min(&mut self, n: u32, role: ExprId, filler: ExprId) -> ExprId {
        if n == 0 {
            return ExprId::TOP;
        }
        self.intern(Expr::ObjectMin { n, role, filler })
    }

    pub fn max(&mut self, n: u32, role: ExprId, filler: ExprId) -> ExprId {
        self.intern(Expr::ObjectMax { n, role, filler })
    }

    pub fn exact(&mut self, n: u32, role: ExprId, filler: ExprId) -> ExprId {
        self.intern(Expr::ObjectExact { n, role, filler })
    }

    pub fn data_some(&mut self, role: ExprId, range: ExprId) -> ExprId {
        if role == ExprId::BOTTOM_DATA_ROLE {
            return ExprId::BOTTOM;
        }
        self.intern(Expr::DataSome { role, range })
    }

    pub fn data_all(&mut self, role: ExprId, range: ExprId) -> ExprId {
        if range == ExprId::DATA_TOP || role == ExprId::BOTTOM_DATA_ROLE {
            return ExprId::TOP;
        }
        self.intern(Expr::DataAll { role, range })
    }

    pub fn data_has_value(&mut self, role: ExprId, value: ExprId) -> ExprId {
        self.intern(Expr::DataHasValue { role, value })
    }

    // ---- individuals ----

    pub fn individual(&mut self, iri: Iri) -> ExprId {
        self.intern(Expr::Individual(iri))
    }

    // ---- roles ----

    pub fn object_role(&mut self, iri: Iri) -> ExprId {
        self.intern(Expr::ObjectRole(iri))
    }

    /// R⁻ with (R⁻)⁻ = R; the universal and empty roles are their own inverse
    pub fn inverse(&mut self, role: ExprId) -> ExprId {
        match self.get(role) {
            Expr::Inverse(inner) => *inner,
            Expr::TopObjectRole | Expr::BottomObjectRole => role,
            _ => self.intern(Expr::Inverse(role)),
        }
    }

    /// Non-interning inverse lookup
    pub fn inverse_of(&self, role: ExprId) -> Option<ExprId> {
        match self.get(role) {
            Expr::Inverse(inner) => Some(*inner),
            Expr::TopObjectRole | Expr::BottomObjectRole => Some(role),
            Expr::ObjectRole(_) => self.find(&Expr::Inverse(role)),
            _ => None,
        }
    }

    pub fn data_role(&mut self, iri: Iri) -> ExprId {
        self.intern(Expr::DataRole(iri))
    }

    // ---- data ----

    pub fn datatype(&mut self, iri: Iri) -> ExprId {
        if iri.as_str() == shoin_core::vocabulary::RDFS_LITERAL {
            return ExprId::DATA_TOP;
        }
        self.intern(Expr::Datatype(iri))
    }

    pub fn literal(&mut self, lexical: impl Into<String>, datatype: Iri) -> ExprId {
        self.intern(Expr::Literal {
            lexical: lexical.into(),
            datatype,
        })
    }

    pub fn data_one_of(&mut self, values: Vec<ExprId>) -> ExprId {
        self.intern(Expr::DataOneOf(values))
    }

    pub fn data_not(&mut self, range: ExprId) -> ExprId {
        match self.get(range) {
            Expr::DataNot(inner) => *inner,
            _ => self.intern(Expr::DataNot(range)),
        }
    }

    pub fn datatype_restriction(&mut self, datatype: Iri, facets: Vec<(String, ExprId)>) -> ExprId {
        if facets.is_empty() {
            return self.datatype(datatype);
        }
        self.intern(Expr::DatatypeRestriction { datatype, facets })
    }

    // ---- classification of handles ----

    pub fn is_concept(&self, id: ExprId) -> bool {
        matches!(
            self.get(id),
            Expr::Top
                | Expr::Bottom
                | Expr::Concept(_)
                | Expr::Not(_)
                | Expr::And(_)
                | Expr::Or(_)
                | Expr::OneOf(_)
                | Expr::ObjectSome { .. }
                | Expr::ObjectAll { .. }
                | Expr::ObjectHasValue { .. }
                | Expr::ObjectMin { .. }
                | Expr::ObjectMax { .. }
                | Expr::ObjectExact { .. }
                | Expr::DataSome { .. }
                | Expr::DataAll { .. }
                | Expr::DataHasValue { .. }
        )
    }

    /// Top, bottom or a concept name
    pub fn is_concept_name(&self, id: ExprId) -> bool {
        matches!(self.get(id), Expr::Top | Expr::Bottom | Expr::Concept(_))
    }

    pub fn is_object_role(&self, id: ExprId) -> bool {
        matches!(
            self.get(id),
            Expr::TopObjectRole | Expr::BottomObjectRole | Expr::ObjectRole(_) | Expr::Inverse(_)
        )
    }

    pub fn is_data_role(&self, id: ExprId) -> bool {
        matches!(self.get(id), Expr::TopDataRole | Expr::BottomDataRole | Expr::DataRole(_))
    }

    pub fn is_individual(&self, id: ExprId) -> bool {
        matches!(self.get(id), Expr::Individual(_))
    }

    pub fn is_literal(&self, id: ExprId) -> bool {
        matches!(self.get(id), Expr::Literal { .. })
    }

    /// IRI of a named concept, role, individual or datatype
    pub fn name(&self, id: ExprId) -> Option<&Iri> {
        match self.get(id) {
            Expr::Concept(iri)
            | Expr::ObjectRole(iri)
            | Expr::DataRole(iri)
            | Expr::Individual(iri)
            | Expr::Datatype(iri) => Some(iri),
            _ => None,
        }
    }

    /// Named concepts, roles and individuals occurring in `id`
    pub fn collect_signature(&self, id: ExprId, signature: &mut BTreeSet<ExprId>) {
        match self.get(id) {
            Expr::Concept(_) | Expr::ObjectRole(_) | Expr::DataRole(_) | Expr::Individual(_) => {
                signature.insert(id);
            }
            Expr::Not(inner) | Expr::Inverse(inner) | Expr::DataNot(inner) => {
                self.collect_signature(*inner, signature);
            }
            Expr::And(items) | Expr::Or(items) | Expr::OneOf(items) | Expr::DataOneOf(items) => {
                for item in items {
                    self.collect_signature(*item, signature);
                }
            }
            Expr::ObjectSome { role, filler }
            | Expr::ObjectAll { role, filler }
            | Expr::ObjectMin { role, filler, .. }
            | Expr::ObjectMax { role, filler, .. }
            | Expr::ObjectExact { role, filler, .. } => {
                self.collect_signature(*role, signature);
                self.collect_signature(*filler, signature);
            }
            Expr::ObjectHasValue { role, individual } => {
                self.collect_signature(*role, signature);
                signature.insert(*individual);
            }
            Expr::DataSome { role, range } | Expr::DataAll { role, range } => {
                self.collect_signature(*role, signature);
                self.collect_signature(*range, signature);
            }
            Expr::DataHasValue { role, .. } => {
                self.collect_signature(*role, signature);
            }
            _ => {}
        }
    }

    pub fn display(&self, id: ExprId) -> String {
        match self.get(id) {
            Expr::Top => "⊤".to_string(),
            Expr::Bottom => "⊥".to_string(),
            Expr::Concept(iri)
            | Expr::ObjectRole(iri)
            | Expr::DataRole(iri)
            | Expr::Individual(iri)
            | Expr::Datatype(iri) => iri.to_string(),
            Expr::Not(c) => format!("¬{}", self.display(*c)),
            Expr::And(cs) => self.join(cs, " ⊓ "),
            Expr::Or(cs) => self.join(cs, " ⊔ "),
            Expr::OneOf(is) | Expr::DataOneOf(is) => format!("{{{}}}", self.join_plain(is)),
            Expr::ObjectSome { role, filler } => {
                format!("∃{}.{}", self.display(*role), self.display(*filler))
            }
            Expr::ObjectAll { role, filler } => {
                format!("∀{}.{}", self.display(*role), self.display(*filler))
            }
            Expr::ObjectHasValue { role, individual } => {
                format!("∃{}.{{{}}}", self.display(*role), self.display(*individual))
            }
            Expr::ObjectMin { n, role, filler } => {
                format!("≥{} {}.{}", n, self.display(*role), self.display(*filler))
            }
            Expr::ObjectMax { n, role, filler } => {
                format!("≤{} {}.{}", n, self.display(*role), self.display(*filler))
            }
            Expr::ObjectExact { n, role, filler } => {
                format!("={} {}.{}", n, self.display(*role), self.display(*filler))
            }
            Expr::DataSome { role, range } => {
                format!("∃{}.{}", self.display(*role), self.display(*range))
            }
            Expr::DataAll { role, range } => {
                format!("∀{}.{}", self.display(*role), self.display(*range))
            }
            Expr::DataHasValue { role, value } => {
                format!("∃{}.{{{}}}", self.display(*role), self.display(*value))
            }
            Expr::TopObjectRole | Expr::TopDataRole => "U".to_string(),
            Expr::BottomObjectRole | Expr::BottomDataRole => "∅".to_string(),
            Expr::Inverse(r) => format!("{}⁻", self.display(*r)),
            Expr::DataTop => "rdfs:Literal".to_string(),
            Expr::Literal { lexical, datatype } => format!("\"{}\"^^<{}>", lexical, datatype),
            Expr::DataNot(r) => format!("¬{}", self.display(*r)),
            Expr::DatatypeRestriction { datatype, facets } => {
                let facets: Vec<String> = facets
                    .iter()
                    .map(|(f, v)| format!("{} {}", f, self.display(*v)))
                    .collect();
                format!("{}[{}]", datatype, facets.join(", "))
            }
        }
    }

    fn join(&self, ids: &[ExprId], sep: &str) -> String {
        let parts: Vec<String> = ids.iter().map(|id| self.display(*id)).collect();
        format!("({})", parts.join(sep))
    }

    fn join_plain(&self, ids: &[ExprId]) -> String {
        let parts: Vec<String> = ids.iter().map(|id| self.display(*id)).collect();
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_deduplicates() {
        let mut em = ExpressionManager::new();
        let a = em.concept(Iri::new("http://example.org/A"));
        let b = em.concept(Iri::new("http://example.org/B"));
        assert_eq!(em.concept(Iri::new("http://example.org/A")), a);

        let ab = em.and(vec![a, b]);
        let ba = em.and(vec![b, a, ExprId::TOP]);
        assert_eq!(ab, ba, "conjunction is order-insensitive and drops ⊤");
        assert_eq!(em.and(vec![a, ExprId::BOTTOM]), ExprId::BOTTOM);
        assert_eq!(em.and(vec![a]), a);
    }

    #[test]
    fn test_negation_and_inverse_fold() {
        let mut em = ExpressionManager::new();
        let a = em.concept(Iri::new("http://example.org/A"));
        let not_a = em.not(a);
        assert_eq!(em.not(not_a), a);
        assert_eq!(em.not(ExprId::TOP), ExprId::BOTTOM);

        let r = em.object_role(Iri::new("http://example.org/r"));
        assert_eq!(em.inverse_of(r), None, "inverse not interned yet");
        let inv = em.inverse(r);
        assert_eq!(em.inverse(inv), r);
        assert_eq!(em.inverse_of(r), Some(inv));
        assert_eq!(em.inverse(ExprId::TOP_OBJECT_ROLE), ExprId::TOP_OBJECT_ROLE);
    }

    #[test]
    fn test_signature_collection() {
        let mut em = ExpressionManager::new();
        let a = em.concept(Iri::new("http://example.org/A"));
        let r = em.object_role(Iri::new("http://example.org/r"));
        let inv = em.inverse(r);
        let some = em.some(inv, a);

        let mut signature = BTreeSet::new();
        em.collect_signature(some, &mut signature);
        assert_eq!(signature, [a, r].into_iter().collect());
        assert!(em.is_concept(some));
        assert!(em.is_object_role(inv));
    }
}
