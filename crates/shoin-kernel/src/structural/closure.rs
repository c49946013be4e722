//! 告知公理上の包含閉包と衝突検出

use super::roles::RoleHierarchy;
use super::Budget;
use crate::axiom::{AxiomBody, AxiomId};
use crate::expr::{Expr, ExprId, ExpressionManager};
use crate::Result;
use shoin_core::vocabulary::RDFS_LITERAL;
use shoin_datatypes::DatatypeModel;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// How an item entered a label
#[derive(Debug, Clone, Default)]
pub(crate) struct Derivation {
    /// Items of the same label the step used
    pub premises: Vec<ExprId>,
    /// `(f, g)`: the step used g ∈ S(f) from another saturated label
    pub filler: Option<(ExprId, ExprId)>,
    pub axioms: Vec<AxiomId>,
}

impl Derivation {
    fn of(premises: Vec<ExprId>) -> Self {
        Self {
            premises,
            ..Self::default()
        }
    }

    fn told(premise: ExprId, axiom: AxiomId) -> Self {
        Self {
            premises: vec![premise],
            filler: None,
            axioms: vec![axiom],
        }
    }
}

/// A set of concepts that must hold together at one node, with optional
/// derivations for justification tracing
#[derive(Debug, Clone, Default)]
pub(crate) struct Label {
    pub items: BTreeSet<ExprId>,
    why: HashMap<ExprId, Derivation>,
}

impl Label {
    pub fn seeded(seeds: impl IntoIterator<Item = ExprId>) -> Self {
        let mut items: BTreeSet<ExprId> = seeds.into_iter().collect();
        items.insert(ExprId::TOP);
        Self {
            items,
            why: HashMap::new(),
        }
    }

    pub fn contains(&self, item: ExprId) -> bool {
        self.items.contains(&item)
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.items.contains(&ExprId::BOTTOM)
    }

    fn add(&mut self, item: ExprId, provenance: bool, derivation: impl FnOnce() -> Derivation) -> bool {
        if !self.items.insert(item) {
            return false;
        }
        if provenance {
            self.why.insert(item, derivation());
        }
        true
    }

    /// Merges another label's items as given facts
    pub fn absorb(&mut self, other: &Label) -> bool {
        let before = self.items.len();
        self.items.extend(other.items.iter().copied());
        for (item, derivation) in &other.why {
            self.why.entry(*item).or_insert_with(|| derivation.clone());
        }
        self.items.len() != before
    }

    pub fn insert(&mut self, item: ExprId) -> bool {
        self.items.insert(item)
    }
}

/// Told concept axioms, indexed for the closure rules
#[derive(Debug, Default)]
pub(crate) struct TBox {
    told: HashMap<ExprId, Vec<(ExprId, AxiomId)>>,
    disjoint: Vec<(Vec<ExprId>, AxiomId)>,
    ands: Vec<ExprId>,
    ors: Vec<ExprId>,
    somes: Vec<ExprId>,
    data_somes: Vec<ExprId>,
}

impl TBox {
    pub fn build<'a>(
        em: &ExpressionManager,
        axioms: impl Iterator<Item = (AxiomId, &'a AxiomBody)>,
    ) -> Self {
        let mut tbox = TBox::default();

        for (id, body) in axioms {
            match body {
                AxiomBody::ConceptInclusion { sub, sup } => tbox.add(*sub, *sup, id),
                AxiomBody::EquivalentConcepts(concepts) => {
                    for a in concepts {
                        for b in concepts {
                            if a != b {
                                tbox.add(*a, *b, id);
                            }
                        }
                    }
                }
                AxiomBody::DisjointConcepts(concepts) => {
                    tbox.disjoint.push((concepts.clone(), id));
                }
                AxiomBody::ObjectRoleDomain { role, domain } => {
                    if let Some(some) = em.find(&Expr::ObjectSome { role: *role, filler: ExprId::TOP }) {
                        tbox.add(some, *domain, id);
                    }
                }
                AxiomBody::ObjectRoleRange { role, range } => {
                    let inverse = em.inverse_of(*role);
                    let some = inverse.and_then(|inv| em.find(&Expr::ObjectSome { role: inv, filler: ExprId::TOP }));
                    if let Some(some) = some {
                        tbox.add(some, *range, id);
                    }
                }
                AxiomBody::DataRoleDomain { role, domain } => {
                    if let Some(some) = em.find(&Expr::DataSome { role: *role, range: ExprId::DATA_TOP }) {
                        tbox.add(some, *domain, id);
                    }
                }
                _ => {}
            }
        }

        let mut keys: Vec<ExprId> = tbox.told.keys().copied().collect();
        for (members, _) in &tbox.disjoint {
            keys.extend(members.iter().copied());
        }
        let mut relevant = BTreeSet::new();
        while let Some(id) = keys.pop() {
            if !relevant.insert(id) {
                continue;
            }
            match em.get(id) {
                Expr::And(items) | Expr::Or(items) => keys.extend(items.iter().copied()),
                Expr::ObjectSome { filler, .. } => keys.push(*filler),
                _ => {}
            }
        }
        for id in relevant {
            match em.get(id) {
                Expr::And(_) => tbox.ands.push(id),
                Expr::Or(_) => tbox.ors.push(id),
                Expr::ObjectSome { .. } => tbox.somes.push(id),
                Expr::DataSome { .. } => tbox.data_somes.push(id),
                _ => {}
            }
        }

        tbox
    }

    fn add(&mut self, sub: ExprId, sup: ExprId, id: AxiomId) {
        self.told.entry(sub).or_default().push((sup, id));
    }

    fn told(&self, concept: ExprId) -> &[(ExprId, AxiomId)] {
        self.told.get(&concept).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Everything the closure rules read
pub(crate) struct Context<'a> {
    pub em: &'a ExpressionManager,
    pub roles: &'a RoleHierarchy,
    pub tbox: &'a TBox,
    pub datatypes: &'a DatatypeModel,
    pub provenance: bool,
}

impl Context<'_> {
    /// Saturates the labels of `concepts`. Passes repeat until no label
    /// grows, since existential fillers read other labels.
    pub fn saturate(&self, concepts: &[ExprId], budget: &Budget) -> Result<HashMap<ExprId, Label>> {
        let mut labels: HashMap<ExprId, Label> = concepts
            .iter()
            .map(|c| (*c, Label::seeded([*c])))
            .collect();

        loop {
            budget.check()?;
            let mut changed = false;
            for concept in concepts {
                let mut label = labels.remove(concept).unwrap_or_else(|| Label::seeded([*concept]));
                if self.expand(&mut label, &labels) {
                    changed = true;
                }
                labels.insert(*concept, label);
            }
            if !changed {
                break;
            }
        }

        Ok(labels)
    }

    /// Closure of an arbitrary seed set against saturated labels
    pub fn close(&self, seeds: impl IntoIterator<Item = ExprId>, saturated: &HashMap<ExprId, Label>) -> Label {
        let mut label = Label::seeded(seeds);
        self.expand(&mut label, saturated);
        label
    }

    /// Applies the closure rules to a fixpoint. Returns true if the label grew.
    pub fn expand(&self, label: &mut Label, saturated: &HashMap<ExprId, Label>) -> bool {
        let em = self.em;
        let provenance = self.provenance;
        let mut grew = false;
        let mut queue: VecDeque<ExprId> = label.items.iter().copied().collect();
        let mut visited: HashSet<ExprId> = HashSet::new();

        loop {
            while let Some(item) = queue.pop_front() {
                if label.is_unsatisfiable() {
                    return grew;
                }
                if !visited.insert(item) {
                    continue;
                }

                for (sup, axiom) in self.tbox.told(item) {
                    if label.add(*sup, provenance, || Derivation::told(item, *axiom)) {
                        queue.push_back(*sup);
                        grew = true;
                    }
                }

                let mut implied = Vec::new();
                match em.get(item) {
                    Expr::And(conjuncts) => implied.extend(conjuncts.iter().copied()),
                    Expr::ObjectMin { n, role, filler } | Expr::ObjectExact { n, role, filler } if *n >= 1 => {
                        implied.extend(em.find(&Expr::ObjectSome { role: *role, filler: *filler }));
                    }
                    Expr::ObjectHasValue { role, .. } => {
                        implied.extend(em.find(&Expr::ObjectSome { role: *role, filler: ExprId::TOP }));
                    }
                    Expr::DataHasValue { role, .. } => {
                        implied.extend(em.find(&Expr::DataSome { role: *role, range: ExprId::DATA_TOP }));
                    }
                    _ => {}
                }
                for next in implied {
                    if label.add(next, provenance, || Derivation::of(vec![item])) {
                        queue.push_back(next);
                        grew = true;
                    }
                }
            }

            let added = self.apply_global_rules(label, saturated);
            if added.is_empty() {
                break;
            }
            grew = true;
            queue.extend(added);
        }

        grew
    }

    fn apply_global_rules(&self, label: &mut Label, saturated: &HashMap<ExprId, Label>) -> Vec<ExprId> {
        let em = self.em;
        let provenance = self.provenance;
        let mut added = Vec::new();

        // conjunction and disjunction introduction
        for and in &self.tbox.ands {
            if let Expr::And(conjuncts) = em.get(*and) {
                if !label.contains(*and) && conjuncts.iter().all(|c| label.contains(*c)) {
                    let premises = conjuncts.clone();
                    if label.add(*and, provenance, || Derivation::of(premises)) {
                        added.push(*and);
                    }
                }
            }
        }
        for or in &self.tbox.ors {
            if let Expr::Or(disjuncts) = em.get(*or) {
                if let Some(d) = disjuncts.iter().find(|d| label.contains(**d)) {
                    let d = *d;
                    if label.add(*or, provenance, || Derivation::of(vec![d])) {
                        added.push(*or);
                    }
                }
            }
        }

        let items: Vec<ExprId> = label.items.iter().copied().collect();
        for item in &items {
            match em.get(*item) {
                Expr::ObjectSome { role, filler } => {
                    if self.is_unsat(*filler, saturated) {
                        if label.add(ExprId::BOTTOM, provenance, || Derivation {
                            premises: vec![*item],
                            filler: Some((*filler, ExprId::BOTTOM)),
                            axioms: Vec::new(),
                        }) {
                            added.push(ExprId::BOTTOM);
                        }
                        return added;
                    }
                    for some in &self.tbox.somes {
                        if label.contains(*some) {
                            continue;
                        }
                        if let Expr::ObjectSome { role: sup_role, filler: sup_filler } = em.get(*some) {
                            if self.roles.is_sub(em, *role, *sup_role)
                                && self.filler_entails(*filler, *sup_filler, saturated)
                            {
                                let derivation = || Derivation {
                                    premises: vec![*item],
                                    filler: Some((*filler, *sup_filler)),
                                    axioms: self.roles.path(*role, *sup_role),
                                };
                                if label.add(*some, provenance, derivation) {
                                    added.push(*some);
                                }
                            }
                        }
                    }
                }
                Expr::DataSome { role, .. } | Expr::DataHasValue { role, .. } => {
                    for some in &self.tbox.data_somes {
                        if label.contains(*some) {
                            continue;
                        }
                        if let Expr::DataSome { role: sup_role, range } = em.get(*some) {
                            if self.roles.is_sub(em, *role, *sup_role) && self.data_entails(*item, *range) {
                                if label.add(*some, provenance, || Derivation::of(vec![*item])) {
                                    added.push(*some);
                                }
                            }
                        }
                    }
                    for (range, axiom) in self.roles.ranges_of(*role) {
                        if !self.data_compatible(*item, range) {
                            if label.add(ExprId::BOTTOM, provenance, || Derivation::told(*item, axiom)) {
                                added.push(ExprId::BOTTOM);
                            }
                            return added;
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(derivation) = self.find_clash(label, saturated) {
            if label.add(ExprId::BOTTOM, provenance, || derivation) {
                added.push(ExprId::BOTTOM);
            }
        }

        added
    }

    fn find_clash(&self, label: &Label, saturated: &HashMap<ExprId, Label>) -> Option<Derivation> {
        let em = self.em;

        for (members, axiom) in &self.tbox.disjoint {
            let present: Vec<ExprId> = members.iter().copied().filter(|m| label.contains(*m)).collect();
            if present.len() >= 2 {
                return Some(Derivation {
                    premises: present,
                    filler: None,
                    axioms: vec![*axiom],
                });
            }
        }

        for item in &label.items {
            match em.get(*item) {
                Expr::Not(inner) if label.contains(*inner) => {
                    return Some(Derivation::of(vec![*item, *inner]));
                }
                Expr::Or(disjuncts) if disjuncts.iter().all(|d| self.is_unsat(*d, saturated)) => {
                    return Some(Derivation::of(vec![*item]));
                }
                Expr::ObjectAll { role, filler } if self.is_unsat(*filler, saturated) => {
                    if let Some(some) = self.find_successor(label, *role) {
                        return Some(Derivation::of(vec![*item, some]));
                    }
                }
                Expr::ObjectMax { n, role, filler } => {
                    for other in &label.items {
                        let clash = match em.get(*other) {
                            Expr::ObjectMin { n: m, role: r, filler: f }
                            | Expr::ObjectExact { n: m, role: r, filler: f } => {
                                m > n && self.roles.is_sub(em, *r, *role) && self.filler_entails(*f, *filler, saturated)
                            }
                            Expr::ObjectSome { role: r, filler: f } => {
                                *n == 0 && self.roles.is_sub(em, *r, *role) && self.filler_entails(*f, *filler, saturated)
                            }
                            _ => false,
                        };
                        if clash {
                            return Some(Derivation::of(vec![*item, *other]));
                        }
                    }
                }
                Expr::DataAll { role, range } => {
                    for other in &label.items {
                        if let Expr::DataSome { role: r, .. } | Expr::DataHasValue { role: r, .. } = em.get(*other) {
                            if self.roles.is_sub(em, *r, *role) && !self.data_compatible(*other, *range) {
                                return Some(Derivation::of(vec![*item, *other]));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        None
    }

    fn find_successor(&self, label: &Label, role: ExprId) -> Option<ExprId> {
        label.items.iter().copied().find(|item| match self.em.get(*item) {
            Expr::ObjectSome { role: r, .. } | Expr::ObjectHasValue { role: r, .. } => {
                self.roles.is_sub(self.em, *r, role)
            }
            Expr::ObjectMin { n, role: r, .. } | Expr::ObjectExact { n, role: r, .. } => {
                *n >= 1 && self.roles.is_sub(self.em, *r, role)
            }
            _ => false,
        })
    }

    pub fn is_unsat(&self, concept: ExprId, saturated: &HashMap<ExprId, Label>) -> bool {
        concept == ExprId::BOTTOM
            || saturated
                .get(&concept)
                .map(Label::is_unsatisfiable)
                .unwrap_or(false)
    }

    /// f ⊑ g as far as saturated labels know
    fn filler_entails(&self, f: ExprId, g: ExprId, saturated: &HashMap<ExprId, Label>) -> bool {
        g == ExprId::TOP
            || f == g
            || saturated
                .get(&f)
                .map(|label| label.contains(g) || label.is_unsatisfiable())
                .unwrap_or(false)
    }

    // ---- data ----

    fn datatype_of(&self, range: ExprId) -> Option<&str> {
        match self.em.get(range) {
            Expr::DataTop => Some(RDFS_LITERAL),
            Expr::Datatype(iri) => Some(iri.as_str()),
            Expr::DatatypeRestriction { datatype, .. } => Some(datatype.as_str()),
            Expr::Literal { datatype, .. } => Some(datatype.as_str()),
            _ => None,
        }
    }

    /// Value of a data item (`∃D.r` or `∃D.{v}`) can satisfy `range`
    pub fn data_compatible(&self, item: ExprId, range: ExprId) -> bool {
        match self.em.get(item) {
            Expr::DataSome { range: own, .. } => self.ranges_compatible(*own, range),
            Expr::DataHasValue { value, .. } => self.literal_in_range(*value, range),
            _ => true,
        }
    }

    fn ranges_compatible(&self, a: ExprId, b: ExprId) -> bool {
        if let Expr::DataOneOf(values) = self.em.get(a) {
            return values.iter().any(|v| self.literal_in_range(*v, b));
        }
        if let Expr::DataOneOf(values) = self.em.get(b) {
            return values.iter().any(|v| self.literal_in_range(*v, a));
        }
        match (self.datatype_of(a), self.datatype_of(b)) {
            (Some(x), Some(y)) => {
                if !self.datatypes.contains(x) || !self.datatypes.contains(y) {
                    return true;
                }
                self.datatypes.is_compatible(x, y)
            }
            _ => true,
        }
    }

    pub fn literal_in_range(&self, value: ExprId, range: ExprId) -> bool {
        let (lexical, datatype) = match self.em.get(value) {
            Expr::Literal { lexical, datatype } => (lexical.as_str(), datatype.as_str()),
            _ => return true,
        };
        match self.em.get(range) {
            Expr::DataTop => true,
            Expr::Datatype(iri) => {
                if self.datatypes.contains(iri.as_str()) && self.datatypes.contains(datatype) {
                    self.datatypes.is_literal_compatible(iri.as_str(), datatype, lexical)
                } else {
                    iri.as_str() == datatype
                }
            }
            Expr::DataOneOf(values) => values.contains(&value),
            Expr::DataNot(inner) => !self.literal_in_range(value, *inner),
            Expr::DatatypeRestriction { datatype: base, facets } => {
                let base_ok = !self.datatypes.contains(base.as_str())
                    || !self.datatypes.contains(datatype)
                    || self.datatypes.is_literal_compatible(base.as_str(), datatype, lexical);
                base_ok && facets.iter().all(|(facet, bound)| self.facet_admits(facet, *bound, lexical))
            }
            _ => true,
        }
    }

    fn facet_admits(&self, facet: &str, bound: ExprId, lexical: &str) -> bool {
        let bound = match self.em.get(bound) {
            Expr::Literal { lexical, .. } => lexical.as_str(),
            _ => return true,
        };
        let local = facet.rsplit(['#', ':']).next().unwrap_or(facet);
        let number = |s: &str| s.trim().parse::<f64>().ok();
        match local {
            "minInclusive" | "minExclusive" | "maxInclusive" | "maxExclusive" => {
                match (number(lexical), number(bound)) {
                    (Some(v), Some(b)) => match local {
                        "minInclusive" => v >= b,
                        "minExclusive" => v > b,
                        "maxInclusive" => v <= b,
                        _ => v < b,
                    },
                    _ => true,
                }
            }
            "length" | "minLength" | "maxLength" => match bound.trim().parse::<usize>() {
                Ok(b) => {
                    let len = lexical.chars().count();
                    match local {
                        "length" => len == b,
                        "minLength" => len >= b,
                        _ => len <= b,
                    }
                }
                Err(_) => true,
            },
            _ => true,
        }
    }

    /// A data item's value necessarily lies in `range`
    fn data_entails(&self, item: ExprId, range: ExprId) -> bool {
        if range == ExprId::DATA_TOP {
            return true;
        }
        match self.em.get(item) {
            Expr::DataSome { range: own, .. } => {
                *own == range
                    || match (self.datatype_of(*own), self.em.get(range)) {
                        (Some(x), Expr::Datatype(y)) => self.datatypes.is_subtype_of(x, y.as_str()),
                        _ => false,
                    }
            }
            Expr::DataHasValue { value, .. } => self.literal_in_range(*value, range),
            _ => false,
        }
    }

    // ---- structural entailment ----

    /// Every node whose label is `items` belongs to `concept`
    pub fn holds(&self, items: &BTreeSet<ExprId>, concept: ExprId, saturated: &HashMap<ExprId, Label>) -> bool {
        let em = self.em;
        if concept == ExprId::TOP || items.contains(&concept) || items.contains(&ExprId::BOTTOM) {
            return true;
        }
        match em.get(concept) {
            Expr::And(conjuncts) => conjuncts.iter().all(|c| self.holds(items, *c, saturated)),
            Expr::Or(disjuncts) => disjuncts.iter().any(|d| self.holds(items, *d, saturated)),
            Expr::Not(inner) => {
                let mut seeds = items.clone();
                seeds.insert(*inner);
                self.close(seeds, saturated).is_unsatisfiable()
            }
            Expr::ObjectSome { role, filler } => items.iter().any(|item| match em.get(*item) {
                Expr::ObjectSome { role: r, filler: f } => {
                    self.roles.is_sub(em, *r, *role) && self.subsumes(*f, *filler, saturated)
                }
                Expr::ObjectMin { n, role: r, filler: f } | Expr::ObjectExact { n, role: r, filler: f } => {
                    *n >= 1 && self.roles.is_sub(em, *r, *role) && self.subsumes(*f, *filler, saturated)
                }
                Expr::ObjectHasValue { role: r, .. } => *filler == ExprId::TOP && self.roles.is_sub(em, *r, *role),
                _ => false,
            }),
            Expr::ObjectMin { n, role, filler } => items.iter().any(|item| match em.get(*item) {
                Expr::ObjectMin { n: m, role: r, filler: f } | Expr::ObjectExact { n: m, role: r, filler: f } => {
                    m >= n && self.roles.is_sub(em, *r, *role) && self.subsumes(*f, *filler, saturated)
                }
                Expr::ObjectSome { role: r, filler: f } => {
                    *n <= 1 && self.roles.is_sub(em, *r, *role) && self.subsumes(*f, *filler, saturated)
                }
                _ => false,
            }),
            Expr::ObjectMax { n, role, filler } => items.iter().any(|item| match em.get(*item) {
                Expr::ObjectMax { n: m, role: r, filler: f } | Expr::ObjectExact { n: m, role: r, filler: f } => {
                    m <= n && self.roles.is_sub(em, *role, *r) && self.subsumes(*filler, *f, saturated)
                }
                _ => false,
            }),
            Expr::ObjectAll { role, filler } => items.iter().any(|item| match em.get(*item) {
                Expr::ObjectAll { role: r, filler: f } => {
                    self.roles.is_sub(em, *role, *r) && self.subsumes(*f, *filler, saturated)
                }
                _ => false,
            }),
            Expr::ObjectHasValue { role, individual } => items.iter().any(|item| match em.get(*item) {
                Expr::ObjectHasValue { role: r, individual: i } => i == individual && self.roles.is_sub(em, *r, *role),
                _ => false,
            }),
            Expr::DataSome { role, range } => items.iter().any(|item| match em.get(*item) {
                Expr::DataSome { role: r, .. } | Expr::DataHasValue { role: r, .. } => {
                    self.roles.is_sub(em, *r, *role) && self.data_entails(*item, *range)
                }
                _ => false,
            }),
            Expr::DataHasValue { role, value } => items.iter().any(|item| match em.get(*item) {
                Expr::DataHasValue { role: r, value: v } => v == value && self.roles.is_sub(em, *r, *role),
                _ => false,
            }),
            _ => false,
        }
    }

    /// sub ⊑ sup
    pub fn subsumes(&self, sub: ExprId, sup: ExprId, saturated: &HashMap<ExprId, Label>) -> bool {
        if sup == ExprId::TOP || sub == sup || sub == ExprId::BOTTOM {
            return true;
        }
        match saturated.get(&sub) {
            Some(label) => self.holds(&label.items, sup, saturated),
            None => {
                let label = self.close([sub], saturated);
                self.holds(&label.items, sup, saturated)
            }
        }
    }

    /// Told existentials `∃S.g` satisfied by an edge via `role` to a node
    /// labelled `target`
    pub fn existentials_via(
        &self,
        role: ExprId,
        target: &BTreeSet<ExprId>,
        saturated: &HashMap<ExprId, Label>,
    ) -> Vec<ExprId> {
        let em = self.em;
        self.tbox
            .somes
            .iter()
            .copied()
            .filter(|some| match em.get(*some) {
                Expr::ObjectSome { role: sup, filler } => {
                    self.roles.is_sub(em, role, *sup) && self.holds(target, *filler, saturated)
                }
                _ => false,
            })
            .collect()
    }

    /// Axioms that derived `item` in `label`
    pub fn trace(&self, label: &Label, item: ExprId, saturated: &HashMap<ExprId, Label>) -> BTreeSet<AxiomId> {
        let mut axioms = BTreeSet::new();
        let mut seen = HashSet::new();
        collect_trace(label, item, saturated, &mut axioms, &mut seen);
        axioms
    }
}

fn collect_trace(
    label: &Label,
    item: ExprId,
    saturated: &HashMap<ExprId, Label>,
    axioms: &mut BTreeSet<AxiomId>,
    seen: &mut HashSet<(usize, ExprId)>,
) {
    let key = (label as *const Label as usize, item);
    if !seen.insert(key) {
        return;
    }
    let Some(derivation) = label.why.get(&item) else {
        return;
    };
    axioms.extend(derivation.axioms.iter().copied());
    for premise in &derivation.premises {
        collect_trace(label, *premise, saturated, axioms, seen);
    }
    if let Some((filler, fact)) = derivation.filler {
        if let Some(other) = saturated.get(&filler) {
            collect_trace(other, fact, saturated, axioms, seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::Iri;

    struct Fixture {
        em: ExpressionManager,
        axioms: Vec<(AxiomId, AxiomBody)>,
        datatypes: DatatypeModel,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                em: ExpressionManager::new(),
                axioms: Vec::new(),
                datatypes: DatatypeModel::xsd().unwrap(),
            }
        }

        fn concept(&mut self, name: &str) -> ExprId {
            self.em.concept(Iri::new(format!("http://example.org/{}", name)))
        }

        fn axiom(&mut self, body: AxiomBody) -> AxiomId {
            let id = AxiomId(self.axioms.len() as u64);
            self.axioms.push((id, body));
            id
        }

        fn saturate(&self, provenance: bool) -> (RoleHierarchy, TBox, HashMap<ExprId, Label>, Vec<ExprId>) {
            let roles = RoleHierarchy::build(&self.em, self.axioms.iter().map(|(id, b)| (*id, b)));
            let tbox = TBox::build(&self.em, self.axioms.iter().map(|(id, b)| (*id, b)));
            let concepts: Vec<ExprId> = self.em.ids().filter(|id| self.em.is_concept(*id)).collect();
            let labels = {
                let ctx = Context {
                    em: &self.em,
                    roles: &roles,
                    tbox: &tbox,
                    datatypes: &self.datatypes,
                    provenance,
                };
                ctx.saturate(&concepts, &Budget::unlimited()).unwrap()
            };
            (roles, tbox, labels, concepts)
        }
    }

    #[test]
    fn test_told_chain_and_trace() {
        let mut fx = Fixture::new();
        let cat = fx.concept("Cat");
        let mammal = fx.concept("Mammal");
        let animal = fx.concept("Animal");
        let a1 = fx.axiom(AxiomBody::ConceptInclusion { sub: cat, sup: mammal });
        let a2 = fx.axiom(AxiomBody::ConceptInclusion { sub: mammal, sup: animal });

        let (roles, tbox, labels, _) = fx.saturate(true);
        let ctx = Context { em: &fx.em, roles: &roles, tbox: &tbox, datatypes: &fx.datatypes, provenance: true };

        assert!(labels[&cat].contains(animal));
        assert!(!labels[&animal].contains(cat));
        assert_eq!(ctx.trace(&labels[&cat], animal, &labels), [a1, a2].into_iter().collect());
    }

    #[test]
    fn test_defined_concept_is_recognized() {
        let mut fx = Fixture::new();
        let parent = fx.concept("Parent");
        let person = fx.concept("Person");
        let mother = fx.concept("Mother");
        let woman = fx.concept("Woman");
        let has_child = fx.em.object_role(Iri::new("http://example.org/hasChild"));
        let some_child = fx.em.some(has_child, ExprId::TOP);
        let definition = fx.em.and(vec![person, some_child]);
        fx.axiom(AxiomBody::EquivalentConcepts(vec![parent, definition]));
        fx.axiom(AxiomBody::ConceptInclusion { sub: woman, sup: person });
        let mother_def = {
            let some = fx.em.some(has_child, person);
            fx.em.and(vec![woman, some])
        };
        fx.axiom(AxiomBody::EquivalentConcepts(vec![mother, mother_def]));

        let (_, _, labels, _) = fx.saturate(false);
        assert!(labels[&mother].contains(parent), "Mother ⊑ Parent through ∃hasChild.Person ⊑ ∃hasChild.⊤");
        assert!(!labels[&parent].contains(mother));
    }

    #[test]
    fn test_disjointness_makes_intersection_unsatisfiable() {
        let mut fx = Fixture::new();
        let cat = fx.concept("Cat");
        let dog = fx.concept("Dog");
        let catdog = fx.concept("CatDog");
        fx.axiom(AxiomBody::DisjointConcepts(vec![cat, dog]));
        fx.axiom(AxiomBody::ConceptInclusion { sub: catdog, sup: cat });
        fx.axiom(AxiomBody::ConceptInclusion { sub: catdog, sup: dog });

        let (_, _, labels, _) = fx.saturate(false);
        assert!(labels[&catdog].is_unsatisfiable());
        assert!(!labels[&cat].is_unsatisfiable());
    }

    #[test]
    fn test_incompatible_data_value_clashes() {
        let mut fx = Fixture::new();
        let age = fx.em.data_role(Iri::new("http://example.org/age"));
        let byte = fx.em.datatype(shoin_core::vocabulary::xsd("unsignedByte"));
        let too_old = fx.em.literal("300", shoin_core::vocabulary::xsd("integer"));
        let fine = fx.em.literal("30", shoin_core::vocabulary::xsd("integer"));
        let bad = fx.em.data_has_value(age, too_old);
        let good = fx.em.data_has_value(age, fine);
        fx.axiom(AxiomBody::DataRoleRange { role: age, range: byte });

        let (_, _, labels, _) = fx.saturate(false);
        assert!(labels[&bad].is_unsatisfiable());
        assert!(!labels[&good].is_unsatisfiable());
    }
}
