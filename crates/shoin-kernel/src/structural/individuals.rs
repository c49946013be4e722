//! ABox: 個体ラベル, 同一性クラス, 関係グラフ

use super::closure::{Context, Label};
use super::Budget;
use crate::axiom::{AxiomBody, AxiomId};
use crate::expr::{Expr, ExprId};
use crate::Result;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    from: ExprId,
    role: ExprId,
    to: ExprId,
}

/// Completed individual-level state of the knowledge base
#[derive(Debug, Default)]
pub(crate) struct ABox {
    individuals: Vec<ExprId>,
    parent: HashMap<ExprId, ExprId>,
    labels: HashMap<ExprId, Label>,
    edges: Vec<Edge>,
    values: Vec<(ExprId, ExprId, ExprId)>,
    different: Vec<Vec<ExprId>>,
    /// Axioms behind the first clash found, if any
    pub clash: Option<BTreeSet<AxiomId>>,
}

impl ABox {
    pub fn build(
        ctx: &Context<'_>,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        saturated: &HashMap<ExprId, Label>,
        budget: &Budget,
    ) -> Result<Self> {
        let em = ctx.em;
        let mut abox = ABox::default();

        let mut individuals = BTreeSet::new();
        for body in axioms.values() {
            individuals.extend(body.signature(em).into_iter().filter(|id| em.is_individual(*id)));
        }
        abox.individuals = individuals.into_iter().collect();
        for individual in &abox.individuals {
            abox.parent.insert(*individual, *individual);
            abox.labels.insert(*individual, Label::seeded([]));
        }

        for body in axioms.values() {
            match body {
                AxiomBody::InstanceOf { individual, concept } => {
                    abox.label_mut(*individual).insert(*concept);
                }
                AxiomBody::RelatedTo { from, role, to } => {
                    abox.edges.push(Edge { from: *from, role: *role, to: *to });
                }
                AxiomBody::ValueOf { individual, role, value } => {
                    abox.values.push((*individual, *role, *value));
                }
                AxiomBody::SameIndividuals(items) => {
                    for pair in items.windows(2) {
                        abox.union(pair[0], pair[1]);
                    }
                }
                AxiomBody::DifferentIndividuals(items) => {
                    abox.different.push(items.clone());
                }
                _ => {}
            }
        }

        for edge in abox.edges.clone() {
            if let Some(some) = em.find(&Expr::ObjectSome { role: edge.role, filler: ExprId::TOP }) {
                abox.label_mut(edge.from).insert(some);
            }
            let inverse_some = em
                .inverse_of(edge.role)
                .and_then(|inv| em.find(&Expr::ObjectSome { role: inv, filler: ExprId::TOP }));
            if let Some(some) = inverse_some {
                abox.label_mut(edge.to).insert(some);
            }
        }
        for (individual, role, value) in abox.values.clone() {
            if let Some(has_value) = em.find(&Expr::DataHasValue { role, value }) {
                abox.label_mut(individual).insert(has_value);
            }
        }

        abox.propagate(ctx, saturated, budget)?;
        abox.clash = abox.find_clash(ctx, axioms, saturated);
        if abox.clash.is_some() {
            debug!("ABox clash found over {} individuals", abox.individuals.len());
        }
        Ok(abox)
    }

    fn find(&self, individual: ExprId) -> ExprId {
        let mut current = individual;
        while let Some(next) = self.parent.get(&current) {
            if *next == current {
                break;
            }
            current = *next;
        }
        current
    }

    fn union(&mut self, a: ExprId, b: ExprId) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(drop, keep);
        if let Some(dropped) = self.labels.remove(&drop) {
            self.label_mut(keep).absorb(&dropped);
        }
        true
    }

    fn label_mut(&mut self, individual: ExprId) -> &mut Label {
        let rep = self.find(individual);
        self.labels.entry(rep).or_insert_with(|| Label::seeded([]))
    }

    pub fn label(&self, individual: ExprId) -> Option<&Label> {
        self.labels.get(&self.find(individual))
    }

    pub fn individuals(&self) -> &[ExprId] {
        &self.individuals
    }

    pub fn is_known(&self, individual: ExprId) -> bool {
        self.parent.contains_key(&individual)
    }

    fn reps(&self) -> Vec<ExprId> {
        let mut reps: Vec<ExprId> = self.labels.keys().copied().collect();
        reps.sort();
        reps
    }

    /// Edges as seen from their endpoints' classes, in both directions
    fn resolved_edges(&self, ctx: &Context<'_>) -> Vec<Edge> {
        let mut resolved = Vec::with_capacity(self.edges.len() * 2);
        for edge in &self.edges {
            let (from, to) = (self.find(edge.from), self.find(edge.to));
            resolved.push(Edge { from, role: edge.role, to });
            if let Some(inverse) = ctx.em.inverse_of(edge.role) {
                resolved.push(Edge { from: to, role: inverse, to: from });
            }
        }
        resolved
    }

    fn propagate(&mut self, ctx: &Context<'_>, saturated: &HashMap<ExprId, Label>, budget: &Budget) -> Result<()> {
        let em = ctx.em;
        loop {
            budget.check()?;
            let mut changed = false;

            for rep in self.reps() {
                if let Some(label) = self.labels.get_mut(&rep) {
                    changed |= ctx.expand(label, saturated);
                }
            }
            if self.labels.values().any(Label::is_unsatisfiable) {
                return Ok(());
            }

            // ∃R.{i} yields an edge to i
            for rep in self.reps() {
                let targets: Vec<(ExprId, ExprId)> = self.labels[&rep]
                    .items
                    .iter()
                    .filter_map(|item| match em.get(*item) {
                        Expr::ObjectHasValue { role, individual } => Some((*role, *individual)),
                        _ => None,
                    })
                    .collect();
                for (role, individual) in targets {
                    let edge = Edge { from: rep, role, to: individual };
                    if self.is_known(individual) && !self.edges.contains(&edge) {
                        self.edges.push(edge);
                        changed = true;
                    }
                }
            }

            let edges = self.resolved_edges(ctx);
            for edge in &edges {
                let source = &self.labels[&edge.from].items;
                let mut forward: Vec<ExprId> = Vec::new();
                for item in source {
                    if let Expr::ObjectAll { role, filler } = em.get(*item) {
                        if ctx.roles.is_sub(em, edge.role, *role) {
                            forward.push(*filler);
                            // ∀S.C passes through a transitive T with R ⊑ T ⊑ S
                            for transitive in &ctx.roles.transitive {
                                if ctx.roles.is_sub(em, edge.role, *transitive)
                                    && ctx.roles.is_sub(em, *transitive, *role)
                                {
                                    forward.extend(em.find(&Expr::ObjectAll { role: *transitive, filler: *filler }));
                                }
                            }
                        }
                    }
                }
                let target_items = self.labels[&edge.to].items.clone();
                let backward = ctx.existentials_via(edge.role, &target_items, saturated);

                let target = self.label_mut(edge.to);
                for item in forward {
                    changed |= target.insert(item);
                }
                let source = self.label_mut(edge.from);
                for item in backward {
                    changed |= source.insert(item);
                }
            }

            changed |= self.merge_functional(ctx);
            if !changed {
                return Ok(());
            }
        }
    }

    /// Merges the fillers of functional roles and of `≤1 R.⊤`
    fn merge_functional(&mut self, ctx: &Context<'_>) -> bool {
        let em = ctx.em;
        let mut merged = false;
        let edges = self.resolved_edges(ctx);

        for rep in self.reps() {
            let Some(label) = self.labels.get(&rep) else {
                continue;
            };
            let mut bounded: Vec<ExprId> = ctx.roles.functional.iter().copied().collect();
            for item in &label.items {
                if let Expr::ObjectMax { n: 1, role, filler } = em.get(*item) {
                    if *filler == ExprId::TOP {
                        bounded.push(*role);
                    }
                }
            }
            for role in bounded {
                let targets: BTreeSet<ExprId> = edges
                    .iter()
                    .filter(|e| e.from == rep && ctx.roles.is_sub(em, e.role, role))
                    .map(|e| self.find(e.to))
                    .collect();
                let targets: Vec<ExprId> = targets.into_iter().collect();
                for pair in targets.windows(2) {
                    merged |= self.union(pair[0], pair[1]);
                }
            }
        }
        merged
    }

    fn find_clash(
        &self,
        ctx: &Context<'_>,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        saturated: &HashMap<ExprId, Label>,
    ) -> Option<BTreeSet<AxiomId>> {
        let em = ctx.em;
        let reasons = |members: &[ExprId]| -> BTreeSet<AxiomId> {
            axioms
                .iter()
                .filter(|(_, body)| {
                    let signature = body.signature(em);
                    members.iter().any(|m| signature.contains(m))
                })
                .map(|(id, _)| *id)
                .collect()
        };

        for (rep, label) in &self.labels {
            if label.is_unsatisfiable() {
                let mut why = reasons(&self.same_as(*rep));
                why.extend(ctx.trace(label, ExprId::BOTTOM, saturated));
                return Some(why);
            }
        }

        for (id, body) in axioms {
            let clash = match body {
                AxiomBody::DifferentIndividuals(items) => {
                    let mut seen = BTreeSet::new();
                    !items.iter().all(|i| seen.insert(self.find(*i)))
                }
                AxiomBody::NotRelatedTo { from, role, to } => {
                    let target = self.find(*to);
                    self.role_fillers(ctx, *from, *role).iter().any(|f| self.find(*f) == target)
                }
                AxiomBody::NotValueOf { individual, role, value } => {
                    self.data_fillers(ctx, *individual, *role).contains(value)
                }
                _ => false,
            };
            if clash {
                let mut why = BTreeSet::from([*id]);
                why.extend(reasons(&body.operands()));
                return Some(why);
            }
        }

        let edges = self.resolved_edges(ctx);
        for (i, a) in edges.iter().enumerate() {
            if a.role == ExprId::BOTTOM_OBJECT_ROLE || ctx.roles.is_sub(em, a.role, ExprId::BOTTOM_OBJECT_ROLE) {
                return Some(reasons(&[a.from, a.to]));
            }
            for b in &edges[i + 1..] {
                if a.from == b.from && a.to == b.to && ctx.roles.are_disjoint(em, a.role, b.role) {
                    return Some(reasons(&[a.from, a.to]));
                }
            }
        }

        for rep in self.reps() {
            for role in &ctx.roles.data_functional {
                let values: BTreeSet<ExprId> = self
                    .values
                    .iter()
                    .filter(|(i, r, _)| self.find(*i) == rep && ctx.roles.is_sub(em, *r, *role))
                    .map(|(_, _, v)| *v)
                    .collect();
                if values.len() > 1 {
                    return Some(reasons(&self.same_as(rep)));
                }
            }
            for (i, r, _) in &self.values {
                if self.find(*i) == rep && ctx.roles.is_sub(em, *r, ExprId::BOTTOM_DATA_ROLE) {
                    return Some(reasons(&[*i]));
                }
            }
        }

        None
    }

    /// Members of the same-as class of `individual`, itself included
    pub fn same_as(&self, individual: ExprId) -> Vec<ExprId> {
        let rep = self.find(individual);
        self.individuals
            .iter()
            .copied()
            .filter(|i| self.find(*i) == rep)
            .collect()
    }

    /// Told difference, up to same-as classes
    pub fn is_different(&self, a: ExprId, b: ExprId) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        ra != rb
            && self.different.iter().any(|group| {
                group.iter().any(|i| self.find(*i) == ra) && group.iter().any(|i| self.find(*i) == rb)
            })
    }

    /// Instance check over the completed label. Nominals and their
    /// complements are answered from same-as classes and told difference.
    pub fn instance_of(
        &self,
        ctx: &Context<'_>,
        individual: ExprId,
        concept: ExprId,
        saturated: &HashMap<ExprId, Label>,
    ) -> bool {
        match ctx.em.get(concept) {
            Expr::OneOf(members) => members.iter().any(|m| self.find(*m) == self.find(individual)),
            Expr::Not(inner) => match ctx.em.get(*inner) {
                Expr::OneOf(members) => members.iter().all(|m| self.is_different(individual, *m)),
                _ => self.holds(ctx, individual, concept, saturated),
            },
            _ => self.holds(ctx, individual, concept, saturated),
        }
    }

    fn holds(&self, ctx: &Context<'_>, individual: ExprId, concept: ExprId, saturated: &HashMap<ExprId, Label>) -> bool {
        self.label(individual)
            .map(|label| ctx.holds(&label.items, concept, saturated))
            .unwrap_or(concept == ExprId::TOP)
    }

    /// Individuals related to `individual` through `role`, its sub-roles,
    /// inverse assertions and transitivity
    pub fn role_fillers(&self, ctx: &Context<'_>, individual: ExprId, role: ExprId) -> Vec<ExprId> {
        let em = ctx.em;
        if role == ExprId::TOP_OBJECT_ROLE {
            return self.individuals.clone();
        }
        let edges = self.resolved_edges(ctx);
        let transitive = ctx.roles.is_transitive(em, role);

        let start = self.find(individual);
        let mut reached = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for edge in edges.iter().filter(|e| e.from == current) {
                if ctx.roles.is_sub(em, edge.role, role) && reached.insert(edge.to) && transitive {
                    queue.push_back(edge.to);
                }
            }
        }

        self.individuals
            .iter()
            .copied()
            .filter(|i| reached.contains(&self.find(*i)))
            .collect()
    }

    /// Literals asserted for `individual` through `role` or a sub-role
    pub fn data_fillers(&self, ctx: &Context<'_>, individual: ExprId, role: ExprId) -> Vec<ExprId> {
        let rep = self.find(individual);
        let values: BTreeSet<ExprId> = self
            .values
            .iter()
            .filter(|(i, r, _)| self.find(*i) == rep && ctx.roles.is_sub(ctx.em, *r, role))
            .map(|(_, _, v)| *v)
            .collect();
        values.into_iter().collect()
    }
}
