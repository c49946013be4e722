//! 参照オラクル: 告知公理上の構造的推論
//!
//! 完全なタブロー手続きではなく、次の健全な近似を提供します:
//! - 告知公理の包含閉包による概念ラベルの飽和
//! - ロール階層と逆ロール
//! - 同一性クラスと関係グラフ上の ABox 伝播
//! - 部分集合ブロッキング付きの証明グラフ
//! - 構文的局所性によるモジュール抽出と原子分解

mod closure;
mod individuals;
mod locality;
mod proof;
mod roles;
mod taxonomy;

use crate::axiom::{AxiomBody, AxiomId};
use crate::expr::{Expr, ExprId, ExpressionManager};
use crate::oracle::{InterruptFlag, KernelOracle, ModuleType, ProofNodeId, TaxonomyActor};
use crate::{OracleError, Result};
use closure::{Context, Label, TBox};
use indexmap::IndexMap;
use individuals::ABox;
use locality::{AtomicDecomposition, Modularizer};
use proof::ProofGraph;
use roles::RoleHierarchy;
use shoin_datatypes::DatatypeModel;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use taxonomy::Taxonomy;
use tracing::{debug, info};

/// Interruption and timeout state of one query
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    flag: InterruptFlag,
    timeout: Option<Duration>,
    started: Instant,
}

impl Budget {
    #[cfg(test)]
    pub fn unlimited() -> Self {
        Self {
            flag: InterruptFlag::new(),
            timeout: None,
            started: Instant::now(),
        }
    }

    pub fn check(&self) -> Result<()> {
        if self.flag.is_set() {
            return Err(OracleError::Interrupted);
        }
        if let Some(timeout) = self.timeout {
            let elapsed = self.started.elapsed();
            if elapsed >= timeout {
                return Err(OracleError::Timeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
        }
        Ok(())
    }
}

/// Fills an empty slot with `build`'s value
fn lazily<T>(slot: &mut Option<T>, build: impl FnOnce() -> Result<T>) -> Result<&mut T> {
    let value = match slot.take() {
        Some(value) => value,
        None => build()?,
    };
    Ok(slot.insert(value))
}

/// Saturated TBox state
struct Base {
    roles: RoleHierarchy,
    tbox: TBox,
    labels: HashMap<ExprId, Label>,
    provenance: bool,
    concept_names: Vec<ExprId>,
    object_role_names: Vec<ExprId>,
    data_role_names: Vec<ExprId>,
}

impl Base {
    fn build(
        em: &ExpressionManager,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        datatypes: &DatatypeModel,
        provenance: bool,
        budget: &Budget,
    ) -> Result<Self> {
        let roles = RoleHierarchy::build(em, axioms.iter().map(|(id, body)| (*id, body)));
        let tbox = TBox::build(em, axioms.iter().map(|(id, body)| (*id, body)));

        let mut signature = BTreeSet::new();
        for body in axioms.values() {
            signature.extend(body.signature(em));
        }
        let concept_names = signature
            .iter()
            .copied()
            .filter(|id| matches!(em.get(*id), Expr::Concept(_)))
            .collect();
        let object_role_names = signature
            .iter()
            .copied()
            .filter(|id| matches!(em.get(*id), Expr::ObjectRole(_)))
            .flat_map(|role| std::iter::once(role).chain(em.inverse_of(role)))
            .collect();
        let data_role_names = signature
            .iter()
            .copied()
            .filter(|id| matches!(em.get(*id), Expr::DataRole(_)))
            .collect();

        let concepts: Vec<ExprId> = em.ids().filter(|id| em.is_concept(*id)).collect();
        let labels = Context {
            em,
            roles: &roles,
            tbox: &tbox,
            datatypes,
            provenance,
        }
        .saturate(&concepts, budget)?;

        Ok(Self {
            roles,
            tbox,
            labels,
            provenance,
            concept_names,
            object_role_names,
            data_role_names,
        })
    }

    fn context<'a>(&'a self, em: &'a ExpressionManager, datatypes: &'a DatatypeModel) -> Context<'a> {
        Context {
            em,
            roles: &self.roles,
            tbox: &self.tbox,
            datatypes,
            provenance: self.provenance,
        }
    }

    /// Exact derivation of `sup` in the saturated label of `sub`
    fn derivation(&self, ctx: &Context<'_>, sub: ExprId, sup: ExprId) -> Option<BTreeSet<AxiomId>> {
        let label = self.labels.get(&sub)?;
        if label.contains(sup) {
            Some(ctx.trace(label, sup, &self.labels))
        } else if label.is_unsatisfiable() {
            Some(ctx.trace(label, ExprId::BOTTOM, &self.labels))
        } else {
            None
        }
    }
}

/// Everything derived from the loaded axioms; dropped on any change
struct Core {
    base: Base,
    abox: ABox,
    /// Axioms behind an inconsistency
    inconsistency: Option<BTreeSet<AxiomId>>,
    concepts: Option<Taxonomy>,
    object_roles: Option<Taxonomy>,
    data_roles: Option<Taxonomy>,
    proof: ProofGraph,
}

impl Core {
    fn build(
        em: &ExpressionManager,
        axioms: &IndexMap<AxiomId, AxiomBody>,
        datatypes: &DatatypeModel,
        provenance: bool,
        budget: &Budget,
    ) -> Result<Self> {
        let base = Base::build(em, axioms, datatypes, provenance, budget)?;
        let ctx = base.context(em, datatypes);
        let abox = ABox::build(&ctx, axioms, &base.labels, budget)?;

        let inconsistency = match base.labels.get(&ExprId::TOP) {
            Some(top) if top.is_unsatisfiable() => Some(ctx.trace(top, ExprId::BOTTOM, &base.labels)),
            _ => abox.clash.clone(),
        };
        info!(
            "Saturated {} labels over {} axioms ({} individuals)",
            base.labels.len(),
            axioms.len(),
            abox.individuals().len()
        );

        Ok(Self {
            base,
            abox,
            inconsistency,
            concepts: None,
            object_roles: None,
            data_roles: None,
            proof: ProofGraph::default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hierarchy {
    Concepts,
    ObjectRoles,
    DataRoles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Equivalent,
    Sub,
    Super,
}

/// Position of an element, possibly anonymous, relative to a taxonomy
#[derive(Debug, Default)]
struct Placement {
    equivalent: BTreeSet<usize>,
    supers: BTreeSet<usize>,
    subs: BTreeSet<usize>,
}

fn place(taxonomy: &Taxonomy, element: ExprId, leq: impl Fn(ExprId, ExprId) -> bool) -> Placement {
    if let Some(vertex) = taxonomy.vertex(element) {
        return Placement {
            equivalent: BTreeSet::from([vertex]),
            supers: taxonomy.supers(vertex, false).into_iter().collect(),
            subs: taxonomy.subs(vertex, false).into_iter().collect(),
        };
    }
    let mut placement = Placement::default();
    for vertex in 0..taxonomy.len() {
        let representative = taxonomy.members(vertex)[0];
        match (leq(element, representative), leq(representative, element)) {
            (true, true) => placement.equivalent.insert(vertex),
            (true, false) => placement.supers.insert(vertex),
            (false, true) => placement.subs.insert(vertex),
            (false, false) => false,
        };
    }
    placement
}

fn select(taxonomy: &Taxonomy, placement: &Placement, direction: Direction, direct: bool) -> Vec<Vec<ExprId>> {
    match direction {
        Direction::Equivalent => {
            let members: Vec<ExprId> = placement
                .equivalent
                .iter()
                .flat_map(|v| taxonomy.members(*v).iter().copied())
                .collect();
            if members.is_empty() {
                Vec::new()
            } else {
                vec![members]
            }
        }
        Direction::Super => {
            let vertices = if direct {
                taxonomy.minimal(&placement.supers)
            } else {
                placement.supers.iter().copied().collect()
            };
            vertices.into_iter().map(|v| taxonomy.members(v).to_vec()).collect()
        }
        Direction::Sub => {
            let vertices = if direct {
                taxonomy.maximal(&placement.subs)
            } else {
                placement.subs.iter().copied().collect()
            };
            vertices.into_iter().map(|v| taxonomy.members(v).to_vec()).collect()
        }
    }
}

/// Structural reference implementation of [`KernelOracle`]
pub struct StructuralKernel {
    em: ExpressionManager,
    axioms: IndexMap<AxiomId, AxiomBody>,
    next_id: u64,
    datatypes: Arc<DatatypeModel>,
    interrupt: InterruptFlag,
    timeout: Option<Duration>,
    tracing: bool,
    last_trace: Vec<AxiomId>,
    cache: Option<Core>,
    realized: bool,
    modularizer: Modularizer,
    decomposition: Option<AtomicDecomposition>,
}

impl StructuralKernel {
    /// Kernel over the built-in XML Schema datatypes
    pub fn new() -> Result<Self> {
        let datatypes = DatatypeModel::xsd()
            .map_err(|e| OracleError::Unsupported(format!("datatype model: {}", e)))?;
        Ok(Self::with_datatypes(Arc::new(datatypes)))
    }

    pub fn with_datatypes(datatypes: Arc<DatatypeModel>) -> Self {
        Self {
            em: ExpressionManager::new(),
            axioms: IndexMap::new(),
            next_id: 0,
            datatypes,
            interrupt: InterruptFlag::new(),
            timeout: None,
            tracing: false,
            last_trace: Vec::new(),
            cache: None,
            realized: false,
            modularizer: Modularizer::default(),
            decomposition: None,
        }
    }

    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    pub fn axiom(&self, id: AxiomId) -> Option<&AxiomBody> {
        self.axioms.get(&id)
    }

    fn budget(&self) -> Budget {
        Budget {
            flag: self.interrupt.clone(),
            timeout: self.timeout,
            started: Instant::now(),
        }
    }

    fn invalidate(&mut self) {
        self.cache = None;
        self.decomposition = None;
        self.realized = false;
    }

    /// Helper expressions the closure rules look up without interning
    fn intern_helpers(&mut self, body: &AxiomBody) {
        let signature = body.signature(&self.em);
        for id in signature {
            if self.em.is_object_role(id) {
                let inverse = self.em.inverse(id);
                self.em.some(id, ExprId::TOP);
                self.em.some(inverse, ExprId::TOP);
            } else if self.em.is_data_role(id) {
                self.em.data_some(id, ExprId::DATA_TOP);
            }
        }
        match body {
            AxiomBody::ObjectRoleDomain { role, .. } | AxiomBody::ObjectRoleRange { role, .. } => {
                let inverse = self.em.inverse(*role);
                self.em.some(*role, ExprId::TOP);
                self.em.some(inverse, ExprId::TOP);
            }
            AxiomBody::RelatedTo { role, .. } => {
                let inverse = self.em.inverse(*role);
                self.em.some(*role, ExprId::TOP);
                self.em.some(inverse, ExprId::TOP);
            }
            AxiomBody::ValueOf { role, value, .. } => {
                self.em.data_has_value(*role, *value);
            }
            _ => {}
        }
    }

    /// Derived state, built on demand
    fn reasoned(&mut self) -> Result<(&ExpressionManager, &DatatypeModel, &mut Core)> {
        let budget = self.budget();
        budget.check()?;
        let provenance = self.tracing;
        if matches!(&self.cache, Some(core) if provenance && !core.base.provenance) {
            self.cache = None;
        }
        let core = lazily(&mut self.cache, || {
            Core::build(&self.em, &self.axioms, &self.datatypes, provenance, &budget)
        })?;
        Ok((&self.em, &*self.datatypes, core))
    }

    /// Derived state of a consistent knowledge base
    fn prepared(&mut self) -> Result<(&ExpressionManager, &DatatypeModel, &mut Core)> {
        let (em, datatypes, core) = self.reasoned()?;
        if core.inconsistency.is_some() {
            return Err(OracleError::Inconsistent);
        }
        Ok((em, datatypes, core))
    }

    /// Records the justification of the last answer when tracing was asked
    fn finish_trace(&mut self, holds: bool, exact: Option<BTreeSet<AxiomId>>, signature: BTreeSet<ExprId>) {
        if !self.tracing {
            return;
        }
        self.tracing = false;
        self.last_trace = match exact {
            Some(axioms) if !axioms.is_empty() => axioms.into_iter().collect(),
            _ if holds => {
                let module = self
                    .modularizer
                    .extract(&self.em, &self.axioms, &signature, ModuleType::Bottom);
                module.into_iter().collect()
            }
            _ => Vec::new(),
        };
        debug!("Trace recorded: {} axioms", self.last_trace.len());
    }

    fn signature_of(&self, ids: &[ExprId]) -> BTreeSet<ExprId> {
        let mut signature = BTreeSet::new();
        for id in ids {
            self.em.collect_signature(*id, &mut signature);
        }
        signature
    }

    fn hierarchy_query(
        &mut self,
        hierarchy: Hierarchy,
        element: ExprId,
        direction: Direction,
        direct: bool,
        actor: &mut dyn TaxonomyActor,
    ) -> Result<()> {
        let (em, datatypes, core) = self.prepared()?;
        let Core {
            base,
            concepts,
            object_roles,
            data_roles,
            ..
        } = core;
        let ctx = base.context(em, datatypes);

        let vertices = match hierarchy {
            Hierarchy::Concepts => {
                let leq = |a: ExprId, b: ExprId| ctx.subsumes(a, b, &base.labels);
                let taxonomy = lazily(concepts, || {
                    Ok(Taxonomy::build(base.concept_names.iter().copied(), ExprId::TOP, ExprId::BOTTOM, leq))
                })?;
                select(taxonomy, &place(taxonomy, element, leq), direction, direct)
            }
            Hierarchy::ObjectRoles => {
                let leq = |a: ExprId, b: ExprId| base.roles.is_sub(em, a, b);
                let taxonomy = lazily(object_roles, || {
                    Ok(Taxonomy::build(
                        base.object_role_names.iter().copied(),
                        ExprId::TOP_OBJECT_ROLE,
                        ExprId::BOTTOM_OBJECT_ROLE,
                        leq,
                    ))
                })?;
                select(taxonomy, &place(taxonomy, element, leq), direction, direct)
            }
            Hierarchy::DataRoles => {
                let leq = |a: ExprId, b: ExprId| base.roles.is_sub(em, a, b);
                let taxonomy = lazily(data_roles, || {
                    Ok(Taxonomy::build(
                        base.data_role_names.iter().copied(),
                        ExprId::TOP_DATA_ROLE,
                        ExprId::BOTTOM_DATA_ROLE,
                        leq,
                    ))
                })?;
                select(taxonomy, &place(taxonomy, element, leq), direction, direct)
            }
        };

        for vertex in vertices {
            actor.apply(&vertex, em);
        }
        Ok(())
    }

    fn disjoint_query(&mut self, hierarchy: Hierarchy, element: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        let (em, datatypes, core) = self.prepared()?;
        let Core {
            base,
            concepts,
            object_roles,
            data_roles,
            ..
        } = core;
        let ctx = base.context(em, datatypes);

        let vertices: Vec<Vec<ExprId>> = match hierarchy {
            Hierarchy::Concepts => {
                let leq = |a: ExprId, b: ExprId| ctx.subsumes(a, b, &base.labels);
                let taxonomy = lazily(concepts, || {
                    Ok(Taxonomy::build(base.concept_names.iter().copied(), ExprId::TOP, ExprId::BOTTOM, leq))
                })?;
                (0..taxonomy.len())
                    .filter(|v| {
                        *v == taxonomy.bottom
                            || ctx
                                .close([element, taxonomy.members(*v)[0]], &base.labels)
                                .is_unsatisfiable()
                    })
                    .map(|v| taxonomy.members(v).to_vec())
                    .collect()
            }
            Hierarchy::ObjectRoles | Hierarchy::DataRoles => {
                let leq = |a: ExprId, b: ExprId| base.roles.is_sub(em, a, b);
                let taxonomy = if hierarchy == Hierarchy::ObjectRoles {
                    lazily(object_roles, || {
                        Ok(Taxonomy::build(
                            base.object_role_names.iter().copied(),
                            ExprId::TOP_OBJECT_ROLE,
                            ExprId::BOTTOM_OBJECT_ROLE,
                            leq,
                        ))
                    })?
                } else {
                    lazily(data_roles, || {
                        Ok(Taxonomy::build(
                            base.data_role_names.iter().copied(),
                            ExprId::TOP_DATA_ROLE,
                            ExprId::BOTTOM_DATA_ROLE,
                            leq,
                        ))
                    })?
                };
                (0..taxonomy.len())
                    .filter(|v| {
                        *v == taxonomy.bottom || base.roles.are_disjoint(em, element, taxonomy.members(*v)[0])
                    })
                    .map(|v| taxonomy.members(v).to_vec())
                    .collect()
            }
        };

        for vertex in vertices {
            actor.apply(&vertex, em);
        }
        Ok(())
    }

    /// Pairwise check over a list of operands
    fn all_pairs(items: &[ExprId], mut check: impl FnMut(ExprId, ExprId) -> bool) -> bool {
        items
            .iter()
            .enumerate()
            .all(|(i, a)| items[i + 1..].iter().all(|b| check(*a, *b)))
    }

    fn entailment(&mut self, body: &AxiomBody) -> Result<(bool, Option<BTreeSet<AxiomId>>)> {
        // expressions the checks below look up
        let helper = match body {
            AxiomBody::ObjectRoleDomain { role, .. } => Some(self.em.some(*role, ExprId::TOP)),
            AxiomBody::ObjectRoleRange { role, .. } => {
                let inverse = self.em.inverse(*role);
                Some(self.em.some(inverse, ExprId::TOP))
            }
            AxiomBody::DataRoleDomain { role, .. } => Some(self.em.data_some(*role, ExprId::DATA_TOP)),
            AxiomBody::FunctionalObjectRole(role) | AxiomBody::FunctionalDataRole(role) => {
                Some(self.em.max(1, *role, ExprId::TOP))
            }
            AxiomBody::InverseFunctionalObjectRole(role) | AxiomBody::SymmetricObjectRole(role) => {
                Some(self.em.inverse(*role))
            }
            AxiomBody::InverseObjectRoles(_, b) => Some(self.em.inverse(*b)),
            _ => None,
        };
        let told = self.axioms.values().any(|loaded| loaded == body);

        let (em, datatypes, core) = self.prepared()?;
        let Core { base, abox, .. } = core;
        let ctx = base.context(em, datatypes);
        let labels = &base.labels;
        let roles = &base.roles;
        let empty = Label::seeded([]);

        let result = match body {
            AxiomBody::Declaration(_) => {
                return Err(OracleError::Unsupported("entailment of declarations".to_string()));
            }
            AxiomBody::ConceptInclusion { sub, sup } => {
                let holds = ctx.subsumes(*sub, *sup, labels);
                let exact = if holds { base.derivation(&ctx, *sub, *sup) } else { None };
                (holds, exact)
            }
            AxiomBody::EquivalentConcepts(items) => (
                Self::all_pairs(items, |a, b| ctx.subsumes(a, b, labels) && ctx.subsumes(b, a, labels)),
                None,
            ),
            AxiomBody::DisjointConcepts(items) => (
                Self::all_pairs(items, |a, b| ctx.close([a, b], labels).is_unsatisfiable()),
                None,
            ),
            AxiomBody::ObjectRoleInclusion { sub, sup } | AxiomBody::DataRoleInclusion { sub, sup } => {
                let holds = roles.is_sub(em, *sub, *sup);
                let path: BTreeSet<AxiomId> = roles.path(*sub, *sup).into_iter().collect();
                (holds, Some(path))
            }
            AxiomBody::EquivalentObjectRoles(items) | AxiomBody::EquivalentDataRoles(items) => (
                Self::all_pairs(items, |a, b| roles.is_sub(em, a, b) && roles.is_sub(em, b, a)),
                None,
            ),
            AxiomBody::DisjointObjectRoles(items) | AxiomBody::DisjointDataRoles(items) => (
                Self::all_pairs(items, |a, b| {
                    roles.are_disjoint(em, a, b)
                        || roles.is_sub(em, a, ExprId::BOTTOM_OBJECT_ROLE)
                        || roles.is_sub(em, b, ExprId::BOTTOM_OBJECT_ROLE)
                }),
                None,
            ),
            AxiomBody::InverseObjectRoles(a, _) => {
                let holds = helper
                    .map(|inverse| roles.is_sub(em, *a, inverse) && roles.is_sub(em, inverse, *a))
                    .unwrap_or(false);
                (holds, None)
            }
            AxiomBody::ObjectRoleDomain { domain: concept, .. }
            | AxiomBody::ObjectRoleRange { range: concept, .. }
            | AxiomBody::DataRoleDomain { domain: concept, .. } => {
                let holds = helper
                    .map(|some| ctx.subsumes(some, *concept, labels))
                    .unwrap_or(false);
                let exact = match helper {
                    Some(some) if holds => base.derivation(&ctx, some, *concept),
                    _ => None,
                };
                (holds, exact)
            }
            AxiomBody::DataRoleRange { role, range } => {
                let holds = *range == ExprId::DATA_TOP
                    || roles.ranges_of(*role).iter().any(|(told_range, _)| {
                        *told_range == *range
                            || match (em.get(*told_range), em.get(*range)) {
                                (Expr::Datatype(a), Expr::Datatype(b)) => datatypes.is_subtype_of(a.as_str(), b.as_str()),
                                _ => false,
                            }
                    });
                (holds, None)
            }
            AxiomBody::FunctionalObjectRole(role) | AxiomBody::FunctionalDataRole(role) => {
                let holds = roles.is_functional(em, *role)
                    || helper
                        .map(|max| ctx.subsumes(ExprId::TOP, max, labels))
                        .unwrap_or(false);
                (holds, None)
            }
            AxiomBody::InverseFunctionalObjectRole(_) => {
                let holds = helper.map(|inverse| roles.is_functional(em, inverse)).unwrap_or(false);
                (holds, None)
            }
            AxiomBody::TransitiveObjectRole(role) => (roles.is_transitive(em, *role), None),
            AxiomBody::SymmetricObjectRole(role) => {
                let holds = helper.map(|inverse| roles.is_sub(em, *role, inverse)).unwrap_or(false);
                (holds, None)
            }
            AxiomBody::InstanceOf { individual, concept } => {
                let label = abox.label(*individual).unwrap_or(&empty);
                (ctx.holds(&label.items, *concept, labels), None)
            }
            AxiomBody::RelatedTo { from, role, to } => {
                let holds = abox.role_fillers(&ctx, *from, *role).contains(to)
                    || ctx.holds(
                        &abox.label(*from).unwrap_or(&empty).items,
                        em.find(&Expr::ObjectHasValue { role: *role, individual: *to })
                            .unwrap_or(ExprId::BOTTOM),
                        labels,
                    );
                (holds, None)
            }
            AxiomBody::ValueOf { individual, role, value } => {
                (abox.data_fillers(&ctx, *individual, *role).contains(value), None)
            }
            AxiomBody::SameIndividuals(items) => {
                let class = items.first().map(|first| abox.same_as(*first)).unwrap_or_default();
                (items.iter().all(|i| class.contains(i) || items.len() == 1), None)
            }
            AxiomBody::NotRelatedTo { .. } | AxiomBody::NotValueOf { .. } | AxiomBody::DifferentIndividuals(_) => {
                (told, None)
            }
        };
        Ok(result)
    }
}

impl KernelOracle for StructuralKernel {
    fn clear(&mut self) {
        self.axioms.clear();
        self.invalidate();
        self.last_trace.clear();
    }

    fn load_axiom(&mut self, body: AxiomBody) -> Result<AxiomId> {
        self.intern_helpers(&body);
        let id = AxiomId(self.next_id);
        self.next_id += 1;
        self.axioms.insert(id, body);
        self.invalidate();
        Ok(id)
    }

    fn retract_axiom(&mut self, id: AxiomId) -> Result<()> {
        self.axioms
            .shift_remove(&id)
            .ok_or(OracleError::UnknownAxiom(id))?;
        self.invalidate();
        Ok(())
    }

    fn is_consistent(&mut self) -> Result<bool> {
        let (_, _, core) = self.reasoned()?;
        let inconsistency = core.inconsistency.clone();
        let consistent = inconsistency.is_none();
        self.finish_trace(!consistent, inconsistency, BTreeSet::new());
        Ok(consistent)
    }

    fn is_satisfiable(&mut self, concept: ExprId) -> Result<bool> {
        let (em, datatypes, core) = self.prepared()?;
        let ctx = core.base.context(em, datatypes);
        let labels = &core.base.labels;
        let (satisfiable, exact) = match labels.get(&concept) {
            Some(label) => (
                !label.is_unsatisfiable(),
                label
                    .is_unsatisfiable()
                    .then(|| ctx.trace(label, ExprId::BOTTOM, labels)),
            ),
            None => (!ctx.close([concept], labels).is_unsatisfiable(), None),
        };
        let signature = self.signature_of(&[concept]);
        self.finish_trace(!satisfiable, exact, signature);
        Ok(satisfiable)
    }

    fn is_subsumed_by(&mut self, sub: ExprId, sup: ExprId) -> Result<bool> {
        let (em, datatypes, core) = self.prepared()?;
        let ctx = core.base.context(em, datatypes);
        let holds = ctx.subsumes(sub, sup, &core.base.labels);
        let exact = if holds { core.base.derivation(&ctx, sub, sup) } else { None };
        let signature = self.signature_of(&[sub, sup]);
        self.finish_trace(holds, exact, signature);
        Ok(holds)
    }

    fn equivalent_concepts(&mut self, concept: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::Concepts, concept, Direction::Equivalent, false, actor)
    }

    fn sub_concepts(&mut self, concept: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::Concepts, concept, Direction::Sub, direct, actor)
    }

    fn super_concepts(&mut self, concept: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::Concepts, concept, Direction::Super, direct, actor)
    }

    fn disjoint_concepts(&mut self, concept: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.disjoint_query(Hierarchy::Concepts, concept, actor)
    }

    fn equivalent_object_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::ObjectRoles, role, Direction::Equivalent, false, actor)
    }

    fn sub_object_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::ObjectRoles, role, Direction::Sub, direct, actor)
    }

    fn super_object_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::ObjectRoles, role, Direction::Super, direct, actor)
    }

    fn disjoint_object_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.disjoint_query(Hierarchy::ObjectRoles, role, actor)
    }

    fn equivalent_data_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::DataRoles, role, Direction::Equivalent, false, actor)
    }

    fn sub_data_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::DataRoles, role, Direction::Sub, direct, actor)
    }

    fn super_data_roles(&mut self, role: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.hierarchy_query(Hierarchy::DataRoles, role, Direction::Super, direct, actor)
    }

    fn disjoint_data_roles(&mut self, role: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        self.disjoint_query(Hierarchy::DataRoles, role, actor)
    }

    fn instances(&mut self, concept: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        let (em, datatypes, core) = self.prepared()?;
        let Core { base, abox, concepts, .. } = core;
        let ctx = base.context(em, datatypes);
        let leq = |a: ExprId, b: ExprId| ctx.subsumes(a, b, &base.labels);
        let taxonomy = lazily(concepts, || {
            Ok(Taxonomy::build(base.concept_names.iter().copied(), ExprId::TOP, ExprId::BOTTOM, leq))
        })?;

        let below: Vec<ExprId> = if direct {
            place(taxonomy, concept, leq)
                .subs
                .into_iter()
                .filter(|v| *v != taxonomy.bottom)
                .map(|v| taxonomy.members(v)[0])
                .collect()
        } else {
            Vec::new()
        };

        let mut seen = BTreeSet::new();
        for individual in abox.individuals() {
            if !abox.instance_of(&ctx, *individual, concept, &base.labels) {
                continue;
            }
            if below.iter().any(|sub| abox.instance_of(&ctx, *individual, *sub, &base.labels)) {
                continue;
            }
            let class = abox.same_as(*individual);
            if seen.insert(class.clone()) {
                actor.apply(&class, em);
            }
        }
        Ok(())
    }

    fn types(&mut self, individual: ExprId, direct: bool, actor: &mut dyn TaxonomyActor) -> Result<()> {
        let (em, datatypes, core) = self.prepared()?;
        let Core { base, abox, concepts, .. } = core;
        let ctx = base.context(em, datatypes);
        let leq = |a: ExprId, b: ExprId| ctx.subsumes(a, b, &base.labels);
        let taxonomy = lazily(concepts, || {
            Ok(Taxonomy::build(base.concept_names.iter().copied(), ExprId::TOP, ExprId::BOTTOM, leq))
        })?;

        let empty = Label::seeded([]);
        let label = abox.label(individual).unwrap_or(&empty);
        let holding: BTreeSet<usize> = (0..taxonomy.len())
            .filter(|v| *v != taxonomy.bottom && ctx.holds(&label.items, taxonomy.members(*v)[0], &base.labels))
            .collect();
        let vertices = if direct {
            taxonomy.minimal(&holding)
        } else {
            holding.into_iter().collect()
        };
        for vertex in vertices {
            actor.apply(taxonomy.members(vertex), em);
        }
        Ok(())
    }

    fn same_as(&mut self, individual: ExprId, actor: &mut dyn TaxonomyActor) -> Result<()> {
        let (em, _, core) = self.prepared()?;
        let class = if core.abox.is_known(individual) {
            core.abox.same_as(individual)
        } else {
            vec![individual]
        };
        actor.apply(&class, em);
        Ok(())
    }

    fn role_fillers(&mut self, individual: ExprId, role: ExprId) -> Result<Vec<ExprId>> {
        let (em, datatypes, core) = self.prepared()?;
        let ctx = core.base.context(em, datatypes);
        Ok(core.abox.role_fillers(&ctx, individual, role))
    }

    fn data_fillers(&mut self, individual: ExprId, role: ExprId) -> Result<Vec<ExprId>> {
        let (em, datatypes, core) = self.prepared()?;
        let ctx = core.base.context(em, datatypes);
        Ok(core.abox.data_fillers(&ctx, individual, role))
    }

    fn realize(&mut self) -> Result<()> {
        let (em, datatypes, core) = self.prepared()?;
        let Core { base, concepts, .. } = core;
        let ctx = base.context(em, datatypes);
        lazily(concepts, || {
            Ok(Taxonomy::build(base.concept_names.iter().copied(), ExprId::TOP, ExprId::BOTTOM, |a, b| {
                ctx.subsumes(a, b, &base.labels)
            }))
        })?;
        self.realized = true;
        Ok(())
    }

    fn is_realized(&self) -> bool {
        self.realized
    }

    fn is_entailed(&mut self, body: &AxiomBody) -> Result<bool> {
        let (holds, exact) = self.entailment(body)?;
        let signature = body.signature(&self.em);
        self.finish_trace(holds, exact, signature);
        Ok(holds)
    }

    fn build_proof_node(&mut self, concept: ExprId) -> Result<ProofNodeId> {
        let (em, datatypes, core) = self.prepared()?;
        let Core { base, proof, .. } = core;
        let root = proof.build(&base.context(em, datatypes), &base.labels, concept)?;
        debug!("Proof graph for {} has {} nodes", em.display(concept), proof.len());
        Ok(root)
    }

    fn object_roles(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>> {
        self.proof_graph(node)?.object_roles(node, deterministic_only)
    }

    fn data_roles(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>> {
        self.proof_graph(node)?.data_roles(node, deterministic_only)
    }

    fn neighbours(&self, node: ProofNodeId, role: ExprId) -> Result<Vec<ProofNodeId>> {
        let core = self.cache.as_ref().ok_or(OracleError::UnknownProofNode(node))?;
        core.proof
            .neighbours(node, |edge| core.base.roles.is_sub(&self.em, edge, role))
    }

    fn object_label(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>> {
        self.proof_graph(node)?
            .label(node, deterministic_only, false, |id| self.em.is_concept(id))
    }

    fn data_label(&self, node: ProofNodeId, deterministic_only: bool) -> Result<Vec<ExprId>> {
        self.proof_graph(node)?
            .label(node, deterministic_only, true, |id| self.em.is_concept(id))
    }

    fn blocker(&self, node: ProofNodeId) -> Result<Option<ProofNodeId>> {
        self.proof_graph(node)?.blocker(node)
    }

    fn module(&mut self, signature: &[ExprId], use_semantic: bool, module_type: ModuleType) -> Result<Vec<AxiomId>> {
        if use_semantic {
            debug!("Semantic locality unavailable, using syntactic locality");
        }
        let signature: BTreeSet<ExprId> = signature.iter().copied().collect();
        let module = self
            .modularizer
            .extract(&self.em, &self.axioms, &signature, module_type);
        Ok(module.into_iter().collect())
    }

    fn non_local(&mut self, signature: &[ExprId], use_semantic: bool, module_type: ModuleType) -> Result<Vec<AxiomId>> {
        if use_semantic {
            debug!("Semantic locality unavailable, using syntactic locality");
        }
        let signature: BTreeSet<ExprId> = signature.iter().copied().collect();
        Ok(self
            .modularizer
            .non_local(&self.em, &self.axioms, &signature, module_type))
    }

    fn atomic_decomposition_size(&mut self, use_semantic: bool, module_type: ModuleType) -> Result<usize> {
        if use_semantic {
            debug!("Semantic locality unavailable, using syntactic locality");
        }
        self.budget().check()?;
        let decomposition = AtomicDecomposition::build(&mut self.modularizer, &self.em, &self.axioms, module_type);
        let size = decomposition.len();
        self.decomposition = Some(decomposition);
        Ok(size)
    }

    fn atom_axioms(&self, index: usize) -> Result<Vec<AxiomId>> {
        self.decomposition()?.atom_axioms(index)
    }

    fn atom_module(&self, index: usize) -> Result<Vec<AxiomId>> {
        self.decomposition()?.atom_module(index)
    }

    fn atom_dependents(&self, index: usize) -> Result<Vec<usize>> {
        self.decomposition()?.atom_dependents(index)
    }

    fn tautologies(&self) -> Result<Vec<AxiomId>> {
        Ok(self.decomposition()?.tautologies().to_vec())
    }

    fn loc_check_number(&self) -> u64 {
        self.modularizer.checks
    }

    fn need_tracing(&mut self) {
        self.tracing = true;
    }

    fn trace(&self) -> Vec<AxiomId> {
        self.last_trace.clone()
    }

    fn set_interrupt_flag(&mut self, flag: InterruptFlag) {
        self.interrupt = flag;
    }

    fn set_timeout(&mut self, timeout_ms: Option<u64>) {
        self.timeout = timeout_ms.map(Duration::from_millis);
    }

    fn expression_manager(&self) -> &ExpressionManager {
        &self.em
    }

    fn expression_manager_mut(&mut self) -> &mut ExpressionManager {
        &mut self.em
    }
}

impl StructuralKernel {
    fn proof_graph(&self, node: ProofNodeId) -> Result<&ProofGraph> {
        self.cache
            .as_ref()
            .map(|core| &core.proof)
            .ok_or(OracleError::UnknownProofNode(node))
    }

    fn decomposition(&self) -> Result<&AtomicDecomposition> {
        self.decomposition
            .as_ref()
            .ok_or(OracleError::NoAtomicDecomposition)
    }
}
