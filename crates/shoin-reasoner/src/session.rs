//! 知識ベースセッション
//!
//! コミット済み公理, 保留中の変更ログ, 既知実体インデックス, 一貫性キャッシュを
//! 単一のロックの下で保持し, 差分をオラクルへ転送します。

use crate::change::{compute_diff, ChangeDiff};
use crate::config::{BufferingMode, FreshEntityPolicy, IndividualNodeSetPolicy, ReasonerConfiguration};
use crate::translation::Translator;
use crate::{ReasonerError, Result};
use indexmap::IndexSet;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shoin_core::{
    Axiom, Class, ClassExpression, DataProperty, Entity, ObjectPropertyExpression, Ontology,
    OntologyChange,
};
use shoin_datatypes::{DatatypeDeclaration, DatatypeError, DatatypeModel};
use shoin_kernel::{AxiomId, InterruptFlag, KernelOracle, OracleError, StructuralKernel};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

pub const REASONER_NAME: &str = "shoin";

/// Cached consistency of the committed axiom set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyState {
    Unknown,
    Consistent,
    Inconsistent,
}

/// Inference kinds a caller may ask to precompute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum InferenceType {
    ClassHierarchy,
    ClassAssertions,
    ObjectPropertyHierarchy,
    DataPropertyHierarchy,
    ObjectPropertyAssertions,
    DataPropertyAssertions,
    SameIndividual,
    DifferentIndividuals,
    DisjointClasses,
}

const PRECOMPUTABLE: [InferenceType; 5] = [
    InferenceType::ClassHierarchy,
    InferenceType::ClassAssertions,
    InferenceType::ObjectPropertyHierarchy,
    InferenceType::DataPropertyHierarchy,
    InferenceType::SameIndividual,
];

/// Everything the session lock protects
pub(crate) struct KnowledgeBase<O> {
    pub oracle: O,
    pub interrupt: InterruptFlag,
    pub fresh_entity_policy: FreshEntityPolicy,
    pub merge_same_as: bool,
    pub committed: IndexSet<Arc<Axiom>>,
    pub pending: Vec<OntologyChange>,
    pub known: BTreeSet<Entity>,
    pub consistency: ConsistencyState,
    /// Committed axioms the oracle holds, by kernel handle
    pub loaded: HashMap<Arc<Axiom>, AxiomId>,
    pub by_id: HashMap<AxiomId, Arc<Axiom>>,
    pub last_trace: Vec<Arc<Axiom>>,
}

impl<O: KernelOracle> KnowledgeBase<O> {
    fn builtin_entities() -> [Entity; 6] {
        [
            Class::Thing.entity(),
            Class::Nothing.entity(),
            ObjectPropertyExpression::top().entity(),
            ObjectPropertyExpression::bottom().entity(),
            DataProperty::top().entity(),
            DataProperty::bottom().entity(),
        ]
    }

    fn rebuild_known_entities(&mut self) {
        self.known = Self::builtin_entities().into_iter().collect();
        for axiom in &self.committed {
            self.known.extend(axiom.signature());
        }
    }

    /// Sends `axioms` to the oracle and records their handles
    fn load(&mut self, axioms: impl IntoIterator<Item = Arc<Axiom>>) -> Result<()> {
        let mut sent = Vec::new();
        let mut bodies = Vec::new();
        for axiom in axioms {
            let body = Translator::new(self.oracle.expression_manager_mut()).axiom(&axiom);
            match body {
                Some(body) => {
                    sent.push(axiom);
                    bodies.push(body);
                }
                None => debug!("Axiom not loaded into the oracle: {:?}", axiom.axiom_type()),
            }
        }
        let ids = self.oracle.load_axioms(bodies)?;
        for (axiom, id) in sent.into_iter().zip(ids) {
            self.by_id.insert(id, Arc::clone(&axiom));
            self.loaded.insert(axiom, id);
        }
        Ok(())
    }

    fn retract(&mut self, axiom: &Arc<Axiom>) -> Result<()> {
        if let Some(&id) = self.loaded.get(axiom) {
            self.oracle.retract_axiom(id)?;
            self.loaded.remove(axiom);
            self.by_id.remove(&id);
        }
        Ok(())
    }

    pub fn diff(&self) -> ChangeDiff {
        compute_diff(&self.pending, &self.committed)
    }

    /// Applies the net pending change. The oracle is updated first; the
    /// committed set, known entities and pending log only change once it
    /// has accepted the whole delta, so a failed flush can be retried.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let diff = self.diff();
        if diff.is_empty() {
            self.pending.clear();
            debug!("Flush: no net change");
            return Ok(());
        }

        for axiom in &diff.removed {
            self.retract(axiom)?;
        }
        let unloaded: Vec<Arc<Axiom>> = diff
            .added
            .iter()
            .filter(|axiom| !self.loaded.contains_key(*axiom))
            .cloned()
            .collect();
        self.load(unloaded)?;

        for axiom in &diff.removed {
            self.committed.shift_remove(axiom);
        }
        for axiom in &diff.added {
            self.committed.insert(Arc::clone(axiom));
        }
        self.pending.clear();
        self.rebuild_known_entities();
        self.consistency = ConsistencyState::Unknown;
        info!(
            "Flushed changes: {} added, {} removed, {} committed",
            diff.added.len(),
            diff.removed.len(),
            self.committed.len()
        );
        Ok(())
    }

    /// Cached consistency; an oracle inconsistency signal becomes `false`
    pub fn is_consistent(&mut self) -> Result<bool> {
        match self.consistency {
            ConsistencyState::Consistent => return Ok(true),
            ConsistencyState::Inconsistent => return Ok(false),
            ConsistencyState::Unknown => {}
        }
        let consistent = match self.oracle.is_consistent() {
            Ok(consistent) => consistent,
            Err(OracleError::Inconsistent) => false,
            Err(e) => return Err(e.into()),
        };
        self.consistency = if consistent {
            ConsistencyState::Consistent
        } else {
            ConsistencyState::Inconsistent
        };
        info!("Consistency computed: {}", consistent);
        Ok(consistent)
    }

    /// Guard for every consistency-dependent query. The interrupt flag is
    /// looked at first.
    pub fn check_consistency(&mut self) -> Result<()> {
        if self.interrupt.is_set() {
            return Err(ReasonerError::Interrupted);
        }
        if !self.is_consistent()? {
            return Err(ReasonerError::Inconsistent);
        }
        Ok(())
    }

    pub fn is_fresh(&self, entity: &Entity) -> bool {
        !self.known.contains(entity)
    }

    pub fn translator(&mut self) -> Translator<'_> {
        Translator::new(self.oracle.expression_manager_mut())
    }

    pub fn host_axioms(&self, ids: impl IntoIterator<Item = AxiomId>) -> Vec<Arc<Axiom>> {
        let mut seen = IndexSet::new();
        for id in ids {
            if let Some(axiom) = self.by_id.get(&id) {
                seen.insert(Arc::clone(axiom));
            }
        }
        seen.into_iter().collect()
    }
}

/// The named entity a class expression stands for, if it is not anonymous
pub(crate) fn named_class(ce: &ClassExpression) -> Option<Entity> {
    ce.as_class().map(|class| class.entity())
}

pub(crate) fn named_object_property(pe: &ObjectPropertyExpression) -> Option<Entity> {
    (!pe.is_anonymous()).then(|| pe.entity())
}

/// Reasoning session over a knowledge base.
///
/// All state lives behind one lock; configuration getters bypass it.
/// The session is `Send + Sync` for any `Send` oracle.
pub struct Reasoner<O: KernelOracle = StructuralKernel> {
    config: ReasonerConfiguration,
    interrupt: InterruptFlag,
    pub(crate) state: Mutex<KnowledgeBase<O>>,
}

impl Reasoner<StructuralKernel> {
    /// Session backed by the structural reference oracle over the XML
    /// Schema datatypes
    pub fn structural(ontology: &Ontology, config: ReasonerConfiguration) -> Result<Self> {
        Self::new(ontology, StructuralKernel::new()?, config)
    }

    /// Like [`Reasoner::structural`], with user datatypes declared in a JSON
    /// schema document on top of the XML Schema hierarchy
    pub fn with_datatype_schema(
        ontology: &Ontology,
        schema_json: &str,
        config: ReasonerConfiguration,
    ) -> Result<Self> {
        let declarations: Vec<DatatypeDeclaration> =
            serde_json::from_str(schema_json).map_err(DatatypeError::from)?;
        let datatypes = DatatypeModel::xsd_with(&declarations)?;
        info!("Datatype model loaded: {} datatypes", datatypes.len());
        Self::new(ontology, StructuralKernel::with_datatypes(Arc::new(datatypes)), config)
    }
}

impl<O: KernelOracle> Reasoner<O> {
    /// Starts a session: the oracle is cleared and loaded with the
    /// ontology's logical axioms
    pub fn new(ontology: &Ontology, oracle: O, config: ReasonerConfiguration) -> Result<Self> {
        Self::with_interrupt_flag(ontology, oracle, config, InterruptFlag::new())
    }

    /// Like [`Reasoner::new`], cancelled through a flag the caller already
    /// holds. One flag may be shared by several sessions.
    pub fn with_interrupt_flag(
        ontology: &Ontology,
        mut oracle: O,
        config: ReasonerConfiguration,
        interrupt: InterruptFlag,
    ) -> Result<Self> {
        oracle.set_interrupt_flag(interrupt.clone());
        oracle.set_timeout(config.timeout_ms);
        oracle.clear();

        let committed: IndexSet<Arc<Axiom>> = ontology.axioms().map(|a| a.without_annotations()).collect();
        let mut kb = KnowledgeBase {
            oracle,
            interrupt: interrupt.clone(),
            fresh_entity_policy: config.fresh_entity_policy,
            merge_same_as: config.individual_node_set_policy == IndividualNodeSetPolicy::BySameAs,
            committed: committed.clone(),
            pending: Vec::new(),
            known: BTreeSet::new(),
            consistency: ConsistencyState::Unknown,
            loaded: HashMap::new(),
            by_id: HashMap::new(),
            last_trace: Vec::new(),
        };
        kb.rebuild_known_entities();
        kb.load(committed)?;
        info!(
            "Reasoner created: {} axioms, {} known entities",
            kb.committed.len(),
            kb.known.len()
        );

        Ok(Self {
            config,
            interrupt,
            state: Mutex::new(kb),
        })
    }

    // ---- identity and configuration (no lock) ----

    pub fn reasoner_name(&self) -> &'static str {
        REASONER_NAME
    }

    pub fn reasoner_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn configuration(&self) -> &ReasonerConfiguration {
        &self.config
    }

    pub fn buffering_mode(&self) -> BufferingMode {
        self.config.buffering_mode
    }

    pub fn timeout(&self) -> Option<u64> {
        self.config.timeout_ms
    }

    pub fn fresh_entity_policy(&self) -> FreshEntityPolicy {
        self.config.fresh_entity_policy
    }

    pub fn individual_node_set_policy(&self) -> IndividualNodeSetPolicy {
        self.config.individual_node_set_policy
    }

    /// Makes every later consistency-dependent call fail with
    /// [`ReasonerError::Interrupted`]. There is no way back.
    pub fn interrupt(&self) {
        info!("Reasoner interrupted");
        self.interrupt.interrupt();
    }

    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    // ---- changes ----

    /// Appends to the pending log; flushes at once when non-buffering
    #[tracing::instrument(skip(self))]
    pub fn record_change(&self, change: OntologyChange) -> Result<()> {
        self.record_changes([change])
    }

    pub fn record_changes(&self, changes: impl IntoIterator<Item = OntologyChange>) -> Result<()> {
        let mut kb = self.state.lock();
        kb.pending.extend(changes);
        if self.config.buffering_mode == BufferingMode::NonBuffering {
            kb.flush()?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn flush(&self) -> Result<()> {
        self.state.lock().flush()
    }

    pub fn pending_changes(&self) -> Vec<OntologyChange> {
        self.state.lock().pending.clone()
    }

    pub fn pending_axiom_additions(&self) -> IndexSet<Arc<Axiom>> {
        self.state.lock().diff().added
    }

    pub fn pending_axiom_removals(&self) -> IndexSet<Arc<Axiom>> {
        self.state.lock().diff().removed
    }

    pub fn committed_axioms(&self) -> Vec<Arc<Axiom>> {
        self.state.lock().committed.iter().cloned().collect()
    }

    // ---- consistency ----

    /// Never fails on an inconsistent knowledge base; that is `Ok(false)`
    #[tracing::instrument(skip(self))]
    pub fn is_consistent(&self) -> Result<bool> {
        self.state.lock().is_consistent()
    }

    pub fn consistency_state(&self) -> ConsistencyState {
        self.state.lock().consistency
    }

    /// True for a named entity outside every committed axiom's signature
    pub fn is_fresh(&self, entity: &Entity) -> bool {
        self.state.lock().is_fresh(entity)
    }

    #[tracing::instrument(skip(self))]
    pub fn is_satisfiable(&self, ce: &ClassExpression) -> Result<bool> {
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        let concept = kb.translator().class(ce);
        Ok(kb.oracle.is_satisfiable(concept)?)
    }

    // ---- precomputation ----

    pub fn precomputable_inference_types(&self) -> BTreeSet<InferenceType> {
        PRECOMPUTABLE.into_iter().collect()
    }

    /// Realises the knowledge base if any requested type is supported
    #[tracing::instrument(skip(self))]
    pub fn precompute_inferences(&self, types: &[InferenceType]) -> Result<()> {
        if !types.iter().any(|t| PRECOMPUTABLE.contains(t)) {
            return Ok(());
        }
        let mut kb = self.state.lock();
        kb.check_consistency()?;
        if !kb.oracle.is_realized() {
            kb.oracle.realize()?;
            info!("Knowledge base realised");
        }
        Ok(())
    }

    pub fn is_precomputed(&self, inference_type: InferenceType) -> bool {
        if PRECOMPUTABLE.contains(&inference_type) {
            self.state.lock().oracle.is_realized()
        } else {
            true
        }
    }
}
