//! # Reasoner Configuration
//!
//! Session-level settings, fixed at construction

use serde::{Deserialize, Serialize};

/// When recorded changes reach the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BufferingMode {
    /// Changes wait in the pending log until `flush`
    #[default]
    Buffering,
    /// Every recorded change is flushed immediately
    NonBuffering,
}

/// How queries over vocabulary outside the knowledge base are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FreshEntityPolicy {
    #[default]
    Allow,
    Disallow,
}

/// How individuals are grouped into nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndividualNodeSetPolicy {
    /// Same-as individuals share one node
    #[default]
    BySameAs,
    /// One node per individual
    BySingletons,
}

/// Reasoner configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfiguration {
    pub buffering_mode: BufferingMode,

    pub fresh_entity_policy: FreshEntityPolicy,

    pub individual_node_set_policy: IndividualNodeSetPolicy,

    /// Advisory budget forwarded to the oracle
    pub timeout_ms: Option<u64>,

    /// Ask the oracle to record justifications for every entailment
    pub tracing: bool,
}

impl ReasonerConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_buffering_mode(mut self, mode: BufferingMode) -> Self {
        self.buffering_mode = mode;
        self
    }

    pub fn with_fresh_entity_policy(mut self, policy: FreshEntityPolicy) -> Self {
        self.fresh_entity_policy = policy;
        self
    }

    pub fn with_individual_node_set_policy(mut self, policy: IndividualNodeSetPolicy) -> Self {
        self.individual_node_set_policy = policy;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_tracing(mut self, tracing: bool) -> Self {
        self.tracing = tracing;
        self
    }
}
