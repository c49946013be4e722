//! 推論セッションのエラー

use shoin_core::{AxiomType, Entity};
use shoin_datatypes::DatatypeError;
use shoin_kernel::OracleError;
use thiserror::Error;

/// Errors a reasoning session reports to its caller
#[derive(Error, Debug)]
pub enum ReasonerError {
    /// The committed axioms have no model
    #[error("Inconsistent ontology")]
    Inconsistent,

    #[error("Reasoner interrupted")]
    Interrupted,

    /// Query vocabulary outside the known-entity index
    #[error("Fresh entities in query: {}", format_entities(.entities))]
    FreshEntities { entities: Vec<Entity> },

    #[error("Reasoner timed out")]
    Timeout,

    #[error("Entailment checking is not supported for {0} axioms")]
    UnsupportedEntailment(AxiomType),

    #[error("Configuration error: {0}")]
    Configuration(#[from] DatatypeError),

    #[error("Invalid reasoner configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Oracle(OracleError),
}

fn format_entities(entities: &[Entity]) -> String {
    entities
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<OracleError> for ReasonerError {
    fn from(error: OracleError) -> Self {
        match error {
            OracleError::Inconsistent => ReasonerError::Inconsistent,
            OracleError::Interrupted => ReasonerError::Interrupted,
            OracleError::Timeout { .. } => ReasonerError::Timeout,
            other => ReasonerError::Oracle(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReasonerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::Iri;

    #[test]
    fn test_oracle_signals_map_to_session_errors() {
        assert!(matches!(ReasonerError::from(OracleError::Inconsistent), ReasonerError::Inconsistent));
        assert!(matches!(ReasonerError::from(OracleError::Interrupted), ReasonerError::Interrupted));
        assert!(matches!(
            ReasonerError::from(OracleError::Timeout { elapsed_ms: 10 }),
            ReasonerError::Timeout
        ));
        assert!(matches!(
            ReasonerError::from(OracleError::NoAtomicDecomposition),
            ReasonerError::Oracle(OracleError::NoAtomicDecomposition)
        ));
    }

    #[test]
    fn test_fresh_entities_message_names_every_entity() {
        let error = ReasonerError::FreshEntities {
            entities: vec![
                Entity::Class(Iri::new("http://example.org/Unicorn")),
                Entity::Individual(Iri::new("http://example.org/Unicorn")),
            ],
        };
        let message = error.to_string();
        assert!(message.contains("class <http://example.org/Unicorn>"));
        assert!(message.contains("individual <http://example.org/Unicorn>"));
    }
}
