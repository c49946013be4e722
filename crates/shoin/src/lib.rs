//! # Shoin - OWL DL 推論セッション
//!
//! 記述論理カーネルの前段に立つセッション管理スタックです。
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shoin::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cat = ClassExpression::named("http://example.org/Cat");
//!     let animal = ClassExpression::named("http://example.org/Animal");
//!
//!     let mut ontology = Ontology::new();
//!     ontology.add_axiom(Axiom::SubClassOf(cat.clone(), animal));
//!
//!     let reasoner = Reasoner::structural(&ontology, ReasonerConfiguration::default())?;
//!     for node in &reasoner.super_classes(&cat, true)? {
//!         println!("{}", node);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`shoin-core`**: OWL モデル (IRI, 実体, 式, 公理, オントロジー)
//! - **`shoin-datatypes`**: データ型モデル (制約の継承, 部分型, 互換性)
//! - **`shoin-kernel`**: カーネルオラクル契約と構造的リファレンス実装
//! - **`shoin-reasoner`**: 差分エンジン, KB セッション, タクソノミー問い合わせ, 含意, 探索
//!
//! ## Feature Flags
//!
//! - `full` (default): すべてのクレート
//! - `core`, `datatypes`, `kernel`, `reasoner`: 個別のクレート

#[cfg(feature = "shoin-core")]
pub use shoin_core as core;

#[cfg(feature = "shoin-datatypes")]
pub use shoin_datatypes as datatypes;

#[cfg(feature = "shoin-kernel")]
pub use shoin_kernel as kernel;

#[cfg(feature = "shoin-reasoner")]
pub use shoin_reasoner as reasoner;

#[cfg(feature = "shoin-reasoner")]
pub use shoin_reasoner::{Reasoner, ReasonerConfiguration, ReasonerError};

// Commonly used external dependencies
pub use anyhow;
pub use serde;
pub use serde_json;

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "shoin-core")]
    pub use shoin_core::{
        AnnotatedAxiom, Axiom, AxiomType, Class, ClassExpression, DataProperty, DataRange, Entity, Individual,
        Iri, Literal, ObjectPropertyExpression, Ontology, OntologyChange,
    };

    #[cfg(feature = "shoin-datatypes")]
    pub use shoin_datatypes::{DatatypeDeclaration, DatatypeModel};

    #[cfg(feature = "shoin-reasoner")]
    pub use shoin_reasoner::{
        BufferingMode, ConsistencyState, FreshEntityPolicy, IndividualNodeSetPolicy, InferenceType, Node,
        NodeSet, Reasoner, ReasonerConfiguration, ReasonerError,
    };

    pub use anyhow::Result;
}

/// Current version of Shoin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reads a JSON datatype schema from `path` and merges it into the
/// built-in XSD hierarchy
#[cfg(feature = "shoin-datatypes")]
pub fn load_datatype_model(path: impl AsRef<std::path::Path>) -> anyhow::Result<shoin_datatypes::DatatypeModel> {
    use anyhow::Context;

    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read datatype schema {}", path.display()))?;
    let declarations: Vec<shoin_datatypes::DatatypeDeclaration> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse datatype schema {}", path.display()))?;
    let model = shoin_datatypes::DatatypeModel::xsd_with(&declarations)?;
    tracing::info!("Loaded {} datatypes from {}", model.len(), path.display());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.chars().all(|c| c.is_ascii_digit() || c == '.'));
    }

    #[cfg(feature = "shoin-datatypes")]
    #[test]
    fn test_load_datatype_model_missing_file() {
        let err = load_datatype_model("/nonexistent/shoin/schema.json").unwrap_err();
        assert!(err.to_string().contains("failed to read datatype schema"));
    }

    #[cfg(feature = "shoin-datatypes")]
    #[test]
    fn test_load_datatype_model_from_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("shoin-schema-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"name": "http://example.org/dt#Age", "base": "http://www.w3.org/2001/XMLSchema#integer"}]"#,
        )?;
        let model = load_datatype_model(&path)?;
        std::fs::remove_file(&path)?;
        assert!(model.is_subtype_of(
            "http://example.org/dt#Age",
            "http://www.w3.org/2001/XMLSchema#integer"
        ));
        Ok(())
    }
}
