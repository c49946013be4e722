//! データ型モデル
//!
//! このクレートはデータ型スキーマの解決済みモデルを提供します:
//! - 制限ベースによる木構造 (多重継承なし, ロード時の循環検出)
//! - ファセットとファセット値の継承
//! - ordered / bounded / cardinality / numeric の独立した継承
//! - 部分型判定と互換性判定 (数値型は数値専用規則へ委譲)

pub mod facet;
pub mod model;
pub mod numeric;
pub mod schema;

pub use facet::{Cardinality, Facet, Ordered};
pub use model::{DatatypeModel, DatatypeNode};
pub use schema::DatatypeDeclaration;

use thiserror::Error;

/// Errors raised while loading a datatype schema. All of them are
/// configuration errors: a model that fails to load is never half-built.
#[derive(Error, Debug)]
pub enum DatatypeError {
    #[error("Duplicate datatype declaration: {0}")]
    DuplicateDeclaration(String),

    #[error("Datatype {datatype} restricts unknown base {base}")]
    UnknownBase { datatype: String, base: String },

    #[error("Cyclic restriction chain: {}", .0.join(" -> "))]
    CyclicRestriction(Vec<String>),

    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    #[error("Unknown datatype property: {0}")]
    UnknownProperty(String),

    #[error("Invalid value '{value}' for datatype property {property}")]
    InvalidPropertyValue { property: String, value: String },

    #[error("Schema parse error: {0}")]
    Schema(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatatypeError>;
