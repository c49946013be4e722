//! 推論カーネル (オラクル) 契約
//!
//! このクレートはセッションがオラクルに要求するインターフェースを提供します:
//! - 重複排除された式空間 (ハンドルでアドレスされるアリーナ)
//! - カーネル公理と公理ハンドル
//! - `KernelOracle` トレイトとタクソノミーアクター
//! - 協調的な割り込みフラグ
//! - 参照実装 `StructuralKernel` (告知公理上の構造的推論, 証明グラフ, モジュール抽出)

pub mod axiom;
pub mod expr;
pub mod oracle;
pub mod structural;

pub use axiom::{AxiomBody, AxiomId};
pub use expr::{Expr, ExprId, ExpressionManager};
pub use oracle::{InterruptFlag, KernelOracle, ModuleType, ProofNodeId, TaxonomyActor};
pub use structural::StructuralKernel;

use thiserror::Error;

/// Signals raised by an oracle. The session maps the first three onto its
/// own error kinds and propagates the rest unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Knowledge base is inconsistent")]
    Inconsistent,

    #[error("Reasoning was interrupted")]
    Interrupted,

    #[error("Reasoning timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Fresh entity in query: {iri}")]
    FreshEntity { iri: String },

    #[error("No proof node could be built: {0}")]
    NoProofNode(String),

    #[error("Unknown proof node: {0}")]
    UnknownProofNode(ProofNodeId),

    #[error("Unknown axiom: {0}")]
    UnknownAxiom(AxiomId),

    #[error("Atom index {index} out of range (decomposition has {size} atoms)")]
    AtomIndexOutOfRange { index: usize, size: usize },

    #[error("Atomic decomposition has not been computed")]
    NoAtomicDecomposition,

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, OracleError>;
