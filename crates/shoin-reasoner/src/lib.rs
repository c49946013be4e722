//! OWL DL 推論セッション
//!
//! このクレートは知識ベースセッションと問い合わせプロトコルを提供します:
//! - 変更ログからの差分計算と一括反映 (flush)
//! - 一貫性キャッシュと割り込み/新規実体のガード
//! - 種別ごとのポリシーによるタクソノミー問い合わせ (Node / NodeSet)
//! - 含意判定と正当化の追跡
//! - 証明グラフの探索, モジュール抽出, 原子分解

pub mod change;
pub mod classification;
pub mod config;
pub mod entailment;
pub mod error;
pub mod exploration;
pub mod modules;
pub mod session;
pub mod taxonomy;
mod translation;

pub use change::{compute_diff, ChangeDiff};
pub use classification::DataComparison;
pub use config::{BufferingMode, FreshEntityPolicy, IndividualNodeSetPolicy, ReasonerConfiguration};
pub use error::{ReasonerError, Result};
pub use exploration::RootNode;
pub use session::{ConsistencyState, InferenceType, Reasoner, REASONER_NAME};
pub use taxonomy::{Node, NodeSet};

pub use shoin_kernel::{InterruptFlag, ModuleType};
