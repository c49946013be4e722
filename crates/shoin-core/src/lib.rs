//! OWL ホストモデル
//!
//! このクレートは推論セッションが受け取る OWL 構造を提供します:
//! - IRI と 4 種類の実体 (クラス, オブジェクトプロパティ, データプロパティ, 個体)
//! - クラス式・プロパティ式・データ範囲
//! - 注釈を識別に含めない公理と、その注釈付き出現
//! - ホストオントロジーと変更レコード

pub mod axiom;
pub mod model;
pub mod ontology;
pub mod vocabulary;

pub use axiom::{AnnotatedAxiom, Annotation, Axiom, AxiomType};
pub use model::{
    Class, ClassExpression, DataProperty, DataRange, Entity, EntityKind, Individual, Iri, Literal,
    ObjectPropertyExpression,
};
pub use ontology::{Ontology, OntologyChange};
