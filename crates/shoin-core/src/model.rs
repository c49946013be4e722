//! OWL データモデル (ホスト側の式と実体)

use crate::vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// OWL IRI wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Iri(pub String);

impl Iri {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four disjoint entity kinds every taxonomy query is parameterized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    Individual,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Class => "class",
            EntityKind::ObjectProperty => "object property",
            EntityKind::DataProperty => "data property",
            EntityKind::Individual => "individual",
        };
        f.write_str(name)
    }
}

/// A named entity as it appears in an axiom signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Entity {
    Class(Iri),
    ObjectProperty(Iri),
    DataProperty(Iri),
    Individual(Iri),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Class(_) => EntityKind::Class,
            Entity::ObjectProperty(_) => EntityKind::ObjectProperty,
            Entity::DataProperty(_) => EntityKind::DataProperty,
            Entity::Individual(_) => EntityKind::Individual,
        }
    }

    pub fn iri(&self) -> &Iri {
        match self {
            Entity::Class(iri)
            | Entity::ObjectProperty(iri)
            | Entity::DataProperty(iri)
            | Entity::Individual(iri) => iri,
        }
    }

    pub fn thing() -> Self {
        Entity::Class(vocabulary::owl_thing())
    }

    pub fn nothing() -> Self {
        Entity::Class(vocabulary::owl_nothing())
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.kind(), self.iri())
    }
}

/// OWL Class (named, including the two built-in classes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Class {
    /// owl:Thing (⊤)
    Thing,
    /// owl:Nothing (⊥)
    Nothing,
    /// Named class
    Named(Iri),
}

impl Class {
    /// Maps the built-in IRIs onto `Thing`/`Nothing`
    pub fn from_iri(iri: Iri) -> Self {
        match iri.as_str() {
            vocabulary::OWL_THING => Class::Thing,
            vocabulary::OWL_NOTHING => Class::Nothing,
            _ => Class::Named(iri),
        }
    }

    pub fn named(iri: impl Into<String>) -> Self {
        Self::from_iri(Iri::new(iri))
    }

    pub fn iri(&self) -> Iri {
        match self {
            Class::Thing => vocabulary::owl_thing(),
            Class::Nothing => vocabulary::owl_nothing(),
            Class::Named(iri) => iri.clone(),
        }
    }

    pub fn entity(&self) -> Entity {
        Entity::Class(self.iri())
    }

    pub fn is_thing(&self) -> bool {
        matches!(self, Class::Thing)
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Class::Nothing)
    }
}

impl From<Class> for ClassExpression {
    fn from(class: Class) -> Self {
        match class {
            Class::Thing => ClassExpression::Thing,
            Class::Nothing => ClassExpression::Nothing,
            Class::Named(iri) => ClassExpression::Named(iri),
        }
    }
}

/// OWL named individual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Individual(pub Iri);

impl Individual {
    pub fn named(iri: impl Into<String>) -> Self {
        Self(Iri::new(iri))
    }

    pub fn entity(&self) -> Entity {
        Entity::Individual(self.0.clone())
    }
}

/// OWL data property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DataProperty(pub Iri);

impl DataProperty {
    pub fn named(iri: impl Into<String>) -> Self {
        Self(Iri::new(iri))
    }

    pub fn top() -> Self {
        Self(vocabulary::owl_top_data_property())
    }

    pub fn bottom() -> Self {
        Self(vocabulary::owl_bottom_data_property())
    }

    pub fn entity(&self) -> Entity {
        Entity::DataProperty(self.0.clone())
    }
}

/// OWL object property expression: a named property or the inverse of one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ObjectPropertyExpression {
    /// Object property
    ObjectProperty(Iri),
    /// Inverse property: R⁻
    InverseOf(Iri),
}

impl ObjectPropertyExpression {
    pub fn named(iri: impl Into<String>) -> Self {
        ObjectPropertyExpression::ObjectProperty(Iri::new(iri))
    }

    pub fn top() -> Self {
        ObjectPropertyExpression::ObjectProperty(vocabulary::owl_top_object_property())
    }

    pub fn bottom() -> Self {
        ObjectPropertyExpression::ObjectProperty(vocabulary::owl_bottom_object_property())
    }

    /// R⁻, with (R⁻)⁻ folded back to R
    pub fn inverse(&self) -> Self {
        match self {
            ObjectPropertyExpression::ObjectProperty(iri) => {
                ObjectPropertyExpression::InverseOf(iri.clone())
            }
            ObjectPropertyExpression::InverseOf(iri) => {
                ObjectPropertyExpression::ObjectProperty(iri.clone())
            }
        }
    }

    pub fn named_property(&self) -> &Iri {
        match self {
            ObjectPropertyExpression::ObjectProperty(iri)
            | ObjectPropertyExpression::InverseOf(iri) => iri,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, ObjectPropertyExpression::InverseOf(_))
    }

    pub fn entity(&self) -> Entity {
        Entity::ObjectProperty(self.named_property().clone())
    }
}

/// Typed literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Iri,
}

impl Literal {
    pub fn new(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            datatype,
        }
    }

    /// `"lexical"^^xsd:<local>`
    pub fn xsd(lexical: impl Into<String>, local: &str) -> Self {
        Self::new(lexical, vocabulary::xsd(local))
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"^^<{}>", self.lexical, self.datatype)
    }
}

/// OWL data range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataRange {
    /// Named datatype
    Datatype(Iri),
    /// Enumeration of literals
    OneOf(Vec<Literal>),
    /// Datatype restricted by facet/value pairs
    Restriction {
        datatype: Iri,
        facets: Vec<(String, Literal)>,
    },
    /// Complement of a data range
    ComplementOf(Box<DataRange>),
}

impl DataRange {
    /// rdfs:Literal, the universal data range
    pub fn top() -> Self {
        DataRange::Datatype(vocabulary::rdfs_literal())
    }
}

/// OWL DL Class Expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassExpression {
    /// Named class
    Named(Iri),

    /// owl:Thing (⊤)
    Thing,

    /// owl:Nothing (⊥)
    Nothing,

    /// Intersection of classes: C1 ⊓ C2 ⊓ ... ⊓ Cn
    IntersectionOf(Vec<ClassExpression>),

    /// Union of classes: C1 ⊔ C2 ⊔ ... ⊔ Cn
    UnionOf(Vec<ClassExpression>),

    /// Complement of class: ¬C
    ComplementOf(Box<ClassExpression>),

    /// Enumeration of individuals: {i1, i2, ..., in}
    OneOf(Vec<Individual>),

    /// Existential restriction: ∃R.C
    SomeValuesFrom {
        property: ObjectPropertyExpression,
        class: Box<ClassExpression>,
    },

    /// Universal restriction: ∀R.C
    AllValuesFrom {
        property: ObjectPropertyExpression,
        class: Box<ClassExpression>,
    },

    /// Has value: ∃R.{i}
    HasValue {
        property: ObjectPropertyExpression,
        individual: Individual,
    },

    /// Minimum cardinality: ≥n R.C
    MinCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },

    /// Maximum cardinality: ≤n R.C
    MaxCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },

    /// Exact cardinality: =n R.C
    ExactCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },

    /// Data existential restriction: ∃D.range
    DataSomeValuesFrom {
        property: DataProperty,
        range: DataRange,
    },

    /// Data universal restriction: ∀D.range
    DataAllValuesFrom {
        property: DataProperty,
        range: DataRange,
    },

    /// Data has value: ∃D.{v}
    DataHasValue {
        property: DataProperty,
        value: Literal,
    },
}

impl ClassExpression {
    /// Named class constructor; built-in IRIs become `Thing`/`Nothing`
    pub fn named(iri: impl Into<String>) -> Self {
        Class::named(iri).into()
    }

    pub fn some(property: ObjectPropertyExpression, class: ClassExpression) -> Self {
        ClassExpression::SomeValuesFrom {
            property,
            class: Box::new(class),
        }
    }

    pub fn all(property: ObjectPropertyExpression, class: ClassExpression) -> Self {
        ClassExpression::AllValuesFrom {
            property,
            class: Box::new(class),
        }
    }

    pub fn complement(class: ClassExpression) -> Self {
        ClassExpression::ComplementOf(Box::new(class))
    }

    /// Anything but a named class (or a built-in) is anonymous
    pub fn is_anonymous(&self) -> bool {
        !matches!(
            self,
            ClassExpression::Named(_) | ClassExpression::Thing | ClassExpression::Nothing
        )
    }

    /// The named class this expression denotes, if it is not anonymous
    pub fn as_class(&self) -> Option<Class> {
        match self {
            ClassExpression::Named(iri) => Some(Class::from_iri(iri.clone())),
            ClassExpression::Thing => Some(Class::Thing),
            ClassExpression::Nothing => Some(Class::Nothing),
            _ => None,
        }
    }

    pub fn signature(&self) -> BTreeSet<Entity> {
        let mut signature = BTreeSet::new();
        self.collect_signature(&mut signature);
        signature
    }

    /// Recursively collect all named entities
    pub fn collect_signature(&self, signature: &mut BTreeSet<Entity>) {
        match self {
            ClassExpression::Named(iri) => {
                signature.insert(Entity::Class(iri.clone()));
            }
            ClassExpression::Thing => {
                signature.insert(Entity::thing());
            }
            ClassExpression::Nothing => {
                signature.insert(Entity::nothing());
            }
            ClassExpression::IntersectionOf(expressions) | ClassExpression::UnionOf(expressions) => {
                for expr in expressions {
                    expr.collect_signature(signature);
                }
            }
            ClassExpression::ComplementOf(expr) => {
                expr.collect_signature(signature);
            }
            ClassExpression::OneOf(individuals) => {
                signature.extend(individuals.iter().map(Individual::entity));
            }
            ClassExpression::SomeValuesFrom { property, class }
            | ClassExpression::AllValuesFrom { property, class } => {
                signature.insert(property.entity());
                class.collect_signature(signature);
            }
            ClassExpression::HasValue {
                property,
                individual,
            } => {
                signature.insert(property.entity());
                signature.insert(individual.entity());
            }
            ClassExpression::MinCardinality { property, class, .. }
            | ClassExpression::MaxCardinality { property, class, .. }
            | ClassExpression::ExactCardinality { property, class, .. } => {
                signature.insert(property.entity());
                if let Some(class) = class {
                    class.collect_signature(signature);
                }
            }
            ClassExpression::DataSomeValuesFrom { property, .. }
            | ClassExpression::DataAllValuesFrom { property, .. }
            | ClassExpression::DataHasValue { property, .. } => {
                signature.insert(property.entity());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_classes_are_not_anonymous() {
        assert!(!ClassExpression::Thing.is_anonymous());
        assert!(!ClassExpression::named(vocabulary::OWL_NOTHING).is_anonymous());
        assert_eq!(ClassExpression::named(vocabulary::OWL_THING), ClassExpression::Thing);

        let some = ClassExpression::some(
            ObjectPropertyExpression::named("http://example.org/hasChild"),
            ClassExpression::Thing,
        );
        assert!(some.is_anonymous());
        assert!(some.as_class().is_none());
    }

    #[test]
    fn test_signature_of_nested_expression() {
        let expr = ClassExpression::IntersectionOf(vec![
            ClassExpression::named("http://example.org/Person"),
            ClassExpression::HasValue {
                property: ObjectPropertyExpression::named("http://example.org/hasChild").inverse(),
                individual: Individual::named("http://example.org/mary"),
            },
        ]);

        let signature = expr.signature();
        assert_eq!(signature.len(), 3);
        assert!(signature.contains(&Entity::Class(Iri::new("http://example.org/Person"))));
        assert!(signature.contains(&Entity::ObjectProperty(Iri::new("http://example.org/hasChild"))));
        assert!(signature.contains(&Entity::Individual(Iri::new("http://example.org/mary"))));
    }

    #[test]
    fn test_double_inverse_folds() {
        let p = ObjectPropertyExpression::named("http://example.org/p");
        assert!(p.inverse().is_anonymous());
        assert_eq!(p.inverse().inverse(), p);
    }
}
