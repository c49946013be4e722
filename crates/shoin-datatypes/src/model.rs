//! 解決済みデータ型階層

use crate::facet::{parse_flag, Cardinality, Facet, Ordered};
use crate::numeric;
use crate::schema::{DatatypeDeclaration, XSD_SCHEMA};
use crate::{DatatypeError, Result};
use serde::{Deserialize, Serialize};
use shoin_core::vocabulary::RDFS_LITERAL;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// One named datatype after loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatypeNode {
    pub uri: String,
    /// Restriction base; `None` only for roots
    pub base: Option<String>,
    /// Facets declared on this node (not inherited)
    pub facets: BTreeSet<Facet>,
    /// Facet values declared on this node (not inherited)
    pub facet_values: BTreeMap<Facet, String>,
    pub ordered: Option<Ordered>,
    pub bounded: Option<bool>,
    pub cardinality: Option<Cardinality>,
    pub numeric: Option<bool>,
}

impl DatatypeNode {
    fn root(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            base: None,
            facets: BTreeSet::new(),
            facet_values: BTreeMap::new(),
            ordered: None,
            bounded: None,
            cardinality: None,
            numeric: None,
        }
    }

    fn from_declaration(declaration: &DatatypeDeclaration) -> Result<Self> {
        let uri = declaration.uri();
        let mut node = DatatypeNode::root(&uri);
        node.base = declaration.base_uri();

        for facet in &declaration.facets {
            node.facets.insert(Facet::parse(facet)?);
        }
        for (facet, value) in &declaration.facet_values {
            node.facet_values.insert(Facet::parse(facet)?, value.clone());
        }
        for (property, value) in &declaration.properties {
            match property.as_str() {
                "ordered" => node.ordered = Some(Ordered::parse(value)?),
                "bounded" => node.bounded = Some(parse_flag(property, value)?),
                "cardinality" => node.cardinality = Some(Cardinality::parse(value)?),
                "numeric" => node.numeric = Some(parse_flag(property, value)?),
                other => return Err(DatatypeError::UnknownProperty(other.to_string())),
            }
        }

        Ok(node)
    }
}

/// The datatype hierarchy. Built once, immutable afterwards; share it
/// behind an `Arc` between sessions.
#[derive(Debug, Clone)]
pub struct DatatypeModel {
    nodes: HashMap<String, DatatypeNode>,
}

impl DatatypeModel {
    /// Resolves a list of declarations. rdfs:Literal is always present as
    /// the implicit root; every other base must be declared, and restriction
    /// chains must be acyclic.
    pub fn build(declarations: &[DatatypeDeclaration]) -> Result<Self> {
        let mut nodes = HashMap::with_capacity(declarations.len() + 1);
        nodes.insert(RDFS_LITERAL.to_string(), DatatypeNode::root(RDFS_LITERAL));

        for declaration in declarations {
            let node = DatatypeNode::from_declaration(declaration)?;
            if nodes.contains_key(&node.uri) {
                return Err(DatatypeError::DuplicateDeclaration(node.uri));
            }
            nodes.insert(node.uri.clone(), node);
        }

        for node in nodes.values() {
            if let Some(base) = &node.base {
                if !nodes.contains_key(base) {
                    return Err(DatatypeError::UnknownBase {
                        datatype: node.uri.clone(),
                        base: base.clone(),
                    });
                }
            }
        }

        check_acyclic(&nodes)?;

        info!("Loaded datatype model with {} datatypes", nodes.len());
        Ok(Self { nodes })
    }

    /// Parses a JSON list of declarations
    pub fn from_json_str(json: &str) -> Result<Self> {
        let declarations: Vec<DatatypeDeclaration> = serde_json::from_str(json)?;
        Self::build(&declarations)
    }

    /// The built-in XSD hierarchy
    pub fn xsd() -> Result<Self> {
        Self::from_json_str(XSD_SCHEMA)
    }

    /// The built-in XSD hierarchy extended with user declarations
    pub fn xsd_with(declarations: &[DatatypeDeclaration]) -> Result<Self> {
        let mut all: Vec<DatatypeDeclaration> = serde_json::from_str(XSD_SCHEMA)?;
        all.extend(declarations.iter().cloned());
        Self::build(&all)
    }

    pub fn get(&self, uri: &str) -> Option<&DatatypeNode> {
        self.nodes.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.nodes.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// `uri` followed by its restriction bases, nearest first
    pub fn ancestors<'a>(&'a self, uri: &str) -> Ancestors<'a> {
        Ancestors {
            model: self,
            next: self.nodes.get(uri),
        }
    }

    pub fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.ancestors(sub).any(|node| node.uri == sup)
    }

    /// Declared facets of `uri` and of every restriction base
    pub fn facets(&self, uri: &str) -> BTreeSet<Facet> {
        self.ancestors(uri)
            .flat_map(|node| node.facets.iter().copied())
            .collect()
    }

    /// Nearest explicit value of `facet` along the restriction chain
    pub fn facet_value(&self, uri: &str, facet: Facet) -> Option<&str> {
        self.ancestors(uri)
            .find_map(|node| node.facet_values.get(&facet))
            .map(String::as_str)
    }

    /// Every facet with a value on the chain, nearest value winning
    pub fn known_facet_values(&self, uri: &str) -> BTreeMap<Facet, &str> {
        let mut values = BTreeMap::new();
        for node in self.ancestors(uri) {
            for (facet, value) in &node.facet_values {
                values.entry(*facet).or_insert(value.as_str());
            }
        }
        values
    }

    pub fn ordered(&self, uri: &str) -> Ordered {
        self.ancestors(uri)
            .find_map(|node| node.ordered)
            .unwrap_or_default()
    }

    pub fn bounded(&self, uri: &str) -> bool {
        self.ancestors(uri)
            .find_map(|node| node.bounded)
            .unwrap_or(false)
    }

    pub fn cardinality(&self, uri: &str) -> Cardinality {
        self.ancestors(uri)
            .find_map(|node| node.cardinality)
            .unwrap_or_default()
    }

    pub fn numeric(&self, uri: &str) -> bool {
        self.ancestors(uri)
            .find_map(|node| node.numeric)
            .unwrap_or(false)
    }

    /// Two datatypes are compatible if they share values: same URI, the
    /// universal literal type on either side, or a subtype relation in
    /// either direction. Numeric datatypes use interval overlap instead.
    pub fn is_compatible(&self, a: &str, b: &str) -> bool {
        if self.numeric(a) || self.numeric(b) {
            return numeric::is_compatible(self, a, b);
        }
        a == b
            || a == RDFS_LITERAL
            || b == RDFS_LITERAL
            || self.is_subtype_of(a, b)
            || self.is_subtype_of(b, a)
    }

    /// Lexical value check. Numeric types check their interval; boolean
    /// checks its four lexical forms; enumerations must list the value.
    /// Other facets are not verified.
    pub fn is_in_value_space(&self, uri: &str, lexical: &str) -> bool {
        if self.numeric(uri) {
            return numeric::is_in_value_space(self, uri, lexical);
        }
        if self.is_subtype_of(uri, &shoin_core::vocabulary::xsd("boolean").0) {
            return matches!(lexical.trim(), "true" | "false" | "1" | "0");
        }
        match self.facet_value(uri, Facet::Enumeration) {
            Some(values) => values.split_whitespace().any(|v| v == lexical),
            None => true,
        }
    }

    /// A literal fits `uri` if its datatype is compatible and its lexical
    /// form lies in the value space of `uri`
    pub fn is_literal_compatible(&self, uri: &str, literal_datatype: &str, lexical: &str) -> bool {
        self.is_compatible(uri, literal_datatype) && self.is_in_value_space(uri, lexical)
    }
}

/// Walks a restriction chain; terminates because chains are checked acyclic
/// at load
pub struct Ancestors<'a> {
    model: &'a DatatypeModel,
    next: Option<&'a DatatypeNode>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a DatatypeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .base
            .as_ref()
            .and_then(|base| self.model.nodes.get(base));
        Some(current)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn check_acyclic(nodes: &HashMap<String, DatatypeNode>) -> Result<()> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(nodes.len());

    for start in nodes.keys() {
        let mut path: Vec<&str> = Vec::new();
        let mut current = Some(start.as_str());

        while let Some(uri) = current {
            match marks.get(uri) {
                Some(Mark::Done) => break,
                Some(Mark::Visiting) => {
                    let from = path.iter().position(|u| *u == uri).unwrap_or(0);
                    let mut cycle: Vec<String> = path[from..].iter().map(|u| u.to_string()).collect();
                    cycle.push(uri.to_string());
                    return Err(DatatypeError::CyclicRestriction(cycle));
                }
                None => {}
            }
            marks.insert(uri, Mark::Visiting);
            path.push(uri);
            current = nodes.get(uri).and_then(|node| node.base.as_deref());
        }

        for uri in path {
            marks.insert(uri, Mark::Done);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoin_core::vocabulary::XSD_NS;

    fn xsd(local: &str) -> String {
        format!("{}{}", XSD_NS, local)
    }

    #[test]
    fn test_xsd_hierarchy() {
        let model = DatatypeModel::xsd().unwrap();

        assert!(model.is_subtype_of(&xsd("byte"), &xsd("decimal")));
        assert!(model.is_subtype_of(&xsd("string"), RDFS_LITERAL));
        assert!(!model.is_subtype_of(&xsd("decimal"), &xsd("integer")));

        assert!(model.numeric(&xsd("byte")), "numeric is inherited from decimal");
        assert_eq!(model.ordered(&xsd("int")), Ordered::Total);
        assert!(model.bounded(&xsd("int")));
        assert_eq!(model.cardinality(&xsd("integer")), Cardinality::CountablyInfinite);
        assert_eq!(model.facet_value(&xsd("short"), Facet::MaxInclusive), Some("32767"));
        assert!(model.facets(&xsd("token")).contains(&Facet::Length));
    }

    #[test]
    fn test_root_defaults() {
        let model = DatatypeModel::xsd().unwrap();
        assert_eq!(model.ordered(RDFS_LITERAL), Ordered::False);
        assert!(!model.bounded(RDFS_LITERAL));
        assert_eq!(model.cardinality(RDFS_LITERAL), Cardinality::CountablyInfinite);
        assert!(!model.numeric(RDFS_LITERAL));
    }

    #[test]
    fn test_compatibility() {
        let model = DatatypeModel::xsd().unwrap();
        assert!(model.is_compatible(&xsd("token"), &xsd("string")));
        assert!(model.is_compatible(&xsd("anyURI"), RDFS_LITERAL));
        assert!(!model.is_compatible(&xsd("anyURI"), &xsd("string")));
        assert!(!model.is_compatible(&xsd("boolean"), &xsd("integer")));
    }

    #[test]
    fn test_value_space() {
        let model = DatatypeModel::xsd().unwrap();
        assert!(model.is_in_value_space(&xsd("boolean"), "true"));
        assert!(!model.is_in_value_space(&xsd("boolean"), "yes"));
        assert!(model.is_literal_compatible(&xsd("int"), &xsd("integer"), "42"));
        assert!(!model.is_literal_compatible(&xsd("unsignedByte"), &xsd("integer"), "-1"));
    }

    #[test]
    fn test_load_errors() {
        let duplicate = [DatatypeDeclaration::new("a"), DatatypeDeclaration::new("xs:a")];
        assert!(matches!(
            DatatypeModel::build(&duplicate),
            Err(DatatypeError::DuplicateDeclaration(_))
        ));

        let orphan = [DatatypeDeclaration::new("a").with_base("missing")];
        assert!(matches!(
            DatatypeModel::build(&orphan),
            Err(DatatypeError::UnknownBase { .. })
        ));

        let bad_property = [DatatypeDeclaration::new("a").with_property("colour", "red")];
        assert!(matches!(
            DatatypeModel::build(&bad_property),
            Err(DatatypeError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_cycle_is_rejected_at_load() {
        let cyclic = [
            DatatypeDeclaration::new("a").with_base("b"),
            DatatypeDeclaration::new("b").with_base("c"),
            DatatypeDeclaration::new("c").with_base("a"),
        ];
        match DatatypeModel::build(&cyclic) {
            Err(DatatypeError::CyclicRestriction(cycle)) => {
                assert_eq!(cycle.len(), 4, "cycle is reported closed: {:?}", cycle);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected a cyclic restriction error, got {:?}", other.map(|m| m.len())),
        }
    }
}
