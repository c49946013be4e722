//! Datatype schema declarations (the resolved input of the datatype model)

use serde::{Deserialize, Serialize};
use shoin_core::vocabulary::{RDFS_LITERAL, XSD_NS};
use std::collections::BTreeMap;

/// One named datatype declaration: an optional restriction base, the facets
/// that apply to it, explicit facet values and fundamental properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatatypeDeclaration {
    pub name: String,
    pub base: Option<String>,
    pub facets: Vec<String>,
    pub facet_values: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
}

impl DatatypeDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facets.push(facet.into());
        self
    }

    pub fn with_facet_value(mut self, facet: impl Into<String>, value: impl Into<String>) -> Self {
        self.facet_values.insert(facet.into(), value.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn uri(&self) -> String {
        resolve_name(&self.name)
    }

    pub fn base_uri(&self) -> Option<String> {
        self.base.as_deref().map(resolve_name)
    }
}

/// Full IRIs pass through; `anySimpleType` maps to the universal literal
/// type; everything else is an XSD local name
pub fn resolve_name(name: &str) -> String {
    if name.starts_with("http://") || name.starts_with("https://") {
        return name.to_string();
    }
    let local = name
        .strip_prefix("xs:")
        .or_else(|| name.strip_prefix("xsd:"))
        .unwrap_or(name);
    if local == "anySimpleType" {
        RDFS_LITERAL.to_string()
    } else {
        format!("{}{}", XSD_NS, local)
    }
}

/// Built-in XSD hierarchy
pub const XSD_SCHEMA: &str = r#"[
  {"name": "string", "base": "xs:anySimpleType",
   "facets": ["length", "minLength", "maxLength", "pattern", "enumeration", "whiteSpace"],
   "properties": {"ordered": "false", "bounded": "false", "cardinality": "countably infinite", "numeric": "false"}},
  {"name": "normalizedString", "base": "xs:string"},
  {"name": "token", "base": "xs:normalizedString"},
  {"name": "language", "base": "xs:token", "facet_values": {"pattern": "[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*"}},
  {"name": "anyURI", "base": "xs:anySimpleType",
   "facets": ["length", "minLength", "maxLength", "pattern", "enumeration", "whiteSpace"]},
  {"name": "boolean", "base": "xs:anySimpleType", "facets": ["pattern", "whiteSpace"],
   "properties": {"ordered": "false", "bounded": "false", "cardinality": "finite", "numeric": "false"}},
  {"name": "decimal", "base": "xs:anySimpleType",
   "facets": ["totalDigits", "fractionDigits", "pattern", "whiteSpace", "enumeration",
              "maxInclusive", "maxExclusive", "minInclusive", "minExclusive"],
   "properties": {"ordered": "total", "bounded": "false", "cardinality": "countably infinite", "numeric": "true"}},
  {"name": "float", "base": "xs:anySimpleType",
   "facets": ["pattern", "enumeration", "whiteSpace", "maxInclusive", "maxExclusive", "minInclusive", "minExclusive"],
   "properties": {"ordered": "partial", "bounded": "true", "cardinality": "finite", "numeric": "true"}},
  {"name": "double", "base": "xs:anySimpleType",
   "facets": ["pattern", "enumeration", "whiteSpace", "maxInclusive", "maxExclusive", "minInclusive", "minExclusive"],
   "properties": {"ordered": "partial", "bounded": "true", "cardinality": "finite", "numeric": "true"}},
  {"name": "dateTime", "base": "xs:anySimpleType",
   "facets": ["pattern", "enumeration", "whiteSpace", "maxInclusive", "maxExclusive", "minInclusive", "minExclusive", "explicitTimezone"],
   "properties": {"ordered": "partial", "bounded": "false", "cardinality": "countably infinite", "numeric": "false"}},
  {"name": "integer", "base": "xs:decimal", "facet_values": {"fractionDigits": "0"}},
  {"name": "nonNegativeInteger", "base": "xs:integer", "facet_values": {"minInclusive": "0"}},
  {"name": "positiveInteger", "base": "xs:nonNegativeInteger", "facet_values": {"minInclusive": "1"}},
  {"name": "nonPositiveInteger", "base": "xs:integer", "facet_values": {"maxInclusive": "0"}},
  {"name": "negativeInteger", "base": "xs:nonPositiveInteger", "facet_values": {"maxInclusive": "-1"}},
  {"name": "long", "base": "xs:integer",
   "facet_values": {"minInclusive": "-9223372036854775808", "maxInclusive": "9223372036854775807"},
   "properties": {"bounded": "true", "cardinality": "finite"}},
  {"name": "int", "base": "xs:long", "facet_values": {"minInclusive": "-2147483648", "maxInclusive": "2147483647"}},
  {"name": "short", "base": "xs:int", "facet_values": {"minInclusive": "-32768", "maxInclusive": "32767"}},
  {"name": "byte", "base": "xs:short", "facet_values": {"minInclusive": "-128", "maxInclusive": "127"}},
  {"name": "unsignedLong", "base": "xs:nonNegativeInteger",
   "facet_values": {"maxInclusive": "18446744073709551615"},
   "properties": {"bounded": "true", "cardinality": "finite"}},
  {"name": "unsignedInt", "base": "xs:unsignedLong", "facet_values": {"maxInclusive": "4294967295"}},
  {"name": "unsignedShort", "base": "xs:unsignedInt", "facet_values": {"maxInclusive": "65535"}},
  {"name": "unsignedByte", "base": "xs:unsignedShort", "facet_values": {"maxInclusive": "255"}}
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_name() {
        assert_eq!(resolve_name("xs:anySimpleType"), RDFS_LITERAL);
        assert_eq!(resolve_name("integer"), format!("{}integer", XSD_NS));
        assert_eq!(resolve_name("xs:int"), format!("{}int", XSD_NS));
        assert_eq!(resolve_name("http://example.org/dt#age"), "http://example.org/dt#age");
    }

    #[test]
    fn test_builtin_schema_parses() {
        let declarations: Vec<DatatypeDeclaration> = serde_json::from_str(XSD_SCHEMA).unwrap();
        assert!(declarations.iter().any(|d| d.name == "unsignedByte"));
        let int = declarations.iter().find(|d| d.name == "int").unwrap();
        assert_eq!(int.base_uri(), Some(format!("{}long", XSD_NS)));
    }
}
