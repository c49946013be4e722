//! Facets and the inheritable datatype properties

use crate::DatatypeError;
use serde::{Deserialize, Serialize};
use shoin_core::vocabulary::XSD_NS;

/// Constraining facet of a datatype's value space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Length,
    MinLength,
    MaxLength,
    Pattern,
    Enumeration,
    WhiteSpace,
    MaxInclusive,
    MaxExclusive,
    MinInclusive,
    MinExclusive,
    TotalDigits,
    FractionDigits,
    ExplicitTimezone,
}

impl Facet {
    pub const ALL: [Facet; 13] = [
        Facet::Length,
        Facet::MinLength,
        Facet::MaxLength,
        Facet::Pattern,
        Facet::Enumeration,
        Facet::WhiteSpace,
        Facet::MaxInclusive,
        Facet::MaxExclusive,
        Facet::MinInclusive,
        Facet::MinExclusive,
        Facet::TotalDigits,
        Facet::FractionDigits,
        Facet::ExplicitTimezone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Facet::Length => "length",
            Facet::MinLength => "minLength",
            Facet::MaxLength => "maxLength",
            Facet::Pattern => "pattern",
            Facet::Enumeration => "enumeration",
            Facet::WhiteSpace => "whiteSpace",
            Facet::MaxInclusive => "maxInclusive",
            Facet::MaxExclusive => "maxExclusive",
            Facet::MinInclusive => "minInclusive",
            Facet::MinExclusive => "minExclusive",
            Facet::TotalDigits => "totalDigits",
            Facet::FractionDigits => "fractionDigits",
            Facet::ExplicitTimezone => "explicitTimezone",
        }
    }

    /// Accepts `length`, `xs:length` and the full XSD IRI
    pub fn parse(name: &str) -> Result<Facet, DatatypeError> {
        let local = name
            .strip_prefix(XSD_NS)
            .or_else(|| name.strip_prefix("xs:"))
            .or_else(|| name.strip_prefix("xsd:"))
            .unwrap_or(name);
        Facet::ALL
            .iter()
            .copied()
            .find(|facet| facet.name() == local)
            .ok_or_else(|| DatatypeError::UnknownFacet(name.to_string()))
    }

    /// Facets whose values are numbers
    pub fn is_number_facet(&self) -> bool {
        matches!(
            self,
            Facet::Length
                | Facet::MinLength
                | Facet::MaxLength
                | Facet::MaxInclusive
                | Facet::MaxExclusive
                | Facet::MinInclusive
                | Facet::MinExclusive
                | Facet::TotalDigits
                | Facet::FractionDigits
        )
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `ordered` fundamental property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordered {
    #[default]
    False,
    Partial,
    Total,
}

impl Ordered {
    pub fn parse(value: &str) -> Result<Ordered, DatatypeError> {
        match value.trim() {
            "false" => Ok(Ordered::False),
            "partial" => Ok(Ordered::Partial),
            "total" => Ok(Ordered::Total),
            other => Err(DatatypeError::InvalidPropertyValue {
                property: "ordered".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// `cardinality` fundamental property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    Finite,
    #[default]
    CountablyInfinite,
}

impl Cardinality {
    pub fn parse(value: &str) -> Result<Cardinality, DatatypeError> {
        match value.trim() {
            "finite" => Ok(Cardinality::Finite),
            "countably infinite" | "countablyInfinite" => Ok(Cardinality::CountablyInfinite),
            other => Err(DatatypeError::InvalidPropertyValue {
                property: "cardinality".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

pub(crate) fn parse_flag(property: &str, value: &str) -> Result<bool, DatatypeError> {
    value
        .trim()
        .parse::<bool>()
        .map_err(|_| DatatypeError::InvalidPropertyValue {
            property: property.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_parse_accepts_prefixes() {
        assert_eq!(Facet::parse("minInclusive").unwrap(), Facet::MinInclusive);
        assert_eq!(Facet::parse("xs:length").unwrap(), Facet::Length);
        assert_eq!(
            Facet::parse("http://www.w3.org/2001/XMLSchema#pattern").unwrap(),
            Facet::Pattern
        );
        assert!(matches!(Facet::parse("colour"), Err(DatatypeError::UnknownFacet(_))));
    }

    #[test]
    fn test_property_parsers() {
        assert_eq!(Ordered::parse("partial").unwrap(), Ordered::Partial);
        assert_eq!(Cardinality::parse("countably infinite").unwrap(), Cardinality::CountablyInfinite);
        assert!(Ordered::parse("sometimes").is_err());
        assert!(parse_flag("bounded", "yes").is_err());
        assert_eq!(Ordered::default(), Ordered::False);
    }
}
