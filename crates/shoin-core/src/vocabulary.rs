//! Built-in OWL/RDFS/XSD vocabulary

use crate::model::Iri;

pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";
pub const OWL_TOP_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#topObjectProperty";
pub const OWL_BOTTOM_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#bottomObjectProperty";
pub const OWL_TOP_DATA_PROPERTY: &str = "http://www.w3.org/2002/07/owl#topDataProperty";
pub const OWL_BOTTOM_DATA_PROPERTY: &str = "http://www.w3.org/2002/07/owl#bottomDataProperty";
pub const RDFS_LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub fn owl_thing() -> Iri { Iri::new(OWL_THING) }
pub fn owl_nothing() -> Iri { Iri::new(OWL_NOTHING) }
pub fn owl_top_object_property() -> Iri { Iri::new(OWL_TOP_OBJECT_PROPERTY) }
pub fn owl_bottom_object_property() -> Iri { Iri::new(OWL_BOTTOM_OBJECT_PROPERTY) }
pub fn owl_top_data_property() -> Iri { Iri::new(OWL_TOP_DATA_PROPERTY) }
pub fn owl_bottom_data_property() -> Iri { Iri::new(OWL_BOTTOM_DATA_PROPERTY) }
pub fn rdfs_literal() -> Iri { Iri::new(RDFS_LITERAL) }

/// `xsd:<local>` as a full IRI
pub fn xsd(local: &str) -> Iri {
    Iri::new(format!("{}{}", XSD_NS, local))
}

/// True for the built-in top/bottom entities of every hierarchical kind
pub fn is_builtin(iri: &str) -> bool {
    matches!(
        iri,
        OWL_THING
            | OWL_NOTHING
            | OWL_TOP_OBJECT_PROPERTY
            | OWL_BOTTOM_OBJECT_PROPERTY
            | OWL_TOP_DATA_PROPERTY
            | OWL_BOTTOM_DATA_PROPERTY
    )
}
