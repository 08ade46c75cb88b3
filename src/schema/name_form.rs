//! NameForm schema object (spec §3, §4.6): which attributes may name an
//! entry of a given structural object class.

use super::object::SchemaObject;

/// Full structural equality (derived), not the source's field-ignoring
/// stub (Design Notes §9 open question).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameForm {
    pub object: SchemaObject,
    pub object_class: String,
    pub must: Vec<String>,
    pub may: Vec<String>,
}

impl NameForm {
    pub fn numeric_oid(&self) -> &str {
        &self.object.oid
    }
}
