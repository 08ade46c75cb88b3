//! DitContentRule and DitStructureRule schema objects (spec §3, §4.6).

use super::object::SchemaObject;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitContentRule {
    pub object: SchemaObject,
    /// Governed structural object class OID (a DIT content rule's own
    /// numeric OID must equal this per RFC 4512 §4.1.6).
    pub structural_oc: String,
    pub aux: Vec<String>,
    pub must: Vec<String>,
    pub may: Vec<String>,
    pub not: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitStructureRule {
    pub object: SchemaObject,
    /// DIT structure rules are identified by a small integer, not an OID
    /// (RFC 4512 §4.1.7.1).
    pub rule_id: u32,
    pub name_form: String,
    pub sup_rules: Vec<u32>,
}
