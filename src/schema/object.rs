//! Shared base fields every schema object carries (spec §3 "SchemaObject").
//!
//! Per Design Notes §9 ("mutable-then-locked objects"), this crate does not
//! replicate the source's `isLocked`/mutator-returns-error pattern: each
//! concrete schema type is built through a `*Builder`, and only the
//! resulting frozen value (this struct embedded in it) is ever stored in a
//! [`SchemaManager`](crate::schema::SchemaManager). There is nothing left to
//! lock because there is no mutator on the frozen type.

use std::collections::BTreeMap;

/// Fields common to AttributeType, ObjectClass, MatchingRule, LdapSyntax,
/// NameForm, MatchingRuleUse, DitContentRule and DitStructureRule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObject {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    /// `X-`-prefixed extensions, preserved verbatim (spec §4.11).
    pub extensions: BTreeMap<String, Vec<String>>,
    /// Owning schema, set from `X-SCHEMA` or defaulting to `"other"`.
    pub schema_name: String,
}

impl SchemaObject {
    pub fn new(oid: impl Into<String>) -> Self {
        SchemaObject {
            oid: oid.into(),
            names: Vec::new(),
            description: None,
            obsolete: false,
            extensions: BTreeMap::new(),
            schema_name: "other".to_string(),
        }
    }

    /// `true` if `needle` matches the numeric OID or any descriptor name,
    /// case-insensitively for names (spec §3 Registry: "every descriptor
    /// name, case-insensitive").
    pub fn matches(&self, needle: &str) -> bool {
        self.oid == needle || self.names.iter().any(|n| n.eq_ignore_ascii_case(needle))
    }

    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }
}

/// `true` if `oid` looks like a dotted-decimal numeric OID (`1.2.3...`).
/// Quirks/relaxed mode callers may accept non-numeric OIDs anyway; this is
/// only a shape check used by strict-mode validation (spec §3, §4.7 rule).
pub fn is_numeric_oid(oid: &str) -> bool {
    !oid.is_empty() && oid.split('.').all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}
