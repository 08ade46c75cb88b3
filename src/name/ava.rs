//! Attribute-Type-and-Value Assertion (spec §3 "DN / RDN / AVA").

use super::escape::escape_value;
use crate::schema::SchemaManager;

/// One `type=value` pair inside an RDN.
///
/// Keeps the user-provided type text for round-tripping/display
/// alongside the normalized type (lowercase descriptor, or the
/// attribute's numeric OID when a [`SchemaManager`] resolved it) and the
/// normalized value bytes (spec §3 AVA invariants).
#[derive(Debug, Clone)]
pub struct Ava {
    pub user_type: String,
    pub user_value: String,
    pub normalized_type: String,
    pub normalized_value: Vec<u8>,
}

impl Ava {
    /// Build an AVA from its user-provided `type=value` components,
    /// normalizing through `schema` when present (spec §4.5
    /// "Normalization").
    pub fn new(user_type: &str, user_value: &str, schema: Option<&SchemaManager>) -> Self {
        let normalized_type = match schema.and_then(|s| s.attribute_types().get(user_type)) {
            Some(at) => at.numeric_oid().to_string(),
            None => user_type.to_ascii_lowercase(),
        };
        let normalized_value = match schema.and_then(|s| s.attribute_types().get(user_type)) {
            Some(at) => at.normalize_value(user_value.as_bytes()),
            None => user_value.as_bytes().to_vec(),
        };
        Ava {
            user_type: user_type.to_string(),
            user_value: user_value.to_string(),
            normalized_type,
            normalized_value,
        }
    }

    /// `type=value` using the user-provided form, value-escaped per RFC 4514.
    pub fn to_user_string(&self) -> String {
        format!("{}={}", self.user_type, escape_value(&self.user_value))
    }

    /// `oid=value` (or `lowercasetype=value`) using the normalized form.
    pub fn to_normalized_string(&self) -> String {
        let value = String::from_utf8_lossy(&self.normalized_value);
        format!("{}={}", self.normalized_type, escape_value(&value))
    }
}

impl PartialEq for Ava {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_type == other.normalized_type && self.normalized_value == other.normalized_value
    }
}
impl Eq for Ava {}
