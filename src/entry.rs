//! Entry and Attribute (spec §3 "Attribute", "Entry"): a directory entry as
//! a [`Dn`] plus a map from canonical attribute identifier to its values.
//!
//! Grounded on the same descriptor/OID case-insensitive collapsing
//! [`crate::schema::registry::Registry`] uses for schema objects, and on
//! [`Value`]'s eager-normalize-on-construction idiom for attribute values.

use crate::name::Dn;
use crate::schema::SchemaManager;
use crate::value::Value;
use crate::error::LdapError;
use std::collections::HashMap;

/// An attribute descriptor: `type[;option]*` (RFC 4512 §2.5). Splitting the
/// base type from its options lets [`Entry`] collapse descriptors that
/// differ only by the base type's case or OID/name spelling while keeping
/// options significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescription {
    text: String,
}

impl AttributeDescription {
    pub fn new(text: impl Into<String>) -> Self {
        AttributeDescription { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The base type name, before any `;option` suffixes.
    pub fn base_type(&self) -> &str {
        self.text.split(';').next().unwrap_or(&self.text)
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.text.split(';').skip(1)
    }

    /// The key an [`Entry`] collapses this descriptor under: the base
    /// type's schema-resolved numeric OID when `schema` knows it (so `cn`
    /// and `2.5.4.3` collapse together), lowercased descriptor text
    /// otherwise, plus its lowercased options appended back on.
    fn canonical_key(&self, schema: Option<&SchemaManager>) -> String {
        let base = self.base_type();
        let resolved = schema
            .and_then(|s| s.attribute_types().get(base))
            .map(|at| at.numeric_oid().to_string())
            .unwrap_or_else(|| base.to_ascii_lowercase());
        let mut key = resolved;
        for opt in self.options() {
            key.push(';');
            key.push_str(&opt.to_ascii_lowercase());
        }
        key
    }
}

impl std::fmt::Display for AttributeDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A descriptor paired with a multiset of [`Value`]s (spec §3 "Attribute").
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    description: AttributeDescription,
    values: Vec<Value<'a>>,
}

impl<'a> Attribute<'a> {
    pub fn new(description: AttributeDescription, values: Vec<Value<'a>>) -> Self {
        Attribute { description, values }
    }

    pub fn description(&self) -> &AttributeDescription {
        &self.description
    }

    pub fn values(&self) -> &[Value<'a>] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Append a value, then re-check the SINGLE-VALUE invariant (spec §3:
    /// "when schema-aware and the type is SINGLE-VALUED, size ≤ 1") against
    /// `schema` if given.
    pub fn push(&mut self, value: Value<'a>, schema: Option<&SchemaManager>) -> Result<(), LdapError> {
        self.values.push(value);
        self.check_single_value(schema)
    }

    fn check_single_value(&self, schema: Option<&SchemaManager>) -> Result<(), LdapError> {
        if self.values.len() <= 1 {
            return Ok(());
        }
        if let Some(at) = schema.and_then(|s| s.attribute_types().get(self.description.base_type())) {
            if at.single_value {
                return Err(LdapError::SchemaViolation(format!(
                    "attribute {} is SINGLE-VALUE but carries {} values",
                    self.description,
                    self.values.len()
                )));
            }
        }
        Ok(())
    }
}

/// A DN plus its attributes, collapsing duplicate descriptors under
/// case-insensitive OID/name equivalence (spec §3 "Entry").
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    dn: Dn,
    attributes: HashMap<String, Attribute<'a>>,
}

impl<'a> Entry<'a> {
    pub fn new(dn: Dn) -> Self {
        Entry {
            dn,
            attributes: HashMap::new(),
        }
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute<'a>> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Look up an attribute by descriptor, resolving through `schema` (if
    /// given) the same way [`Entry::set`]/[`Entry::add_values`] do.
    pub fn get(&self, descriptor: &str, schema: Option<&SchemaManager>) -> Option<&Attribute<'a>> {
        let key = AttributeDescription::new(descriptor).canonical_key(schema);
        self.attributes.get(&key)
    }

    /// Replace any existing attribute under `descriptor`'s canonical key
    /// with `values` wholesale.
    pub fn set(
        &mut self,
        descriptor: impl Into<String>,
        values: Vec<Value<'a>>,
        schema: Option<&SchemaManager>,
    ) -> Result<(), LdapError> {
        let description = AttributeDescription::new(descriptor);
        let key = description.canonical_key(schema);
        let attr = Attribute::new(description, values);
        attr.check_single_value(schema)?;
        self.attributes.insert(key, attr);
        Ok(())
    }

    /// Append `values` to the attribute under `descriptor`'s canonical
    /// key, creating it if absent (spec §3: "duplicates under
    /// case-insensitive OID/name equivalence collapse").
    pub fn add_values(
        &mut self,
        descriptor: impl Into<String>,
        values: impl IntoIterator<Item = Value<'a>>,
        schema: Option<&SchemaManager>,
    ) -> Result<(), LdapError> {
        let description = AttributeDescription::new(descriptor);
        let key = description.canonical_key(schema);
        let entry = self
            .attributes
            .entry(key)
            .or_insert_with(|| Attribute::new(description, Vec::new()));
        entry.values.extend(values);
        entry.check_single_value(schema)
    }

    pub fn remove(&mut self, descriptor: &str, schema: Option<&SchemaManager>) -> Option<Attribute<'a>> {
        let key = AttributeDescription::new(descriptor).canonical_key(schema);
        self.attributes.remove(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::parse_dn;

    fn dn() -> Dn {
        parse_dn("cn=jdoe,dc=example,dc=com", None).unwrap()
    }

    #[test]
    fn descriptors_with_options_are_distinct_from_base_type() {
        let mut entry = Entry::new(dn());
        entry
            .set("cn", vec![Value::from_str("John Doe")], None)
            .unwrap();
        entry
            .set("cn;lang-en", vec![Value::from_str("John")], None)
            .unwrap();
        assert_eq!(entry.len(), 2);
        assert!(entry.get("cn", None).is_some());
        assert!(entry.get("cn;lang-en", None).is_some());
    }

    #[test]
    fn case_insensitive_descriptors_collapse_without_schema() {
        let mut entry = Entry::new(dn());
        entry.set("CN", vec![Value::from_str("John Doe")], None).unwrap();
        entry
            .add_values("cn", vec![Value::from_str("Johnny")], None)
            .unwrap();
        assert_eq!(entry.len(), 1);
        assert_eq!(entry.get("cn", None).unwrap().len(), 2);
    }

    #[test]
    fn single_valued_schema_attribute_rejects_second_value() {
        let schema = SchemaManager::new();
        let mut entry = Entry::new(dn());
        entry
            .set("c", vec![Value::from_str("US")], Some(&schema))
            .unwrap();
        let err = entry.add_values("c", vec![Value::from_str("FR")], Some(&schema));
        assert!(err.is_err());
    }

    #[test]
    fn descriptor_resolves_to_numeric_oid_under_schema() {
        let schema = SchemaManager::new();
        let mut entry = Entry::new(dn());
        entry
            .set("cn", vec![Value::from_str("John Doe")], Some(&schema))
            .unwrap();
        assert!(entry.get("2.5.4.3", Some(&schema)).is_some());
    }
}
