//! AttributeType schema object (spec §3, §4.6).

use super::object::SchemaObject;
use crate::syntaxes::NormalizerFn;

/// `USAGE` (RFC 4512 §4.1.2): who is allowed to see/set values of this
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Usage {
    #[default]
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    DsaOperation,
}

/// A frozen, registry-resolved attribute type.
///
/// `syntax_oid`/`equality`/`ordering`/`substr` are the *effective* values
/// after walking the `SUP` chain (spec §4.7 rule 2: "if SUP is absent, the
/// others inherit from the supertype") — there is no live pointer back to
/// the superior type, only its OID, so unloading the superior cannot
/// dangle this value (Design Notes §9, "weak lookups, not direct object
/// references").
#[derive(Debug, Clone)]
pub struct AttributeType {
    pub object: SchemaObject,
    pub sup: Option<String>,
    pub syntax_oid: Option<String>,
    pub syntax_length: Option<u32>,
    pub equality: Option<String>,
    pub ordering: Option<String>,
    pub substr: Option<String>,
    pub single_value: bool,
    pub collective: bool,
    pub no_user_modification: bool,
    pub usage: Usage,
    pub(crate) human_readable: bool,
    pub(crate) normalizer: NormalizerFn,
}

impl AttributeType {
    pub fn numeric_oid(&self) -> &str {
        &self.object.oid
    }

    pub fn names(&self) -> &[String] {
        &self.object.names
    }

    /// Property of the resolved SYNTAX, not of any particular value (spec
    /// §4.4).
    pub fn syntax_is_human_readable(&self) -> bool {
        self.human_readable
    }

    /// Canonicalize `bytes` through the resolved EQUALITY matching rule's
    /// normalizer (or the SYNTAX-derived default when none resolved).
    pub fn normalize_value(&self, bytes: &[u8]) -> Vec<u8> {
        (self.normalizer)(bytes)
    }

    /// `true` when this type (or an ancestor reachable within `max_depth`
    /// SUP hops) is `needle` by OID or name. A plain string comparison at
    /// each hop, not a registry walk — callers holding a `SchemaManager`
    /// should prefer [`super::registry::SchemaManager::attribute_type_isa`].
    pub fn is_direct_sup(&self, needle: &str) -> bool {
        self.sup.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(needle))
    }
}

/// Builds an [`AttributeType`] from an RFC 4512 description or programmatic
/// construction. `SchemaManager::register_attribute_type` resolves the SUP
/// chain and picks the normalizer, freezing the result (spec Design Notes
/// §9, builder → frozen-value split).
#[derive(Debug, Clone)]
pub struct AttributeTypeBuilder {
    pub(crate) object: SchemaObject,
    pub(crate) sup: Option<String>,
    pub(crate) syntax_oid: Option<String>,
    pub(crate) syntax_length: Option<u32>,
    pub(crate) equality: Option<String>,
    pub(crate) ordering: Option<String>,
    pub(crate) substr: Option<String>,
    pub(crate) single_value: bool,
    pub(crate) collective: bool,
    pub(crate) no_user_modification: bool,
    pub(crate) usage: Usage,
}

impl AttributeTypeBuilder {
    pub fn new(oid: impl Into<String>) -> Self {
        AttributeTypeBuilder {
            object: SchemaObject::new(oid),
            sup: None,
            syntax_oid: None,
            syntax_length: None,
            equality: None,
            ordering: None,
            substr: None,
            single_value: false,
            collective: false,
            no_user_modification: false,
            usage: Usage::UserApplications,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.object.names.push(name.into());
        self
    }

    pub fn names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.object.names.extend(names);
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.object.description = Some(desc.into());
        self
    }

    pub fn obsolete(mut self, obsolete: bool) -> Self {
        self.object.obsolete = obsolete;
        self
    }

    pub fn sup(mut self, sup: impl Into<String>) -> Self {
        self.sup = Some(sup.into());
        self
    }

    pub fn syntax(mut self, oid: impl Into<String>) -> Self {
        self.syntax_oid = Some(oid.into());
        self
    }

    pub fn syntax_length(mut self, len: u32) -> Self {
        self.syntax_length = Some(len);
        self
    }

    pub fn equality(mut self, mr: impl Into<String>) -> Self {
        self.equality = Some(mr.into());
        self
    }

    pub fn ordering(mut self, mr: impl Into<String>) -> Self {
        self.ordering = Some(mr.into());
        self
    }

    pub fn substr(mut self, mr: impl Into<String>) -> Self {
        self.substr = Some(mr.into());
        self
    }

    pub fn single_value(mut self, v: bool) -> Self {
        self.single_value = v;
        self
    }

    pub fn collective(mut self, v: bool) -> Self {
        self.collective = v;
        self
    }

    pub fn no_user_modification(mut self, v: bool) -> Self {
        self.no_user_modification = v;
        self
    }

    pub fn usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn schema_name(mut self, name: impl Into<String>) -> Self {
        self.object.schema_name = name.into();
        self
    }

    pub fn extension(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.object.extensions.insert(key.into(), values);
        self
    }
}
