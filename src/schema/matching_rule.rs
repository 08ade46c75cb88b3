//! MatchingRule and MatchingRuleUse schema objects (spec §3, §4.6).
//!
//! Per Design Notes §9 this uses full structural `PartialEq` on both
//! types — the source's stub `equals` (ignoring fields) is not replicated.

use super::object::SchemaObject;
use crate::syntaxes::NormalizerFn;

/// A named comparison/normalization algorithm over a syntax.
#[derive(Clone)]
pub struct MatchingRule {
    pub object: SchemaObject,
    pub syntax_oid: String,
    pub(crate) normalizer: NormalizerFn,
}

impl MatchingRule {
    pub fn numeric_oid(&self) -> &str {
        &self.object.oid
    }

    pub fn normalize(&self, value: &[u8]) -> Vec<u8> {
        (self.normalizer)(value)
    }
}

impl std::fmt::Debug for MatchingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingRule")
            .field("object", &self.object)
            .field("syntax_oid", &self.syntax_oid)
            .finish()
    }
}

impl PartialEq for MatchingRule {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object && self.syntax_oid == other.syntax_oid
    }
}
impl Eq for MatchingRule {}

#[derive(Debug, Clone)]
pub struct MatchingRuleBuilder {
    object: SchemaObject,
    syntax_oid: String,
}

impl MatchingRuleBuilder {
    pub fn new(oid: impl Into<String>, syntax_oid: impl Into<String>) -> Self {
        MatchingRuleBuilder {
            object: SchemaObject::new(oid),
            syntax_oid: syntax_oid.into(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.object.names.push(name.into());
        self
    }

    pub fn schema_name(mut self, name: impl Into<String>) -> Self {
        self.object.schema_name = name.into();
        self
    }

    pub fn build(self) -> MatchingRule {
        let normalizer = crate::syntaxes::normalizer_for(&self.object.oid);
        MatchingRule {
            object: self.object,
            syntax_oid: self.syntax_oid,
            normalizer,
        }
    }
}

/// `MatchingRuleUse`: which attribute types a matching rule applies to
/// (RFC 4512 §4.1.4). Structural equality, not the source's field-ignoring
/// stub (Design Notes §9 open question).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingRuleUse {
    pub object: SchemaObject,
    pub applies: Vec<String>,
}
