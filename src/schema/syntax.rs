//! LdapSyntax schema object (spec §3, §4.6): an OID plus a human-readable
//! flag plus a syntax checker, delegating the actual check to
//! [`crate::syntaxes`].

use super::object::SchemaObject;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapSyntax {
    pub object: SchemaObject,
    pub human_readable: bool,
}

impl LdapSyntax {
    pub fn new(oid: impl Into<String>, human_readable: bool) -> Self {
        LdapSyntax {
            object: SchemaObject::new(oid),
            human_readable,
        }
    }

    pub fn numeric_oid(&self) -> &str {
        &self.object.oid
    }

    pub fn is_valid(&self, value: &[u8]) -> bool {
        crate::syntaxes::is_valid(&self.object.oid, value)
    }
}
