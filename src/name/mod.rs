//! Distinguished Name / RDN / AVA handling (spec component C5).
//!
//! Two parsers coexist by design (spec §4.5, Design Notes §9): a fast
//! path ([`parse_fast`]) for the single-AVA, unescaped, keystring-typed
//! common case, and a full recursive-descent grammar ([`parse_complex`])
//! for everything else (multi-AVA RDNs, escapes, quoting, `#<hex>`
//! binary values).

pub mod ava;
pub mod dn;
pub mod escape;
pub mod parse_complex;
pub mod parse_fast;

pub use ava::Ava;
pub use dn::Dn;
pub use rdn::Rdn;

pub mod rdn;

use crate::error::LdapError;
use crate::schema::SchemaManager;

/// Parse `input` as an RFC 4514 DN, normalizing through `schema` when
/// given. Tries the fast parser first and falls back to the complex one.
pub fn parse_dn(input: &str, schema: Option<&SchemaManager>) -> Result<Dn, LdapError> {
    if let Some(dn) = parse_fast::try_parse_dn(input, schema) {
        return Ok(dn);
    }
    parse_complex::parse_dn(input, schema)
}

/// Parse `input` as a single RFC 4514 `<name-component>` (RDN).
pub fn parse_rdn(input: &str, schema: Option<&SchemaManager>) -> Result<Rdn, LdapError> {
    let mut cur = parse_complex::Cursor::new(input.trim());
    let rdn = parse_complex::parse_rdn(&mut cur, schema)?;
    Ok(rdn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dn_round_trip() {
        let text = "cn=jdoe,dc=example,dc=com";
        let dn = parse_dn(text, None).unwrap();
        assert_eq!(dn.user_provided(), text);
        let reparsed = parse_dn(dn.user_provided(), None).unwrap();
        assert_eq!(dn, reparsed);
    }

    #[test]
    fn dn_canonicalization_ignores_rdn_order_and_case() {
        let a = parse_dn("CN=A+SN=B,DC=Example,DC=COM", None).unwrap();
        let b = parse_dn("sn=b+cn=a,dc=example,dc=com", None).unwrap();
        assert_eq!(a.normalized(), b.normalized());
        assert_eq!(a, b);
    }
}
