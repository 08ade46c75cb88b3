//! Fast DN parser (spec §4.5): covers the overwhelming majority of real
//! DNs — one AVA per RDN, a keystring attribute type, and an unescaped
//! printable value — without allocating a grammar stack. Anything outside
//! that shape falls back to [`super::parse_complex`].

use super::ava::Ava;
use super::dn::Dn;
use super::rdn::Rdn;
use crate::schema::SchemaManager;

fn is_keystring_type(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_plain_value(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.starts_with(' ') || s.ends_with(' ') || s.starts_with('#') {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_graphic() && !super::escape::SPECIAL.contains(&c) || c == ' ')
}

/// Attempt the fast path; returns `None` when `input` needs the complex
/// grammar (multi-AVA RDN, escapes, quoting, binary values, non-ASCII).
pub fn try_parse_dn(input: &str, schema: Option<&SchemaManager>) -> Option<Dn> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(Dn::new(String::new(), Vec::new()));
    }
    let mut rdns = Vec::new();
    for component in trimmed.split(',') {
        let component = component.trim();
        if component.contains('+') {
            return None;
        }
        let (ty, val) = component.split_once('=')?;
        let ty = ty.trim();
        if !is_keystring_type(ty) || !is_plain_value(val) {
            return None;
        }
        rdns.push(Rdn::new(vec![Ava::new(ty, val, schema)]));
    }
    Some(Dn::new(input.to_string(), rdns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_dn() {
        let dn = try_parse_dn("cn=jdoe,dc=example,dc=com", None).unwrap();
        assert_eq!(dn.depth(), 3);
    }

    #[test]
    fn rejects_multivalued_rdn() {
        assert!(try_parse_dn("cn=a+sn=b,dc=example,dc=com", None).is_none());
    }

    #[test]
    fn rejects_escaped_value() {
        assert!(try_parse_dn("cn=a\\,b,dc=example,dc=com", None).is_none());
    }
}
