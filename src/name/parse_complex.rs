//! Complex DN parser (spec §4.5): multi-AVA RDNs, hex-pair escapes,
//! special-char escapes, quoted values, and `#<hex>` binary RDN values,
//! per RFC 4514.

use super::ava::Ava;
use super::dn::Dn;
use super::escape::unescape_value;
use super::rdn::Rdn;
use crate::error::LdapError;
use crate::schema::SchemaManager;

pub(crate) struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    _input: &'a str,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Cursor {
            chars: input.chars().collect(),
            pos: 0,
            _input: input,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }
}

/// Parse `input` as a full DN (comma/semicolon-joined RDNs), using
/// `schema` to resolve attribute types for normalization when present.
pub fn parse_dn(input: &str, schema: Option<&SchemaManager>) -> Result<Dn, LdapError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Dn::new(String::new(), Vec::new()));
    }
    let mut cur = Cursor::new(trimmed);
    let mut rdns = Vec::new();
    loop {
        let rdn = parse_rdn(&mut cur, schema)?;
        rdns.push(rdn);
        match cur.peek() {
            Some(',') | Some(';') => {
                cur.bump();
            }
            None => break,
            Some(c) => {
                return Err(LdapError::DnSyntax(format!(
                    "unexpected character {c:?} between RDNs"
                )))
            }
        }
    }
    Ok(Dn::new(input.to_string(), rdns))
}

/// Parse a single RDN (spec §3: `ava1+ava2+...`), used by
/// `ModifyDNRequest.newrdn` decoding as well as full-DN parsing.
pub(crate) fn parse_rdn(cur: &mut Cursor<'_>, schema: Option<&SchemaManager>) -> Result<Rdn, LdapError> {
    let mut avas = Vec::new();
    loop {
        avas.push(parse_ava(cur, schema)?);
        if cur.peek() == Some('+') {
            cur.bump();
        } else {
            break;
        }
    }
    Ok(Rdn::new(avas))
}

fn parse_ava(cur: &mut Cursor<'_>, schema: Option<&SchemaManager>) -> Result<Ava, LdapError> {
    let attr_type = parse_attribute_type(cur)?;
    skip_ws(cur);
    if cur.bump() != Some('=') {
        return Err(LdapError::DnSyntax(format!(
            "expected '=' after attribute type {attr_type:?}"
        )));
    }
    skip_ws(cur);
    let value = parse_value(cur)?;
    Ok(Ava::new(&attr_type, &value, schema))
}

fn skip_ws(cur: &mut Cursor<'_>) {
    while cur.peek() == Some(' ') {
        cur.bump();
    }
}

fn parse_attribute_type(cur: &mut Cursor<'_>) -> Result<String, LdapError> {
    skip_ws(cur);
    let start = cur.pos;
    // numericoid: digits and dots; descr: ALPHA (ALPHA|DIGIT|'-')*
    while let Some(c) = cur.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            cur.bump();
        } else {
            break;
        }
    }
    if cur.pos == start {
        return Err(LdapError::DnSyntax("empty attribute type".into()));
    }
    Ok(cur.chars[start..cur.pos].iter().collect())
}

/// `#<hex>` binary values decode straight to a Latin-1-ish string of the
/// raw bytes; this keeps the AVA model uniform (string + normalizer)
/// while still round-tripping the original octets through `as_bytes`.
fn parse_value(cur: &mut Cursor<'_>) -> Result<String, LdapError> {
    match cur.peek() {
        Some('#') => {
            cur.bump();
            let start = cur.pos;
            while let Some(c) = cur.peek() {
                if c.is_ascii_hexdigit() {
                    cur.bump();
                } else {
                    break;
                }
            }
            let hex: String = cur.chars[start..cur.pos].iter().collect();
            if hex.is_empty() || hex.len() % 2 != 0 {
                return Err(LdapError::DnSyntax("malformed hex value".into()));
            }
            let mut bytes = Vec::with_capacity(hex.len() / 2);
            let hb = hex.as_bytes();
            for chunk in hb.chunks(2) {
                let s = std::str::from_utf8(chunk).unwrap();
                let b = u8::from_str_radix(s, 16)
                    .map_err(|_| LdapError::DnSyntax("malformed hex value".into()))?;
                bytes.push(b);
            }
            Ok(bytes.into_iter().map(|b| b as char).collect())
        }
        Some('"') => {
            cur.bump();
            let start = cur.pos;
            loop {
                match cur.bump() {
                    Some('"') => break,
                    Some('\\') => {
                        cur.bump();
                    }
                    Some(_) => {}
                    None => return Err(LdapError::DnSyntax("unterminated quoted value".into())),
                }
            }
            let raw: String = cur.chars[start..cur.pos - 1].iter().collect();
            unescape_value(&raw)
        }
        _ => {
            let start = cur.pos;
            while let Some(c) = cur.peek() {
                if c == ',' || c == '+' || c == ';' {
                    break;
                }
                if c == '\\' {
                    cur.bump();
                    if cur.bump().is_none() {
                        return Err(LdapError::DnSyntax("dangling escape".into()));
                    }
                } else {
                    cur.bump();
                }
            }
            let raw: String = cur.chars[start..cur.pos].iter().collect();
            let trimmed = raw.trim_end_matches(' ').to_string();
            unescape_value(&trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multivalued_rdn() {
        let dn = parse_dn("CN=A+SN=B,DC=example,DC=com", None).unwrap();
        assert_eq!(dn.depth(), 2);
        assert!(dn.rdns()[0].is_multivalued());
    }

    #[test]
    fn parses_escaped_comma_in_value() {
        let dn = parse_dn("cn=Doe\\, John,dc=example,dc=com", None).unwrap();
        assert_eq!(dn.rdns()[0].avas[0].user_value, "Doe, John");
    }

    #[test]
    fn parses_quoted_value() {
        let dn = parse_dn("cn=\"Doe, John\",dc=example,dc=com", None).unwrap();
        assert_eq!(dn.rdns()[0].avas[0].user_value, "Doe, John");
    }

    #[test]
    fn parses_hex_binary_value() {
        let dn = parse_dn("cn=#48656c6c6f,dc=example,dc=com", None).unwrap();
        assert_eq!(dn.rdns()[0].avas[0].user_value, "Hello");
    }

    #[test]
    fn rejects_dangling_escape() {
        assert!(parse_dn("cn=abc\\", None).is_err());
    }
}
