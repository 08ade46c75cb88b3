//! RFC 4515 string form: renderer and recursive-descent parser.
//!
//! New relative to the teacher crate, which only ever decoded the BER
//! form; grounded on RFC 4515's grammar and on this crate's own
//! `name::parse_complex` for the "balanced delimiters, escape-aware
//! cursor" parsing idiom.

use super::{
    AssertionValue, AttributeDescription, AttributeValueAssertion, Filter, MatchingRuleAssertion,
    Substring, SubstringFilter, MAX_FILTER_DEPTH,
};
use crate::error::LdapError;
use crate::message::LdapString;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Parse an RFC 4515 filter string, e.g. `(&(cn=Foo)(!(objectClass=person)))`.
pub fn parse_filter(input: &str) -> Result<Filter<'static>, LdapError> {
    let mut cursor = Cursor::new(input.as_bytes());
    let filter = cursor.parse_filter(0)?;
    cursor.skip_ws();
    if !cursor.eof() {
        return Err(LdapError::InvalidFilterType);
    }
    Ok(filter)
}

/// Render a filter back to its RFC 4515 textual form.
pub fn render_filter(filter: &Filter<'_>) -> String {
    let mut out = String::new();
    render(filter, &mut out);
    out
}

fn render(filter: &Filter<'_>, out: &mut String) {
    match filter {
        Filter::And(subs) => {
            out.push_str("(&");
            for s in subs {
                render(s, out);
            }
            out.push(')');
        }
        Filter::Or(subs) => {
            out.push_str("(|");
            for s in subs {
                render(s, out);
            }
            out.push(')');
        }
        Filter::Not(sub) => {
            out.push_str("(!");
            render(sub, out);
            out.push(')');
        }
        Filter::EqualityMatch(ava) => render_ava(out, &ava.attribute_desc, "=", &ava.assertion_value),
        Filter::GreaterOrEqual(ava) => render_ava(out, &ava.attribute_desc, ">=", &ava.assertion_value),
        Filter::LessOrEqual(ava) => render_ava(out, &ava.attribute_desc, "<=", &ava.assertion_value),
        Filter::ApproxMatch(ava) => render_ava(out, &ava.attribute_desc, "~=", &ava.assertion_value),
        Filter::Present(attr) => {
            out.push('(');
            out.push_str(&attr.0);
            out.push_str("=*)");
        }
        Filter::Substrings(sf) => render_substrings(out, sf),
        Filter::ExtensibleMatch(mra) => render_extensible(out, mra),
    }
}

fn render_ava(out: &mut String, attr: &LdapString<'_>, op: &str, value: &std::borrow::Cow<'_, [u8]>) {
    out.push('(');
    out.push_str(&attr.0);
    out.push_str(op);
    escape_value(out, value);
    out.push(')');
}

fn render_substrings(out: &mut String, sf: &SubstringFilter<'_>) {
    out.push('(');
    out.push_str(&sf.filter_type.0);
    out.push('=');
    for (idx, s) in sf.substrings.iter().enumerate() {
        match s {
            Substring::Initial(v) => {
                escape_value(out, &v.0);
                out.push('*');
            }
            Substring::Any(v) => {
                if idx == 0 {
                    out.push('*');
                }
                escape_value(out, &v.0);
                out.push('*');
            }
            Substring::Final(v) => {
                escape_value(out, &v.0);
            }
        }
    }
    out.push(')');
}

fn render_extensible(out: &mut String, mra: &MatchingRuleAssertion<'_>) {
    out.push('(');
    if let Some(t) = &mra.rule_type {
        out.push_str(&t.0);
    }
    if let Some(r) = &mra.matching_rule {
        out.push(':');
        out.push_str(&r.0);
    }
    if mra.dn_attributes == Some(true) {
        out.push_str(":dn");
    }
    out.push_str(":=");
    escape_value(out, &mra.assertion_value.0);
    out.push(')');
}

/// Escape the RFC 4515 special octets (`*`, `(`, `)`, `\`, NUL) as `\HH`.
fn escape_value(out: &mut String, value: &[u8]) {
    for &b in value {
        match b {
            b'*' | b'(' | b')' | b'\\' | 0x00 => {
                let _ = write!(out, "\\{:02x}", b);
            }
            _ if b.is_ascii_graphic() || b == b' ' => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:02x}", b);
            }
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), LdapError> {
        if self.bump() == Some(b) {
            Ok(())
        } else {
            Err(LdapError::InvalidFilterType)
        }
    }

    fn parse_filter(&mut self, depth: usize) -> Result<Filter<'static>, LdapError> {
        if depth >= MAX_FILTER_DEPTH {
            return Err(LdapError::NestingTooDeep);
        }
        self.expect(b'(')?;
        let filter = match self.peek() {
            Some(b'&') => {
                self.bump();
                let subs = self.parse_filter_list(depth)?;
                if subs.is_empty() {
                    return Err(LdapError::InvalidFilterType);
                }
                Filter::And(subs)
            }
            Some(b'|') => {
                self.bump();
                let subs = self.parse_filter_list(depth)?;
                if subs.is_empty() {
                    return Err(LdapError::InvalidFilterType);
                }
                Filter::Or(subs)
            }
            Some(b'!') => {
                self.bump();
                let sub = self.parse_filter(depth + 1)?;
                Filter::Not(Box::new(sub))
            }
            _ => self.parse_item()?,
        };
        self.expect(b')')?;
        Ok(filter)
    }

    fn parse_filter_list(&mut self, depth: usize) -> Result<Vec<Filter<'static>>, LdapError> {
        let mut out = Vec::new();
        while self.peek() == Some(b'(') {
            out.push(self.parse_filter(depth + 1)?);
        }
        Ok(out)
    }

    /// `attr filtertype value`, where filtertype is one of `=`, `>=`,
    /// `<=`, `~=`, or the extensible-match `:dn:rule:=`/`:=` forms.
    fn parse_item(&mut self) -> Result<Filter<'static>, LdapError> {
        let start = self.pos;
        while !matches!(self.peek(), None | Some(b'=') | Some(b'>') | Some(b'<') | Some(b'~') | Some(b':') | Some(b')')) {
            self.pos += 1;
        }
        let attr = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| LdapError::InvalidFilterType)?
            .to_string();

        match self.peek() {
            Some(b':') => self.parse_extensible(attr),
            Some(b'>') => {
                self.bump();
                self.expect(b'=')?;
                let value = self.parse_value()?;
                Ok(Filter::GreaterOrEqual(make_ava(attr, value)))
            }
            Some(b'<') => {
                self.bump();
                self.expect(b'=')?;
                let value = self.parse_value()?;
                Ok(Filter::LessOrEqual(make_ava(attr, value)))
            }
            Some(b'~') => {
                self.bump();
                self.expect(b'=')?;
                let value = self.parse_value()?;
                Ok(Filter::ApproxMatch(make_ava(attr, value)))
            }
            Some(b'=') => {
                self.bump();
                if attr.is_empty() {
                    return Err(LdapError::InvalidFilterType);
                }
                self.parse_equality_or_present_or_substrings(attr)
            }
            _ => Err(LdapError::InvalidFilterType),
        }
    }

    fn parse_equality_or_present_or_substrings(
        &mut self,
        attr: String,
    ) -> Result<Filter<'static>, LdapError> {
        if self.peek() == Some(b'*') && self.bytes.get(self.pos + 1) == Some(&b')') {
            self.bump();
            return Ok(Filter::Present(LdapString(Cow::Owned(attr))));
        }
        let raw_start = self.pos;
        while self.peek().is_some() && self.peek() != Some(b')') {
            if self.peek() == Some(b'\\') {
                self.pos += 3;
            } else {
                self.pos += 1;
            }
        }
        let raw = &self.bytes[raw_start..self.pos];
        if raw.contains(&b'*') {
            let substrings = parse_substring_segments(raw)?;
            return Ok(Filter::Substrings(SubstringFilter {
                filter_type: LdapString(Cow::Owned(attr)),
                substrings,
            }));
        }
        let value = unescape(raw)?;
        Ok(Filter::EqualityMatch(make_ava(attr, value)))
    }

    fn parse_extensible(&mut self, mut attr: String) -> Result<Filter<'static>, LdapError> {
        let mut dn_attributes = None;
        let mut matching_rule = None;
        loop {
            self.expect(b':')?;
            if self.peek() == Some(b'=') {
                self.bump();
                break;
            }
            let start = self.pos;
            while !matches!(self.peek(), None | Some(b':') | Some(b'=')) {
                self.pos += 1;
            }
            let token = std::str::from_utf8(&self.bytes[start..self.pos])
                .map_err(|_| LdapError::InvalidFilterType)?;
            if token.eq_ignore_ascii_case("dn") {
                dn_attributes = Some(true);
            } else {
                matching_rule = Some(token.to_string());
            }
            if self.peek() == Some(b'=') {
                self.bump();
                break;
            }
        }
        let value = self.parse_value()?;
        let rule_type = if attr.is_empty() {
            None
        } else {
            Some(AttributeDescription(Cow::Owned(std::mem::take(&mut attr))))
        };
        if rule_type.is_none() && matching_rule.is_none() {
            return Err(LdapError::InvalidFilterType);
        }
        Ok(Filter::ExtensibleMatch(MatchingRuleAssertion {
            matching_rule: matching_rule.map(|r| LdapString(Cow::Owned(r))),
            rule_type,
            assertion_value: AssertionValue(Cow::Owned(value)),
            dn_attributes,
        }))
    }

    fn parse_value(&mut self) -> Result<Vec<u8>, LdapError> {
        let start = self.pos;
        while self.peek().is_some() && self.peek() != Some(b')') {
            if self.peek() == Some(b'\\') {
                self.pos += 3;
            } else {
                self.pos += 1;
            }
        }
        unescape(&self.bytes[start..self.pos])
    }
}

fn make_ava(attr: String, value: Vec<u8>) -> AttributeValueAssertion<'static> {
    AttributeValueAssertion {
        attribute_desc: LdapString(Cow::Owned(attr)),
        assertion_value: Cow::Owned(value),
    }
}

/// Split a `*`-delimited raw (still-escaped) substring value into
/// initial/any/final segments per RFC 4515.
fn parse_substring_segments(raw: &[u8]) -> Result<Vec<Substring<'static>>, LdapError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' {
            i += 3;
            continue;
        }
        if raw[i] == b'*' {
            segments.push(&raw[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    segments.push(&raw[start..]);

    let n = segments.len();
    let mut out = Vec::new();
    for (idx, seg) in segments.iter().enumerate() {
        if seg.is_empty() && idx != 0 && idx != n - 1 {
            continue;
        }
        let value = AssertionValue(Cow::Owned(unescape(seg)?));
        if idx == 0 {
            if !seg.is_empty() {
                out.push(Substring::Initial(value));
            }
        } else if idx == n - 1 {
            if !seg.is_empty() {
                out.push(Substring::Final(value));
            }
        } else {
            out.push(Substring::Any(value));
        }
    }
    if out.is_empty() {
        return Err(LdapError::InvalidSubstring);
    }
    Ok(out)
}

/// Undo RFC 4515 `\HH` hex-pair escapes.
fn unescape(raw: &[u8]) -> Result<Vec<u8>, LdapError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' {
            let hex = raw.get(i + 1..i + 3).ok_or(LdapError::InvalidFilterType)?;
            let s = std::str::from_utf8(hex).map_err(|_| LdapError::InvalidFilterType)?;
            let byte = u8::from_str_radix(s, 16).map_err(|_| LdapError::InvalidFilterType)?;
            out.push(byte);
            i += 3;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_not_filter() {
        let f = parse_filter("(&(cn=Foo)(!(objectClass=person)))").unwrap();
        match f {
            Filter::And(subs) => {
                assert_eq!(subs.len(), 2);
                assert!(matches!(subs[0], Filter::EqualityMatch(_)));
                assert!(matches!(subs[1], Filter::Not(_)));
            }
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn renders_back_equivalent_text() {
        let f = parse_filter("(&(cn=Foo)(!(objectClass=person)))").unwrap();
        let rendered = render_filter(&f);
        assert_eq!(rendered, "(&(cn=Foo)(!(objectClass=person)))");
    }

    #[test]
    fn parses_present_filter() {
        let f = parse_filter("(cn=*)").unwrap();
        assert!(matches!(f, Filter::Present(_)));
    }

    #[test]
    fn parses_substrings_filter() {
        let f = parse_filter("(cn=fo*ba*r)").unwrap();
        match f {
            Filter::Substrings(sf) => {
                assert_eq!(sf.substrings.len(), 3);
            }
            _ => panic!("expected Substrings"),
        }
    }

    #[test]
    fn parses_extensible_match() {
        let f = parse_filter("(cn:caseIgnoreMatch:=Foo)").unwrap();
        match f {
            Filter::ExtensibleMatch(mra) => {
                assert_eq!(mra.rule_type.unwrap().0, "cn");
                assert_eq!(mra.matching_rule.unwrap().0, "caseIgnoreMatch");
            }
            _ => panic!("expected ExtensibleMatch"),
        }
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(parse_filter("(cn=Foo").is_err());
    }

    #[test]
    fn rejects_empty_and() {
        assert!(parse_filter("(&)").is_err());
    }

    #[test]
    fn unescapes_hex_pairs() {
        let f = parse_filter(r"(cn=Foo\28Bar\29)").unwrap();
        match f {
            Filter::EqualityMatch(ava) => assert_eq!(&*ava.assertion_value, b"Foo(Bar)"),
            _ => panic!("expected EqualityMatch"),
        }
    }
}
