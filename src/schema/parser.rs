//! RFC 4512 / OpenLDAP schema description parser (spec component C11).
//!
//! Tokens are parenthesised keyword/value pairs; arbitrary whitespace is
//! tolerated between them. Multi-valued fields (`NAME`, `MUST`, `MAY`,
//! `SUP`) accept either a bare descriptor or a `( a $ b $ c )` list.
//! `X-`-prefixed extensions are preserved verbatim; `X-SCHEMA` sets the
//! owning schema name (defaulting to `"other"`).
//!
//! "Quirks mode" relaxes the numeric-OID requirement and expands
//! OpenLDAP's `objectIdentifier` macro (`name:suffix` → `<base-oid>.suffix`,
//! `name` alone → `<base-oid>`) before the description is otherwise parsed.

use super::attribute_type::{AttributeTypeBuilder, Usage};
use super::object_class::{ObjectClassBuilder, ObjectClassKind};
use crate::error::LdapError;
use std::collections::HashMap;

/// Tracks `objectIdentifier` macro definitions for quirks-mode expansion.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: HashMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single `objectIdentifier <name> <oid-or-ref>` directive.
    pub fn define(&mut self, line: &str) -> Result<(), LdapError> {
        let mut it = line.split_whitespace();
        let keyword = it.next().unwrap_or("");
        if keyword != "objectIdentifier" {
            return Err(LdapError::SchemaViolation(format!("not an objectIdentifier directive: {line:?}")));
        }
        let name = it
            .next()
            .ok_or_else(|| LdapError::SchemaViolation("objectIdentifier missing name".into()))?;
        let value = it
            .next()
            .ok_or_else(|| LdapError::SchemaViolation("objectIdentifier missing value".into()))?;
        let expanded = self.expand(value);
        self.macros.insert(name.to_string(), expanded);
        Ok(())
    }

    /// Expands `name:suffix` or bare `name` against previously defined
    /// macros; tokens that aren't registered macro references pass
    /// through unchanged (they're assumed to already be numeric OIDs).
    pub fn expand(&self, token: &str) -> String {
        match token.split_once(':') {
            Some((name, suffix)) => match self.macros.get(name) {
                Some(base) => format!("{base}.{suffix}"),
                None => token.to_string(),
            },
            None => self.macros.get(token).cloned().unwrap_or_else(|| token.to_string()),
        }
    }
}

/// Tokenize a parenthesised schema description, keeping quoted strings
/// intact and treating `(`/`)` as standalone tokens.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' | ')' | '$' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '\'' => {
                chars.next();
                let mut s = String::new();
                for c2 in chars.by_ref() {
                    if c2 == '\'' {
                        break;
                    }
                    s.push(c2);
                }
                tokens.push(format!("'{s}'"));
            }
            _ => {
                let mut s = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_whitespace() || c2 == '(' || c2 == ')' || c2 == '$' {
                        break;
                    }
                    s.push(c2);
                    chars.next();
                }
                tokens.push(s);
            }
        }
    }
    tokens
}

fn unquote(tok: &str) -> String {
    tok.trim_matches('\'').to_string()
}

struct TokenCursor {
    tokens: Vec<String>,
    pos: usize,
}

impl TokenCursor {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn bump(&mut self) -> Option<String> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// Reads `VALUE` or `( a $ b $ c )` into a list of unquoted strings.
    fn read_list(&mut self) -> Vec<String> {
        if self.peek() == Some("(") {
            self.bump();
            let mut out = Vec::new();
            while let Some(tok) = self.bump() {
                if tok == ")" {
                    break;
                }
                if tok == "$" {
                    continue;
                }
                out.push(unquote(&tok));
            }
            out
        } else if let Some(tok) = self.bump() {
            vec![unquote(&tok)]
        } else {
            Vec::new()
        }
    }

    fn read_one(&mut self) -> Option<String> {
        self.bump().map(|t| unquote(&t))
    }
}

/// Parses one attribute type description. `quirks` permits non-numeric
/// leading OIDs (expanded macro references) instead of requiring a
/// dotted-decimal literal.
pub fn parse_attribute_type(description: &str, macros: &MacroTable, quirks: bool) -> Result<AttributeTypeBuilder, LdapError> {
    let mut cur = TokenCursor { tokens: tokenize_and_expand(description, macros), pos: 0 };
    if cur.bump().as_deref() != Some("(") {
        return Err(LdapError::SchemaViolation("expected '(' to start attribute type description".into()));
    }
    let oid = cur.read_one().ok_or_else(|| LdapError::SchemaViolation("missing OID".into()))?;
    if !quirks && !super::object::is_numeric_oid(&oid) {
        return Err(LdapError::SchemaViolation(format!("{oid:?} is not a numeric OID (quirks mode disabled)")));
    }
    let mut builder = AttributeTypeBuilder::new(oid);
    let mut schema_name: Option<String> = None;
    loop {
        match cur.peek() {
            Some(")") | None => {
                cur.bump();
                break;
            }
            Some("NAME") => {
                cur.bump();
                for n in cur.read_list() {
                    builder = builder.name(n);
                }
            }
            Some("DESC") => {
                cur.bump();
                if let Some(d) = cur.read_one() {
                    builder = builder.description(d);
                }
            }
            Some("OBSOLETE") => {
                cur.bump();
                builder = builder.obsolete(true);
            }
            Some("SUP") => {
                cur.bump();
                if let Some(s) = cur.read_one() {
                    builder = builder.sup(s);
                }
            }
            Some("EQUALITY") => {
                cur.bump();
                if let Some(s) = cur.read_one() {
                    builder = builder.equality(s);
                }
            }
            Some("ORDERING") => {
                cur.bump();
                if let Some(s) = cur.read_one() {
                    builder = builder.ordering(s);
                }
            }
            Some("SUBSTR") => {
                cur.bump();
                if let Some(s) = cur.read_one() {
                    builder = builder.substr(s);
                }
            }
            Some("SYNTAX") => {
                cur.bump();
                if let Some(s) = cur.read_one() {
                    let (oid, len) = split_syntax_length(&s);
                    builder = builder.syntax(oid);
                    if let Some(len) = len {
                        builder = builder.syntax_length(len);
                    }
                }
            }
            Some("SINGLE-VALUE") => {
                cur.bump();
                builder = builder.single_value(true);
            }
            Some("COLLECTIVE") => {
                cur.bump();
                builder = builder.collective(true);
            }
            Some("NO-USER-MODIFICATION") => {
                cur.bump();
                builder = builder.no_user_modification(true);
            }
            Some("USAGE") => {
                cur.bump();
                if let Some(u) = cur.read_one() {
                    builder = builder.usage(parse_usage(&u));
                }
            }
            Some(tok) if tok.starts_with("X-") => {
                let key = cur.bump().unwrap();
                let values = cur.read_list();
                if key == "X-SCHEMA" {
                    schema_name = values.first().cloned();
                }
                builder = builder.extension(key, values);
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
    if let Some(name) = schema_name {
        builder = builder.schema_name(name);
    }
    Ok(builder)
}

fn split_syntax_length(s: &str) -> (String, Option<u32>) {
    match s.split_once('{') {
        Some((oid, rest)) => {
            let len = rest.trim_end_matches('}').parse::<u32>().ok();
            (oid.to_string(), len)
        }
        None => (s.to_string(), None),
    }
}

fn parse_usage(s: &str) -> Usage {
    match s {
        "directoryOperation" => Usage::DirectoryOperation,
        "distributedOperation" => Usage::DistributedOperation,
        "dSAOperation" => Usage::DsaOperation,
        _ => Usage::UserApplications,
    }
}

/// Parses one object class description.
pub fn parse_object_class(description: &str, macros: &MacroTable, quirks: bool) -> Result<ObjectClassBuilder, LdapError> {
    let mut cur = TokenCursor { tokens: tokenize_and_expand(description, macros), pos: 0 };
    if cur.bump().as_deref() != Some("(") {
        return Err(LdapError::SchemaViolation("expected '(' to start object class description".into()));
    }
    let oid = cur.read_one().ok_or_else(|| LdapError::SchemaViolation("missing OID".into()))?;
    if !quirks && !super::object::is_numeric_oid(&oid) {
        return Err(LdapError::SchemaViolation(format!("{oid:?} is not a numeric OID (quirks mode disabled)")));
    }
    let mut builder = ObjectClassBuilder::new(oid);
    let mut schema_name: Option<String> = None;
    loop {
        match cur.peek() {
            Some(")") | None => {
                cur.bump();
                break;
            }
            Some("NAME") => {
                cur.bump();
                for n in cur.read_list() {
                    builder = builder.name(n);
                }
            }
            Some("DESC") => {
                cur.bump();
                if let Some(d) = cur.read_one() {
                    builder = builder.description(d);
                }
            }
            Some("OBSOLETE") => {
                cur.bump();
                builder = builder.obsolete(true);
            }
            Some("SUP") => {
                cur.bump();
                for s in cur.read_list() {
                    builder = builder.sup(s);
                }
            }
            Some("ABSTRACT") => {
                cur.bump();
                builder = builder.kind(ObjectClassKind::Abstract);
            }
            Some("STRUCTURAL") => {
                cur.bump();
                builder = builder.kind(ObjectClassKind::Structural);
            }
            Some("AUXILIARY") => {
                cur.bump();
                builder = builder.kind(ObjectClassKind::Auxiliary);
            }
            Some("MUST") => {
                cur.bump();
                for a in cur.read_list() {
                    builder = builder.must(a);
                }
            }
            Some("MAY") => {
                cur.bump();
                for a in cur.read_list() {
                    builder = builder.may(a);
                }
            }
            Some(tok) if tok.starts_with("X-") => {
                let key = cur.bump().unwrap();
                let values = cur.read_list();
                if key == "X-SCHEMA" {
                    schema_name = values.first().cloned();
                }
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
    if let Some(name) = schema_name {
        builder = builder.schema_name(name);
    }
    Ok(builder)
}

/// Tokenizes `description`, expanding every bare/`macro:suffix`-shaped
/// token against `macros`. Quoted strings and the `(`/`)`/`$` structural
/// tokens pass through unchanged.
fn tokenize_and_expand(description: &str, macros: &MacroTable) -> Vec<String> {
    tokenize(description)
        .into_iter()
        .map(|tok| {
            if tok.starts_with('\'') || tok == "(" || tok == ")" || tok == "$" {
                tok
            } else {
                macros.expand(&tok)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cn_attribute_type() {
        let desc = "( 2.5.4.3 NAME 'cn' SUP name EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{64} )";
        let b = parse_attribute_type(desc, &MacroTable::new(), false).unwrap();
        assert_eq!(b.object.oid, "2.5.4.3");
        assert_eq!(b.object.names, vec!["cn".to_string()]);
        assert_eq!(b.equality.as_deref(), Some("caseIgnoreMatch"));
        assert_eq!(b.syntax_length, Some(64));
    }

    #[test]
    fn parses_person_object_class() {
        let desc = "( 2.5.6.6 NAME 'person' SUP top STRUCTURAL MUST ( sn $ cn ) MAY ( userPassword $ description ) )";
        let b = parse_object_class(desc, &MacroTable::new(), false).unwrap();
        assert_eq!(b.must, vec!["sn".to_string(), "cn".to_string()]);
        assert_eq!(b.kind, ObjectClassKind::Structural);
    }

    #[test]
    fn expands_object_identifier_macro() {
        let mut macros = MacroTable::new();
        macros.define("objectIdentifier OLcfgAt 1.3.6.1.4.1.4203.1.12.2.3").unwrap();
        assert_eq!(macros.expand("OLcfgAt:1"), "1.3.6.1.4.1.4203.1.12.2.3.1");
    }

    #[test]
    fn rejects_non_numeric_oid_without_quirks() {
        let desc = "( myAttr NAME 'x' SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )";
        assert!(parse_attribute_type(desc, &MacroTable::new(), false).is_err());
    }
}
