//! Per-syntax validators and per-matching-rule normalizers (spec component
//! C9), keyed by the RFC 4517 syntax/matching-rule OIDs.
//!
//! [`AttributeType`](crate::schema::AttributeType) resolves its normalizer
//! function once, at registration time, via [`normalizer_for`] /
//! [`default_normalizer_for_syntax`]; the frozen `AttributeType` then calls
//! it directly with no further OID lookups (spec Design Notes §9, "builder
//! → frozen-value split").

use crate::prepare::{prepare_lossy, CaseSensitivity, StringType};

/// LDAP syntax OIDs (RFC 4517 §3.3), the ones this crate's bootstrap
/// schema and core attribute types reference.
pub mod syntax_oid {
    pub const BOOLEAN: &str = "1.3.6.1.4.1.1466.115.121.1.7";
    pub const BIT_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.6";
    pub const CERTIFICATE: &str = "1.3.6.1.4.1.1466.115.121.1.8";
    pub const CERTIFICATE_LIST: &str = "1.3.6.1.4.1.1466.115.121.1.9";
    pub const CERTIFICATE_PAIR: &str = "1.3.6.1.4.1.1466.115.121.1.10";
    pub const COUNTRY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.11";
    pub const DN: &str = "1.3.6.1.4.1.1466.115.121.1.12";
    pub const DIRECTORY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.15";
    pub const GENERALIZED_TIME: &str = "1.3.6.1.4.1.1466.115.121.1.24";
    pub const IA5_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.26";
    pub const INTEGER: &str = "1.3.6.1.4.1.1466.115.121.1.27";
    pub const JPEG: &str = "1.3.6.1.4.1.1466.115.121.1.28";
    pub const NAME_AND_OPTIONAL_UID: &str = "1.3.6.1.4.1.1466.115.121.1.34";
    pub const NUMERIC_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.36";
    pub const OID: &str = "1.3.6.1.4.1.1466.115.121.1.38";
    pub const OCTET_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.40";
    pub const POSTAL_ADDRESS: &str = "1.3.6.1.4.1.1466.115.121.1.41";
    pub const PRINTABLE_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.44";
    pub const TELEPHONE_NUMBER: &str = "1.3.6.1.4.1.1466.115.121.1.50";
    pub const TELEX_NUMBER: &str = "1.3.6.1.4.1.1466.115.121.1.52";
    pub const SUBSTRING_ASSERTION: &str = "1.3.6.1.4.1.1466.115.121.1.58";
}

/// Matching rule OIDs (RFC 4517 §4.2) this crate resolves normalizers for.
pub mod matching_rule_oid {
    pub const OBJECT_IDENTIFIER_MATCH: &str = "2.5.13.0";
    pub const DISTINGUISHED_NAME_MATCH: &str = "2.5.13.1";
    pub const CASE_IGNORE_MATCH: &str = "2.5.13.2";
    pub const CASE_IGNORE_ORDERING_MATCH: &str = "2.5.13.3";
    pub const CASE_IGNORE_SUBSTRINGS_MATCH: &str = "2.5.13.4";
    pub const CASE_EXACT_MATCH: &str = "2.5.13.5";
    pub const CASE_EXACT_ORDERING_MATCH: &str = "2.5.13.6";
    pub const CASE_EXACT_SUBSTRINGS_MATCH: &str = "2.5.13.7";
    pub const NUMERIC_STRING_MATCH: &str = "2.5.13.8";
    pub const NUMERIC_STRING_SUBSTRINGS_MATCH: &str = "2.5.13.10";
    pub const BOOLEAN_MATCH: &str = "2.5.13.13";
    pub const INTEGER_MATCH: &str = "2.5.13.14";
    pub const BIT_STRING_MATCH: &str = "2.5.13.16";
    pub const OCTET_STRING_MATCH: &str = "2.5.13.17";
    pub const TELEPHONE_NUMBER_MATCH: &str = "2.5.13.20";
    pub const GENERALIZED_TIME_MATCH: &str = "2.5.13.27";
    pub const GENERALIZED_TIME_ORDERING_MATCH: &str = "2.5.13.28";
    pub const OBJECT_IDENTIFIER_FIRST_COMPONENT_MATCH: &str = "2.5.13.30";
    pub const CASE_IGNORE_IA5_MATCH: &str = "1.3.6.1.4.1.1466.109.114.2";
    pub const CASE_EXACT_IA5_MATCH: &str = "1.3.6.1.4.1.1466.109.114.3";
}

/// A resolved, cheaply-`Copy`able normalizer: owning bytes in, canonical
/// bytes out. Attached to a frozen [`AttributeType`](crate::schema::AttributeType)
/// so values normalize with no further schema lookups.
pub type NormalizerFn = fn(&[u8]) -> Vec<u8>;

/// Whether values of `syntax_oid` are presented as UTF-8 text rather than
/// opaque octets (spec §4.4: "human-readability is a property of the
/// syntax"). Unknown OIDs default to human-readable, the more permissive
/// choice for schema-less/relaxed operation.
pub fn is_human_readable(syntax_oid: &str) -> bool {
    !matches!(
        syntax_oid,
        syntax_oid::JPEG
            | syntax_oid::CERTIFICATE
            | syntax_oid::CERTIFICATE_LIST
            | syntax_oid::CERTIFICATE_PAIR
            | syntax_oid::OCTET_STRING
            | syntax_oid::BIT_STRING
    )
}

/// Syntax checker: `isValidSyntax(value)` (spec §4.9). Values are accepted
/// as either UTF-8 text or octets; octets are decoded as UTF-8 first for
/// the text-shaped syntaxes.
pub fn is_valid(syntax_oid: &str, value: &[u8]) -> bool {
    match syntax_oid {
        syntax_oid::BOOLEAN => matches!(value, b"TRUE" | b"FALSE"),
        syntax_oid::INTEGER => std::str::from_utf8(value)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .is_some(),
        syntax_oid::NUMERIC_STRING => !value.is_empty()
            && value.iter().all(|b| b.is_ascii_digit() || *b == b' '),
        syntax_oid::PRINTABLE_STRING | syntax_oid::COUNTRY_STRING => {
            !value.is_empty() && value.iter().all(|b| is_printable_char(*b))
        }
        syntax_oid::IA5_STRING => value.is_ascii(),
        syntax_oid::DIRECTORY_STRING | syntax_oid::POSTAL_ADDRESS => match std::str::from_utf8(value) {
            Ok(s) => !s.is_empty() && !s.contains('\u{FFFD}'),
            Err(_) => false,
        },
        syntax_oid::GENERALIZED_TIME => is_valid_generalized_time(value),
        syntax_oid::OID => std::str::from_utf8(value)
            .map(is_valid_oid_descriptor)
            .unwrap_or(false),
        syntax_oid::DN => std::str::from_utf8(value)
            .map(|s| crate::name::parse_dn(s, None).is_ok())
            .unwrap_or(false),
        syntax_oid::TELEX_NUMBER => std::str::from_utf8(value)
            .map(is_valid_telex_number)
            .unwrap_or(false),
        syntax_oid::BIT_STRING => {
            value.first() == Some(&b'\'') && value.last() == Some(&b'B') && value.len() >= 2
        }
        syntax_oid::JPEG
        | syntax_oid::CERTIFICATE
        | syntax_oid::CERTIFICATE_LIST
        | syntax_oid::CERTIFICATE_PAIR
        | syntax_oid::OCTET_STRING => !value.is_empty(),
        syntax_oid::NAME_AND_OPTIONAL_UID => !value.is_empty(),
        // Unrecognized syntax: accept (relaxed-by-default for unregistered OIDs).
        _ => true,
    }
}

fn is_printable_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'?' | b' ' | b'=')
}

fn is_valid_oid_descriptor(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.chars().next().unwrap().is_ascii_digit() {
        return s.split('.').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    }
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_telex_number(s: &str) -> bool {
    let parts: Vec<&str> = s.split('$').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| is_printable_char(c as u8)))
}

fn is_valid_generalized_time(value: &[u8]) -> bool {
    let s = match std::str::from_utf8(value) {
        Ok(s) => s,
        Err(_) => return false,
    };
    // YYYYMMDDHH[MM[SS]][.f+](Z|(+|-)HHMM), RFC 4517 §3.3.13 (simplified).
    if s.len() < 11 {
        return false;
    }
    let digits_ok = s[..10].bytes().all(|b| b.is_ascii_digit());
    let tail_ok = s.ends_with('Z') || s.contains('+') || s.contains('-');
    digits_ok && tail_ok
}

/// Resolve the normalizer for an EQUALITY/ORDERING/SUBSTR matching rule by
/// OID. Falls back to identity (byte-for-byte) for unrecognized OIDs.
pub fn normalizer_for(matching_rule_oid: &str) -> NormalizerFn {
    use matching_rule_oid::*;
    match matching_rule_oid {
        CASE_IGNORE_MATCH | CASE_IGNORE_ORDERING_MATCH | CASE_IGNORE_SUBSTRINGS_MATCH | CASE_IGNORE_IA5_MATCH => {
            case_ignore_normalize
        }
        CASE_EXACT_MATCH | CASE_EXACT_ORDERING_MATCH | CASE_EXACT_SUBSTRINGS_MATCH | CASE_EXACT_IA5_MATCH => {
            case_exact_normalize
        }
        NUMERIC_STRING_MATCH | NUMERIC_STRING_SUBSTRINGS_MATCH => numeric_string_normalize,
        TELEPHONE_NUMBER_MATCH => telephone_number_normalize,
        BOOLEAN_MATCH => boolean_normalize,
        INTEGER_MATCH => integer_normalize,
        OBJECT_IDENTIFIER_MATCH | OBJECT_IDENTIFIER_FIRST_COMPONENT_MATCH => oid_normalize,
        DISTINGUISHED_NAME_MATCH => dn_normalize,
        OCTET_STRING_MATCH | BIT_STRING_MATCH => identity_normalize,
        GENERALIZED_TIME_MATCH | GENERALIZED_TIME_ORDERING_MATCH => identity_normalize,
        _ => identity_normalize,
    }
}

/// Fallback normalizer picked from an attribute's SYNTAX when it names no
/// (resolvable) EQUALITY matching rule.
pub fn default_normalizer_for_syntax(syntax_oid: &str) -> NormalizerFn {
    match syntax_oid {
        syntax_oid::DIRECTORY_STRING | syntax_oid::POSTAL_ADDRESS => case_ignore_normalize,
        syntax_oid::IA5_STRING => case_ignore_normalize,
        syntax_oid::NUMERIC_STRING => numeric_string_normalize,
        syntax_oid::TELEPHONE_NUMBER => telephone_number_normalize,
        syntax_oid::BOOLEAN => boolean_normalize,
        syntax_oid::INTEGER => integer_normalize,
        syntax_oid::OID => oid_normalize,
        syntax_oid::DN => dn_normalize,
        _ => identity_normalize,
    }
}

fn identity_normalize(value: &[u8]) -> Vec<u8> {
    value.to_vec()
}

fn case_ignore_normalize(value: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(value) {
        Ok(s) => prepare_lossy(s, StringType::DirectoryString, CaseSensitivity::Insensitive).into_owned().into_bytes(),
        Err(_) => value.to_vec(),
    }
}

fn case_exact_normalize(value: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(value) {
        Ok(s) => prepare_lossy(s, StringType::DirectoryString, CaseSensitivity::Sensitive).into_owned().into_bytes(),
        Err(_) => value.to_vec(),
    }
}

fn numeric_string_normalize(value: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(value) {
        Ok(s) => prepare_lossy(s, StringType::Numeric, CaseSensitivity::Sensitive).into_owned().into_bytes(),
        Err(_) => value.to_vec(),
    }
}

fn telephone_number_normalize(value: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(value) {
        Ok(s) => prepare_lossy(s, StringType::TelephoneNumber, CaseSensitivity::Sensitive).into_owned().into_bytes(),
        Err(_) => value.to_vec(),
    }
}

fn boolean_normalize(value: &[u8]) -> Vec<u8> {
    if value.eq_ignore_ascii_case(b"true") {
        b"TRUE".to_vec()
    } else if value.eq_ignore_ascii_case(b"false") {
        b"FALSE".to_vec()
    } else {
        value.to_vec()
    }
}

/// Strips leading zeros (keeping a lone `0` and a leading `-`), matching
/// the shortest-form canonicalization `integerMatch` requires.
fn integer_normalize(value: &[u8]) -> Vec<u8> {
    let s = match std::str::from_utf8(value) {
        Ok(s) => s,
        Err(_) => return value.to_vec(),
    };
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let trimmed = digits.trim_start_matches('0');
    let canonical = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{sign}{canonical}").into_bytes()
}

fn oid_normalize(value: &[u8]) -> Vec<u8> {
    value.to_ascii_lowercase()
}

fn dn_normalize(value: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(value) {
        Ok(s) => match crate::name::parse_dn(s, None) {
            Ok(dn) => dn.normalized().into_bytes(),
            Err(_) => value.to_vec(),
        },
        Err(_) => value.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_string_is_human_readable_jpeg_is_not() {
        assert!(is_human_readable(syntax_oid::DIRECTORY_STRING));
        assert!(!is_human_readable(syntax_oid::JPEG));
    }

    #[test]
    fn integer_syntax_accepts_only_integers() {
        assert!(is_valid(syntax_oid::INTEGER, b"42"));
        assert!(!is_valid(syntax_oid::INTEGER, b"abc"));
    }

    #[test]
    fn case_ignore_normalizer_folds_case_and_spaces() {
        let out = normalizer_for(matching_rule_oid::CASE_IGNORE_MATCH)(b" Foo  Bar ");
        assert_eq!(out, b"foo bar");
    }

    #[test]
    fn integer_normalizer_strips_leading_zeros() {
        assert_eq!(integer_normalize(b"0042"), b"42");
        assert_eq!(integer_normalize(b"-007"), b"-7");
        assert_eq!(integer_normalize(b"0"), b"0");
    }

    #[test]
    fn boolean_syntax_rejects_lowercase() {
        assert!(is_valid(syntax_oid::BOOLEAN, b"TRUE"));
        assert!(!is_valid(syntax_oid::BOOLEAN, b"true"));
    }
}
