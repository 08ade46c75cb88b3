//! BER decode of the `Filter` CHOICE, grounded on the teacher crate's
//! `filter_parser.rs`. Recursion through `And`/`Or`/`Not` is bounded by
//! an explicit depth counter (spec §5, §8 filter-nesting boundary test)
//! instead of relying on the call stack alone.

use super::*;
use crate::error::{LdapError, Result};
use crate::message::LdapString;
use asn1_rs::nom;
use asn1_rs::OptTaggedImplicit;
use asn1_rs::{Any, Class, FromBer, ParseResult, Sequence, Set, Tag, TaggedParser};
use nom::combinator::{complete, map};
use nom::multi::{many0, many1};
use nom::Err;
use std::borrow::Cow;

#[inline]
fn parse_ldap_attribute_description(i: &[u8]) -> Result<'_, LdapString<'_>> {
    LdapString::from_ber(i)
}

#[inline]
fn parse_ldap_octet_string_as_slice(i: &[u8]) -> Result<'_, &[u8]> {
    <&[u8]>::from_ber(i).map_err(Err::convert)
}

fn parse_ldap_attribute_value_assertion_content(
    content: &[u8],
) -> Result<'_, AttributeValueAssertion<'_>> {
    let (content, attribute_desc) = parse_ldap_attribute_description(content)?;
    let (content, assertion_value) = parse_ldap_assertion_value(content)?;
    Ok((
        content,
        AttributeValueAssertion {
            attribute_desc,
            assertion_value: assertion_value.into(),
        },
    ))
}

impl<'a> FromBer<'a, LdapError> for AttributeValueAssertion<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, parse_ldap_attribute_value_assertion_content)
    }
}

#[inline]
fn parse_ldap_assertion_value(i: &[u8]) -> Result<'_, &[u8]> {
    parse_ldap_octet_string_as_slice(i)
}

#[inline]
fn parse_ldap_attribute_value(i: &[u8]) -> Result<'_, AttributeValue<'_>> {
    map(parse_ldap_octet_string_as_slice, |v| {
        AttributeValue(Cow::Borrowed(v))
    })(i)
}

impl<'a> FromBer<'a, LdapError> for PartialAttribute<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, attr_type) = LdapString::from_ber(i)?;
            let (i, attr_vals) = Set::from_ber_and_then(i, |inner| {
                many0(complete(parse_ldap_attribute_value))(inner)
            })?;
            Ok((
                i,
                PartialAttribute {
                    attr_type,
                    attr_vals,
                },
            ))
        })
    }
}

impl<'a> FromBer<'a, LdapError> for Attribute<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, attr_type) = LdapString::from_ber(i)?;
            let (i, attr_vals) = Set::from_ber_and_then(i, |inner| {
                many1(complete(parse_ldap_attribute_value))(inner)
            })?;
            Ok((
                i,
                Attribute {
                    attr_type,
                    attr_vals,
                },
            ))
        })
    }
}

impl<'a> FromBer<'a, LdapError> for Filter<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        parse_filter_bounded(bytes, 0)
    }
}

fn parse_filter_bounded(bytes: &[u8], depth: usize) -> ParseResult<'_, Filter<'_>, LdapError> {
    if depth >= MAX_FILTER_DEPTH {
        return Err(Err::Error(LdapError::NestingTooDeep));
    }
    let (rem, any) = Any::from_ber(bytes).map_err(Err::convert)?;
    any.class()
        .assert_eq(Class::ContextSpecific)
        .map_err(|e| Err::Error(e.into()))?;
    let content = any.data;
    let (_, filter) = match any.tag().0 {
        0 => {
            let (rem, sub_filters) =
                many1(complete(|i| parse_filter_bounded(i, depth + 1)))(content)?;
            Ok((rem, Filter::And(sub_filters)))
        }
        1 => {
            let (rem, sub_filters) =
                many1(complete(|i| parse_filter_bounded(i, depth + 1)))(content)?;
            Ok((rem, Filter::Or(sub_filters)))
        }
        2 => map(
            |i| parse_filter_bounded(i, depth + 1),
            |f| Filter::Not(Box::new(f)),
        )(content),
        3 => map(
            parse_ldap_attribute_value_assertion_content,
            Filter::EqualityMatch,
        )(content),
        4 => map(parse_ldap_substrings_filter_content, Filter::Substrings)(content),
        5 => map(
            parse_ldap_attribute_value_assertion_content,
            Filter::GreaterOrEqual,
        )(content),
        6 => map(
            parse_ldap_attribute_value_assertion_content,
            Filter::LessOrEqual,
        )(content),
        7 => {
            let s = std::str::from_utf8(content).or(Err(Err::Error(LdapError::InvalidString)))?;
            Ok((&b""[..], Filter::Present(LdapString(Cow::Borrowed(s)))))
        }
        8 => map(
            parse_ldap_attribute_value_assertion_content,
            Filter::ApproxMatch,
        )(content),
        9 => map(
            parse_ldap_matching_rule_assertion_content,
            Filter::ExtensibleMatch,
        )(content),
        _ => Err(Err::Error(LdapError::InvalidFilterType)),
    }?;
    Ok((rem, filter))
}

fn parse_ldap_substrings_filter_content(i: &[u8]) -> Result<'_, SubstringFilter<'_>> {
    let (i, filter_type) = parse_ldap_attribute_description(i)?;
    let (i, substrings) =
        Sequence::from_ber_and_then(i, |inner| many1(complete(parse_ldap_substring))(inner))?;
    if substrings.is_empty() {
        return Err(Err::Error(LdapError::InvalidSubstring));
    }
    Ok((
        i,
        SubstringFilter {
            filter_type,
            substrings,
        },
    ))
}

fn parse_ldap_substring(bytes: &[u8]) -> Result<'_, Substring<'_>> {
    let (rem, any) = Any::from_ber(bytes).map_err(Err::convert)?;
    let b = AssertionValue(Cow::Borrowed(any.data));
    match any.tag().0 {
        0 => Ok((rem, Substring::Initial(b))),
        1 => Ok((rem, Substring::Any(b))),
        2 => Ok((rem, Substring::Final(b))),
        _ => Err(Err::Error(LdapError::InvalidSubstring)),
    }
}

fn parse_ldap_matching_rule_assertion_content(i: &[u8]) -> Result<'_, MatchingRuleAssertion<'_>> {
    let (i, matching_rule) = asn1_rs::OptTaggedParser::new(Class::ContextSpecific, Tag(1))
        .parse_ber(i, |_, content| {
            let s = std::str::from_utf8(content).or(Err(Err::Error(LdapError::InvalidString)))?;
            Ok((&b""[..], LdapString(Cow::Borrowed(s))))
        })?;
    let (i, rule_type) = asn1_rs::OptTaggedParser::new(Class::ContextSpecific, Tag(2))
        .parse_ber(i, |_, content| {
            let s = std::str::from_utf8(content).or(Err(Err::Error(LdapError::InvalidString)))?;
            Ok((&b""[..], AttributeDescription(Cow::Borrowed(s))))
        })?;
    if matching_rule.is_none() && rule_type.is_none() {
        return Err(Err::Error(LdapError::InvalidFilterType));
    }
    let (i, assertion_value) =
        TaggedParser::from_ber_and_then(Class::ContextSpecific, 3, i, |content| {
            Ok((&b""[..], AssertionValue(Cow::Borrowed(content))))
        })?;
    let (i, dn_attributes) =
        OptTaggedImplicit::<bool, asn1_rs::Error, 4>::from_ber(i).map_err(Err::convert)?;
    let dn_attributes = dn_attributes.map(|t| t.into_inner());
    Ok((
        i,
        MatchingRuleAssertion {
            matching_rule,
            rule_type,
            assertion_value,
            dn_attributes,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nesting_past_bound() {
        // A single NOT filter nested MAX_FILTER_DEPTH+1 levels deep, built
        // by hand, would overflow a recursive parser's call stack without
        // the explicit depth counter; here we just check the constant is
        // enforced on a synthetic deep chain via direct recursion counting.
        let err = parse_filter_bounded(&[0xa2, 0x02, 0xa2, 0x00], MAX_FILTER_DEPTH);
        assert!(matches!(err, Err(Err::Error(LdapError::NestingTooDeep))));
    }
}
