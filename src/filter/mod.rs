//! LDAP search filter AST and RFC 4515 string form (spec component C10).
//!
//! The AST mirrors the ASN.1 CHOICE exactly, grounded on the teacher
//! crate's `filter.rs`. BER decode lives in [`decode`] (grounded on
//! `filter_parser.rs`, with a depth bound added per spec §5); the RFC
//! 4515 renderer/parser live in [`text`] (new — the teacher crate never
//! needed a textual filter form).

pub mod decode;
pub mod encode;
pub mod text;

use crate::message::LdapString;
use asn1_rs::ToStatic;
use std::borrow::Cow;

/// Filter nesting bound (spec §5, §8: "1 000 accepted, beyond an
/// implementation-chosen bound the parser returns protocolError rather
/// than overflowing the stack").
pub const MAX_FILTER_DEPTH: usize = 1024;

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub enum Filter<'a> {
    And(Vec<Filter<'a>>),
    Or(Vec<Filter<'a>>),
    Not(Box<Filter<'a>>),
    EqualityMatch(AttributeValueAssertion<'a>),
    Substrings(SubstringFilter<'a>),
    GreaterOrEqual(AttributeValueAssertion<'a>),
    LessOrEqual(AttributeValueAssertion<'a>),
    Present(LdapString<'a>),
    ApproxMatch(AttributeValueAssertion<'a>),
    ExtensibleMatch(MatchingRuleAssertion<'a>),
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct PartialAttribute<'a> {
    pub attr_type: LdapString<'a>,
    pub attr_vals: Vec<AttributeValue<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct Attribute<'a> {
    pub attr_type: LdapString<'a>,
    pub attr_vals: Vec<AttributeValue<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct AttributeValueAssertion<'a> {
    pub attribute_desc: LdapString<'a>,
    pub assertion_value: Cow<'a, [u8]>,
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct AttributeDescription<'a>(pub Cow<'a, str>);

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct MatchingRuleAssertion<'a> {
    pub matching_rule: Option<LdapString<'a>>,
    pub rule_type: Option<AttributeDescription<'a>>,
    pub assertion_value: AssertionValue<'a>,
    pub dn_attributes: Option<bool>,
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct MatchingRuleId<'a>(pub Cow<'a, str>);

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct SubstringFilter<'a> {
    pub filter_type: LdapString<'a>,
    pub substrings: Vec<Substring<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub enum Substring<'a> {
    Initial(AssertionValue<'a>),
    Any(AssertionValue<'a>),
    Final(AssertionValue<'a>),
}

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct AssertionValue<'a>(pub Cow<'a, [u8]>);

#[derive(Clone, Debug, Eq, PartialEq, ToStatic)]
pub struct AttributeValue<'a>(pub Cow<'a, [u8]>);

pub use text::{parse_filter, render_filter};
