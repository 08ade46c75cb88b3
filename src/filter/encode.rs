//! BER encode of the `Filter` CHOICE via [`crate::asn1::Asn1Buffer`].
//!
//! New relative to the teacher crate (decode-only); mirrors the tag
//! layout `decode.rs` reads, context-specific tags 0-9 as documented in
//! RFC 4511 §4.5.1.

use super::*;
use crate::asn1::{Asn1Buffer, Class};

pub fn encode_filter(buf: &mut Asn1Buffer, filter: &Filter<'_>) {
    match filter {
        Filter::And(subs) => buf.write_tagged_implicit(Class::ContextSpecific, true, 0, |buf| {
            for s in subs {
                encode_filter(buf, s);
            }
        }),
        Filter::Or(subs) => buf.write_tagged_implicit(Class::ContextSpecific, true, 1, |buf| {
            for s in subs {
                encode_filter(buf, s);
            }
        }),
        Filter::Not(sub) => buf.write_tagged_implicit(Class::ContextSpecific, true, 2, |buf| {
            encode_filter(buf, sub);
        }),
        Filter::EqualityMatch(ava) => encode_ava(buf, 3, ava),
        Filter::Substrings(sf) => encode_substrings(buf, sf),
        Filter::GreaterOrEqual(ava) => encode_ava(buf, 5, ava),
        Filter::LessOrEqual(ava) => encode_ava(buf, 6, ava),
        Filter::Present(attr) => {
            buf.write_tlv(Class::ContextSpecific, false, 7, attr.0.as_bytes());
        }
        Filter::ApproxMatch(ava) => encode_ava(buf, 8, ava),
        Filter::ExtensibleMatch(mra) => encode_extensible(buf, mra),
    }
}

fn encode_ava(buf: &mut Asn1Buffer, tag: u32, ava: &AttributeValueAssertion<'_>) {
    buf.write_tagged_implicit(Class::ContextSpecific, true, tag, |buf| {
        buf.write_octet_string(ava.attribute_desc.0.as_bytes());
        buf.write_octet_string(&ava.assertion_value);
    });
}

fn encode_substrings(buf: &mut Asn1Buffer, sf: &SubstringFilter<'_>) {
    buf.write_tagged_implicit(Class::ContextSpecific, true, 4, |buf| {
        buf.write_octet_string(sf.filter_type.0.as_bytes());
        buf.write_sequence(|buf| {
            for s in &sf.substrings {
                match s {
                    Substring::Initial(v) => buf.write_tlv(Class::ContextSpecific, false, 0, &v.0),
                    Substring::Any(v) => buf.write_tlv(Class::ContextSpecific, false, 1, &v.0),
                    Substring::Final(v) => buf.write_tlv(Class::ContextSpecific, false, 2, &v.0),
                }
            }
        });
    });
}

fn encode_extensible(buf: &mut Asn1Buffer, mra: &MatchingRuleAssertion<'_>) {
    buf.write_tagged_implicit(Class::ContextSpecific, true, 9, |buf| {
        if let Some(rule) = &mra.matching_rule {
            buf.write_tlv(Class::ContextSpecific, false, 1, rule.0.as_bytes());
        }
        if let Some(t) = &mra.rule_type {
            buf.write_tlv(Class::ContextSpecific, false, 2, t.0.as_bytes());
        }
        buf.write_tlv(Class::ContextSpecific, false, 3, &mra.assertion_value.0);
        if mra.dn_attributes == Some(true) {
            buf.write_tlv(Class::ContextSpecific, false, 4, &[0xff]);
        }
    });
}

pub fn encode_partial_attribute(buf: &mut Asn1Buffer, attr: &PartialAttribute<'_>) {
    buf.write_sequence(|buf| {
        buf.write_octet_string(attr.attr_type.0.as_bytes());
        buf.write_set(|buf| {
            for v in &attr.attr_vals {
                buf.write_octet_string(&v.0);
            }
        });
    });
}

pub fn encode_attribute(buf: &mut Asn1Buffer, attr: &Attribute<'_>) {
    buf.write_sequence(|buf| {
        buf.write_octet_string(attr.attr_type.0.as_bytes());
        buf.write_set(|buf| {
            for v in &attr.attr_vals {
                buf.write_octet_string(&v.0);
            }
        });
    });
}
