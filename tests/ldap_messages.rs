use hex_literal::hex;
use std::borrow::Cow;

use ldap_api::controls::{decode as decode_control, encode as encode_control, sort::SortRequestControl, KnownControl};
use ldap_api::filter::{AttributeValue, Filter, PartialAttribute};
use ldap_api::message::{
    decode_message, decode_with_schema, Change, Control, LdapDN, LdapMessage, LdapOID, LdapString,
    MessageID, ModifyRequest, Operation, ProtocolOp, ResultCode,
};
use ldap_api::schema::SchemaManager;
use ldap_api::{encode, parse_dn, parse_filter, render_filter};

/// Scenario 1: AddResponse success.
#[test]
fn add_response_success_round_trips() {
    const DATA: &[u8] = &hex!("30 0C 02 01 01 69 07 0A 01 00 04 00 04 00");
    let (rem, msg) = decode_message(DATA).expect("decode");
    assert!(rem.is_empty());
    assert_eq!(msg.message_id.0, 1);
    match &msg.protocol_op {
        ProtocolOp::AddResponse(result) => {
            assert_eq!(result.result_code, ResultCode::Success);
            assert_eq!(result.matched_dn.0.as_ref(), "");
            assert_eq!(result.diagnostic_message.0.as_ref(), "");
        }
        other => panic!("expected AddResponse, got {other:?}"),
    }
    assert_eq!(encode(&msg), DATA);
}

/// Scenario 2: SortRequest control value — one SortKey{attributeTypeDesc
/// ="cn", matchingRuleId="oid", reverseOrder=false}.
#[test]
fn sort_request_control_value_round_trips() {
    const DATA: &[u8] = &hex!("30 0E 30 0C 04 02 63 6e 04 03 6f 69 64 01 01 00");
    let control = SortRequestControl::decode(DATA).expect("decode sort request control");
    assert_eq!(control.sort_keys.len(), 1);
    assert_eq!(control.sort_keys[0].attribute_type, "cn");
    assert_eq!(control.sort_keys[0].matching_rule_id.as_deref(), Some("oid"));
    assert!(!control.sort_keys[0].reverse_order);
    assert_eq!(control.encode(), DATA);
}

/// Scenario 3: ModifyRequest with an RFC 4525 increment modification.
#[test]
fn modify_request_increment_round_trips() {
    let msg = LdapMessage {
        message_id: MessageID(2),
        protocol_op: ProtocolOp::ModifyRequest(ModifyRequest {
            object: LdapDN(Cow::Borrowed("uid=jdoe,dc=example,dc=com")),
            changes: vec![Change {
                operation: Operation::Increment,
                modification: PartialAttribute {
                    attr_type: LdapString(Cow::Borrowed("uidnumber")),
                    attr_vals: vec![AttributeValue(Cow::Borrowed(b"1".as_slice()))],
                },
            }],
        }),
        controls: None,
    };
    let encoded = encode(&msg);
    let (rem, decoded) = decode_message(&encoded).expect("decode");
    assert!(rem.is_empty());
    assert_eq!(decoded, msg);
    match &decoded.protocol_op {
        ProtocolOp::ModifyRequest(req) => {
            assert_eq!(req.changes.len(), 1);
            assert_eq!(req.changes[0].operation, Operation::Increment);
            assert_eq!(req.changes[0].modification.attr_type.0.as_ref(), "uidnumber");
            assert_eq!(req.changes[0].modification.attr_vals.len(), 1);
        }
        other => panic!("expected ModifyRequest, got {other:?}"),
    }

    // uidNumber isn't a registered attribute type in the default schema,
    // so the increment is admitted without a syntax check (Design Notes
    // §9, "increment without schema").
    let schema = SchemaManager::new();
    decode_with_schema(&encoded, Some(&schema)).expect("schema-aware decode");
}

/// Scenario 4: ModifyRequest whose DN uses `:` instead of `=` decodes to a
/// response-carrying invalidDnSyntax fault.
#[test]
fn modify_request_bad_dn_yields_response_carrying_error() {
    let msg = LdapMessage {
        message_id: MessageID(3),
        protocol_op: ProtocolOp::ModifyRequest(ModifyRequest {
            object: LdapDN(Cow::Borrowed("uid:jdoe,dc=example,dc=com")),
            changes: vec![Change {
                operation: Operation::Replace,
                modification: PartialAttribute {
                    attr_type: LdapString(Cow::Borrowed("cn")),
                    attr_vals: vec![AttributeValue(Cow::Borrowed(b"X".as_slice()))],
                },
            }],
        }),
        controls: None,
    };
    let encoded = encode(&msg);
    let err = decode_with_schema(&encoded, None).expect_err("malformed DN must be rejected");
    match err {
        nom::Err::Error(ldap_api::LdapError::ResponseCarrying(boxed)) => {
            assert_eq!(boxed.result.result_code, ResultCode::InvalidDNSyntax);
        }
        other => panic!("expected a response-carrying invalidDNSyntax error, got {other:?}"),
    }
}

/// Scenario 5: filter parse and render.
#[test]
fn filter_parses_and_renders() {
    let text = "(&(cn=Foo)(!(objectClass=person)))";
    let filter = parse_filter(text).expect("parse");
    match &filter {
        Filter::And(children) => {
            assert_eq!(children.len(), 2);
            match &children[0] {
                Filter::EqualityMatch(ava) => {
                    assert_eq!(ava.attribute_desc.0.as_ref(), "cn");
                    assert_eq!(&ava.assertion_value[..], b"Foo");
                }
                other => panic!("expected EqualityMatch, got {other:?}"),
            }
            match &children[1] {
                Filter::Not(inner) => match inner.as_ref() {
                    Filter::EqualityMatch(ava) => {
                        assert_eq!(ava.attribute_desc.0.as_ref(), "objectClass");
                        assert_eq!(&ava.assertion_value[..], b"person");
                    }
                    other => panic!("expected EqualityMatch, got {other:?}"),
                },
                other => panic!("expected Not, got {other:?}"),
            }
        }
        other => panic!("expected And, got {other:?}"),
    }
    let rendered = render_filter(&filter);
    assert_eq!(rendered.to_ascii_lowercase(), text.to_ascii_lowercase());
}

/// Scenario 6: DN normalization collapses RDN order/case and attribute
/// descriptor spelling.
#[test]
fn dn_normalize_collapses_order_case_and_descriptor_spelling() {
    let schema = SchemaManager::new();
    let a = parse_dn("CN=A+SN=B,DC=Example,DC=COM", Some(&schema)).unwrap();
    let b = parse_dn("sn=b+cn=a,dc=example,dc=com", Some(&schema)).unwrap();
    assert_eq!(a.normalized(), b.normalized());
    assert_eq!(a, b);
}

/// Boundary: an empty DN is a valid root DN with zero RDNs.
#[test]
fn empty_dn_is_root_with_empty_normalized_form() {
    let dn = parse_dn("", None).expect("empty DN parses");
    assert!(dn.is_root());
    assert_eq!(dn.depth(), 0);
    assert_eq!(dn.normalized(), "");
}

/// Boundary: a ModifyRequest with many modifications, each carrying many
/// values, round-trips without overflowing the stack.
#[test]
fn modify_request_with_many_modifications_and_values_round_trips() {
    const MODIFICATIONS: usize = 2_000;
    const VALUES_PER_MODIFICATION: usize = 50;
    let changes = (0..MODIFICATIONS)
        .map(|i| Change {
            operation: Operation::Replace,
            modification: PartialAttribute {
                attr_type: LdapString(Cow::Owned(format!("attr{i}"))),
                attr_vals: (0..VALUES_PER_MODIFICATION)
                    .map(|v| AttributeValue(Cow::Owned(format!("v{v}").into_bytes())))
                    .collect(),
            },
        })
        .collect::<Vec<_>>();
    let msg = LdapMessage {
        message_id: MessageID(4),
        protocol_op: ProtocolOp::ModifyRequest(ModifyRequest {
            object: LdapDN(Cow::Borrowed("dc=example,dc=com")),
            changes,
        }),
        controls: None,
    };
    let encoded = encode(&msg);
    let (rem, decoded) = decode_message(&encoded).expect("decode");
    assert!(rem.is_empty());
    match &decoded.protocol_op {
        ProtocolOp::ModifyRequest(req) => assert_eq!(req.changes.len(), MODIFICATIONS),
        other => panic!("expected ModifyRequest, got {other:?}"),
    }
}

/// Boundary: filter nesting depth up to the implementation bound is
/// accepted; beyond it decode fails instead of overflowing the stack.
#[test]
fn filter_nesting_depth_boundary() {
    let accepted_depth = ldap_api::filter::MAX_FILTER_DEPTH - 1;
    let mut text = "(cn=x)".to_string();
    for _ in 0..accepted_depth {
        text = format!("(&{text})");
    }
    assert!(parse_filter(&text).is_ok());

    let mut too_deep = "(cn=x)".to_string();
    for _ in 0..(ldap_api::filter::MAX_FILTER_DEPTH + 8) {
        too_deep = format!("(&{too_deep})");
    }
    assert!(parse_filter(&too_deep).is_err());
}

/// Control opaque round-trip: an unrecognized control's bytes survive a
/// decode/encode cycle unchanged.
#[test]
fn unknown_control_round_trips_opaquely() {
    let wire_control = Control {
        control_type: LdapOID(Cow::Borrowed("1.2.3.4.5")),
        criticality: false,
        control_value: Some(Cow::Borrowed(&[0x01, 0x02, 0x03][..])),
    };
    let decoded = decode_control(&wire_control).expect("decode opaque control");
    assert_eq!(
        decoded,
        KnownControl::Opaque {
            oid: "1.2.3.4.5".to_string(),
            value: Some(vec![0x01, 0x02, 0x03]),
        }
    );
    let re_encoded = encode_control(&decoded, false);
    assert_eq!(re_encoded, wire_control);
}

#[test]
fn malformed_message_is_rejected() {
    const DATA: &[u8] = &hex!("30 02 02 01");
    assert!(decode_message(DATA).is_err());
}
