//! Reverse (tail-growing) BER encode of the LDAPv3 grammar via
//! [`Asn1Buffer`] (spec §4.1, §4.2 "encode in reverse"). The teacher
//! crate never encoded; this mirrors the tag layout `decode.rs` reads.

use super::*;
use crate::asn1::{Asn1Buffer, Class};
use crate::filter::encode::{encode_attribute, encode_filter, encode_partial_attribute};

/// Encode a full `LDAPMessage`, including any attached controls.
pub fn encode(msg: &LdapMessage<'_>) -> Vec<u8> {
    let mut buf = Asn1Buffer::new();
    buf.write_sequence(|buf| {
        buf.write_u32(msg.message_id.0);
        encode_protocol_op(buf, &msg.protocol_op);
        if let Some(controls) = &msg.controls {
            buf.write_tagged_implicit(Class::ContextSpecific, true, 0, |buf| {
                for c in controls {
                    encode_control(buf, c);
                }
            });
        }
    });
    buf.into_bytes()
}

fn encode_control(buf: &mut Asn1Buffer, c: &Control<'_>) {
    buf.write_sequence(|buf| {
        buf.write_octet_string(c.control_type.0.as_bytes());
        if c.criticality {
            buf.write_boolean(true);
        }
        if let Some(v) = &c.control_value {
            buf.write_octet_string(v);
        }
    });
}

fn encode_result(buf: &mut Asn1Buffer, result: &LdapResult<'_>) {
    buf.write_enumerated(result.result_code.0);
    buf.write_octet_string(result.matched_dn.0.as_bytes());
    buf.write_octet_string(result.diagnostic_message.0.as_bytes());
}

fn encode_protocol_op(buf: &mut Asn1Buffer, op: &ProtocolOp<'_>) {
    match op {
        ProtocolOp::BindRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 0, |buf| {
                buf.write_integer(req.version as i64);
                buf.write_octet_string(req.name.0.as_bytes());
                encode_authentication(buf, &req.authentication);
            });
        }
        ProtocolOp::BindResponse(resp) => {
            buf.write_tagged_implicit(Class::Application, true, 1, |buf| {
                encode_result(buf, &resp.result);
                if let Some(creds) = &resp.server_sasl_creds {
                    buf.write_tlv(Class::ContextSpecific, false, 7, creds);
                }
            });
        }
        ProtocolOp::UnbindRequest => {
            buf.write_tlv(Class::Application, false, 2, &[]);
        }
        ProtocolOp::SearchRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 3, |buf| {
                buf.write_octet_string(req.base_object.0.as_bytes());
                buf.write_enumerated(req.scope.0);
                buf.write_enumerated(req.deref_aliases.0);
                buf.write_u32(req.size_limit);
                buf.write_u32(req.time_limit);
                buf.write_boolean(req.types_only);
                encode_filter(buf, &req.filter);
                buf.write_sequence(|buf| {
                    for a in &req.attributes {
                        buf.write_octet_string(a.0.as_bytes());
                    }
                });
            });
        }
        ProtocolOp::SearchResultEntry(res) => {
            buf.write_tagged_implicit(Class::Application, true, 4, |buf| {
                buf.write_octet_string(res.object_name.0.as_bytes());
                buf.write_sequence(|buf| {
                    for a in &res.attributes {
                        encode_partial_attribute(buf, a);
                    }
                });
            });
        }
        ProtocolOp::SearchResultDone(result) => {
            buf.write_tagged_implicit(Class::Application, true, 5, |buf| {
                encode_result(buf, result);
            });
        }
        ProtocolOp::SearchResultReference(uris) => {
            buf.write_tagged_implicit(Class::Application, true, 19, |buf| {
                for u in uris {
                    buf.write_octet_string(u.0.as_bytes());
                }
            });
        }
        ProtocolOp::ModifyRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 6, |buf| {
                buf.write_octet_string(req.object.0.as_bytes());
                buf.write_sequence(|buf| {
                    for change in &req.changes {
                        buf.write_sequence(|buf| {
                            buf.write_enumerated(change.operation.0);
                            encode_partial_attribute(buf, &change.modification);
                        });
                    }
                });
            });
        }
        ProtocolOp::ModifyResponse(resp) => {
            buf.write_tagged_implicit(Class::Application, true, 7, |buf| {
                encode_result(buf, &resp.result);
            });
        }
        ProtocolOp::AddRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 8, |buf| {
                buf.write_octet_string(req.entry.0.as_bytes());
                buf.write_sequence(|buf| {
                    for a in &req.attributes {
                        encode_attribute(buf, a);
                    }
                });
            });
        }
        ProtocolOp::AddResponse(result) => {
            buf.write_tagged_implicit(Class::Application, true, 9, |buf| {
                encode_result(buf, result);
            });
        }
        ProtocolOp::DelRequest(dn) => {
            buf.write_tlv(Class::Application, false, 10, dn.0.as_bytes());
        }
        ProtocolOp::DelResponse(result) => {
            buf.write_tagged_implicit(Class::Application, true, 11, |buf| {
                encode_result(buf, result);
            });
        }
        ProtocolOp::ModDnRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 12, |buf| {
                buf.write_octet_string(req.entry.0.as_bytes());
                buf.write_octet_string(req.newrdn.0.as_bytes());
                buf.write_boolean(req.deleteoldrdn);
                if let Some(sup) = &req.newsuperior {
                    buf.write_tlv(Class::ContextSpecific, false, 0, sup.0.as_bytes());
                }
            });
        }
        ProtocolOp::ModDnResponse(result) => {
            buf.write_tagged_implicit(Class::Application, true, 13, |buf| {
                encode_result(buf, result);
            });
        }
        ProtocolOp::CompareRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 14, |buf| {
                buf.write_octet_string(req.entry.0.as_bytes());
                buf.write_sequence(|buf| {
                    buf.write_octet_string(req.ava.attribute_desc.0.as_bytes());
                    buf.write_octet_string(&req.ava.assertion_value);
                });
            });
        }
        ProtocolOp::CompareResponse(result) => {
            buf.write_tagged_implicit(Class::Application, true, 15, |buf| {
                encode_result(buf, result);
            });
        }
        ProtocolOp::AbandonRequest(id) => encode_abandon(buf, id),
        ProtocolOp::ExtendedRequest(req) => {
            buf.write_tagged_implicit(Class::Application, true, 23, |buf| {
                buf.write_tlv(Class::ContextSpecific, false, 0, req.request_name.0.as_bytes());
                if let Some(v) = &req.request_value {
                    buf.write_tlv(Class::ContextSpecific, false, 1, v);
                }
            });
        }
        ProtocolOp::ExtendedResponse(resp) => {
            buf.write_tagged_implicit(Class::Application, true, 24, |buf| {
                encode_result(buf, &resp.result);
                if let Some(name) = &resp.response_name {
                    buf.write_tlv(Class::ContextSpecific, false, 10, name.0.as_bytes());
                }
                if let Some(v) = &resp.response_value {
                    buf.write_tlv(Class::ContextSpecific, false, 11, v);
                }
            });
        }
        ProtocolOp::IntermediateResponse(resp) => {
            buf.write_tagged_implicit(Class::Application, true, 25, |buf| {
                if let Some(name) = &resp.response_name {
                    buf.write_tlv(Class::ContextSpecific, false, 0, name.0.as_bytes());
                }
                if let Some(v) = &resp.response_value {
                    buf.write_tlv(Class::ContextSpecific, false, 1, v);
                }
            });
        }
    }
}

fn encode_authentication(buf: &mut Asn1Buffer, auth: &AuthenticationChoice<'_>) {
    match auth {
        AuthenticationChoice::Simple(creds) => {
            buf.write_tlv(Class::ContextSpecific, false, 0, creds);
        }
        AuthenticationChoice::Sasl(sasl) => {
            buf.write_tagged_implicit(Class::ContextSpecific, true, 3, |buf| {
                buf.write_octet_string(sasl.mechanism.0.as_bytes());
                if let Some(creds) = &sasl.credentials {
                    buf.write_octet_string(creds);
                }
            });
        }
    }
}

fn encode_abandon(buf: &mut Asn1Buffer, id: &MessageID) {
    buf.write_tlv(Class::Application, false, 16, &crate::asn1::integer_content(id.0 as i64));
}
