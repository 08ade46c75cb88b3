//! Virtual List View controls (RFC 2891 draft / `draft-ietf-ldapext-ldapv3-vlv`).
//!
//! `VirtualListViewRequestValue ::= SEQUENCE { beforeCount INTEGER,
//! afterCount INTEGER, target CHOICE { byOffset [0] SEQUENCE { offset
//! INTEGER, contentCount INTEGER }, greaterThanOrEqual [1] AssertionValue
//! }, contextID OCTET STRING OPTIONAL }`. The `target` CHOICE is read via
//! [`crate::asn1::tlv::read`] (its two arms have genuinely different
//! shapes, one constructed and one primitive) the same way
//! [`super::password_policy`] reads its warning `CHOICE`.

use super::finish;
use crate::asn1::{tlv, Asn1Buffer, Class};
use crate::error::LdapError;
use asn1_rs::FromBer;
use asn1_rs::{Enumerated, Sequence};
use nom::combinator::{complete, opt};
use nom::Err;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlvTarget {
    ByOffset { offset: i64, content_count: i64 },
    /// The raw `AssertionValue` bytes of a `greaterThanOrEqual` target
    /// (the value to search from; not necessarily numeric).
    GreaterThanOrEqual(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualListViewRequestControl {
    pub before_count: i64,
    pub after_count: i64,
    pub target: VlvTarget,
    pub context_id: Option<Vec<u8>>,
}

impl VirtualListViewRequestControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        fn read_i64(i: &[u8]) -> std::result::Result<(&[u8], i64), Err<LdapError>> {
            i64::from_ber(i).map_err(Err::convert)
        }
        fn read_octet_string(i: &[u8]) -> std::result::Result<(&[u8], &[u8]), Err<LdapError>> {
            <&[u8]>::from_ber(i).map_err(Err::convert)
        }

        let err = |msg: &str| LdapError::InvalidControl(format!("virtualListViewRequestControl: {msg}"));
        let (rest, outer) = tlv::read(value).map_err(|_| err("malformed SEQUENCE"))?;
        if !rest.is_empty() {
            return Err(err("trailing bytes"));
        }
        let (i, before_count) = read_i64(outer.content).map_err(|_| err("beforeCount"))?;
        let (i, after_count) = read_i64(i).map_err(|_| err("afterCount"))?;
        let (i, target_tlv) = tlv::read(i).map_err(|_| err("target"))?;
        let target = match target_tlv.tag {
            0 => {
                let (i2, offset) = read_i64(target_tlv.content).map_err(|_| err("byOffset.offset"))?;
                let (i2, content_count) = read_i64(i2).map_err(|_| err("byOffset.contentCount"))?;
                if !i2.is_empty() {
                    return Err(err("byOffset trailing bytes"));
                }
                VlvTarget::ByOffset { offset, content_count }
            }
            1 => VlvTarget::GreaterThanOrEqual(target_tlv.content.to_vec()),
            _ => return Err(err("unknown target choice tag")),
        };
        let (i, context_id) = opt(complete(read_octet_string))(i).map_err(|_| err("contextID"))?;
        if !i.is_empty() {
            return Err(err("trailing bytes"));
        }
        Ok(VirtualListViewRequestControl {
            before_count,
            after_count,
            target,
            context_id: context_id.map(<[u8]>::to_vec),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_integer(self.before_count);
            buf.write_integer(self.after_count);
            match &self.target {
                VlvTarget::ByOffset { offset, content_count } => {
                    buf.write_tagged_implicit(Class::ContextSpecific, true, 0, |buf| {
                        buf.write_integer(*offset);
                        buf.write_integer(*content_count);
                    });
                }
                VlvTarget::GreaterThanOrEqual(v) => {
                    buf.write_tlv(Class::ContextSpecific, false, 1, v);
                }
            }
            if let Some(ctx) = &self.context_id {
                buf.write_octet_string(ctx);
            }
        });
        buf.into_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VlvResult {
    Success = 0,
    OperationsError = 1,
    TimeLimitExceeded = 3,
    AdminLimitExceeded = 11,
    InappropriateMatching = 18,
    InsufficientAccessRights = 50,
    Busy = 51,
    Unwilling = 53,
    SortControlMissing = 60,
    OffsetRangeError = 61,
    Other = 80,
}

impl VlvResult {
    fn from_u32(v: u32) -> Self {
        match v {
            0 => Self::Success,
            1 => Self::OperationsError,
            3 => Self::TimeLimitExceeded,
            11 => Self::AdminLimitExceeded,
            18 => Self::InappropriateMatching,
            50 => Self::InsufficientAccessRights,
            51 => Self::Busy,
            53 => Self::Unwilling,
            60 => Self::SortControlMissing,
            61 => Self::OffsetRangeError,
            _ => Self::Other,
        }
    }
}

/// `VirtualListViewResponseValue ::= SEQUENCE { targetPosition INTEGER,
/// contentCount INTEGER, virtualListViewResult ENUMERATED, contextID
/// OCTET STRING OPTIONAL }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualListViewResponseControl {
    pub target_position: i64,
    pub content_count: i64,
    pub result: VlvResult,
    pub context_id: Option<Vec<u8>>,
}

impl VirtualListViewResponseControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], VirtualListViewResponseControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, target_position) = i64::from_ber(i).map_err(Err::convert)?;
                let (i, content_count) = i64::from_ber(i).map_err(Err::convert)?;
                let (i, result) = Enumerated::from_ber(i).map_err(Err::convert)?;
                let (i, context_id) = opt(complete(<&[u8]>::from_ber))(i).map_err(Err::convert)?;
                Ok((
                    i,
                    VirtualListViewResponseControl {
                        target_position,
                        content_count,
                        result: VlvResult::from_u32(result.0),
                        context_id: context_id.map(<[u8]>::to_vec),
                    },
                ))
            });
        finish(parsed, "virtualListViewResponseControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_integer(self.target_position);
            buf.write_integer(self.content_count);
            buf.write_enumerated(self.result as u32);
            if let Some(ctx) = &self.context_id {
                buf.write_octet_string(ctx);
            }
        });
        buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_by_offset_target() {
        let control = VirtualListViewRequestControl {
            before_count: 2,
            after_count: 3,
            target: VlvTarget::ByOffset {
                offset: 10,
                content_count: 100,
            },
            context_id: Some(vec![1, 2]),
        };
        let encoded = control.encode();
        assert_eq!(VirtualListViewRequestControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn round_trips_greater_than_or_equal_target_no_context() {
        let control = VirtualListViewRequestControl {
            before_count: 0,
            after_count: 9,
            target: VlvTarget::GreaterThanOrEqual(b"smith".to_vec()),
            context_id: None,
        };
        let encoded = control.encode();
        assert_eq!(VirtualListViewRequestControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn round_trips_response_control() {
        let control = VirtualListViewResponseControl {
            target_position: 5,
            content_count: 50,
            result: VlvResult::Success,
            context_id: None,
        };
        let encoded = control.encode();
        assert_eq!(VirtualListViewResponseControl::decode(&encoded).unwrap(), control);
    }
}
