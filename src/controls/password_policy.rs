//! `PasswordPolicyResponseControl` (draft-behera-ldap-password-policy
//! §6.1): `SEQUENCE { warning [0] CHOICE { timeBeforeExpiration [0]
//! INTEGER, graceAuthNsRemaining [1] INTEGER } OPTIONAL, error [1]
//! ENUMERATED OPTIONAL }`.
//!
//! Decoded field-by-field with [`crate::asn1::tlv::read`] rather than
//! `asn1-rs`'s `FromBer`: every field here is an implicitly-tagged
//! choice/optional whose content is a bare integer, which is simplest to
//! read as a raw TLV and interpret directly.

use super::decode_integer_content;
use crate::asn1::{tlv, Asn1Buffer, Class};
use crate::error::LdapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyError {
    PasswordExpired = 0,
    AccountLocked = 1,
    ChangeAfterReset = 2,
    PasswordModNotAllowed = 3,
    MustSupplyOldPassword = 4,
    InsufficientPasswordQuality = 5,
    PasswordTooShort = 6,
    PasswordTooYoung = 7,
    PasswordInHistory = 8,
}

impl PasswordPolicyError {
    fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => Self::PasswordExpired,
            1 => Self::AccountLocked,
            2 => Self::ChangeAfterReset,
            3 => Self::PasswordModNotAllowed,
            4 => Self::MustSupplyOldPassword,
            5 => Self::InsufficientPasswordQuality,
            6 => Self::PasswordTooShort,
            7 => Self::PasswordTooYoung,
            8 => Self::PasswordInHistory,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyWarning {
    TimeBeforeExpiration(i64),
    GraceAuthNsRemaining(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasswordPolicyResponseControl {
    pub warning: Option<PasswordPolicyWarning>,
    pub error: Option<PasswordPolicyError>,
}

impl PasswordPolicyResponseControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        if value.is_empty() {
            return Ok(Self::default());
        }
        let err = |msg: &str| LdapError::InvalidControl(format!("passwordPolicyResponseControl: {msg}"));
        let (rest, outer) = tlv::read(value).map_err(|_| err("malformed SEQUENCE"))?;
        if !rest.is_empty() {
            return Err(err("trailing bytes"));
        }
        let mut control = Self::default();
        let mut i = outer.content;
        if let Ok((rest, field)) = tlv::read(i) {
            if field.class == Class::ContextSpecific && field.tag == 0 {
                let (inner_rest, inner) = tlv::read(field.content).map_err(|_| err("malformed warning"))?;
                if !inner_rest.is_empty() {
                    return Err(err("malformed warning"));
                }
                let n = decode_integer_content(inner.content);
                control.warning = Some(match inner.tag {
                    0 => PasswordPolicyWarning::TimeBeforeExpiration(n),
                    1 => PasswordPolicyWarning::GraceAuthNsRemaining(n),
                    _ => return Err(err("unknown warning choice tag")),
                });
                i = rest;
            }
        }
        if let Ok((rest, field)) = tlv::read(i) {
            if field.class == Class::ContextSpecific && field.tag == 1 {
                control.error = PasswordPolicyError::from_i64(decode_integer_content(field.content));
                i = rest;
            }
        }
        if !i.is_empty() {
            return Err(err("trailing bytes"));
        }
        Ok(control)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            if let Some(warning) = self.warning {
                buf.write_tagged_implicit(Class::ContextSpecific, true, 0, |buf| match warning {
                    PasswordPolicyWarning::TimeBeforeExpiration(v) => {
                        buf.write_tlv(Class::ContextSpecific, false, 0, &crate::asn1::integer_content(v));
                    }
                    PasswordPolicyWarning::GraceAuthNsRemaining(v) => {
                        buf.write_tlv(Class::ContextSpecific, false, 1, &crate::asn1::integer_content(v));
                    }
                });
            }
            if let Some(error) = self.error {
                buf.write_tlv(
                    Class::ContextSpecific,
                    false,
                    1,
                    &crate::asn1::integer_content(error as i64),
                );
            }
        });
        buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_time_before_expiration_warning() {
        let control = PasswordPolicyResponseControl {
            warning: Some(PasswordPolicyWarning::TimeBeforeExpiration(3600)),
            error: None,
        };
        let encoded = control.encode();
        assert_eq!(PasswordPolicyResponseControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn round_trips_error_only() {
        let control = PasswordPolicyResponseControl {
            warning: None,
            error: Some(PasswordPolicyError::PasswordExpired),
        };
        let encoded = control.encode();
        assert_eq!(PasswordPolicyResponseControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn empty_value_decodes_to_no_warning_no_error() {
        assert_eq!(
            PasswordPolicyResponseControl::decode(&[]).unwrap(),
            PasswordPolicyResponseControl::default()
        );
    }
}
