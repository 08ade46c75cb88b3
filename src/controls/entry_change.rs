//! `EntryChangeNotificationControl` (persistent-search family,
//! draft-ietf-ldapext-psearch): `SEQUENCE { changeType ENUMERATED,
//! previousDN LDAPDN OPTIONAL, changeNumber INTEGER OPTIONAL }`.

use super::finish;
use crate::asn1::Asn1Buffer;
use crate::error::LdapError;
use asn1_rs::FromBer;
use asn1_rs::{Enumerated, Sequence};
use nom::combinator::{complete, opt};
use nom::Err;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Add = 1,
    Delete = 2,
    Modify = 4,
    ModDn = 8,
}

impl ChangeType {
    fn from_u32(v: u32) -> Result<Self, LdapError> {
        match v {
            1 => Ok(Self::Add),
            2 => Ok(Self::Delete),
            4 => Ok(Self::Modify),
            8 => Ok(Self::ModDn),
            _ => Err(LdapError::InvalidControl(format!("unknown entry change type {v}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChangeNotificationControl {
    pub change_type: ChangeType,
    pub previous_dn: Option<String>,
    pub change_number: Option<i64>,
}

impl EntryChangeNotificationControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], EntryChangeNotificationControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, code) = Enumerated::from_ber(i).map_err(Err::convert)?;
                let change_type = ChangeType::from_u32(code.0).map_err(Err::Error)?;
                let (i, previous_dn) = opt(complete(<&[u8]>::from_ber))(i).map_err(Err::convert)?;
                let previous_dn = previous_dn
                    .map(|b| std::str::from_utf8(b).map(str::to_string))
                    .transpose()
                    .map_err(|_| Err::Error(LdapError::InvalidString))?;
                let (i, change_number) = opt(complete(i64::from_ber))(i).map_err(Err::convert)?;
                Ok((
                    i,
                    EntryChangeNotificationControl {
                        change_type,
                        previous_dn,
                        change_number,
                    },
                ))
            });
        finish(parsed, "entryChangeNotificationControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_enumerated(self.change_type as u32);
            if let Some(dn) = &self.previous_dn {
                buf.write_octet_string(dn.as_bytes());
            }
            if let Some(n) = self.change_number {
                buf.write_integer(n);
            }
        });
        buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_modify_with_no_optionals() {
        let control = EntryChangeNotificationControl {
            change_type: ChangeType::Modify,
            previous_dn: None,
            change_number: None,
        };
        let encoded = control.encode();
        assert_eq!(EntryChangeNotificationControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn round_trips_moddn_with_previous_dn_and_change_number() {
        let control = EntryChangeNotificationControl {
            change_type: ChangeType::ModDn,
            previous_dn: Some("cn=old,dc=example,dc=com".to_string()),
            change_number: Some(42),
        };
        let encoded = control.encode();
        assert_eq!(EntryChangeNotificationControl::decode(&encoded).unwrap(), control);
    }
}
