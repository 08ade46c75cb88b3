//! The remaining built-in controls: presence/flag-only controls
//! (`ManageDsaIT`, `AdShowDeleted` — handled directly in
//! [`super::decode`]/[`super::encode`] since they carry no structured
//! body at all), a boolean-valued control (`Subentries`, RFC 3672), and
//! typed wrappers around controls with a single simple payload
//! (`ProxiedAuthorization`, RFC 4370; the Microsoft AD-DS `AdDirSync` and
//! `AdPolicyHints` controls; the persistent-search request control; the
//! RFC 5805 transaction specification control).

use super::finish;
use crate::asn1::Asn1Buffer;
use crate::error::LdapError;
use asn1_rs::FromBer;
use asn1_rs::Sequence;
use nom::Err;

/// RFC 3296: presence-only, no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManageDsaItControl;

impl ManageDsaItControl {
    pub fn decode(value: Option<&[u8]>) -> Result<Self, LdapError> {
        if value.is_some_and(|v| !v.is_empty()) {
            return Err(LdapError::InvalidControl("manageDsaIT carries no value".into()));
        }
        Ok(Self)
    }

    pub fn encode(&self) -> Option<Vec<u8>> {
        None
    }
}

/// RFC 3672: `value ::= BOOLEAN` (visibility of subentries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubentriesControl(pub bool);

impl SubentriesControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], bool), Err<LdapError>> =
            bool::from_ber(value).map_err(Err::convert);
        let (rem, visible) =
            parsed.map_err(|e| LdapError::InvalidControl(format!("subentriesControl: {e:?}")))?;
        if !rem.is_empty() {
            return Err(LdapError::InvalidControl("subentriesControl: trailing bytes".into()));
        }
        Ok(Self(visible))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_boolean(self.0);
        buf.into_bytes()
    }
}

/// RFC 4370: `value ::= authzId` (a raw `OCTET STRING`, e.g. `"dn:..."`
/// or `"u:..."`), not further ASN.1-structured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedAuthorizationControl {
    pub authz_id: String,
}

impl ProxiedAuthorizationControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let authz_id = std::str::from_utf8(value)
            .map_err(|_| LdapError::InvalidControl("proxiedAuthorizationControl: invalid UTF-8".into()))?
            .to_string();
        Ok(Self { authz_id })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.authz_id.as_bytes().to_vec()
    }
}

/// MS-ADTS AD DirSync control: `SEQUENCE { flags INTEGER,
/// maxAttributeCount INTEGER, cookie OCTET STRING }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdDirSyncControl {
    pub flags: i64,
    pub max_attribute_count: i64,
    pub cookie: Vec<u8>,
}

impl AdDirSyncControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], AdDirSyncControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, flags) = i64::from_ber(i).map_err(Err::convert)?;
                let (i, max_attribute_count) = i64::from_ber(i).map_err(Err::convert)?;
                let (i, cookie) = <&[u8]>::from_ber(i).map_err(Err::convert)?;
                Ok((
                    i,
                    AdDirSyncControl {
                        flags,
                        max_attribute_count,
                        cookie: cookie.to_vec(),
                    },
                ))
            });
        finish(parsed, "adDirSyncControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_integer(self.flags);
            buf.write_integer(self.max_attribute_count);
            buf.write_octet_string(&self.cookie);
        });
        buf.into_bytes()
    }
}

/// MS-ADTS AD policy hints control: `SEQUENCE { flags INTEGER }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdPolicyHintsControl {
    pub flags: i64,
}

impl AdPolicyHintsControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], AdPolicyHintsControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, flags) = i64::from_ber(i).map_err(Err::convert)?;
                Ok((i, AdPolicyHintsControl { flags }))
            });
        finish(parsed, "adPolicyHintsControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_integer(self.flags);
        });
        buf.into_bytes()
    }
}

/// Persistent-search request control (draft-ietf-ldapext-psearch):
/// `SEQUENCE { changeTypes INTEGER, changesOnly BOOLEAN, returnECs
/// BOOLEAN }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentSearchControl {
    pub change_types: i64,
    pub changes_only: bool,
    pub return_ecs: bool,
}

impl PersistentSearchControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], PersistentSearchControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, change_types) = i64::from_ber(i).map_err(Err::convert)?;
                let (i, changes_only) = bool::from_ber(i).map_err(Err::convert)?;
                let (i, return_ecs) = bool::from_ber(i).map_err(Err::convert)?;
                Ok((
                    i,
                    PersistentSearchControl {
                        change_types,
                        changes_only,
                        return_ecs,
                    },
                ))
            });
        finish(parsed, "persistentSearchControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_integer(self.change_types);
            buf.write_boolean(self.changes_only);
            buf.write_boolean(self.return_ecs);
        });
        buf.into_bytes()
    }
}

/// RFC 5805 transaction specification control: `value ::= OCTET STRING`
/// (the opaque transaction identifier returned by `startTransaction`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSpecificationControl {
    pub identifier: Vec<u8>,
}

impl TransactionSpecificationControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        Ok(Self {
            identifier: value.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.identifier.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manage_dsa_it_rejects_nonempty_value() {
        assert!(ManageDsaItControl::decode(Some(&[0x01])).is_err());
        assert!(ManageDsaItControl::decode(None).is_ok());
    }

    #[test]
    fn subentries_round_trips_boolean() {
        let control = SubentriesControl(true);
        assert_eq!(SubentriesControl::decode(&control.encode()).unwrap(), control);
    }

    #[test]
    fn proxied_authorization_round_trips_authz_id() {
        let control = ProxiedAuthorizationControl {
            authz_id: "dn:cn=admin,dc=example,dc=com".to_string(),
        };
        let encoded = control.encode();
        assert_eq!(ProxiedAuthorizationControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn ad_dirsync_round_trips() {
        let control = AdDirSyncControl {
            flags: 1,
            max_attribute_count: 0,
            cookie: vec![9, 9, 9],
        };
        let encoded = control.encode();
        assert_eq!(AdDirSyncControl::decode(&encoded).unwrap(), control);
    }
}
