//! RFC 4533 content synchronization controls: `SyncRequestControl`
//! (request), `SyncStateControl` (attached to each `SearchResultEntry`),
//! `SyncDoneControl` (attached to `SearchResultDone`).

use super::finish;
use crate::asn1::Asn1Buffer;
use crate::error::LdapError;
use asn1_rs::FromBer;
use asn1_rs::{Enumerated, Sequence};
use nom::combinator::{complete, opt};
use nom::Err;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequestMode {
    RefreshOnly = 1,
    RefreshAndPersist = 3,
}

impl SyncRequestMode {
    fn from_u32(v: u32) -> Result<Self, LdapError> {
        match v {
            1 => Ok(Self::RefreshOnly),
            3 => Ok(Self::RefreshAndPersist),
            _ => Err(LdapError::InvalidControl(format!("unknown syncRequestControl mode {v}"))),
        }
    }
}

/// `SEQUENCE { mode ENUMERATED, cookie syncCookie OPTIONAL, reloadHint
/// BOOLEAN DEFAULT FALSE }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequestControl {
    pub mode: SyncRequestMode,
    pub cookie: Option<Vec<u8>>,
    pub reload_hint: bool,
}

impl SyncRequestControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], SyncRequestControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, mode) = Enumerated::from_ber(i).map_err(Err::convert)?;
                let mode = SyncRequestMode::from_u32(mode.0).map_err(Err::Error)?;
                let (i, cookie) = opt(complete(<&[u8]>::from_ber))(i).map_err(Err::convert)?;
                let (i, reload_hint) = opt(complete(bool::from_ber))(i).map_err(Err::convert)?;
                Ok((
                    i,
                    SyncRequestControl {
                        mode,
                        cookie: cookie.map(|c| c.to_vec()),
                        reload_hint: reload_hint.unwrap_or(false),
                    },
                ))
            });
        finish(parsed, "syncRequestControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_enumerated(self.mode as u32);
            if let Some(cookie) = &self.cookie {
                buf.write_octet_string(cookie);
            }
            if self.reload_hint {
                buf.write_boolean(true);
            }
        });
        buf.into_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStateValue {
    Present = 0,
    Add = 1,
    Modify = 2,
    Delete = 3,
}

impl SyncStateValue {
    fn from_u32(v: u32) -> Result<Self, LdapError> {
        match v {
            0 => Ok(Self::Present),
            1 => Ok(Self::Add),
            2 => Ok(Self::Modify),
            3 => Ok(Self::Delete),
            _ => Err(LdapError::InvalidControl(format!("unknown syncStateControl state {v}"))),
        }
    }
}

/// `SEQUENCE { state ENUMERATED, entryUUID OCTET STRING, cookie
/// syncCookie OPTIONAL }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStateControl {
    pub state: SyncStateValue,
    pub entry_uuid: Vec<u8>,
    pub cookie: Option<Vec<u8>>,
}

impl SyncStateControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], SyncStateControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, state) = Enumerated::from_ber(i).map_err(Err::convert)?;
                let state = SyncStateValue::from_u32(state.0).map_err(Err::Error)?;
                let (i, entry_uuid) = <&[u8]>::from_ber(i).map_err(Err::convert)?;
                let (i, cookie) = opt(complete(<&[u8]>::from_ber))(i).map_err(Err::convert)?;
                Ok((
                    i,
                    SyncStateControl {
                        state,
                        entry_uuid: entry_uuid.to_vec(),
                        cookie: cookie.map(|c| c.to_vec()),
                    },
                ))
            });
        finish(parsed, "syncStateControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_enumerated(self.state as u32);
            buf.write_octet_string(&self.entry_uuid);
            if let Some(cookie) = &self.cookie {
                buf.write_octet_string(cookie);
            }
        });
        buf.into_bytes()
    }
}

/// `SEQUENCE { cookie syncCookie OPTIONAL, refreshDeletes BOOLEAN
/// DEFAULT FALSE }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDoneControl {
    pub cookie: Option<Vec<u8>>,
    pub refresh_deletes: bool,
}

impl SyncDoneControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], SyncDoneControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, cookie) = opt(complete(<&[u8]>::from_ber))(i).map_err(Err::convert)?;
                let (i, refresh_deletes) = opt(complete(bool::from_ber))(i).map_err(Err::convert)?;
                Ok((
                    i,
                    SyncDoneControl {
                        cookie: cookie.map(|c| c.to_vec()),
                        refresh_deletes: refresh_deletes.unwrap_or(false),
                    },
                ))
            });
        finish(parsed, "syncDoneControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            if let Some(cookie) = &self.cookie {
                buf.write_octet_string(cookie);
            }
            if self.refresh_deletes {
                buf.write_boolean(true);
            }
        });
        buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_refresh_and_persist_with_cookie() {
        let control = SyncRequestControl {
            mode: SyncRequestMode::RefreshAndPersist,
            cookie: Some(vec![1, 2, 3]),
            reload_hint: true,
        };
        let encoded = control.encode();
        assert_eq!(SyncRequestControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn round_trips_sync_state_add() {
        let control = SyncStateControl {
            state: SyncStateValue::Add,
            entry_uuid: vec![0xaa; 16],
            cookie: None,
        };
        let encoded = control.encode();
        assert_eq!(SyncStateControl::decode(&encoded).unwrap(), control);
    }

    #[test]
    fn round_trips_sync_done_with_refresh_deletes() {
        let control = SyncDoneControl {
            cookie: Some(vec![7, 7]),
            refresh_deletes: true,
        };
        let encoded = control.encode();
        assert_eq!(SyncDoneControl::decode(&encoded).unwrap(), control);
    }
}
