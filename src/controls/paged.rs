//! `PagedResultsControl` (RFC 2696): `SEQUENCE { size INTEGER, cookie
//! OCTET STRING }`, used on both the request and the response.

use super::finish;
use crate::asn1::Asn1Buffer;
use crate::error::LdapError;
use asn1_rs::FromBer;
use asn1_rs::Sequence;
use nom::Err;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedResultsControl {
    pub size: u32,
    pub cookie: Vec<u8>,
}

impl PagedResultsControl {
    pub fn decode(value: &[u8]) -> Result<Self, LdapError> {
        let parsed: std::result::Result<(&[u8], PagedResultsControl), Err<LdapError>> =
            Sequence::from_ber_and_then(value, |i| {
                let (i, size) = u32::from_ber(i).map_err(Err::convert)?;
                let (i, cookie) = <&[u8]>::from_ber(i).map_err(Err::convert)?;
                Ok((
                    i,
                    PagedResultsControl {
                        size,
                        cookie: cookie.to_vec(),
                    },
                ))
            });
        finish(parsed, "pagedResultsControl")
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Asn1Buffer::new();
        buf.write_sequence(|buf| {
            buf.write_u32(self.size);
            buf.write_octet_string(&self.cookie);
        });
        buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_size_and_cookie() {
        let control = PagedResultsControl {
            size: 100,
            cookie: vec![1, 2, 3],
        };
        let encoded = control.encode();
        let decoded = PagedResultsControl::decode(&encoded).unwrap();
        assert_eq!(decoded, control);
    }
}
