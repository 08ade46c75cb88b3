//! Single tag-length-value reader (spec §4.1: "decode one tag-length-value
//! at a stream position").
//!
//! This is the low-level primitive C1 is required to expose; the
//! LDAPv3 grammar itself (C2, in [`crate::message`]) is decoded through
//! `asn1-rs`'s `FromBer` trait the way the teacher crate does. `Tlv`
//! borrows directly from the input slice and never copies or mutates
//! `OCTET STRING`/`SEQUENCE` content (spec §4.1).

use super::Class;
use nom::bytes::streaming::take;
use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult, Needed};

/// One decoded tag-length-value unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub class: Class,
    pub constructed: bool,
    pub tag: u32,
    pub content: &'a [u8],
}

fn class_from_bits(bits: u8) -> Class {
    match bits {
        0b00 => Class::Universal,
        0b01 => Class::Application,
        0b10 => Class::ContextSpecific,
        _ => Class::Private,
    }
}

fn read_tag(i: &[u8]) -> IResult<&[u8], (Class, bool, u32), crate::error::LdapError> {
    let (i, first) = take(1usize)(i)?;
    let first = first[0];
    let class = class_from_bits(first >> 6);
    let constructed = first & 0x20 != 0;
    let low = first & 0x1f;
    if low != 0x1f {
        return Ok((i, (class, constructed, low as u32)));
    }
    // high-tag-number form
    let mut value: u32 = 0;
    let mut rest = i;
    loop {
        let (next, byte) = take(1usize)(rest)?;
        rest = next;
        let b = byte[0];
        value = (value << 7) | (b & 0x7f) as u32;
        if b & 0x80 == 0 {
            break;
        }
    }
    Ok((rest, (class, constructed, value)))
}

fn read_length(i: &[u8]) -> IResult<&[u8], usize, crate::error::LdapError> {
    let (i, first) = take(1usize)(i)?;
    let first = first[0];
    if first & 0x80 == 0 {
        return Ok((i, first as usize));
    }
    let n = (first & 0x7f) as usize;
    if n == 0 {
        // indefinite length: unsupported in the LDAP BER profile (spec §6)
        return Err(Err::Error(crate::error::LdapError::from_error_kind(
            i,
            ErrorKind::LengthValue,
        )));
    }
    if n > std::mem::size_of::<usize>() {
        return Err(Err::Failure(crate::error::LdapError::from_error_kind(
            i,
            ErrorKind::TooLarge,
        )));
    }
    let (i, octets) = take(n)(i)?;
    let mut len: usize = 0;
    for &b in octets {
        len = (len << 8) | b as usize;
    }
    Ok((i, len))
}

/// Decode exactly one TLV starting at `i`, returning the remaining input
/// and the parsed unit. Returns `Err(Err::Incomplete(_))` if `i` does not
/// yet contain the full value (spec "InputIncomplete" failure class).
pub fn read(i: &[u8]) -> IResult<&[u8], Tlv<'_>, crate::error::LdapError> {
    let (i, (class, constructed, tag)) = read_tag(i)?;
    let (i, len) = read_length(i)?;
    if i.len() < len {
        return Err(Err::Incomplete(Needed::new(len - i.len())));
    }
    let (i, content) = take(len)(i)?;
    Ok((
        i,
        Tlv {
            class,
            constructed,
            tag,
            content,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_short_form() {
        let data = [0x04, 0x03, b'a', b'b', b'c'];
        let (rem, tlv) = read(&data).unwrap();
        assert!(rem.is_empty());
        assert_eq!(tlv.class, Class::Universal);
        assert!(!tlv.constructed);
        assert_eq!(tlv.tag, 4);
        assert_eq!(tlv.content, b"abc");
    }

    #[test]
    fn reads_application_tag() {
        // AddResponse, [APPLICATION 9], length 7
        let data = [0x69, 0x07, 0x0a, 0x01, 0x00, 0x04, 0x00, 0x04, 0x00];
        let (rem, tlv) = read(&data).unwrap();
        assert!(rem.is_empty());
        assert_eq!(tlv.class, Class::Application);
        assert!(tlv.constructed);
        assert_eq!(tlv.tag, 9);
        assert_eq!(tlv.content.len(), 7);
    }

    #[test]
    fn incomplete_is_recoverable() {
        let data = [0x04, 0x05, b'a', b'b'];
        let res = read(&data);
        assert!(matches!(res, Err(Err::Incomplete(_))));
    }

    #[test]
    fn long_form_length() {
        let mut data = vec![0x04u8, 0x81, 0x80];
        data.extend(std::iter::repeat(b'x').take(128));
        let (rem, tlv) = read(&data).unwrap();
        assert!(rem.is_empty());
        assert_eq!(tlv.content.len(), 128);
    }
}
