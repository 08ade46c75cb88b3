//! # ldap-api
//!
//! A client-side implementation of the Lightweight Directory Access
//! Protocol ([RFC4511]) wire format, distinguished-name grammar and schema
//! engine, implemented with the [nom](https://github.com/Geal/nom) parser
//! combinator framework and [asn1-rs](https://github.com/rusticata/asn1-rs).
//!
//! It is written in pure Rust, fast, and makes extensive use of zero-copy.
//! A lot of care is taken to ensure security and safety of this crate,
//! including design (recursion limit, defensive programming), tests, and
//! fuzzing. It also aims to be panic-free.
//!
//! ## Layout
//!
//! - [`asn1`] — the BER/DER codec primitives (tag/length/value reader,
//!   reverse-encoding buffer).
//! - [`message`] — the LDAPv3 message grammar: [`message::decode`] and
//!   [`message::encode`] turn bytes into/from [`message::LdapMessage`].
//! - [`controls`] — the OID-indexed control registry layered on top of
//!   `message::Control`'s opaque value.
//! - [`filter`] — the search filter model, its BER codec and its RFC 4515
//!   textual form.
//! - [`name`] — DN/RDN/AVA parsing, normalization and comparison (RFC 4514).
//! - [`schema`] — schema objects and [`schema::SchemaManager`], the
//!   OID/name-indexed registry with RFC 4512/4517/4518 semantics.
//! - [`value`] — attribute values and their schema-driven normalized form.
//! - [`entry`] — [`entry::Entry`]/[`entry::Attribute`], a DN plus its
//!   attribute map.
//!
//! [RFC4511]: https://datatracker.ietf.org/doc/html/rfc4511

#![deny(/*missing_docs,*/
        unstable_features,
        unused_import_braces, unused_qualifications)]
#![warn(
    missing_debug_implementations,
    /* missing_docs,
    rust_2018_idioms,*/
    unreachable_pub
)]
#![forbid(unsafe_code)]
#![deny(broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod asn1;
pub mod controls;
pub mod entry;
pub mod error;
pub mod filter;
pub mod message;
pub mod name;
pub mod prepare;
pub mod schema;
pub mod syntaxes;
pub mod value;

pub extern crate nom;
pub use nom::{Err, IResult};

pub use entry::{Attribute, AttributeDescription, Entry};
pub use error::LdapError;
pub use filter::{parse_filter, render_filter, Filter};
pub use message::{decode_message, decode_with_schema, encode_message, LdapMessage};
pub use name::{parse_dn, parse_rdn, Ava, Dn, Rdn};
pub use schema::SchemaManager;
pub use value::Value;

/// Decode a single LDAP message from `bytes`, schema-unaware (spec §6
/// "decode(bytes) → Message | DecodeError"). Returns the decoded message
/// together with any trailing bytes, the way `FromBer`-based decoders do
/// throughout this crate.
///
/// For schema-aware decoding (attribute syntax and SINGLE-VALUE checks,
/// response-carrying DN errors), use [`message::decode_with_schema`].
pub fn decode(bytes: &[u8]) -> error::Result<'_, LdapMessage<'_>> {
    decode_message(bytes)
}

/// Encode `msg` back to its BER wire form (spec §6 "encode(Message,
/// context) → bytes").
pub fn encode(msg: &LdapMessage<'_>) -> Vec<u8> {
    encode_message(msg)
}
