//! Error types shared across the codec, DN, filter and schema layers.

use crate::message::{LdapDN, LdapResult, LdapString, ResultCode};
use asn1_rs::Error as BerError;
use nom::error::{ErrorKind, FromExternalError, ParseError};
use nom::IResult;
use std::borrow::Cow;

/// Holds the result of parsing functions (LDAP)
///
/// Note that this type is also a `Result`, so usual functions (`map`, `unwrap` etc.) are available.
///
/// Note that this type is not named `LdapResult` to avoid conflicts with the LDAP standard type.
pub type Result<'a, T> = IResult<&'a [u8], T, LdapError>;

/// Which response PDU shape a decode fault should be reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOperation {
    Add,
    Modify,
    Delete,
    ModDn,
    Compare,
    Search,
    Bind,
}

/// A decode fault that carries a pre-built response PDU.
///
/// Produced when a request body decodes far enough to identify the
/// targeted DN and the remaining fault is a grammar/syntax violation
/// (invalid DN, invalid attribute syntax, protocol error): callers that
/// intend to reply to the request can lift the response directly instead
/// of tearing down the connection. See spec §4.2 "Decoder contract".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCarryingDecodeError {
    pub operation: ResponseOperation,
    pub result: LdapResult<'static>,
}

/// An error that can occur while parsing, validating or encoding an LDAP
/// entity (message, DN, filter, schema object).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LdapError {
    #[error("Invalid LDAP String encoding")]
    InvalidString,

    #[error("Invalid LDAP Authentication Type")]
    InvalidAuthenticationType,

    #[error("Invalid DN encoding")]
    InvalidDN,

    #[error("Invalid Substring Type")]
    InvalidSubstring,

    #[error("Invalid Type for Filter")]
    InvalidFilterType,
    #[error("Invalid Type for Message")]
    InvalidMessageType,

    #[error("filter or SUP closure nesting exceeds the implementation bound")]
    NestingTooDeep,

    #[error("decode fault carrying a pre-built response")]
    ResponseCarrying(Box<ResponseCarryingDecodeError>),

    #[error("attempt to encode an incomplete or invalid PDU: {0}")]
    EncodeError(String),

    #[error("RFC 4514 DN syntax violation: {0}")]
    DnSyntax(String),

    #[error("value rejected by syntax checker or normalizer: {0}")]
    InvalidAttributeSyntax(String),

    #[error("mutation attempted on a locked schema object: {0}")]
    LockedSchemaObject(String),

    #[error("operation not supported: {0}")]
    UnsupportedOperation(String),

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("schema violations accumulated in relaxed mode: {0:?}")]
    SchemaViolations(Vec<String>),

    #[error("invalid control encoding: {0}")]
    InvalidControl(String),

    #[error("Unknown error")]
    Unknown,

    #[error("BER error: {0}")]
    Ber(#[from] BerError),
    #[error("nom error: {0:?}")]
    NomError(ErrorKind),
}

impl From<LdapError> for nom::Err<LdapError> {
    fn from(e: LdapError) -> nom::Err<LdapError> {
        nom::Err::Error(e)
    }
}

impl From<ErrorKind> for LdapError {
    fn from(e: ErrorKind) -> LdapError {
        LdapError::NomError(e)
    }
}

impl<I> ParseError<I> for LdapError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        LdapError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        LdapError::NomError(kind)
    }
}

impl<I, E> FromExternalError<I, E> for LdapError {
    fn from_external_error(_input: I, kind: ErrorKind, _e: E) -> LdapError {
        LdapError::NomError(kind)
    }
}

/// Build a response-carrying error reporting `invalidDNSyntax` against
/// `operation`.
pub(crate) fn invalid_dn_response(operation: ResponseOperation) -> LdapError {
    response_carrying(operation, ResultCode::InvalidDNSyntax, "invalid DN syntax")
}

/// Build a response-carrying error reporting `invalidAttributeSyntax`
/// against `operation`.
pub(crate) fn invalid_attribute_response(operation: ResponseOperation) -> LdapError {
    response_carrying(
        operation,
        ResultCode::InvalidAttributeSyntax,
        "invalid attribute syntax",
    )
}

/// Build a response-carrying error reporting `protocolError` against
/// `operation`.
pub(crate) fn protocol_error_response(operation: ResponseOperation) -> LdapError {
    response_carrying(operation, ResultCode::ProtocolError, "protocol error")
}

fn response_carrying(operation: ResponseOperation, code: ResultCode, msg: &'static str) -> LdapError {
    let result = LdapResult {
        result_code: code,
        matched_dn: LdapDN(Cow::Borrowed("")),
        diagnostic_message: LdapString(Cow::Borrowed(msg)),
    };
    LdapError::ResponseCarrying(Box::new(ResponseCarryingDecodeError { operation, result }))
}

#[allow(dead_code)]
pub(crate) fn print_hex_dump(bytes: &[u8], max_len: usize) {
    use nom::HexDisplay;
    use std::cmp::min;
    let m = min(bytes.len(), max_len);
    if m == 0 {
        println!("<empty>");
    }
    print!("{}", &bytes[..m].to_hex(16));
    if bytes.len() > max_len {
        println!("... <continued>");
    }
}
