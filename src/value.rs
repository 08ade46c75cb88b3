//! Typed attribute values (spec component C4).
//!
//! A [`Value`] pairs the bytes a caller or the wire gave us with an
//! optional normalized form computed through the owning
//! [`AttributeType`](crate::schema::AttributeType)'s equality matching
//! rule. Human-readability is a property of the attribute's syntax, not
//! of the value itself (spec §4.4).

use crate::schema::AttributeType;
use std::borrow::Cow;
use std::fmt;

/// Either a UTF-8 string or an opaque octet sequence, together with the
/// normalized form used for equality (spec §3 "Value").
#[derive(Clone)]
pub struct Value<'a> {
    raw: Raw<'a>,
    normalized: Option<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Raw<'a> {
    Str(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
}

impl<'a> Value<'a> {
    /// Construct a bare value with no schema context; normalization is
    /// deferred until an [`AttributeType`] is attached via
    /// [`Value::normalize_with`].
    pub fn from_str(s: impl Into<Cow<'a, str>>) -> Self {
        Value {
            raw: Raw::Str(s.into()),
            normalized: None,
        }
    }

    pub fn from_bytes(b: impl Into<Cow<'a, [u8]>>) -> Self {
        Value {
            raw: Raw::Bytes(b.into()),
            normalized: None,
        }
    }

    /// Construct a value and eagerly normalize it against `at` (spec
    /// §4.4: "computed eagerly on construction when schema-aware").
    pub fn new_with_schema(bytes: &'a [u8], at: &AttributeType) -> Self {
        let mut v = if at.syntax_is_human_readable() {
            match std::str::from_utf8(bytes) {
                Ok(s) => Value::from_str(Cow::Borrowed(s)),
                Err(_) => Value::from_bytes(Cow::Borrowed(bytes)),
            }
        } else {
            Value::from_bytes(Cow::Borrowed(bytes))
        };
        v.normalize_with(at);
        v
    }

    /// Compute (or recompute) the normalized form using `at`'s equality
    /// matching rule. Idempotent: calling this twice in a row yields the
    /// same bytes (spec §8 "Normalization idempotence").
    pub fn normalize_with(&mut self, at: &AttributeType) {
        let normalized = at.normalize_value(self.as_bytes());
        self.normalized = Some(normalized);
    }

    pub fn is_human_readable(&self) -> bool {
        matches!(self.raw, Raw::Str(_))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.raw {
            Raw::Str(s) => s.as_bytes(),
            Raw::Bytes(b) => b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.raw {
            Raw::Str(s) => Some(s),
            Raw::Bytes(_) => None,
        }
    }

    /// Bytes two values compare equal over iff they are byte-for-byte
    /// identical (spec §3 invariant ii). Falls back to the raw bytes when
    /// no normalizer has run yet.
    pub fn normalized_bytes(&self) -> &[u8] {
        self.normalized.as_deref().unwrap_or_else(|| self.as_bytes())
    }

    pub fn into_owned(self) -> Value<'static> {
        let raw = match self.raw {
            Raw::Str(s) => Raw::Str(Cow::Owned(s.into_owned())),
            Raw::Bytes(b) => Raw::Bytes(Cow::Owned(b.into_owned())),
        };
        Value {
            raw,
            normalized: self.normalized,
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_bytes() == other.normalized_bytes()
    }
}
impl Eq for Value<'_> {}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Raw::Str(s) => write!(f, "Value::Str({s:?})"),
            Raw::Bytes(b) => write!(f, "Value::Bytes({} bytes)", b.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_value_without_schema_keeps_raw_bytes() {
        let v = Value::from_str("hello");
        assert_eq!(v.normalized_bytes(), b"hello");
        assert!(v.is_human_readable());
    }

    #[test]
    fn equality_is_over_normalized_form() {
        let a = Value::from_str("hello");
        let b = Value::from_str("hello");
        assert_eq!(a, b);
    }
}
