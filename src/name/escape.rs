//! RFC 4514 §2.4 escaping rules, shared by both DN parsers and by DN
//! rendering.

/// Characters that MUST be escaped anywhere they occur in an RDN value's
/// string representation, per RFC 4514 §2.4.
pub(crate) const SPECIAL: &[char] = &[',', '+', '"', '\\', '<', '>', ';', '#', '='];

/// Escape `value` for use as the string representation of an AVA value:
/// the RFC 4514 special set, plus a leading/trailing space, plus a
/// leading `#`.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let chars: Vec<char> = value.chars().collect();
    for (idx, &c) in chars.iter().enumerate() {
        let is_leading_space = idx == 0 && c == ' ';
        let is_trailing_space = idx == chars.len() - 1 && c == ' ';
        let is_leading_hash = idx == 0 && c == '#';
        if SPECIAL.contains(&c) || is_leading_space || is_trailing_space || is_leading_hash {
            out.push('\\');
            out.push(c);
        } else if (c as u32) < 0x20 {
            out.push_str(&format!("\\{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// Undo [`escape_value`]: resolve `\HH` hex pairs and `\<special>`
/// escapes, per RFC 4514 §3 `<string>`.
pub fn unescape_value(input: &str) -> Result<String, crate::error::LdapError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let (h1, h2) = (chars.next(), chars.next());
        match (h1, h2) {
            (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit() => {
                let byte = u8::from_str_radix(&format!("{a}{b}"), 16)
                    .map_err(|_| crate::error::LdapError::DnSyntax("bad hex escape".into()))?;
                out.push(byte as char);
            }
            (Some(a), b) if SPECIAL.contains(&a) || a == ' ' => {
                out.push(a);
                if let Some(b) = b {
                    out.push(b);
                }
            }
            _ => return Err(crate::error::LdapError::DnSyntax("dangling escape".into())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_special_chars() {
        assert_eq!(escape_value("a,b"), "a\\,b");
        assert_eq!(escape_value(" leading"), "\\ leading");
        assert_eq!(escape_value("trailing "), "trailing\\ ");
    }

    #[test]
    fn round_trips_through_unescape() {
        let original = "a+b=c\\d";
        let escaped = escape_value(original);
        let back = unescape_value(&escaped).unwrap();
        assert_eq!(back, original);
    }
}
