//! BER length-octet encoding (X.690 §8.1.3), short and long definite forms.
//!
//! LDAP only ever uses definite-length encoding (spec §6: "BER-encoded
//! per X.690 with the LDAP profile restrictions (definite-length, ...)"),
//! so indefinite-length is intentionally unsupported here.

/// Encode `len` as a BER length field.
pub fn encode(len: usize) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else {
        let be = len.to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let octets = &be[first_nonzero..];
        let mut out = Vec::with_capacity(octets.len() + 1);
        out.push(0x80 | (octets.len() as u8));
        out.extend_from_slice(octets);
        out
    }
}

/// Number of octets [`encode`] would produce for `len`.
pub fn encoded_len(len: usize) -> usize {
    if len < 0x80 {
        1
    } else {
        let be = len.to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        1 + (be.len() - first_nonzero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(0x7f), vec![0x7f]);
        assert_eq!(encoded_len(0x7f), 1);
    }

    #[test]
    fn long_form() {
        assert_eq!(encode(0x80), vec![0x81, 0x80]);
        assert_eq!(encode(0xff), vec![0x81, 0xff]);
        assert_eq!(encode(0x1_0000), vec![0x83, 0x01, 0x00, 0x00]);
        assert_eq!(encoded_len(0x1_0000), 4);
    }

    #[test]
    fn matches_minimum_octet_rule() {
        for len in [0usize, 1, 127, 128, 255, 256, 65535, 65536, 100_000] {
            let enc = encode(len);
            assert_eq!(enc.len(), encoded_len(len));
        }
    }
}
