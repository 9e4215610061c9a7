//! Byte/hex utilities and constant-time comparison.
//!
//! Grounded on the teacher's `sha3::aux_functions::byte_utils` module: small,
//! free functions over `Vec<u8>`/byte slices rather than a trait hierarchy.

use subtle::ConstantTimeEq;

/// Constant-time equality over two equal-length byte slices.
///
/// Returns `false` immediately (in variable time) on a length mismatch,
/// since length is never secret in this protocol; the byte contents are
/// compared without branching on secret data.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Draws `n` cryptographically random bytes from the OS CSPRNG.
pub fn random_bytes(n: usize) -> Vec<u8> {
    use rand::RngCore;
    let mut buf = vec![0u8; n];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Encodes bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a hex string into bytes.
pub fn from_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s)
}

/// Appends an 8-byte little-endian length prefix followed by `data` to `out`.
///
/// This is the "length-prefixed field" encoding used by the SPAKE2
/// transcript hash.
pub fn append_length_prefixed(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());
    out.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ct_eq_matches_equal_slices() {
        assert!(ct_eq(b"abcd", b"abcd"));
    }

    #[test]
    fn ct_eq_rejects_mismatches() {
        assert!(!ct_eq(b"abcd", b"abce"));
        assert!(!ct_eq(b"abc", b"abcd"));
    }

    #[test]
    fn length_prefix_round_trips() {
        let mut out = Vec::new();
        append_length_prefixed(&mut out, b"hi");
        assert_eq!(out, vec![2, 0, 0, 0, 0, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn hex_round_trips() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        assert_eq!(from_hex(&to_hex(&bytes)).unwrap(), bytes);
    }
}
