// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Digest helpers.

/// Canonical 256-bit BLAKE3 digest used to fingerprint constructed geometry.
pub type Hash = [u8; 32];

/// Renders the first 8 bytes of a digest as lowercase hex (for logs).
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hex_is_sixteen_chars() {
        let h: Hash = blake3::hash(b"ndd").into();
        let s = short_hex(&h);
        assert_eq!(s.len(), 16);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
