use md5::{Digest as _, Md5};
use sha2::Sha256;
use std::fmt;

pub const MD5_HEX_LEN: usize = 32;
pub const SHA256_HEX_LEN: usize = 64;

/// A validated avatar fingerprint: 32 (MD5) or 64 (SHA-256) hex characters.
///
/// Anything else is not an error at the HTTP surface; an unparsable digest
/// simply never matches a stored identity and ends up in the fallback chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn parse(input: &str) -> Option<Fingerprint> {
        if input.len() != MD5_HEX_LEN && input.len() != SHA256_HEX_LEN {
            return None;
        }
        if !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Fingerprint(input.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_lengths() {
        let md5 = "0".repeat(32);
        let sha256 = "a".repeat(64);
        assert!(Fingerprint::parse(&md5).is_some());
        assert!(Fingerprint::parse(&sha256).is_some());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        // wrong lengths
        assert!(Fingerprint::parse("").is_none());
        assert!(Fingerprint::parse(&"a".repeat(31)).is_none());
        assert!(Fingerprint::parse(&"a".repeat(33)).is_none());
        assert!(Fingerprint::parse(&"a".repeat(65)).is_none());
        // right length, non-hex charset
        assert!(Fingerprint::parse(&"x".repeat(32)).is_none());
        assert!(Fingerprint::parse(&"g".repeat(64)).is_none());
    }

    #[test]
    fn test_parse_lowercases() {
        let upper = "ABCDEF0123456789ABCDEF0123456789";
        let parsed = Fingerprint::parse(upper).unwrap();
        assert_eq!(parsed.as_str(), upper.to_ascii_lowercase());
    }

    #[test]
    fn test_digest_helpers() {
        // Well-known reference digests of the empty string
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
