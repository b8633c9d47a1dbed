//! Result-document integrity verification.
//!
//! The provider sends a Content-MD5 header with each result document:
//! base64 of the raw MD5 digest. A mismatch means the body was corrupted in
//! transit and must not be interpreted.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::{Digest, Md5};

/// Compute the Content-MD5 value for a body: base64(md5(body)).
pub fn content_md5(body: &[u8]) -> String {
    BASE64.encode(Md5::digest(body))
}

/// Compare a body against the provider-supplied checksum header.
pub fn verify_checksum(body: &[u8], checksum_header: &str) -> bool {
    content_md5(body) == checksum_header.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_of_empty_body() {
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn known_digest_of_hello_world() {
        assert_eq!(content_md5(b"hello world"), "XrY7u+Ae7tCTyyK7j1rNww==");
    }

    #[test]
    fn verification_tolerates_header_whitespace() {
        assert!(verify_checksum(b"hello world", " XrY7u+Ae7tCTyyK7j1rNww== "));
    }

    #[test]
    fn tampered_body_fails_verification() {
        let header = content_md5(b"original body");
        assert!(!verify_checksum(b"original bodY", &header));
    }
}
