use crate::{CodeGenerator, CODE_LENGTH};
use ::md5::{Digest, Md5};
use pinhole_core::ShortCode;
use std::fmt::Write as _;

/// Takes the leading hex characters of `md5(url + id)`.
///
/// Mixing in the id separates repeated URLs, but unrelated URLs can still
/// share a prefix, so callers must check uniqueness.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Generator;

impl CodeGenerator for Md5Generator {
    fn generate(&self, original_url: &str, id: u64) -> ShortCode {
        let mut hasher = Md5::new();
        hasher.update(original_url.as_bytes());
        hasher.update(id.to_string().as_bytes());
        let digest = hasher.finalize();

        let mut code = String::with_capacity(CODE_LENGTH);
        for byte in digest.iter().take(CODE_LENGTH / 2) {
            // Writing to a String cannot fail.
            let _ = write!(code, "{byte:02x}");
        }
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digest_prefix() {
        let code = Md5Generator.generate("https://example.com", 1);
        assert_eq!(code.as_str(), "721790cd");
    }

    #[test]
    fn is_eight_lowercase_hex_characters() {
        let code = Md5Generator.generate("https://example.com/long/path?x=1", 99);
        assert_eq!(code.as_str().len(), CODE_LENGTH);
        assert!(code
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn id_changes_the_code() {
        let a = Md5Generator.generate("https://example.com", 1);
        let b = Md5Generator.generate("https://example.com", 2);
        assert_ne!(a, b);
    }
}
