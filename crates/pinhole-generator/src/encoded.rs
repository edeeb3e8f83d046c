use crate::{CodeGenerator, CODE_LENGTH};
use ::base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ::base64::Engine as _;
use pinhole_core::ShortCode;

/// Takes the leading characters of the unpadded base64 encoding of the URL.
///
/// The URL-safe alphabet (`-` and `_` instead of `+` and `/`) keeps codes
/// usable as a single path segment. URLs sharing their first six bytes
/// produce the same code, so callers must check uniqueness.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Generator;

impl CodeGenerator for Base64Generator {
    fn generate(&self, original_url: &str, _id: u64) -> ShortCode {
        let mut encoded = URL_SAFE_NO_PAD.encode(original_url.as_bytes());
        encoded.truncate(CODE_LENGTH);
        ShortCode::new_unchecked(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_eight_characters() {
        let code = Base64Generator.generate("https://example.com", 1);
        assert_eq!(code.as_str(), "aHR0cHM6");
    }

    #[test]
    fn short_input_yields_short_code() {
        let code = Base64Generator.generate("abc", 1);
        assert_eq!(code.as_str(), "YWJj");
    }

    #[test]
    fn shared_prefix_collides() {
        let a = Base64Generator.generate("https://a.example", 1);
        let b = Base64Generator.generate("https://b.example", 2);
        assert_eq!(a, b);
    }

    #[test]
    fn never_emits_padding_or_slashes() {
        let code = Base64Generator.generate("\u{fb}\u{ff}\u{fe}", 1);
        assert!(!code.as_str().contains(['=', '/', '+']));
    }
}
