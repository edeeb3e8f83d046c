//! Short code generation strategies.
//!
//! Every strategy maps the store-assigned id and/or the original URL to a
//! [`ShortCode`]. Only [`Base62Generator`] is collision-free; codes from the
//! other strategies must be checked for uniqueness before they are persisted.

pub mod base62;
pub mod encoded;
pub mod hashed;
pub mod random;

pub use base62::Base62Generator;
pub use encoded::Base64Generator;
pub use hashed::Md5Generator;
pub use random::RandomGenerator;

use pinhole_core::{Algorithm, ShortCode};

/// The 62-symbol alphabet shared by the base62 and random strategies.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of codes produced by the content-based and random strategies.
pub const CODE_LENGTH: usize = 8;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
pub trait CodeGenerator: Send + Sync + 'static {
    /// Generates a short code from the original URL and the id the store
    /// assigned to its mapping.
    fn generate(&self, original_url: &str, id: u64) -> ShortCode;
}

/// Returns the generator implementing `algorithm`.
pub fn generator_for(algorithm: Algorithm) -> &'static dyn CodeGenerator {
    match algorithm {
        Algorithm::Base62 => &Base62Generator,
        Algorithm::Base64 => &Base64Generator,
        Algorithm::Md5 => &Md5Generator,
        Algorithm::Random => &RandomGenerator,
    }
}

/// Generates a short code with the given strategy.
pub fn generate(algorithm: Algorithm, original_url: &str, id: u64) -> ShortCode {
    generator_for(algorithm).generate(original_url, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_to_matching_strategy() {
        let url = "https://example.com/some/path";

        assert_eq!(generate(Algorithm::Base62, url, 62).as_str(), "10");
        assert_eq!(
            generate(Algorithm::Base64, url, 1).as_str(),
            Base64Generator.generate(url, 1).as_str()
        );
        assert_eq!(
            generate(Algorithm::Md5, url, 7).as_str(),
            Md5Generator.generate(url, 7).as_str()
        );
        assert_eq!(generate(Algorithm::Random, url, 1).as_str().len(), CODE_LENGTH);
    }

    #[test]
    fn every_strategy_produces_a_valid_short_code() {
        let url = "https://example.com/?q=a+b&r=/c";
        for algorithm in Algorithm::ALL {
            let code = generate(algorithm, url, 123_456);
            assert!(
                ShortCode::new(code.as_str()).is_ok(),
                "{algorithm} produced invalid code {code}"
            );
        }
    }

    #[test]
    fn alphabet_is_ordered_digits_upper_lower() {
        assert_eq!(ALPHABET[0], b'0');
        assert_eq!(ALPHABET[10], b'A');
        assert_eq!(ALPHABET[36], b'a');
        assert_eq!(ALPHABET[61], b'z');
    }
}
