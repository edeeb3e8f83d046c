use crate::{CodeGenerator, ALPHABET, CODE_LENGTH};
use pinhole_core::ShortCode;
use rand::Rng;

/// Draws [`CODE_LENGTH`] characters uniformly from the base62 alphabet.
///
/// Uses the thread-local generator, which is seeded from the OS once per
/// thread rather than on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl CodeGenerator for RandomGenerator {
    fn generate(&self, _original_url: &str, _id: u64) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..CODE_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}
