use crate::{CodeGenerator, ALPHABET};
use pinhole_core::ShortCode;
use thiserror::Error;

const BASE: u64 = 62;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,
    #[error("invalid base62 character '{0}'")]
    InvalidCharacter(char),
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Encodes `id` in base62, most significant digit first.
///
/// Zero encodes as `"0"`; no other value has a leading zero.
pub fn encode(mut id: u64) -> String {
    if id == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while id > 0 {
        digits.push(ALPHABET[(id % BASE) as usize]);
        id /= BASE;
    }
    digits.reverse();

    // ALPHABET is pure ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base62 string produced by [`encode`] back to its id.
pub fn decode(code: &str) -> Result<u64, DecodeError> {
    if code.is_empty() {
        return Err(DecodeError::Empty);
    }

    code.chars().try_fold(0_u64, |acc, c| {
        let digit = digit_value(c).ok_or(DecodeError::InvalidCharacter(c))?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(DecodeError::Overflow)
    })
}

fn digit_value(c: char) -> Option<u64> {
    let value = match c {
        '0'..='9' => c as u64 - '0' as u64,
        'A'..='Z' => c as u64 - 'A' as u64 + 10,
        'a'..='z' => c as u64 - 'a' as u64 + 36,
        _ => return None,
    };
    Some(value)
}

/// Encodes the store-assigned id in base62.
///
/// Codes are unique as long as ids are, and grow in length with the id space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base62Generator;

impl CodeGenerator for Base62Generator {
    fn generate(&self, _original_url: &str, id: u64) -> ShortCode {
        ShortCode::new_unchecked(encode(id))
    }
}
