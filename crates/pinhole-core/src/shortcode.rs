use crate::error::ShortenerError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

const MAX_LEN: usize = 64;

/// The path segment that identifies a mapping, e.g. `aZ3` in `https://pin.hole/aZ3`.
///
/// Every generator emits 1 to 64 characters from `[A-Za-z0-9_-]`, so anything
/// else arriving from a client can be rejected before a lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

impl ShortCode {
    /// Parses a client-supplied code.
    pub fn new(code: impl Into<String>) -> Result<Self, ShortenerError> {
        let code = code.into();

        if code.is_empty() || code.len() > MAX_LEN {
            return Err(ShortenerError::InvalidShortCode(format!(
                "expected 1..={MAX_LEN} characters, got {}",
                code.len()
            )));
        }
        if let Some(bad) = code.chars().find(|c| !is_code_char(*c)) {
            return Err(ShortenerError::InvalidShortCode(format!(
                "unexpected character {bad:?} in '{code}'"
            )));
        }

        Ok(Self(code))
    }

    /// Wraps a code from a generator or the store without checking it.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Joins the code onto `base_url` as its last path segment.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortCode {
    type Err = ShortenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = ShortenerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
