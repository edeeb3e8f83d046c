use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The strategy that produced a mapping's short code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Base62 encoding of the store-assigned id. Collision-free.
    #[default]
    Base62,
    /// Leading characters of the base64-encoded original URL.
    Base64,
    /// Leading hex characters of an MD5 digest over the URL and id.
    Md5,
    /// Eight characters drawn uniformly from the base62 alphabet.
    Random,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Base62,
        Algorithm::Base64,
        Algorithm::Md5,
        Algorithm::Random,
    ];

    /// Looks up an algorithm by its configured name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Like [`Algorithm::from_name`], but unknown names resolve to [`Algorithm::Base62`].
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Base62 => "base62",
            Algorithm::Base64 => "base64",
            Algorithm::Md5 => "md5",
            Algorithm::Random => "random",
        }
    }

    /// Whether codes from this algorithm are unique by construction.
    pub fn is_collision_free(&self) -> bool {
        matches!(self, Algorithm::Base62)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
