use std::sync::Arc;

use pinhole_core::{Algorithm, ShortCode, Shortener};

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    algorithm: Algorithm,
    base_url: Option<String>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, algorithm: Algorithm) -> Self {
        Self {
            shortener,
            algorithm,
            base_url: None,
        }
    }

    /// Sets the public base URL that short codes are joined onto in responses.
    pub fn with_base_url(mut self, public_base_url: impl Into<String>) -> Self {
        self.base_url = Some(public_base_url.into());
        self
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    /// The strategy used for newly created mappings.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn short_url(&self, code: &ShortCode) -> String {
        match &self.base_url {
            Some(base_url) => code.to_url(base_url),
            None => code.to_string(),
        }
    }
}
