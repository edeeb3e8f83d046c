use jiff::Timestamp;
use pinhole_core::{Algorithm, ShortCode, UrlMapping};
use serde::{Deserialize, Serialize};

/// The authenticated principal making a request.
///
/// Installed as a request extension by an upstream authentication layer;
/// requests without it are anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub u64);

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub url: String,
    /// Lifetime of the short URL in hours.
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    pub short_url: String,
    pub algorithm: Algorithm,
    pub expires_at: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingView {
    pub id: u64,
    pub short_code: Option<ShortCode>,
    pub original_url: String,
    pub algorithm: Algorithm,
    pub visits: u64,
    pub expires_at: Option<Timestamp>,
    pub owner_id: Option<u64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UrlMapping> for MappingView {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            id: mapping.id,
            short_code: mapping.short_code,
            original_url: mapping.original_url,
            algorithm: mapping.algorithm,
            visits: mapping.visits,
            expires_at: mapping.expires_at,
            owner_id: mapping.owner_id,
            created_at: mapping.created_at,
            updated_at: mapping.updated_at,
        }
    }
}

/// `{"code": .., "msg": .., "data": ..}` wrapper for successful listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub msg: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            msg: "success".to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub msg: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: Timestamp,
}
