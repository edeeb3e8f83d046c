//! [`UrlCache`] backends for the Pinhole shortener.
//!
//! - [`MokaUrlCache`]: in-process cache with per-entry TTL.
//! - [`RedisUrlCache`]: shared cache backed by Redis key expiry.
//! - [`NoopUrlCache`]: stands in when no cache backend is configured.

pub mod moka;
pub mod noop;
pub mod redis;

pub use crate::moka::{CacheConfig, MokaUrlCache};
pub use crate::noop::NoopUrlCache;
pub use crate::redis::RedisUrlCache;
pub use pinhole_core::cache::Result;
pub use pinhole_core::{CacheError, CachedUrl, UrlCache};
