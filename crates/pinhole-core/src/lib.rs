//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate provides the domain model and the seams (repository, cache,
//! shortener) shared by the generator, storage, cache, service and gateway
//! crates.

pub mod algorithm;
pub mod cache;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use algorithm::Algorithm;
pub use cache::{CachedUrl, UrlCache};
pub use error::{CacheError, ShortenerError, StorageError};
pub use mapping::{NewMapping, UrlMapping};
pub use repository::MappingRepository;
pub use shortcode::ShortCode;
pub use shortener::{ExpirationPolicy, ShortenParams, Shortener};
