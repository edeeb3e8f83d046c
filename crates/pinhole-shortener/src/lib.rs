//! The Pinhole shortener service.
//!
//! [`ShortenerService`] ties a [`MappingRepository`](pinhole_core::MappingRepository),
//! a [`UrlCache`](pinhole_core::UrlCache) and the code generators together;
//! [`spawn_sweeper`] purges expired mappings in the background.

pub mod config;
pub mod service;
pub mod sweeper;

pub use config::ShortenerConfig;
pub use service::ShortenerService;
pub use sweeper::spawn_sweeper;
