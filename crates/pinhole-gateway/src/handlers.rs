mod health;
mod url;

pub use health::health_handler;
pub use url::{create_url_handler, list_urls_handler, redirect_handler};
