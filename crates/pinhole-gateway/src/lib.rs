//! HTTP surface of the Pinhole shortener.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::{AppError, Result};
pub use model::Owner;
pub use state::AppState;
