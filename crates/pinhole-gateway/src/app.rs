use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{create_url_handler, health_handler, list_urls_handler, redirect_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(health_handler))
            .route(
                "/url_mapping",
                get(list_urls_handler).post(create_url_handler),
            )
            // Static routes above take priority over the catch-all code segment.
            .route("/{code}", get(redirect_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }
}
