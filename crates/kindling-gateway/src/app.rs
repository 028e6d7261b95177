use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{best_stories_handler, health_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/api",
                Router::new().route("/beststories/{n}", get(best_stories_handler)),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
