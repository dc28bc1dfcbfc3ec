//! REST API module using Axum
//!
//! Exposes the analytics runner over HTTP: a run trigger, the run status and
//! downloads of the exported artifacts.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    routes::analytics_routes(state).layer(TraceLayer::new_for_http())
}
