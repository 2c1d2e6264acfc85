//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// Transfer routes are mounted under the announced context root so the
/// URLs the negotiator hands out resolve against this router as-is.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Capability discovery
        .route("/v1/capabilities", get(handlers::get_capabilities))
        // Health check (intentionally unauthenticated for load balancer probes)
        .route("/v1/health", get(handlers::health_check))
        // Slot negotiation
        .route("/v1/slots", post(handlers::request_slot));

    let transfer_routes = Router::new().route(
        "/{slot_id}/{filename}",
        get(handlers::fetch_object).put(handlers::store_object),
    );

    let context_root = state.config.announce.context_root.trim_end_matches('/');
    let router = if context_root.is_empty() {
        Router::new().merge(api_routes).merge(transfer_routes)
    } else {
        Router::new()
            .merge(api_routes)
            .nest(context_root, transfer_routes)
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
