//! # Route Table
//!
//! ```text
//! GET  /health                          liveness + migration status
//! GET  /api/dashboard                   margin dashboard
//! GET  /api/markup-rules                list rules
//! PUT  /api/markup-rules                batch upsert
//! POST /api/price-lists                 create list
//! POST /api/price-lists/{id}/items      set per-item override
//! POST /api/customer-groups             create group
//! POST /api/customer-groups/{id}/members add member
//! GET  /api/items/{id}/price            direct price lookup (?customerId=)
//! POST /api/repricing/simulate          ad-hoc simulation
//! POST /api/lots                        create lot (DRAFT)
//! GET  /api/lots                        list lots
//! GET  /api/lots/{id}                   fetch lot
//! POST /api/lots/{id}/simulate          simulate stored lot
//! POST /api/lots/{id}/apply             apply lot
//! POST /api/lots/{id}/revert            revert lot
//! ```

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Builds the full application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dashboard", get(handlers::dashboard))
        .route(
            "/api/markup-rules",
            get(handlers::list_markup_rules).put(handlers::put_markup_rules),
        )
        .route("/api/price-lists", post(handlers::create_price_list))
        .route("/api/price-lists/:id/items", post(handlers::set_price_override))
        .route("/api/customer-groups", post(handlers::create_customer_group))
        .route("/api/customer-groups/:id/members", post(handlers::add_group_member))
        .route("/api/items/:id/price", get(handlers::get_item_price))
        .route("/api/repricing/simulate", post(handlers::simulate_adhoc))
        .route("/api/lots", post(handlers::create_lot).get(handlers::list_lots))
        .route("/api/lots/:id", get(handlers::get_lot))
        .route("/api/lots/:id/simulate", post(handlers::simulate_lot))
        .route("/api/lots/:id/apply", post(handlers::apply_lot))
        .route("/api/lots/:id/revert", post(handlers::revert_lot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
