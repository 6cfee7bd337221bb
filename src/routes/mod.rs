// Route modules
pub mod admin;
pub mod doctors;
pub mod patients;
pub mod sessions;

use crate::{
    app_state::AppState,
    middleware::{create_rate_limiter, identity_middleware, logging_middleware},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: AppState) -> Router<AppState> {
    // Wallet-mutating party routes require identity and rate limiting
    let rate_limiter = create_rate_limiter(state.redis.clone());
    let party_mutation_routes = Router::new()
        .route("/purchases", post(patients::create_purchase))
        .route(
            "/purchases/{purchase_id}/refund",
            post(patients::request_refund),
        )
        .route(
            "/payouts",
            post(doctors::create_payout).get(doctors::list_payouts),
        )
        .route(
            "/payouts/{payout_request_id}/cancel",
            post(doctors::cancel_payout),
        )
        .route_layer(middleware::from_fn(rate_limiter))
        .layer(middleware::from_fn(identity_middleware));

    // Party-facing read routes (identity, no rate limiting)
    let party_read_routes = Router::new()
        .route("/refunds/history", get(patients::refund_history))
        .route("/warnings", get(doctors::refund_warnings))
        .route("/statistics/response-rate", get(doctors::response_rate))
        .route("/earnings", get(doctors::earnings_summary))
        .layer(middleware::from_fn(identity_middleware));

    // Operator routes; the gateway restricts access
    let admin_routes = Router::new()
        .route(
            "/admin/purchases/{purchase_id}/refund",
            post(admin::force_refund),
        )
        .route(
            "/admin/refunds/eligible",
            get(admin::list_eligible_purchases),
        )
        .route("/admin/refunds/statistics", get(admin::refund_statistics))
        .route(
            "/admin/earnings/{earning_id}/confirm",
            post(admin::confirm_earning),
        )
        .route(
            "/admin/payouts/{payout_request_id}/approve",
            post(admin::approve_payout),
        )
        .route(
            "/admin/payouts/{payout_request_id}/reject",
            post(admin::reject_payout),
        )
        .route(
            "/admin/payouts/{payout_request_id}/complete",
            post(admin::complete_payout),
        );

    // Collaborator routes (messaging mirror, session completion)
    let collaborator_routes = Router::new()
        .route(
            "/sessions/{session_request_id}/messages",
            post(sessions::record_message),
        )
        .route(
            "/purchases/{purchase_id}/complete",
            post(sessions::complete_purchase),
        );

    // Combine all routes with request/response body logging
    Router::new()
        .merge(party_mutation_routes)
        .merge(party_read_routes)
        .merge(admin_routes)
        .merge(collaborator_routes)
        .layer(middleware::from_fn(logging_middleware))
}
