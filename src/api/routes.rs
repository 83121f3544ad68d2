//! Route definitions for the broker.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::SharedState;

/// Create the main router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/ecpay", ecpay_router())
        .with_state(state)
}

/// Payment flow routes, nested under `/ecpay`
fn ecpay_router() -> Router<SharedState> {
    Router::new()
        .route("/create", post(handlers::checkout::create))
        .route("/return", post(handlers::notify::notify_return))
        .route(
            "/order_result",
            get(handlers::order_result::order_result).post(handlers::order_result::order_result),
        )
        .route("/download/:token", get(handlers::download::download))
}
