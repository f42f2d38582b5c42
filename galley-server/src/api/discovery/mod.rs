//! Discovery API
//!
//! Results are candidates only; nothing is registered.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/discover", get(handler::network))
        .route("/discover/usb", get(handler::usb))
        .route("/discover/cloud", post(handler::cloud))
        .route("/test/cloud", post(handler::test_cloud))
}
