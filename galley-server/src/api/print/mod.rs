//! Print API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /print | POST | Print an order (default printer unless `printerId`) |
//! | /test | POST | Test print on a registered printer |
//! | /test/usb | POST | Test print on an unregistered USB device |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/print", post(handler::print_order))
        .route("/test", post(handler::test_print))
        .route("/test/usb", post(handler::test_usb))
}
