//! USB driver API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /drivers | GET | Catalog drivers with install state |
//! | /drivers/{id}/install | POST | Install one driver |
//! | /configure/usb | POST | Install the driver and register the printer |
//! | /models | GET | Supported models |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/drivers", get(handler::list))
        .route("/drivers/{id}/install", post(handler::install))
        .route("/configure/usb", post(handler::configure_usb))
        .route("/models", get(handler::models))
}
