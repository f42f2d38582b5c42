//! Print configuration API
//!
//! `GET /config` returns the live snapshot; `POST /config` replaces it.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/config", get(handler::get).post(handler::replace))
}
