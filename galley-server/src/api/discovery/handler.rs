//! Discovery API Handlers

use axum::{Json, extract::State};
use galley_printer::RemotePrinter;
use serde::Deserialize;
use shared::models::{PrinterConfig, UsbPrinterDevice};
use validator::Validate;

use crate::core::ServerState;
use crate::printing::CloudCredentials;
use crate::utils::{ApiResponse, AppResult, ValidJson};

#[derive(Debug, Deserialize, Validate)]
pub struct CloudDiscoveryRequest {
    #[validate(length(min = 1, max = 16), nested)]
    pub services: Vec<CloudCredentials>,
}

/// GET /discover
pub async fn network(State(state): State<ServerState>) -> Json<ApiResponse<Vec<PrinterConfig>>> {
    Json(ApiResponse::success(state.discovery.discover_network().await))
}

/// GET /discover/usb
pub async fn usb(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<UsbPrinterDevice>>>> {
    let devices = state.discovery.discover_usb().await?;
    Ok(Json(ApiResponse::success(devices)))
}

/// POST /discover/cloud
pub async fn cloud(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<CloudDiscoveryRequest>,
) -> Json<ApiResponse<Vec<PrinterConfig>>> {
    Json(ApiResponse::success(
        state.discovery.discover_cloud(&req.services).await,
    ))
}

/// POST /test/cloud
pub async fn test_cloud(
    State(state): State<ServerState>,
    ValidJson(creds): ValidJson<CloudCredentials>,
) -> AppResult<Json<ApiResponse<Vec<RemotePrinter>>>> {
    let printers = state.discovery.test_cloud(&creds).await?;
    Ok(Json(ApiResponse::success(printers)))
}
