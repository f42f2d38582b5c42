//! Driver API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{DriverInfo, PrinterConfig, PrinterModel, normalize_usb_id};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::core::ServerState;
use crate::printing::drivers;
use crate::utils::{ApiResponse, AppResult, ValidJson};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureUsbRequest {
    #[validate(custom(function = "validate_usb_id"))]
    pub vendor_id: String,
    #[validate(custom(function = "validate_usb_id"))]
    pub product_id: String,
    #[validate(length(min = 1, max = 255))]
    pub device_path: String,
}

fn validate_usb_id(value: &str) -> Result<(), ValidationError> {
    match normalize_usb_id(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("usb_id")
            .with_message(Cow::Borrowed("must be a 16-bit hex id"))),
    }
}

/// GET /drivers
pub async fn list(State(state): State<ServerState>) -> Json<ApiResponse<Vec<DriverInfo>>> {
    Json(ApiResponse::success(state.print_service.list_drivers()))
}

/// POST /drivers/{id}/install
pub async fn install(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DriverInfo>>> {
    let info = state.print_service.install_driver(&id).await?;
    Ok(Json(ApiResponse::success(info)))
}

/// POST /configure/usb
pub async fn configure_usb(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<ConfigureUsbRequest>,
) -> AppResult<Json<ApiResponse<PrinterConfig>>> {
    let printer = state
        .print_service
        .configure_usb_printer(&req.vendor_id, &req.product_id, &req.device_path)
        .await?;
    Ok(Json(ApiResponse::success(printer)))
}

/// GET /models
pub async fn models() -> Json<ApiResponse<Vec<PrinterModel>>> {
    Json(ApiResponse::success(drivers::models()))
}
