//! Print API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::OrderData;
use validator::Validate;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ValidJson};

/// Order plus optional target
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub order: OrderData,
    #[validate(length(min = 1, max = 64))]
    pub printer_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestPrintRequest {
    #[validate(length(min = 1, max = 64))]
    pub printer_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UsbTestRequest {
    #[validate(length(min = 1, max = 255))]
    pub device_path: String,
}

/// Transport outcome; `false` means the printer did not take the job
#[derive(Debug, Serialize)]
pub struct PrintOutcome {
    pub success: bool,
}

/// POST /print
pub async fn print_order(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<PrintRequest>,
) -> AppResult<Json<ApiResponse<PrintOutcome>>> {
    let success = state
        .print_service
        .print_order(&req.order, req.printer_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(PrintOutcome { success })))
}

/// POST /test
pub async fn test_print(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<TestPrintRequest>,
) -> AppResult<Json<ApiResponse<PrintOutcome>>> {
    let success = state.print_service.test_print(&req.printer_id).await?;
    Ok(Json(ApiResponse::success(PrintOutcome { success })))
}

/// POST /test/usb
pub async fn test_usb(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<UsbTestRequest>,
) -> Json<ApiResponse<PrintOutcome>> {
    let success = state.print_service.test_usb(&req.device_path).await;
    Json(ApiResponse::success(PrintOutcome { success }))
}
