//! Printer API Handlers
//!
//! Cloud API keys never leave the server; responses carry the mask.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{PrinterConfig, PrinterCreate, PrinterUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ValidJson};

/// GET /printers
pub async fn list(State(state): State<ServerState>) -> Json<ApiResponse<Vec<PrinterConfig>>> {
    let printers = state.print_service.list().await;
    Json(ApiResponse::success(
        printers.iter().map(PrinterConfig::redacted).collect(),
    ))
}

/// GET /printers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PrinterConfig>>> {
    let printer = state.print_service.get(&id).await?;
    Ok(Json(ApiResponse::success(printer.redacted())))
}

/// POST /printers
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<PrinterCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<PrinterConfig>>)> {
    let printer = state.print_service.add(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(printer.redacted()))))
}

/// PUT /printers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<PrinterUpdate>,
) -> AppResult<Json<ApiResponse<PrinterConfig>>> {
    let printer = state.print_service.update(&id, payload).await?;
    Ok(Json(ApiResponse::success(printer.redacted())))
}

/// DELETE /printers/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PrinterConfig>>> {
    let printer = state.print_service.delete(&id).await?;
    Ok(Json(ApiResponse::success_with_message("Printer deleted", printer.redacted())))
}
