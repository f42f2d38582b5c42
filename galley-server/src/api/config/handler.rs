//! Print Config API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::{GlobalSettings, PrintConfigSnapshot, PrintTemplate, PrinterConfig};
use validator::Validate;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ValidJson};

/// Replacement body
///
/// `printers` is always replaced. Omitted `templates` or `settings` keep
/// their current values.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReplace {
    #[validate(nested)]
    pub printers: Vec<PrinterConfig>,
    #[validate(nested)]
    pub templates: Option<Vec<PrintTemplate>>,
    #[validate(nested)]
    pub settings: Option<GlobalSettings>,
}

/// GET /config
pub async fn get(State(state): State<ServerState>) -> Json<ApiResponse<PrintConfigSnapshot>> {
    Json(ApiResponse::success(state.print_service.config().await.redacted()))
}

/// POST /config
pub async fn replace(
    State(state): State<ServerState>,
    ValidJson(body): ValidJson<ConfigReplace>,
) -> AppResult<Json<ApiResponse<PrintConfigSnapshot>>> {
    let snapshot = state
        .print_service
        .replace_config(body.printers, body.templates, body.settings)
        .await?;
    Ok(Json(ApiResponse::success(snapshot.redacted())))
}
