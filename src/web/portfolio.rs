use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::{logging, web::error::ApiError, web::AppState};

const INVALID_REQUEST: &str = "Invalid request";
const INVALID_FORMAT: &str = "Invalid data format. \"symbols\" must be an array.";
const SAVE_FAILED: &str = "Failed to save data";

#[derive(Serialize)]
pub struct PortfolioBody {
    pub symbols: Vec<String>,
}

#[derive(Serialize)]
pub struct SavedBody {
    pub success: bool,
    pub symbols: Vec<String>,
}

/// GET /api/portfolio
pub async fn get_portfolio(State(state): State<AppState>) -> Json<PortfolioBody> {
    Json(PortfolioBody {
        symbols: state.portfolio.load().await,
    })
}

/// POST /api/portfolio，以整份清單覆寫
pub async fn post_portfolio(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SavedBody>, ApiError> {
    let symbols = parse_symbols(&body)?;

    if let Err(why) = state.portfolio.save(&symbols).await {
        logging::error_file_async(format!("Failed to save portfolio because {:?}", why));
        return Err(ApiError::Internal(SAVE_FAILED.to_string()));
    }

    Ok(Json(SavedBody {
        success: true,
        symbols,
    }))
}

/// 本體需為 `{"symbols": ["2330.TW", ...]}`
fn parse_symbols(body: &[u8]) -> Result<Vec<String>, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest(INVALID_REQUEST.to_string()))?;

    if value.is_null() {
        return Err(ApiError::BadRequest(INVALID_REQUEST.to_string()));
    }

    let items = value
        .get("symbols")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::BadRequest(INVALID_FORMAT.to_string()))?;

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ApiError::BadRequest(INVALID_FORMAT.to_string()))
}
