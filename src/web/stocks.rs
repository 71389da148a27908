use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{declare::Quote, logging, web::error::ApiError, web::AppState};

#[derive(Debug, Default, PartialEq)]
pub struct StocksParams {
    pub symbols: Option<String>,
    pub query: Option<String>,
}

impl StocksParams {
    /// 同一個參數出現多次時取第一個值，其餘參數忽略
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = StocksParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "symbols" => &mut params.symbols,
                "query" => &mut params.query,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        params
    }
}

#[derive(Serialize)]
pub struct SearchBody {
    pub results: Vec<Quote>,
}

#[derive(Serialize)]
pub struct QuotesBody {
    pub data: Vec<Quote>,
}

/// 允許任何來源的瀏覽器呼叫
fn cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /api/stocks?query=... 或 /api/stocks?symbols=...，兩者皆有時以 query 為準
pub async fn get_stocks(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let params = match pairs {
        Ok(Query(pairs)) => StocksParams::from_pairs(pairs),
        Err(why) => {
            logging::warn_file_async(format!("Invalid /api/stocks query because {}", why));
            return cors(ApiError::BadRequest("Invalid request".to_string()).into_response());
        }
    };

    if let Some(query) = non_empty(params.query) {
        let results = state.gateway.search(&query).await;
        return cors(Json(SearchBody { results }).into_response());
    }

    if let Some(symbols) = non_empty(params.symbols) {
        let data = state.gateway.quotes(&symbols).await;
        return cors(Json(QuotesBody { data }).into_response());
    }

    cors(ApiError::BadRequest("No symbols or query provided".to_string()).into_response())
}

/// OPTIONS /api/stocks
pub async fn options_stocks() -> Response {
    cors(Json(serde_json::json!({})).into_response())
}
