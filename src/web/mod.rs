use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;

use crate::{gateway::Gateway, logging, portfolio::PortfolioStore};

pub mod error;
/// 自選股清單 API
pub mod portfolio;
/// 搜尋與報價 API
pub mod stocks;

#[derive(Clone)]
pub struct AppState {
    pub portfolio: Arc<PortfolioStore>,
    pub gateway: Arc<Gateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/portfolio",
            get(portfolio::get_portfolio).post(portfolio::post_portfolio),
        )
        .route(
            "/api/stocks",
            get(stocks::get_stocks).options(stocks::options_stocks),
        )
        .with_state(state)
}

/// 啟動 HTTP 服務，收到 Ctrl-C 後結束
pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(|why| {
        logging::error_file_async(format!("Failed to bind {:?} because {:?}", addr, why));
        why
    })?;

    logging::info_file_async(format!("HTTP 伺服器正在 {:?} 開始服務...", addr));
    logging::info_console(format!("listening on http://{}", addr));

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match &result {
        Ok(_) => logging::info_file_async(format!("HTTP 伺服器在 {:?} 正常停止", addr)),
        Err(why) => logging::error_file_async(format!(
            "HTTP 伺服器運行中斷 ({:?}): {}",
            addr, why
        )),
    }

    Ok(result?)
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        logging::error_file_async(format!("Failed to listen for ctrl_c because {:?}", why));
    }
}
