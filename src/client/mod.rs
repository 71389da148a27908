use anyhow::{anyhow, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{
    config::SETTINGS,
    declare::{self, Quote},
    logging,
    util::http,
};

/// 定時更新自選股報價
pub mod poller;

#[derive(Serialize, Deserialize, Debug)]
struct PortfolioBody {
    symbols: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct SavedBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    symbols: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct SearchBody {
    #[serde(default)]
    results: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct QuotesBody {
    #[serde(default)]
    data: Vec<Quote>,
}

/// 呼叫自選股服務的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct WatchlistClient {
    base_url: String,
}

impl WatchlistClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        WatchlistClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings() -> Self {
        Self::new(SETTINGS.client.server_url.clone())
    }

    /// 取得自選股清單，服務無法連線時使用預設清單
    pub async fn load_portfolio(&self) -> Vec<String> {
        let url = format!("{}/api/portfolio", self.base_url);
        match http::get_json::<PortfolioBody>(&url).await {
            Ok(body) => body.symbols,
            Err(why) => {
                logging::error_file_async(format!("Failed to load portfolio because {:?}", why));
                declare::default_symbols()
            }
        }
    }

    pub async fn save_portfolio(&self, symbols: &[String]) -> Result<Vec<String>> {
        let url = format!("{}/api/portfolio", self.base_url);
        let req = PortfolioBody {
            symbols: symbols.to_vec(),
        };
        let res = http::post_use_json::<PortfolioBody, SavedBody>(&url, &req).await?;
        if !res.success {
            return Err(anyhow!("The server refused to save the portfolio"));
        }

        Ok(res.symbols)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Quote>> {
        let url = format!(
            "{}/api/stocks?query={}",
            self.base_url,
            urlencoding::encode(query)
        );

        Ok(http::get_json::<SearchBody>(&url).await?.results)
    }

    /// 取得報價，加上時間戳避免中間層快取
    pub async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        if symbols.is_empty() {
            return Ok(vec![]);
        }

        let url = format!(
            "{}/api/stocks?symbols={}&t={}",
            self.base_url,
            urlencoding::encode(&symbols.join(",")),
            Local::now().timestamp_millis()
        );

        Ok(http::get_json::<QuotesBody>(&url).await?.data)
    }

    /// 加入自選股，已存在時不做任何事。回傳是否有變更
    pub async fn add(&self, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol);
        let mut symbols = self.load_portfolio().await;
        if symbols.contains(&symbol) {
            return Ok(false);
        }

        symbols.push(symbol);
        self.save_portfolio(&symbols).await?;

        Ok(true)
    }

    /// 移除自選股。回傳是否有變更
    pub async fn remove(&self, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol);
        let symbols = self.load_portfolio().await;
        let remaining: Vec<String> = symbols.iter().filter(|s| **s != symbol).cloned().collect();
        if remaining.len() == symbols.len() {
            return Ok(false);
        }

        self.save_portfolio(&remaining).await?;

        Ok(true)
    }
}

/// 2330 => 2330.TW；已有後綴的保持不變
pub fn normalize_symbol(symbol: &str) -> String {
    declare::to_symbol(&declare::to_stock_code(symbol).to_uppercase())
}
