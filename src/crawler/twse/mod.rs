use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{config::SETTINGS, crawler::MarketSource};

use self::{stock_day::DailyReport, stock_day_all::StockDayAll};

/// 個股日成交資訊
pub mod stock_day;
/// 上市個股日成交資訊(全部)
pub mod stock_day_all;

/// 證交所的兩個資料來源，根網址可由設定檔替換
#[derive(Debug, Clone)]
pub struct Twse {
    open_api_url: String,
    report_url: String,
}

impl Twse {
    pub fn new(open_api_url: impl Into<String>, report_url: impl Into<String>) -> Self {
        Twse {
            open_api_url: trim_slash(open_api_url.into()),
            report_url: trim_slash(report_url.into()),
        }
    }

    pub fn from_settings() -> Self {
        Self::new(
            SETTINGS.twse.open_api_url.clone(),
            SETTINGS.twse.report_url.clone(),
        )
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[async_trait]
impl MarketSource for Twse {
    async fn stock_day_all(&self) -> Result<Vec<StockDayAll>> {
        stock_day_all::visit(&self.open_api_url).await
    }

    async fn stock_day(&self, stock_code: &str, date: NaiveDate) -> Result<Option<DailyReport>> {
        stock_day::visit(&self.report_url, stock_code, date).await
    }
}
