use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::crawler::twse::{stock_day::DailyReport, stock_day_all::StockDayAll};

/// 台灣證券交易所
pub mod twse;

/// 行情來源
///
/// gateway 只依賴這個 trait，測試時可以換成假的來源並計算呼叫次數。
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// 全部上市股票當日收盤資訊
    async fn stock_day_all(&self) -> Result<Vec<StockDayAll>>;
    /// 個股在指定日期所屬月份的最後一個交易日行情，查無資料時回傳 `None`
    async fn stock_day(&self, stock_code: &str, date: NaiveDate) -> Result<Option<DailyReport>>;
}
