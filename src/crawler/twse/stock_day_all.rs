use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{logging, util::http, util::text};

/// STOCK_DAY_ALL 的一筆資料，只保留用得到的欄位
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StockDayAll {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub closing_price: String,
    #[serde(default)]
    pub change: String,
}

impl StockDayAll {
    pub fn closing_price(&self) -> Decimal {
        text::parse_decimal_or_zero(&self.closing_price)
    }

    pub fn change(&self) -> Decimal {
        text::parse_decimal_or_zero(&self.change)
    }
}

/// 抓取上市公司每日收盤資訊(全部)
pub async fn visit(open_api_url: &str) -> Result<Vec<StockDayAll>> {
    let url = format!("{}/exchangeReport/STOCK_DAY_ALL", open_api_url);
    let rows = http::get_json::<Vec<StockDayAll>>(&url).await?;

    logging::info_file_async(format!("STOCK_DAY_ALL returned {} rows", rows.len()));

    Ok(rows)
}
