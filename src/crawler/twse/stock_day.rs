use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    logging,
    util::{datetime, http, text},
};

/// 每列欄位：日期、成交股數、成交金額、開盤價、最高價、最低價、收盤價、漲跌價差、成交筆數
const CLOSING_PRICE_INDEX: usize = 6;
const CHANGE_INDEX: usize = 7;

#[derive(Serialize, Deserialize, Debug)]
struct StockDayResponse {
    pub stat: Option<String>,
    pub data: Option<Vec<Vec<String>>>,
}

/// 個股最近一個交易日的收盤價與漲跌
#[derive(Debug, Clone, PartialEq)]
pub struct DailyReport {
    pub trade_date: Option<NaiveDate>,
    pub closing_price: Decimal,
    pub change: Decimal,
}

impl DailyReport {
    /// 從 STOCK_DAY 的一列資料轉換，欄位不足時回傳 None
    fn from_row(row: &[String]) -> Option<Self> {
        let closing_price = row.get(CLOSING_PRICE_INDEX)?;
        let change = row.get(CHANGE_INDEX)?;

        Some(DailyReport {
            trade_date: row.first().and_then(|d| datetime::parse_taiwan_date(d)),
            closing_price: text::parse_decimal_or_zero(closing_price),
            change: text::parse_decimal_or_zero(change),
        })
    }

    /// 這一列是否為指定日期的成交資訊
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.trade_date == Some(date)
    }
}

/// 抓取個股日成交資訊，回傳該月份最後一個交易日
pub async fn visit(report_url: &str, stock_code: &str, date: NaiveDate) -> Result<Option<DailyReport>> {
    let url = format!(
        "{}/exchangeReport/STOCK_DAY?response=json&date={}&stockNo={}",
        report_url,
        datetime::to_ymd(date),
        urlencoding::encode(stock_code)
    );

    let res = http::get_json::<StockDayResponse>(&url).await?;

    Ok(parse(stock_code, date, res))
}

fn parse(stock_code: &str, date: NaiveDate, res: StockDayResponse) -> Option<DailyReport> {
    if res.stat.as_deref() != Some("OK") {
        logging::warn_file_async(format!(
            "STOCK_DAY({}) stat is {:?}",
            stock_code, res.stat
        ));
        return None;
    }

    let last = res.data.as_ref()?.last()?;
    let report = match DailyReport::from_row(last) {
        Some(r) => r,
        None => {
            logging::warn_file_async(format!(
                "STOCK_DAY({}) row has too few columns: {:?}",
                stock_code, last
            ));
            return None;
        }
    };

    // 假日或盤中尚未收盤時，最後一列會是前一個交易日
    if !report.is_trading_day(date) {
        logging::debug_file_async(format!(
            "STOCK_DAY({}) latest row is {:?}, requested {}",
            stock_code, report.trade_date, date
        ));
    }

    Some(report)
}
