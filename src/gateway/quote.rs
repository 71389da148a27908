use chrono::NaiveDate;

use crate::{
    calculation,
    crawler::{twse::stock_day_all::StockDayAll, MarketSource},
    declare::Quote,
    logging,
};

/// 取得單一股票報價：先查個股日成交資訊，失敗再用全部上市清單的收盤資料，兩者皆無則略過。
///
/// 名稱一律優先取自全部上市清單，找不到時以股票代號代替。
pub async fn resolve(
    source: &dyn MarketSource,
    stock_code: &str,
    date: NaiveDate,
    listing: Option<&StockDayAll>,
) -> Option<Quote> {
    let name = listing.map_or(stock_code, |l| l.name.as_str());

    match source.stock_day(stock_code, date).await {
        Ok(Some(report)) => {
            return Some(Quote::new(
                stock_code,
                name,
                report.closing_price,
                report.change,
                calculation::change_percent(report.closing_price, report.change),
            ));
        }
        Ok(None) => {
            logging::warn_file_async(format!(
                "STOCK_DAY({}) has no data for {}, falling back to STOCK_DAY_ALL",
                stock_code, date
            ));
        }
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to fetch STOCK_DAY({}) because {:?}",
                stock_code, why
            ));
        }
    }

    listing.map(from_listing)
}

/// 以全部上市清單的收盤價與漲跌組成報價
pub fn from_listing(listing: &StockDayAll) -> Quote {
    let close = listing.closing_price();
    let change = listing.change();

    Quote::new(
        &listing.code,
        &listing.name,
        close,
        change,
        calculation::change_percent(close, change),
    )
}
