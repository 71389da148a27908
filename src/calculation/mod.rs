use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 以收盤價與漲跌反推昨收，再計算漲跌幅(%)
///
/// 昨收 = 收盤價 - 漲跌，漲跌幅 = 漲跌 / 昨收 * 100；昨收為 0 時回傳 0。
pub fn change_percent(close: Decimal, change: Decimal) -> Decimal {
    let previous_close = close - change;
    if previous_close.is_zero() {
        return Decimal::ZERO;
    }

    change / previous_close * dec!(100)
}
