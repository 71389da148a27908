use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 上市股票在報價代號上的後綴，例如 2330.TW
pub const LISTED_SUFFIX: &str = ".TW";

/// 初次使用時的自選股：台積電、元大台灣50、聯發科
pub const DEFAULT_SYMBOLS: [&str; 3] = ["2330.TW", "0050.TW", "2454.TW"];

pub fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

/// 2330.TW => 2330
pub fn to_stock_code(symbol: &str) -> String {
    symbol.trim().replace(LISTED_SUFFIX, "")
}

/// 2330 => 2330.TW
pub fn to_symbol(code: &str) -> String {
    format!("{}{}", code, LISTED_SUFFIX)
}

/// 股票報價，欄位命名沿用前端卡片所使用的格式
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub regular_market_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub regular_market_change: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub regular_market_change_percent: Decimal,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub long_name: String,
}

impl Quote {
    pub fn new(code: &str, name: &str, price: Decimal, change: Decimal, percent: Decimal) -> Self {
        Quote {
            symbol: to_symbol(code),
            regular_market_price: price,
            regular_market_change: change,
            regular_market_change_percent: percent,
            short_name: name.to_string(),
            long_name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_symbol_conversion() {
        assert_eq!(to_stock_code(" 2330.TW "), "2330");
        assert_eq!(to_stock_code("0050"), "0050");
        assert_eq!(to_symbol("2454"), "2454.TW");
    }

    #[test]
    fn test_quote_json_shape() {
        let q = Quote::new("2330", "台積電", dec!(1005), dec!(-5.5), dec!(0));
        let json = serde_json::to_value(&q).unwrap();

        assert_eq!(json["symbol"], "2330.TW");
        assert_eq!(json["regularMarketPrice"], 1005.0);
        assert_eq!(json["regularMarketChange"], -5.5);
        assert_eq!(json["regularMarketChangePercent"], 0.0);
        assert_eq!(json["shortName"], "台積電");
        assert_eq!(json["longName"], "台積電");
    }
}
