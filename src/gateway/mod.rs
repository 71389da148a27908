use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use rust_decimal::Decimal;

use crate::{
    cache::SearchCache,
    config::SETTINGS,
    crawler::{twse::stock_day_all::StockDayAll, MarketSource},
    declare::{self, Quote},
    logging,
    util::{
        datetime::{self, Clock},
        text,
    },
};

/// 單一股票報價的取得流程
pub mod quote;

/// 搜尋結果筆數上限
pub const SEARCH_LIMIT: usize = 10;

/// 搜尋與報價的入口，持有上游來源與全部上市清單的快取
pub struct Gateway {
    source: Arc<dyn MarketSource>,
    clock: Arc<dyn Clock>,
    cache: SearchCache,
}

impl Gateway {
    pub fn new(source: Arc<dyn MarketSource>, clock: Arc<dyn Clock>, cache_ttl: Duration) -> Self {
        Gateway {
            source,
            clock,
            cache: SearchCache::new(cache_ttl),
        }
    }

    pub fn from_settings(source: Arc<dyn MarketSource>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            source,
            clock,
            Duration::from_secs(SETTINGS.twse.search_cache_seconds),
        )
    }

    /// 全部上市股票清單，快取有效時不會向上游請求
    pub async fn listing(&self) -> Arc<Vec<StockDayAll>> {
        let source = Arc::clone(&self.source);
        self.cache
            .get_or_refresh(self.clock.now(), || async move { source.stock_day_all().await })
            .await
    }

    /// 以代號或名稱搜尋(不分大小寫)，最多回傳 [`SEARCH_LIMIT`] 筆。
    ///
    /// 清單檢視不計算漲跌幅，固定為 0。
    pub async fn search(&self, query: &str) -> Vec<Quote> {
        let rows = self.listing().await;
        let needle = query.to_lowercase();

        rows.iter()
            .filter(|row| {
                text::contains_ignore_case(&row.code, &needle)
                    || text::contains_ignore_case(&row.name, &needle)
            })
            .take(SEARCH_LIMIT)
            .map(|row| {
                Quote::new(
                    &row.code,
                    &row.name,
                    row.closing_price(),
                    row.change(),
                    Decimal::ZERO,
                )
            })
            .collect()
    }

    /// 取得多檔股票的最新報價，`symbols` 以逗號分隔，可帶或不帶 `.TW`。
    ///
    /// 每檔股票同時向上游請求，全部完成後依請求順序回傳；兩個來源都查不到的股票會被略過。
    pub async fn quotes(&self, symbols: &str) -> Vec<Quote> {
        let codes = parse_symbols(symbols);
        if codes.is_empty() {
            return vec![];
        }

        let rows = self.listing().await;
        let date = datetime::taipei_date(self.clock.now());
        let source = self.source.as_ref();

        let tasks = codes.iter().map(|code| {
            let listing = rows.iter().find(|row| &row.code == code);
            quote::resolve(source, code, date, listing)
        });

        let quotes: Vec<Quote> = join_all(tasks).await.into_iter().flatten().collect();

        if quotes.len() < codes.len() {
            logging::warn_file_async(format!(
                "Only {} of {} symbols resolved: {:?}",
                quotes.len(),
                codes.len(),
                codes
            ));
        }

        quotes
    }
}

/// "2330.TW, 0050.TW" => ["2330", "0050"]，空白項目會被忽略
fn parse_symbols(symbols: &str) -> Vec<String> {
    symbols
        .split(',')
        .map(declare::to_stock_code)
        .filter(|code| !code.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, TimeDelta};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::crawler::twse::stock_day::DailyReport;

    struct FakeClock(Mutex<DateTime<Local>>);

    impl FakeClock {
        fn advance(&self, seconds: i64) {
            let mut now = self.0.lock().unwrap();
            *now += TimeDelta::seconds(seconds);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Local> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct FakeSource {
        listing: Vec<StockDayAll>,
        reports: HashMap<String, DailyReport>,
        listing_fails: bool,
        listing_calls: AtomicUsize,
        report_calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketSource for FakeSource {
        async fn stock_day_all(&self) -> Result<Vec<StockDayAll>> {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if self.listing_fails {
                return Err(anyhow!("upstream down"));
            }
            Ok(self.listing.clone())
        }

        async fn stock_day(&self, code: &str, _: NaiveDate) -> Result<Option<DailyReport>> {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            match self.reports.get(code) {
                Some(r) => Ok(Some(r.clone())),
                None => Err(anyhow!("no report for {}", code)),
            }
        }
    }

    fn row(code: &str, name: &str, close: &str, change: &str) -> StockDayAll {
        StockDayAll {
            code: code.to_string(),
            name: name.to_string(),
            closing_price: close.to_string(),
            change: change.to_string(),
        }
    }

    fn listing() -> Vec<StockDayAll> {
        vec![
            row("0050", "元大台灣50", "195.50", "1.2500"),
            row("2330", "台積電", "1000.00", "-10.0000"),
            row("2454", "聯發科", "1400.00", "0.0000"),
            row("00631L", "元大台灣50正2", "250.00", "2.0000"),
        ]
    }

    fn gateway(source: FakeSource) -> (Gateway, Arc<FakeSource>, Arc<FakeClock>) {
        let source = Arc::new(source);
        let clock = Arc::new(FakeClock(Mutex::new(Local::now())));
        let gateway = Gateway::new(
            Arc::clone(&source) as Arc<dyn MarketSource>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Duration::from_secs(60),
        );
        (gateway, source, clock)
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(
            parse_symbols("2330.TW, 0050.TW,,2454"),
            vec!["2330", "0050", "2454"]
        );
        assert!(parse_symbols(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_code_and_name_case_insensitive() {
        let (gw, _, _) = gateway(FakeSource {
            listing: listing(),
            ..Default::default()
        });

        let by_code = gw.search("2330").await;
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].symbol, "2330.TW");
        assert_eq!(by_code[0].regular_market_price, dec!(1000));
        assert_eq!(by_code[0].regular_market_change, dec!(-10));
        assert_eq!(by_code[0].regular_market_change_percent, Decimal::ZERO);

        let by_name = gw.search("台灣50").await;
        assert_eq!(
            by_name.iter().map(|q| q.symbol.as_str()).collect::<Vec<_>>(),
            vec!["0050.TW", "00631L.TW"]
        );

        let lower = gw.search("00631l").await;
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].short_name, "元大台灣50正2");
    }

    #[tokio::test]
    async fn test_search_no_match_is_empty() {
        let (gw, _, _) = gateway(FakeSource {
            listing: listing(),
            ..Default::default()
        });

        assert!(gw.search("zzz").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let many = (0..25)
            .map(|i| row(&format!("11{:02}", i), "測試", "10", "0"))
            .collect();
        let (gw, _, _) = gateway(FakeSource {
            listing: many,
            ..Default::default()
        });

        let results = gw.search("11").await;
        assert_eq!(results.len(), SEARCH_LIMIT);
        assert_eq!(results[0].symbol, "1100.TW");
    }

    #[tokio::test]
    async fn test_listing_cached_for_ttl() {
        let (gw, source, clock) = gateway(FakeSource {
            listing: listing(),
            ..Default::default()
        });

        gw.search("2330").await;
        clock.advance(30);
        gw.search("2454").await;
        assert_eq!(source.listing_calls.load(Ordering::SeqCst), 1);

        clock.advance(30);
        gw.search("0050").await;
        assert_eq!(source.listing_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_quotes_pipeline() {
        let mut reports = HashMap::new();
        reports.insert(
            "2330".to_string(),
            DailyReport {
                trade_date: None,
                closing_price: dec!(105),
                change: dec!(5),
            },
        );
        let (gw, source, _) = gateway(FakeSource {
            listing: listing(),
            reports,
            ..Default::default()
        });

        let quotes = gw.quotes("2454.TW,2330.TW,9999.TW").await;

        // 9999 兩個來源都沒有，被略過；其餘依請求順序
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol, "2454.TW");
        assert_eq!(quotes[0].regular_market_price, dec!(1400));
        assert_eq!(quotes[1].symbol, "2330.TW");
        assert_eq!(quotes[1].short_name, "台積電");
        assert_eq!(quotes[1].regular_market_change_percent, dec!(5));
        assert_eq!(source.report_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_quotes_when_listing_unavailable() {
        let mut reports = HashMap::new();
        reports.insert(
            "2330".to_string(),
            DailyReport {
                trade_date: None,
                closing_price: dec!(1005),
                change: dec!(5),
            },
        );
        let (gw, _, _) = gateway(FakeSource {
            reports,
            listing_fails: true,
            ..Default::default()
        });

        let quotes = gw.quotes("2330.TW,2454.TW").await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].short_name, "2330");
        assert_eq!(quotes[0].regular_market_change_percent, dec!(0.5));
    }

    #[tokio::test]
    async fn test_quotes_empty_input_skips_upstream() {
        let (gw, source, _) = gateway(FakeSource::default());

        assert!(gw.quotes(" , ").await.is_empty());
        assert_eq!(source.listing_calls.load(Ordering::SeqCst), 0);
    }
}
