use std::time::Duration;

use chrono::Local;
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::time::{interval, MissedTickBehavior};

use crate::{client::WatchlistClient, declare::Quote, logging};

/// 以固定間隔輪詢報價並輸出到 console，失敗時不退避，下一輪照常執行
pub struct Poller {
    client: WatchlistClient,
    every: Duration,
}

impl Poller {
    pub fn new(client: WatchlistClient, every: Duration) -> Self {
        Poller { client, every }
    }

    /// 持續輪詢直到行程結束，每一輪都重新讀取自選股清單
    pub async fn run(&self) {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let symbols = self.client.load_portfolio().await;
            for line in self.poll_once(&symbols).await {
                println!("{}", line);
            }
        }
    }

    /// 取一次報價並轉成要顯示的文字，清單為空時不發出請求
    pub async fn poll_once(&self, symbols: &[String]) -> Vec<String> {
        if symbols.is_empty() {
            return vec![];
        }

        match self.client.quotes(symbols).await {
            Ok(quotes) => {
                let mut lines = Vec::with_capacity(quotes.len() + 1);
                lines.push(format!("Last updated {}", Local::now().format("%H:%M:%S")));
                lines.extend(quotes.iter().map(render));
                lines
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to poll quotes because {:?}", why));
                vec![format!("Failed to fetch: {}", why)]
            }
        }
    }
}

/// 一張報價卡：代號、名稱、價格、漲跌、漲跌幅
pub fn render(quote: &Quote) -> String {
    let name = if quote.short_name.is_empty() {
        quote.long_name.as_str()
    } else {
        quote.short_name.as_str()
    };

    format!(
        "{:<10} {:<12} {:>10} {:>+9} ({:>+.2}%)",
        quote.symbol,
        name,
        round2(quote.regular_market_price),
        round2(quote.regular_market_change),
        round2(quote.regular_market_change_percent)
    )
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_render() {
        let quote = Quote::new("2330", "台積電", dec!(1005), dec!(5), dec!(0.5));
        let line = render(&quote);

        assert!(line.starts_with("2330.TW"));
        assert!(line.contains("台積電"));
        assert!(line.contains("+5"));
        assert!(line.contains("(+0.50%)"));
    }

    #[test]
    fn test_render_negative() {
        let quote = Quote::new("2454", "聯發科", dec!(1390), dec!(-10), dec!(-0.714285));
        assert!(render(&quote).contains("(-0.71%)"));
    }

    #[tokio::test]
    async fn test_poll_once_empty_watchlist_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let poller = Poller::new(WatchlistClient::new(server.uri()), Duration::from_secs(10));
        assert!(poller.poll_once(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_poll_once_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"x"}"#))
            .mount(&server)
            .await;

        let poller = Poller::new(WatchlistClient::new(server.uri()), Duration::from_secs(10));
        let lines = poller.poll_once(&["2330.TW".to_string()]).await;

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Failed to fetch"));
    }
}
