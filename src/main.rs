use std::{env, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    client::{poller::Poller, WatchlistClient},
    config::SETTINGS,
    crawler::twse::Twse,
    gateway::Gateway,
    portfolio::PortfolioStore,
    util::datetime::SystemClock,
    web::AppState,
};

pub mod cache;
pub mod calculation;
pub mod client;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod gateway;
pub mod logging;
pub mod portfolio;
pub mod util;
pub mod web;

#[derive(Parser, Debug)]
#[command(name = "twse_watchlist", version, about = "台股自選股報價服務")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 啟動 HTTP 服務 (預設)
    Serve,
    /// 每隔一段時間輸出自選股報價
    Watch,
    /// 以代號或名稱搜尋上市股票
    Search { query: String },
    /// 加入自選股
    Add { symbol: String },
    /// 移除自選股
    Remove { symbol: String },
    /// 列出自選股
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Watch => {
            let poller = Poller::new(
                WatchlistClient::from_settings(),
                Duration::from_secs(SETTINGS.client.poll_seconds),
            );
            poller.run().await;
            Ok(())
        }
        Command::Search { query } => {
            for quote in WatchlistClient::from_settings().search(&query).await? {
                println!("{}", client::poller::render(&quote));
            }
            Ok(())
        }
        Command::Add { symbol } => {
            if !WatchlistClient::from_settings().add(&symbol).await? {
                println!("{} is already in the watchlist", symbol);
            }
            Ok(())
        }
        Command::Remove { symbol } => {
            if !WatchlistClient::from_settings().remove(&symbol).await? {
                println!("{} is not in the watchlist", symbol);
            }
            Ok(())
        }
        Command::List => {
            for symbol in WatchlistClient::from_settings().load_portfolio().await {
                println!("{}", symbol);
            }
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    logging::debug_file_async(format!("SETTINGS: {:#?}", *SETTINGS));

    let portfolio = PortfolioStore::from_settings();
    portfolio.ensure_initialized().await?;

    let gateway = Gateway::from_settings(Arc::new(Twse::from_settings()), Arc::new(SystemClock));

    logging::info_file_async(format!(
        "TwseWatchlist 已啟動 Rust OS/Arch: {}/{} portfolio: {}",
        env::consts::OS,
        env::consts::ARCH,
        portfolio.path().display()
    ));

    let state = AppState {
        portfolio: Arc::new(portfolio),
        gateway: Arc::new(gateway),
    };

    web::serve(SETTINGS.system.http_port, state).await
}
