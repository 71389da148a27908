use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::logging;

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub twse: Twse,
    #[serde(default)]
    pub client: Client,
}

const SYSTEM_HTTP_PORT: &str = "SYSTEM_HTTP_PORT";
const SYSTEM_PORTFOLIO_FILE: &str = "SYSTEM_PORTFOLIO_FILE";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// 自選股清單存放的 json 檔
    #[serde(default = "default_portfolio_file")]
    pub portfolio_file: String,
}

impl Default for System {
    fn default() -> Self {
        System {
            http_port: default_http_port(),
            portfolio_file: default_portfolio_file(),
        }
    }
}

fn default_http_port() -> u16 {
    3000
}

fn default_portfolio_file() -> String {
    "stocks.json".to_string()
}

const TWSE_OPEN_API_URL: &str = "TWSE_OPEN_API_URL";
const TWSE_REPORT_URL: &str = "TWSE_REPORT_URL";
const TWSE_SEARCH_CACHE_SECONDS: &str = "TWSE_SEARCH_CACHE_SECONDS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Twse {
    /// 證交所 OpenAPI 的根網址，全部上市股票日成交資訊 (STOCK_DAY_ALL) 由此取得
    #[serde(default = "default_open_api_url")]
    pub open_api_url: String,
    /// 個股日成交資訊 (STOCK_DAY) 的根網址
    #[serde(default = "default_report_url")]
    pub report_url: String,
    #[serde(default = "default_search_cache_seconds")]
    pub search_cache_seconds: u64,
}

impl Default for Twse {
    fn default() -> Self {
        Twse {
            open_api_url: default_open_api_url(),
            report_url: default_report_url(),
            search_cache_seconds: default_search_cache_seconds(),
        }
    }
}

fn default_open_api_url() -> String {
    "https://openapi.twse.com.tw/v1".to_string()
}

fn default_report_url() -> String {
    "https://www.twse.com.tw".to_string()
}

fn default_search_cache_seconds() -> u64 {
    60
}

const CLIENT_SERVER_URL: &str = "CLIENT_SERVER_URL";
const CLIENT_POLL_SECONDS: &str = "CLIENT_POLL_SECONDS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Client {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,
}

impl Default for Client {
    fn default() -> Self {
        Client {
            server_url: default_server_url(),
            poll_seconds: default_poll_seconds(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poll_seconds() -> u64 {
    10
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| {
    App::get().unwrap_or_else(|why| {
        logging::error_file_async(format!(
            "I can't read the config context because {:?}",
            why
        ));
        App::default().override_with_env()
    })
});

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(port) = env::var(SYSTEM_HTTP_PORT) {
            self.system.http_port = u16::from_str(&port).unwrap_or(self.system.http_port);
        }

        if let Ok(file) = env::var(SYSTEM_PORTFOLIO_FILE) {
            self.system.portfolio_file = file;
        }

        if let Ok(url) = env::var(TWSE_OPEN_API_URL) {
            self.twse.open_api_url = url;
        }

        if let Ok(url) = env::var(TWSE_REPORT_URL) {
            self.twse.report_url = url;
        }

        if let Ok(seconds) = env::var(TWSE_SEARCH_CACHE_SECONDS) {
            self.twse.search_cache_seconds =
                u64::from_str(&seconds).unwrap_or(self.twse.search_cache_seconds);
        }

        if let Ok(url) = env::var(CLIENT_SERVER_URL) {
            self.client.server_url = url;
        }

        if let Ok(seconds) = env::var(CLIENT_POLL_SECONDS) {
            self.client.poll_seconds = u64::from_str(&seconds).unwrap_or(self.client.poll_seconds);
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
