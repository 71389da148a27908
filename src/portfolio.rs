use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::{config::SETTINGS, declare, logging};

/// 自選股清單，整份以 json 陣列存放在單一檔案內
///
/// 每次儲存都整份覆寫，不做差異比對也不加鎖；同時寫入時以最後一次為準。
#[derive(Debug, Clone)]
pub struct PortfolioStore {
    path: PathBuf,
}

impl PortfolioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PortfolioStore { path: path.into() }
    }

    pub fn from_settings() -> Self {
        Self::new(&SETTINGS.system.portfolio_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 檔案不存在時寫入預設的自選股，只在啟動時呼叫一次
    pub async fn ensure_initialized(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }

        logging::info_file_async(format!(
            "{} not found, seeding default symbols",
            self.path.display()
        ));

        self.save(&declare::default_symbols()).await
    }

    /// 讀取自選股清單，任何讀取或解析失敗都回傳預設清單
    pub async fn load(&self) -> Vec<String> {
        match self.read().await {
            Ok(symbols) => symbols,
            Err(why) => {
                logging::error_file_async(format!(
                    "Failed to read {} because {:?}",
                    self.path.display(),
                    why
                ));
                declare::default_symbols()
            }
        }
    }

    async fn read(&self) -> Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str::<Vec<String>>(&content)
            .map_err(|why| anyhow!("content is not an array of symbols: {:?}", why))
    }

    /// 以整份清單覆寫檔案
    pub async fn save(&self, symbols: &[String]) -> Result<()> {
        let json = serde_json::to_string_pretty(symbols)?;

        tokio::fs::write(&self.path, json).await.map_err(|why| {
            logging::error_file_async(format!(
                "Failed to write {} because {:?}",
                self.path.display(),
                why
            ));
            anyhow!("Failed to write {}: {}", self.path.display(), why)
        })
    }
}
