//! 證交所全部上市股票清單的記憶體快取。
//!
//! 搜尋與報價備援都讀同一份 STOCK_DAY_ALL，資料在存活時間內直接重用，
//! 過期後才重新向上游請求。快取只存在於行程生命週期內，重啟即清空。
//!
//! 讀寫以 `RwLock` 保護，但鎖不會跨越 `await`：同時有多個請求發現快取過期時，
//! 可能各自向上游請求一次，後寫入者覆蓋前者。

use std::{future::Future, sync::Arc, sync::RwLock, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::{crawler::twse::stock_day_all::StockDayAll, logging};

/// 快取內容與抓取時間
struct Snapshot {
    rows: Arc<Vec<StockDayAll>>,
    fetched_at: DateTime<Local>,
}

pub struct SearchCache {
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        SearchCache {
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// 回傳尚未過期的快取
    pub fn get_fresh(&self, now: DateTime<Local>) -> Option<Arc<Vec<StockDayAll>>> {
        let guard = self.snapshot.read().ok()?;
        let snapshot = guard.as_ref()?;
        let age = now.signed_duration_since(snapshot.fetched_at).to_std().ok();

        match age {
            Some(age) if age < self.ttl => Some(Arc::clone(&snapshot.rows)),
            // 時鐘倒退時 age 為負值，視同仍然有效
            None => Some(Arc::clone(&snapshot.rows)),
            _ => None,
        }
    }

    /// 回傳快取內容，不論是否過期
    pub fn get_stale(&self) -> Option<Arc<Vec<StockDayAll>>> {
        match self.snapshot.read() {
            Ok(guard) => guard.as_ref().map(|s| Arc::clone(&s.rows)),
            Err(_) => None,
        }
    }

    pub fn store(&self, rows: Vec<StockDayAll>, now: DateTime<Local>) -> Arc<Vec<StockDayAll>> {
        let rows = Arc::new(rows);
        if let Ok(mut guard) = self.snapshot.write() {
            *guard = Some(Snapshot {
                rows: Arc::clone(&rows),
                fetched_at: now,
            });
        }

        rows
    }

    /// 快取有效時直接回傳，否則呼叫 `fetch` 更新。
    ///
    /// 更新失敗時記錄錯誤並回傳舊資料(沒有舊資料則回傳空清單)，
    /// 抓取時間不會更新，下一次請求會再嘗試。
    pub async fn get_or_refresh<F, Fut>(&self, now: DateTime<Local>, fetch: F) -> Arc<Vec<StockDayAll>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<StockDayAll>>>,
    {
        if let Some(rows) = self.get_fresh(now) {
            return rows;
        }

        match fetch().await {
            Ok(rows) => self.store(rows, now),
            Err(why) => {
                logging::error_file_async(format!(
                    "Failed to fetch STOCK_DAY_ALL because {:?}",
                    why
                ));
                self.get_stale().unwrap_or_default()
            }
        }
    }
}
