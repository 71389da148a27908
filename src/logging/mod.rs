use std::{
    fmt::Write as _,
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
};

use chrono::{format::DelayedFormat, Local, NaiveDate};
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;

const LOG_DIR: &str = "log";
/// 累積到這個長度就寫入檔案一次
const FLUSH_THRESHOLD: usize = 2048;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 非同步檔案日誌，每個等級各自一個檔案與寫入線程。
///
/// 呼叫端只負責把訊息丟進 channel，實際的 I/O 交給背景線程處理，
/// 所以在 request handler 裡記錄錯誤不會卡住 tokio 的 worker。
pub struct Logger {
    info_writer: Option<Sender<String>>,
    warn_writer: Option<Sender<String>>,
    error_writer: Option<Sender<String>>,
    debug_writer: Option<Sender<String>>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        Logger {
            info_writer: Self::create_writer(&format!("{}_info", log_name)),
            warn_writer: Self::create_writer(&format!("{}_warn", log_name)),
            error_writer: Self::create_writer(&format!("{}_error", log_name)),
            debug_writer: Self::create_writer(&format!("{}_debug", log_name)),
        }
    }

    pub fn info(&self, log: String) {
        self.send(log, &self.info_writer);
    }

    pub fn warn(&self, log: String) {
        self.send(log, &self.warn_writer);
    }

    pub fn error(&self, log: String) {
        self.send(log, &self.error_writer);
    }

    pub fn debug(&self, log: String) {
        self.send(log, &self.debug_writer);
    }

    fn send(&self, msg: String, writer: &Option<Sender<String>>) {
        match writer {
            Some(w) => {
                if let Err(why) = w.send(msg) {
                    error_console(format!("Failed to send a log line because {:?}", why));
                }
            }
            // 無法建立日誌檔時改印到 console
            None => info_console(msg),
        }
    }

    fn create_writer(log_name: &str) -> Option<Sender<String>> {
        let today = Local::now().date_naive();
        let file = Self::open_log_file(log_name, today)?;
        let (tx, rx) = unbounded::<String>();
        let log_name = log_name.to_string();

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut opened_on = today;
            let mut writer = BufWriter::new(file);
            let mut line = String::with_capacity(FLUSH_THRESHOLD);

            for received in &rx {
                let now = Local::now();
                if writeln!(&mut line, "{} {}", now.format("%F %X%.6f"), received).is_err() {
                    continue;
                }

                if !rx.is_empty() && line.len() < FLUSH_THRESHOLD {
                    continue;
                }

                // 跨日後改寫到新日期的檔案
                let date = now.date_naive();
                if date != opened_on {
                    if let Some(f) = Self::open_log_file(&log_name, date) {
                        if let Err(why) = writer.flush() {
                            error_console(format!("Failed to flush log file. because:{:#?}", why));
                        }
                        writer = BufWriter::new(f);
                        opened_on = date;
                    }
                }

                if let Err(why) = writer.write_all(line.as_bytes()) {
                    error_console(format!(
                        "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                        why, line
                    ));
                }

                if let Err(why) = writer.flush() {
                    error_console(format!("Failed to flush log file. because:{:#?}", why));
                }

                line.clear();
            }
        });

        Some(tx)
    }

    fn open_log_file(log_name: &str, date: NaiveDate) -> Option<File> {
        let log_path = match Self::get_log_path(log_name, date) {
            Some(p) => p,
            None => {
                error_console(format!("Failed to create log directory for {}", log_name));
                return None;
            }
        };

        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(f) => Some(f),
            Err(why) => {
                error_console(format!(
                    "Failed to open log file {:?} because {:?}",
                    log_path, why
                ));
                None
            }
        }
    }

    /// log/<yyyy-mm-dd>_<name>.log
    fn get_log_path(name: &str, date: NaiveDate) -> Option<PathBuf> {
        let path = Path::new(LOG_DIR);

        if !path.exists() {
            fs::create_dir_all(path).ok()?;
        }

        let mut log_path = PathBuf::from(path);
        log_path.push(format!("{}_{}.log", date.format("%Y-%m-%d"), name));

        Some(log_path)
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_log_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let p = Logger::get_log_path("unit", date).unwrap();
        let file_name = p.file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(file_name, "2026-01-02_unit.log");
        assert_ne!(
            Logger::get_log_path("unit", date.succ_opt().unwrap()).unwrap(),
            p
        );
    }

    #[tokio::test]
    async fn test_named_logger_writes_file() {
        let logger = Logger::new("logging_test");
        logger.info("hello from test".to_string());
        tokio::time::sleep(Duration::from_millis(300)).await;

        let p = Logger::get_log_path("logging_test_info", Local::now().date_naive()).unwrap();
        let content = fs::read_to_string(p).unwrap();
        assert!(content.contains("hello from test"));
    }
}
