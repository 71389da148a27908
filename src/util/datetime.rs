use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// 台灣時區 UTC+8
const TAIPEI_OFFSET_SECONDS: i32 = 8 * 3600;

/// A source of the current time.
///
/// Components that make time-based decisions (cache expiry, which trading
/// day to ask the exchange for) take a `Clock` so tests can pin the time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Returns the calendar date in Taipei for the given instant.
///
/// The exchange publishes by Taiwan trading day, so the date handed to
/// `STOCK_DAY` must not depend on the host's time zone.
pub fn taipei_date(now: DateTime<Local>) -> NaiveDate {
    match FixedOffset::east_opt(TAIPEI_OFFSET_SECONDS) {
        Some(tz) => now.with_timezone(&tz).date_naive(),
        None => now.date_naive(),
    }
}

/// Formats a date as `YYYYMMDD`, the form TWSE report endpoints expect.
pub fn to_ymd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Convert ROC year to Gregorian year.
pub fn to_gregorian_year(year: i32) -> Option<i32> {
    year.checked_add(1911)
}

/// Parse a date string in the format of ROC calendar
/// and return it as a NaiveDate in the Gregorian calendar.
pub fn parse_taiwan_date(date_str: &str) -> Option<NaiveDate> {
    let split_date: Vec<&str> = date_str.trim().split(['/', '-']).collect();
    if split_date.len() != 3 {
        return None;
    }

    let year = to_gregorian_year(parse_date_part::<i32>(split_date[0])?)?;
    let month = parse_date_part::<u32>(split_date[1])?;
    let day = parse_date_part::<u32>(split_date[2])?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Try to parse a string as a date part and return it as an Option.
fn parse_date_part<T: std::str::FromStr>(date_part_str: &str) -> Option<T> {
    date_part_str.parse::<T>().ok()
}
