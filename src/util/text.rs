use std::str::FromStr;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

/// 數字欄位裡常見的雜訊字元：千分位、空白、正號，以及證交所標記除權息用的 X
const NUMBER_ESCAPE_CHAR: &[char] = &[',', ' ', '+', '"', '\n', 'X', 'x'];

/// Parses a decimal value from a given string.
///
/// Thousands separators, blanks, an explicit `+` sign and the exchange's `X`
/// marker are removed before parsing.
///
/// # Example
///
/// ```
/// let d = parse_decimal("1,234.56").unwrap();
/// ```
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Like [`parse_decimal`] but maps anything unparsable (`--`, empty cells) to zero.
pub fn parse_decimal_or_zero(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or(Decimal::ZERO)
}

/// Removes the number escape characters from a given string.
pub(crate) fn clean_escape_chars(s: &str) -> String {
    s.chars().filter(|c| !NUMBER_ESCAPE_CHAR.contains(c)).collect()
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1,005.00").unwrap(), dec!(1005));
        assert_eq!(parse_decimal("+10.0").unwrap(), dec!(10));
        assert_eq!(parse_decimal("-5.50").unwrap(), dec!(-5.5));
        assert_eq!(parse_decimal("X0.00").unwrap(), dec!(0));
        assert_eq!(parse_decimal(" 0.0000").unwrap(), dec!(0));
        assert!(parse_decimal("--").is_err());
    }

    #[test]
    fn test_parse_decimal_or_zero() {
        assert_eq!(parse_decimal_or_zero("--"), Decimal::ZERO);
        assert_eq!(parse_decimal_or_zero(""), Decimal::ZERO);
        assert_eq!(parse_decimal_or_zero("580.00"), dec!(580));
    }

    #[test]
    fn test_clean_escape_chars() {
        assert_eq!(clean_escape_chars("\"1,234\"\n"), "1234");
        assert_eq!(clean_escape_chars("X+0.50"), "0.50");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Yuanta Taiwan 50", "taiwan"));
        assert!(contains_ignore_case("台積電", "積"));
        assert!(!contains_ignore_case("2330", "2454"));
    }
}
