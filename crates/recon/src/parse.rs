//! Accounting number and spreadsheet date parsing.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::AmountFormat;

/// Amounts at or above this magnitude are rejected. Sums of any number of
/// rows a sheet can hold then stay inside `Decimal`'s range.
pub const AMOUNT_LIMIT: u64 = 1_000_000_000_000_000_000;

fn within_limit(value: Decimal) -> Option<Decimal> {
    (value.abs() < Decimal::from(AMOUNT_LIMIT)).then_some(value)
}

/// Parse an amount as accountants write it.
///
/// Accepts `1,234.56`, `(1,234.56)`, `-1234.56`, `1234.56-`, `$1,234.56`,
/// `1 234,56` (with `,` as the decimal separator), `1234.56 CR` / `DR`,
/// and scientific notation from spreadsheet float cells. Parentheses, a
/// minus sign and a `CR` suffix each negate; two negations cancel.
/// Returns `None` for empty or unparseable text and for magnitudes at or
/// above [`AMOUNT_LIMIT`].
pub fn parse_amount(raw: &str, format: &AmountFormat) -> Option<Decimal> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;

    let upper = s.to_ascii_uppercase();
    if upper.ends_with("CR") {
        negative = !negative;
        s = s[..s.len() - 2].trim_end();
    } else if upper.ends_with("DR") {
        s = s[..s.len() - 2].trim_end();
    }

    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        negative = !negative;
        s = s[1..s.len() - 1].trim();
    }

    if let Some(rest) = s.strip_suffix('-') {
        negative = !negative;
        s = rest.trim_end();
    }

    let mut cleaned = String::with_capacity(s.len());
    let mut seen_digit = false;
    for c in s.chars() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                cleaned.push(c);
            }
            '-' | '+' if !seen_digit && cleaned.is_empty() => cleaned.push(c),
            'e' | 'E' if seen_digit => cleaned.push('e'),
            '-' | '+' if cleaned.ends_with('e') => cleaned.push(c),
            c if c == format.decimal_separator => cleaned.push('.'),
            ',' | '.' | '\'' | ' ' | '\u{a0}' | '\u{202f}' => {}
            '$' | '€' | '£' | '¥' | '₹' if !seen_digit => {}
            _ => return None,
        }
    }

    if !seen_digit {
        return None;
    }

    let value = if cleaned.contains('e') {
        Decimal::from_scientific(&cleaned).ok()?
    } else {
        Decimal::from_str(&cleaned).ok()?
    };

    within_limit(if negative { -value } else { value })
}

/// Parse the text of a numeric spreadsheet cell: plain or scientific float
/// output with `.` as the decimal point, whatever the configured separator.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let value = Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()?;
    within_limit(value)
}

/// Excel's day zero for the 1900 date system (accounts for the 1900 leap-year bug).
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Serials outside this range are treated as not-a-date.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0; // 9999-12-31

/// Parse a date cell: an Excel serial number (what the reader emits for date
/// cells) or text in one of the configured formats.
pub fn parse_date(raw: &str, format: &AmountFormat) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(serial) = s.parse::<f64>() {
        if (1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
            return excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64));
        }
        return None;
    }

    for fmt in &format.date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn amt(s: &str) -> Option<Decimal> {
        parse_amount(s, &AmountFormat::default())
    }

    #[test]
    fn plain_and_signed() {
        assert_eq!(amt("1000"), Some(dec("1000")));
        assert_eq!(amt("1000.50"), Some(dec("1000.50")));
        assert_eq!(amt("-42.1"), Some(dec("-42.1")));
        assert_eq!(amt("+7"), Some(dec("7")));
        assert_eq!(amt("  12 "), Some(dec("12")));
    }

    #[test]
    fn accounting_formats() {
        assert_eq!(amt("(1,234.56)"), Some(dec("-1234.56")));
        assert_eq!(amt("1,234,567.89"), Some(dec("1234567.89")));
        assert_eq!(amt("1234.56-"), Some(dec("-1234.56")));
        assert_eq!(amt("$1,000.00"), Some(dec("1000.00")));
        assert_eq!(amt("-$5.00"), Some(dec("-5.00")));
        assert_eq!(amt("$-5.00"), Some(dec("-5.00")));
        assert_eq!(amt("(€ 300)"), Some(dec("-300")));
        assert_eq!(amt("250.00 CR"), Some(dec("-250.00")));
        assert_eq!(amt("250.00 DR"), Some(dec("250.00")));
        assert_eq!(amt("(250.00) CR"), Some(dec("250.00")));
    }

    #[test]
    fn european_separator() {
        let format = AmountFormat {
            decimal_separator: ',',
            ..AmountFormat::default()
        };
        assert_eq!(parse_amount("1.234,56", &format), Some(dec("1234.56")));
        assert_eq!(parse_amount("(1 234,5)", &format), Some(dec("-1234.5")));
    }

    #[test]
    fn numeric_cells_ignore_separator_setting() {
        let format = AmountFormat {
            decimal_separator: ',',
            ..AmountFormat::default()
        };
        // text "1000.5" under ',' reads the '.' as grouping
        assert_eq!(parse_amount("1000.5", &format), Some(dec("10005")));
        assert_eq!(parse_number("1000.5"), Some(dec("1000.5")));
        assert_eq!(parse_number("-0.3"), Some(dec("-0.3")));
        assert_eq!(parse_number("1.5e3"), Some(dec("1500")));
        assert_eq!(parse_number("4000"), Some(dec("4000")));
        assert_eq!(parse_number("#DIV/0!"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn huge_amounts_rejected() {
        assert_eq!(amt("79228162514264337593543950335"), None);
        assert_eq!(amt("1000000000000000000"), None);
        assert_eq!(amt("(1,000,000,000,000,000,000)"), None);
        assert_eq!(amt("999999999999999999.99"), Some(dec("999999999999999999.99")));
        assert_eq!(parse_number("1e20"), None);
        assert_eq!(parse_number("100000000000000000000"), None);
    }

    #[test]
    fn scientific_from_float_cells() {
        assert_eq!(amt("1.5e3"), Some(dec("1500")));
        assert_eq!(amt("2E-2"), Some(dec("0.02")));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(amt(""), None);
        assert_eq!(amt("n/a"), None);
        assert_eq!(amt("12abc"), None);
        assert_eq!(amt("()"), None);
        assert_eq!(amt("#DIV/0!"), None);
    }

    #[test]
    fn dates_from_serial_and_text() {
        let f = AmountFormat::default();
        let jan15 = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(parse_date("46037", &f), Some(jan15));
        assert_eq!(parse_date("46037.75", &f), Some(jan15));
        assert_eq!(parse_date("2026-01-15", &f), Some(jan15));
        assert_eq!(parse_date("2026-01-15 13:45:00", &f), Some(jan15));
        assert_eq!(parse_date("15/01/2026", &f), Some(jan15));
        assert_eq!(parse_date("15.01.2026", &f), Some(jan15));
        assert_eq!(parse_date("15-Jan-2026", &f), Some(jan15));
        assert_eq!(parse_date("yesterday", &f), None);
        assert_eq!(parse_date("-3", &f), None);
        assert_eq!(parse_date("", &f), None);
    }
}
