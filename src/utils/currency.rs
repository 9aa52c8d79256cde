// src/utils/currency.rs - Exact-decimal currency parsing and formatting
use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a currency string like `$1,234.50` into an exact decimal.
/// Strips an optional `$` prefix and thousands separators. Anything
/// that does not parse cleanly after stripping is an error; silently
/// coercing to zero would corrupt aggregated sums.
pub fn parse_currency(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().replace('$', "").replace(',', "");
    if cleaned.is_empty() {
        return Err(anyhow!("Empty currency value"));
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Cannot parse '{}' as currency", raw))
}

/// Format an amount as `$1,234.50`: dollar sign, thousands
/// separators, always two decimal places.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let plain = format!("{:.2}", rounded);

    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_dollar_and_commas() {
        assert_eq!(
            parse_currency("$1,234.50").unwrap(),
            Decimal::from_str("1234.50").unwrap()
        );
        assert_eq!(
            parse_currency("12.5").unwrap(),
            Decimal::from_str("12.5").unwrap()
        );
        assert_eq!(parse_currency(" $0.00 ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_currency("abc").is_err());
        assert!(parse_currency("").is_err());
        assert!(parse_currency("$").is_err());
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(
            format_currency(Decimal::from_str("1234567.5").unwrap()),
            "$1,234,567.50"
        );
        assert_eq!(format_currency(Decimal::from_str("999.99").unwrap()), "$999.99");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
        assert_eq!(
            format_currency(Decimal::from_str("1000").unwrap()),
            "$1,000.00"
        );
    }

    #[test]
    fn test_round_trip_keeps_exact_cents() {
        let parsed = parse_currency("$12.50").unwrap() + parse_currency("$5.00").unwrap();
        assert_eq!(format_currency(parsed), "$17.50");
    }
}
