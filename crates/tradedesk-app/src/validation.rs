// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::CURRENCIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Required,
    InvalidMoney,
    NegativeMoney,
    InvalidInt,
    InvalidPercent,
    OutOfRange,
    InvalidEmail,
    InvalidUrl,
    InvalidCurrency,
    InvalidPhone,
    InvalidTradingPair,
    InvalidFlag,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::InvalidMoney => f.write_str("must be an amount like 1,250.00"),
            Self::NegativeMoney => f.write_str("must not be negative"),
            Self::InvalidInt => f.write_str("must be a whole number"),
            Self::InvalidPercent => f.write_str("must be a percentage between 0 and 100"),
            Self::OutOfRange => f.write_str("is out of range"),
            Self::InvalidEmail => f.write_str("must be a valid email address"),
            Self::InvalidUrl => f.write_str("must start with http:// or https://"),
            Self::InvalidCurrency => f.write_str("must be one of USD, EUR, GBP, CHF, JPY"),
            Self::InvalidPhone => f.write_str("must be a phone number with 7 to 15 digits"),
            Self::InvalidTradingPair => f.write_str("must look like BTC/USDT"),
            Self::InvalidFlag => f.write_str("must be yes or no"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub fn require_text(input: &str) -> ValidationResult<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(trimmed)
}

/// Parses a non-negative money amount such as `1,250.5` or `$99` into cents.
pub fn parse_cents(input: &str) -> ValidationResult<i64> {
    let clean = input.trim().replace(',', "");
    if clean.is_empty() {
        return Err(ValidationError::Required);
    }
    if clean.starts_with('-') {
        return Err(ValidationError::NegativeMoney);
    }

    let clean = clean.strip_prefix('$').unwrap_or(&clean);
    let (whole, frac) = match clean.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (clean, None),
    };
    if whole.is_empty() && frac.is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidMoney);
    }

    let whole = parse_digits(whole, true)?;
    if whole > i64::MAX / 100 {
        return Err(ValidationError::InvalidMoney);
    }
    let frac = match frac {
        None => 0,
        Some(digits) if digits.len() > 2 => return Err(ValidationError::InvalidMoney),
        Some(digits) => {
            let value = parse_digits(digits, false)?;
            if digits.len() == 1 { value * 10 } else { value }
        }
    };

    whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(frac))
        .ok_or(ValidationError::InvalidMoney)
}

pub fn parse_positive_cents(input: &str) -> ValidationResult<i64> {
    let cents = parse_cents(input)?;
    if cents == 0 {
        return Err(ValidationError::OutOfRange);
    }
    Ok(cents)
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!(
        "{sign}{}.{:02}",
        comma_format(magnitude / 100),
        magnitude % 100
    )
}

/// Plain decimal rendering used to seed edit forms.
pub fn format_cents_plain(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

pub fn parse_percent(input: &str) -> ValidationResult<f64> {
    let trimmed = input.trim().trim_end_matches('%').trim_end();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidPercent)?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::InvalidPercent);
    }
    Ok(value)
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn parse_int_in_range(input: &str, min: i64, max: i64) -> ValidationResult<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidInt)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange);
    }
    Ok(value)
}

pub fn parse_yes_no(input: &str) -> ValidationResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        _ => Err(ValidationError::InvalidFlag),
    }
}

pub const fn format_yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Accepts `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(input: &str) -> bool {
    let input = input.trim();
    if input.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn is_valid_url(input: &str) -> bool {
    let input = input.trim();
    ["http://", "https://"].iter().any(|scheme| {
        input
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains(char::is_whitespace))
    })
}

/// Currencies are limited to the set the currency filter offers.
pub fn is_valid_currency(input: &str) -> bool {
    CURRENCIES.contains(&input.trim())
}

pub fn is_valid_phone(input: &str) -> bool {
    let input = input.trim();
    let body = input.strip_prefix('+').unwrap_or(input);
    if !body
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch == ' ' || ch == '-')
    {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

pub fn is_valid_trading_pair(input: &str) -> bool {
    let Some((base, quote)) = input.trim().split_once('/') else {
        return false;
    };
    let leg = |leg: &str| {
        (2..=6).contains(&leg.len()) && leg.bytes().all(|byte| byte.is_ascii_alphanumeric())
    };
    leg(base) && leg(quote)
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        value.year(),
        u8::from(value.month()),
        value.day(),
        value.hour(),
        value.minute()
    )
}

pub fn format_duration(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_digits(input: &str, allow_empty: bool) -> ValidationResult<i64> {
    if input.is_empty() {
        if allow_empty {
            return Ok(0);
        }
        return Err(ValidationError::InvalidMoney);
    }
    if !input.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::InvalidMoney);
    }
    input
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidMoney)
}

fn comma_format(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        ValidationError, format_cents, format_cents_plain, format_duration, format_timestamp,
        is_valid_currency, is_valid_email, is_valid_phone, is_valid_trading_pair, is_valid_url,
        parse_cents, parse_int_in_range, parse_percent, parse_positive_cents, parse_yes_no,
        split_tags,
    };
    use std::collections::BTreeMap;
    use time::macros::datetime;

    #[test]
    fn parse_cents_overflow() {
        for input in [
            "92233720368547759.00",
            "999999999999999999999.99",
            "92233720368547758.08",
            "92233720368547758.99",
        ] {
            assert_eq!(
                parse_cents(input),
                Err(ValidationError::InvalidMoney),
                "input {input}"
            );
        }
    }

    #[test]
    fn parse_cents_at_max_safe_value() {
        assert_eq!(parse_cents("92233720368547758.00"), Ok(9_223_372_036_854_775_800));
        assert_eq!(parse_cents("92233720368547758.07"), Ok(i64::MAX));
    }

    #[test]
    fn parse_cents_accepts_common_layouts() {
        let cases = BTreeMap::from([
            ("100", 10_000),
            ("100.5", 10_050),
            ("100.05", 10_005),
            ("$1,234.56", 123_456),
            (".75", 75),
            ("0", 0),
        ]);
        for (input, expected) in cases {
            assert_eq!(parse_cents(input), Ok(expected), "input {input}");
        }
    }

    #[test]
    fn parse_cents_rejects_garbage() {
        assert_eq!(parse_cents(""), Err(ValidationError::Required));
        assert_eq!(parse_cents("-5"), Err(ValidationError::NegativeMoney));
        for input in ["12.345", "abc", "1.2.3", "."] {
            assert!(parse_cents(input).is_err(), "input {input}");
        }
    }

    #[test]
    fn positive_cents_rejects_zero() {
        assert_eq!(parse_positive_cents("0.00"), Err(ValidationError::OutOfRange));
        assert_eq!(parse_positive_cents("0.01"), Ok(1));
    }

    #[test]
    fn format_cents_groups_thousands() {
        assert_eq!(format_cents(123_456), "1,234.56");
        assert_eq!(format_cents(-100_000_000), "-1,000,000.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents_plain(123_456), "1234.56");
    }

    #[test]
    fn percent_bounds() {
        assert_eq!(parse_percent("12.5"), Ok(12.5));
        assert_eq!(parse_percent("100%"), Ok(100.0));
        assert_eq!(parse_percent("100.01"), Err(ValidationError::InvalidPercent));
        assert_eq!(parse_percent("-1"), Err(ValidationError::InvalidPercent));
        assert_eq!(parse_percent("NaN"), Err(ValidationError::InvalidPercent));
    }

    #[test]
    fn int_range() {
        assert_eq!(parse_int_in_range("10", 0, 10), Ok(10));
        assert_eq!(parse_int_in_range("11", 0, 10), Err(ValidationError::OutOfRange));
        assert_eq!(parse_int_in_range("1.5", 0, 10), Err(ValidationError::InvalidInt));
        assert_eq!(parse_int_in_range(" ", 0, 10), Err(ValidationError::Required));
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("ops@desk.example"));
        for input in ["", "ops", "ops@", "@desk.io", "ops@desk", "o ps@desk.io", "a@b@c.io"] {
            assert!(!is_valid_email(input), "input {input:?}");
        }
    }

    #[test]
    fn url_currency_phone_and_pair() {
        assert!(is_valid_url("https://api.binance.com"));
        assert!(!is_valid_url("ftp://api.binance.com"));
        assert!(!is_valid_url("https://"));

        assert!(is_valid_currency("USD"));
        assert!(!is_valid_currency("usd"));
        assert!(!is_valid_currency("USDT"));
        assert!(!is_valid_currency("AUD"));

        assert!(is_valid_phone("+1 415-555-0100"));
        assert!(!is_valid_phone("555-01"));
        assert!(!is_valid_phone("call me"));

        assert!(is_valid_trading_pair("BTC/USDT"));
        assert!(!is_valid_trading_pair("BTCUSDT"));
    }

    #[test]
    fn flags_tags_and_display_helpers() {
        assert_eq!(parse_yes_no("Yes"), Ok(true));
        assert_eq!(parse_yes_no("n"), Ok(false));
        assert_eq!(parse_yes_no("maybe"), Err(ValidationError::InvalidFlag));
        assert_eq!(split_tags(" scalp, ,btc ,"), vec!["scalp", "btc"]);
        assert_eq!(format_duration(75), "01:15");
        assert_eq!(format_duration(3_725), "1:02:05");
        assert_eq!(
            format_timestamp(datetime!(2026-03-04 05:06:07 UTC)),
            "2026-03-04 05:06"
        );
    }
}
