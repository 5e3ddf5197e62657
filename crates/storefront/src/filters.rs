//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount as dollars with two decimal places.
///
/// Accepts anything whose `Display` output is a decimal number, so both
/// `Price` and raw `Decimal` totals work.
///
/// Usage in templates: `{{ product.price|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(&value.to_string()))
}

fn format_money(raw: &str) -> String {
    raw.parse::<Decimal>()
        .map_or_else(|_| format!("${raw}"), |amount| format!("${amount:.2}"))
}
