//! Money helpers
//!
//! Amounts are always `i64` minor units (centavos). Decimal arithmetic is only
//! used for percentages and typed-in amounts, and results are rounded back to
//! whole cents.

use rust_decimal::prelude::*;
use std::str::FromStr;

/// Apply a percentage to an amount, rounding half away from zero.
///
/// Negative inputs clamp to 0.
pub fn percent_of(amount_cents: i64, percent: Decimal) -> i64 {
    let amount = Decimal::from(amount_cents.max(0));
    let percent = percent.max(Decimal::ZERO);
    amount
        .checked_mul(percent)
        .map(|v| v / Decimal::ONE_HUNDRED)
        .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|v| v.to_i64())
        .unwrap_or(0)
        .max(0)
}

/// Format cents as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, centavos)
}

/// Parse an amount typed in reais ("12,50", "R$ 1.234,56", "7") into cents.
///
/// The comma is the decimal separator. Without a comma, dots followed by
/// exactly three digits group thousands ("1.234" is R$ 1.234,00); any other
/// dot is a decimal point ("0.5", "12.50").
///
/// `None` for anything that is not a non-negative amount, or that does not
/// fit in `i64` cents.
pub fn parse_brl(input: &str) -> Option<i64> {
    let cleaned = input.trim().trim_start_matches("R$").trim();
    if cleaned.is_empty() {
        return None;
    }
    let normalized = if cleaned.contains(',') || is_thousands_grouped(cleaned) {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    let value = Decimal::from_str(&normalized).ok()?;
    if value.is_sign_negative() {
        return None;
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// "1.234", "12.345.678": every dot-separated group after the first has three digits
fn is_thousands_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let Some(head) = groups.next() else {
        return false;
    };
    let mut tail = groups.peekable();
    if tail.peek().is_none() || head.is_empty() || head.len() > 3 {
        return false;
    }
    head.chars().all(|c| c.is_ascii_digit())
        && tail.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}
