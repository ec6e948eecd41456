//! Tab totals calculator
//!
//! Derives the bill preview (subtotal, service charge, cover charge, total)
//! from a tab detail payload. When the backend supplies every authoritative
//! field they are used as-is; otherwise the totals are recomputed from the
//! line items with default fees.

use crate::models::TabDetail;
use crate::money::percent_of;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Service charge percent applied when neither the tab nor the payload has one
pub const DEFAULT_SERVICE_PERCENT: Decimal = Decimal::TEN;

/// Cover charge applied when neither the tab nor the payload has one
pub const DEFAULT_COVER_CENTS: i64 = 0;

/// Bill preview, all amounts in cents and never negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: i64,
    pub service_charge: i64,
    pub cover_charge: i64,
    pub discount: i64,
    pub total: i64,
}

/// Compute the bill preview for a tab detail.
pub fn compute_totals(detail: &TabDetail) -> Totals {
    let tab = detail.tab.as_ref();
    let discount = tab.and_then(|t| t.discount_cents).unwrap_or(0).max(0);

    if let (Some(subtotal), Some(percent), Some(cover), Some(total)) = (
        detail.subtotal_cents,
        detail.service_percent,
        detail.cover_charge_cents,
        detail.total_cents,
    ) {
        let subtotal = subtotal.max(0);
        return Totals {
            subtotal,
            service_charge: percent_of(subtotal, percent),
            cover_charge: cover.max(0),
            discount,
            total: total.max(0),
        };
    }

    let subtotal = detail
        .items
        .iter()
        .map(|item| item.line_total_cents().max(0))
        .fold(0i64, i64::saturating_add);

    let percent = tab
        .and_then(|t| t.service_percent)
        .or(detail.service_percent)
        .unwrap_or(DEFAULT_SERVICE_PERCENT);
    let cover_charge = tab
        .and_then(|t| t.cover_cents)
        .or(detail.cover_charge_cents)
        .unwrap_or(DEFAULT_COVER_CENTS)
        .max(0);

    let service_charge = percent_of(subtotal, percent);
    let total = subtotal
        .saturating_add(service_charge)
        .saturating_add(cover_charge)
        .saturating_sub(discount)
        .max(0);

    Totals {
        subtotal,
        service_charge,
        cover_charge,
        discount,
        total,
    }
}
