//! Line Item Model

use crate::lenient;
use serde::{Deserialize, Serialize};

/// One product line within a tab (item_comanda)
///
/// `unit_price_snapshot_cents` is frozen when the item is created; billing
/// always uses it rather than the product's live catalog price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "comanda_id", default, deserialize_with = "lenient::int")]
    pub tab_id: i64,
    #[serde(rename = "produto_id", default, deserialize_with = "lenient::int")]
    pub product_id: i64,
    #[serde(rename = "qtd", default, deserialize_with = "lenient::int")]
    pub quantity: i64,
    #[serde(rename = "obs", default, deserialize_with = "lenient::opt_text")]
    pub note: Option<String>,
    #[serde(rename = "preco_unit_centavos_snapshot", default, deserialize_with = "lenient::int")]
    pub unit_price_snapshot_cents: i64,
    #[serde(rename = "natureza_snapshot", default, deserialize_with = "lenient::opt_text")]
    pub kind_snapshot: Option<String>,
    #[serde(rename = "impresso_cozinha", default, deserialize_with = "lenient::flag")]
    pub kitchen_printed: bool,
}

impl LineItem {
    pub fn line_total_cents(&self) -> i64 {
        self.quantity.saturating_mul(self.unit_price_snapshot_cents)
    }
}
