//! Tab (comanda) Model

use crate::lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order session tied to one table
///
/// Every field decodes leniently: the same record shape arrives from the
/// open-tab lookup, from tab patches and nested inside the tab detail, and the
/// backend does not always send all of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub id: Option<i64>,
    #[serde(rename = "mesa_id", default, deserialize_with = "lenient::opt_int")]
    pub table_id: Option<i64>,
    #[serde(rename = "cliente", default, deserialize_with = "lenient::opt_text")]
    pub customer: Option<String>,
    /// Service charge as a percentage of the subtotal (e.g. 10)
    #[serde(
        rename = "taxa_garcom",
        default,
        deserialize_with = "lenient::opt_percent",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub service_percent: Option<Decimal>,
    /// Cover charge in cents
    #[serde(rename = "taxa_couvert", default, deserialize_with = "lenient::opt_int")]
    pub cover_cents: Option<i64>,
    #[serde(rename = "desconto_centavos", default, deserialize_with = "lenient::opt_int")]
    pub discount_cents: Option<i64>,
    #[serde(rename = "fechada", default, deserialize_with = "lenient::flag")]
    pub closed: bool,
    #[serde(rename = "aberta_em", default, deserialize_with = "lenient::opt_int")]
    pub opened_at: Option<i64>,
    #[serde(rename = "fechada_em", default, deserialize_with = "lenient::opt_int")]
    pub closed_at: Option<i64>,
}

impl Tab {
    pub fn is_open(&self) -> bool {
        !self.closed
    }
}
