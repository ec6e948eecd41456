//! Product Model

use crate::lenient;
use serde::{Deserialize, Serialize};

/// Sellable catalog entry (produto), fetched read-only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "nome", default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Current catalog price in cents
    #[serde(rename = "preco_centavos", default, deserialize_with = "lenient::int")]
    pub price_cents: i64,
    #[serde(rename = "ativo", default = "lenient::yes", deserialize_with = "lenient::flag")]
    pub active: bool,
    /// Goes through the kitchen
    #[serde(rename = "preparavel", default, deserialize_with = "lenient::flag")]
    pub preparable: bool,
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}
