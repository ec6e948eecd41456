//! Full tab detail, as returned by `POST /mostrar-comanda`
//!
//! The backend assembles this payload dynamically and fields come and go, so
//! everything is optional. The totals calculator decides which of the
//! authoritative server fields can be trusted.

use super::{Product, Tab, Table};
use crate::lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Line item as embedded in the tab detail (joined with its product)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDetailItem {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub id: Option<i64>,
    #[serde(rename = "produto_id", default, deserialize_with = "lenient::opt_int")]
    pub product_id: Option<i64>,
    #[serde(rename = "nome", default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(rename = "qtd", default, deserialize_with = "lenient::int")]
    pub quantity: i64,
    #[serde(rename = "obs", default, deserialize_with = "lenient::opt_text")]
    pub note: Option<String>,
    #[serde(rename = "preco_unit_centavos_snapshot", default, deserialize_with = "lenient::opt_int")]
    pub unit_price_snapshot_cents: Option<i64>,
    /// Unit price some backend versions send instead of the snapshot
    #[serde(rename = "preco_unit_centavos", default, deserialize_with = "lenient::opt_int")]
    pub unit_price_cents: Option<i64>,
    #[serde(rename = "natureza_snapshot", default, deserialize_with = "lenient::opt_text")]
    pub kind_snapshot: Option<String>,
    #[serde(rename = "produto", default, deserialize_with = "lenient::opt_record")]
    pub product: Option<Product>,
}

impl TabDetailItem {
    /// Unit price used for billing: the snapshot, then the item's own unit price
    pub fn billing_unit_cents(&self) -> i64 {
        self.unit_price_snapshot_cents
            .filter(|p| *p > 0)
            .or(self.unit_price_cents)
            .unwrap_or(0)
    }

    pub fn line_total_cents(&self) -> i64 {
        self.quantity.saturating_mul(self.billing_unit_cents())
    }

    pub fn product_id(&self) -> Option<i64> {
        self.product_id
            .or_else(|| self.product.as_ref().map(|p| p.id))
    }

    /// Name to display, falling back to the joined product
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.product.as_ref().map(|p| p.name.clone()))
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| match self.product_id() {
                Some(id) => format!("Produto #{}", id),
                None => "Produto".to_string(),
            })
    }
}

/// Tab detail payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDetail {
    #[serde(rename = "comanda", default, deserialize_with = "lenient::opt_record")]
    pub tab: Option<Tab>,
    #[serde(rename = "mesa", default, deserialize_with = "lenient::opt_record")]
    pub table: Option<Table>,
    #[serde(rename = "itens", default, deserialize_with = "lenient::list")]
    pub items: Vec<TabDetailItem>,
    #[serde(rename = "subtotal_centavos", default, deserialize_with = "lenient::opt_int")]
    pub subtotal_cents: Option<i64>,
    #[serde(
        rename = "taxa_garcom_percent",
        default,
        deserialize_with = "lenient::opt_percent",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub service_percent: Option<Decimal>,
    /// Service charge amount as computed by the backend (display only)
    #[serde(rename = "taxa_garcom_centavos", default, deserialize_with = "lenient::opt_int")]
    pub service_charge_cents: Option<i64>,
    #[serde(rename = "taxa_couvert_centavos", default, deserialize_with = "lenient::opt_int")]
    pub cover_charge_cents: Option<i64>,
    #[serde(rename = "total_centavos", default, deserialize_with = "lenient::opt_int")]
    pub total_cents: Option<i64>,
}

impl TabDetail {
    pub fn tab_id(&self) -> Option<i64> {
        self.tab.as_ref().and_then(|t| t.id)
    }

    pub fn customer(&self) -> Option<&str> {
        self.tab
            .as_ref()
            .and_then(|t| t.customer.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_payload() {
        let detail: TabDetail = serde_json::from_value(json!({
            "comanda": {"id": 42, "mesa_id": 7, "cliente": "Ana", "taxa_garcom": 10, "taxa_couvert": 0, "fechada": false},
            "mesa": {"id": 7, "numero": 7, "ativa": true},
            "itens": [
                {"id": 1, "qtd": 2, "obs": "", "preco_unit_centavos_snapshot": 1500,
                 "produto": {"id": 3, "nome": "Cerveja", "preco_centavos": 1800, "ativo": true}}
            ],
            "subtotal_centavos": 3000,
            "taxa_garcom_centavos": 300,
            "taxa_couvert_centavos": 0,
            "total_centavos": 3300
        }))
        .unwrap();

        assert_eq!(detail.tab_id(), Some(42));
        assert_eq!(detail.customer(), Some("Ana"));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].display_name(), "Cerveja");
        assert_eq!(detail.items[0].product_id(), Some(3));
        // snapshot wins over the live catalog price
        assert_eq!(detail.items[0].line_total_cents(), 3000);
        assert_eq!(detail.total_cents, Some(3300));
        assert_eq!(detail.service_percent, None);
    }

    #[test]
    fn test_decode_sparse_payload() {
        let detail: TabDetail = serde_json::from_value(json!({
            "comanda": "not-an-object",
            "itens": [{"qtd": null, "preco_unit_centavos": "900"}, 17],
            "total_centavos": "oops"
        }))
        .unwrap();

        assert!(detail.tab.is_none());
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].quantity, 0);
        assert_eq!(detail.items[0].billing_unit_cents(), 900);
        assert_eq!(detail.items[0].display_name(), "Produto");
        assert_eq!(detail.total_cents, None);
    }
}
