//! Request payloads
//!
//! Bodies and query strings sent to the backend. Optional fields are omitted
//! from the JSON when unset so that PATCH requests stay partial.

use crate::models::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Query for `GET /get-comanda-by-mesa`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTabQuery {
    pub mesa_id: i64,
    pub fechada: bool,
}

impl OpenTabQuery {
    pub fn for_table(table_id: i64) -> Self {
        Self {
            mesa_id: table_id,
            fechada: false,
        }
    }

    /// Query string pairs
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mesa_id", self.mesa_id.to_string()),
            ("fechada", self.fechada.to_string()),
        ]
    }
}

/// Body for `POST /mostrar-comanda`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDetailRequest {
    pub mesa_id: i64,
}

/// Product reference inside an open-tab request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub produto_id: i64,
}

/// Body for `POST /abrir-comanda`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTabRequest {
    pub mesa_id: i64,
    pub cliente: String,
    pub produtos: Vec<ProductRef>,
}

/// Body for `POST /item_comanda`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub comanda_id: i64,
    pub produto_id: i64,
    pub qtd: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
}

/// Partial body for `PATCH /item_comanda/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qtd: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impresso_cozinha: Option<bool>,
}

impl LineItemPatch {
    pub fn quantity(qtd: i64) -> Self {
        Self {
            qtd: Some(qtd),
            ..Default::default()
        }
    }

    pub fn note(obs: impl Into<String>) -> Self {
        Self {
            obs: Some(obs.into()),
            ..Default::default()
        }
    }

    pub fn kitchen_printed(printed: bool) -> Self {
        Self {
            impresso_cozinha: Some(printed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.qtd.is_none() && self.obs.is_none() && self.impresso_cozinha.is_none()
    }
}

/// Partial body for `PATCH /comanda/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    /// Move the tab to another table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesa_id: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub taxa_garcom: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxa_couvert: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desconto_centavos: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fechada: Option<bool>,
}

impl TabPatch {
    pub fn close() -> Self {
        Self {
            fechada: Some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Body for `POST /pagamento`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub comanda_id: i64,
    pub valor_centavos: i64,
    pub metodo: PaymentMethod,
}
