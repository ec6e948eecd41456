//! Payment Model

use crate::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement method accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(rename = "dinheiro")]
    Cash,
    #[serde(rename = "credito")]
    Credit,
    #[serde(rename = "debito")]
    Debit,
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [Self::Cash, Self::Credit, Self::Debit, Self::Pix];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "dinheiro",
            Self::Credit => "credito",
            Self::Debit => "debito",
            Self::Pix => "pix",
        }
    }

    /// Label shown to staff
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Dinheiro",
            Self::Credit => "Crédito",
            Self::Debit => "Débito",
            Self::Pix => "PIX",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown payment method string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPaymentMethod(pub String);

impl fmt::Display for UnknownPaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown payment method: {}", self.0)
    }
}

impl std::error::Error for UnknownPaymentMethod {}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s) || m.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPaymentMethod(s.to_string()))
    }
}

/// Settlement record, created once when a tab is closed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "comanda_id", default, deserialize_with = "lenient::int")]
    pub tab_id: i64,
    #[serde(rename = "valor_centavos", default, deserialize_with = "lenient::int")]
    pub amount_cents: i64,
    /// Raw method string as stored by the backend
    #[serde(rename = "metodo", default, deserialize_with = "lenient::text")]
    pub method: String,
    /// Registration timestamp (epoch millis)
    #[serde(rename = "registrado_em", default, deserialize_with = "lenient::opt_int")]
    pub registered_at: Option<i64>,
}

impl Payment {
    pub fn method(&self) -> Option<PaymentMethod> {
        self.method.parse().ok()
    }

    pub fn registered_at_utc(&self) -> Option<DateTime<Utc>> {
        self.registered_at
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}
