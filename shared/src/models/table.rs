//! Dining Table Model

use crate::lenient;
use serde::{Deserialize, Serialize};

/// Physical table (mesa)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    /// Number printed on the table
    #[serde(rename = "numero", default, deserialize_with = "lenient::int")]
    pub number: i64,
    #[serde(rename = "ativa", default = "lenient::yes", deserialize_with = "lenient::flag")]
    pub active: bool,
    /// Creation timestamp (epoch millis)
    #[serde(default, deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Table with its derived occupancy
///
/// `occupied` is exactly "an open tab exists for this table" as observed at
/// fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    #[serde(flatten)]
    pub table: Table,
    #[serde(rename = "ocupada")]
    pub occupied: bool,
}

impl TableStatus {
    pub fn new(table: Table, occupied: bool) -> Self {
        Self { table, occupied }
    }

    pub fn is_free(&self) -> bool {
        !self.occupied
    }
}
