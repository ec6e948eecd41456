//! Remote data gateway
//!
//! One typed function per backend operation. Responses are decoded leniently
//! (see [`shared::lenient`]); transport failures come back as
//! [`GatewayError`](crate::error::GatewayError). No call is ever retried here.

use crate::client::HttpClient;
use crate::error::GatewayResult;
use futures::future::join_all;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shared::lenient;
use shared::models::{LineItem, Payment, PaymentMethod, Product, Tab, TabDetail, Table, TableStatus};
use shared::request::{
    AddItemRequest, LineItemPatch, OpenTabQuery, OpenTabRequest, PaymentRequest, ProductRef,
    TabDetailRequest, TabPatch,
};

// ========== Paths ==========
const TABLES: &str = "/mesa";
const PRODUCTS: &str = "/produto";
const OPEN_TABS_BY_TABLE: &str = "/get-comanda-by-mesa";
const TAB_DETAIL: &str = "/mostrar-comanda";
const OPEN_TAB: &str = "/abrir-comanda";
const LINE_ITEMS: &str = "/item_comanda";
const TABS: &str = "/comanda";
const PAYMENTS: &str = "/pagamento";

/// Typed access to the backend
#[derive(Debug, Clone)]
pub struct ComandaGateway<C> {
    http: C,
}

impl<C: HttpClient> ComandaGateway<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    // ========== Tables ==========

    /// `GET /mesa`
    pub async fn list_tables(&self) -> GatewayResult<Vec<Table>> {
        let value: Value = self.http.get(TABLES).await?;
        Ok(lenient::records(value))
    }

    /// Tables with their occupancy.
    ///
    /// One list call plus one open-tab lookup per table, issued concurrently.
    /// A failed lookup marks that table as free instead of failing the grid.
    pub async fn list_tables_with_status(&self) -> GatewayResult<Vec<TableStatus>> {
        let tables = self.list_tables().await?;

        let checks = tables.iter().map(|table| async move {
            match self.is_table_occupied(table.id).await {
                Ok(occupied) => occupied,
                Err(e) => {
                    tracing::warn!(table_id = table.id, error = %e, "occupancy check failed, treating table as free");
                    false
                }
            }
        });
        let occupancy = join_all(checks).await;

        Ok(tables
            .into_iter()
            .zip(occupancy)
            .map(|(table, occupied)| TableStatus::new(table, occupied))
            .collect())
    }

    // ========== Tabs ==========

    /// `GET /get-comanda-by-mesa?mesa_id=&fechada=false`
    ///
    /// Empty when the table is free. Records flagged closed are dropped in
    /// case the backend ignores the filter.
    pub async fn find_open_tabs(&self, table_id: i64) -> GatewayResult<Vec<Tab>> {
        let query = OpenTabQuery::for_table(table_id).pairs();
        let value: Value = self.http.get_with_query(OPEN_TABS_BY_TABLE, &query).await?;
        Ok(lenient::records::<Tab>(value)
            .into_iter()
            .filter(Tab::is_open)
            .collect())
    }

    /// Occupied is exactly "an open tab exists"
    pub async fn is_table_occupied(&self, table_id: i64) -> GatewayResult<bool> {
        Ok(!self.find_open_tabs(table_id).await?.is_empty())
    }

    /// `POST /mostrar-comanda`
    pub async fn tab_detail(&self, table_id: i64) -> GatewayResult<TabDetail> {
        let body = TabDetailRequest { mesa_id: table_id };
        let Strict(detail): Strict<TabDetail> = self.http.post(TAB_DETAIL, &body).await?;
        Ok(detail)
    }

    /// `POST /abrir-comanda`
    ///
    /// `customer` is sent trimmed; each product is added with quantity 1.
    pub async fn open_tab(
        &self,
        table_id: i64,
        customer: &str,
        product_ids: &[i64],
    ) -> GatewayResult<Tab> {
        let body = OpenTabRequest {
            mesa_id: table_id,
            cliente: customer.trim().to_string(),
            produtos: product_ids
                .iter()
                .map(|&produto_id| ProductRef { produto_id })
                .collect(),
        };
        let value: Value = self.http.post(OPEN_TAB, &body).await?;
        Ok(lenient_record(value))
    }

    /// `GET /comanda/{id}`
    pub async fn get_tab(&self, tab_id: i64) -> GatewayResult<Tab> {
        let path = format!("{}/{}", TABS, tab_id);
        let Strict(tab): Strict<Tab> = self.http.get(&path).await?;
        Ok(tab)
    }

    /// `PATCH /comanda/{id}`
    pub async fn patch_tab(&self, tab_id: i64, patch: &TabPatch) -> GatewayResult<Tab> {
        let path = format!("{}/{}", TABS, tab_id);
        let value: Value = self.http.patch(&path, patch).await?;
        Ok(lenient_record(value))
    }

    // ========== Products ==========

    /// `GET /produto`
    pub async fn list_products(&self) -> GatewayResult<Vec<Product>> {
        let value: Value = self.http.get(PRODUCTS).await?;
        Ok(lenient::records(value))
    }

    // ========== Line items ==========

    /// `POST /item_comanda`
    pub async fn add_item(
        &self,
        tab_id: i64,
        product_id: i64,
        quantity: i64,
        note: Option<&str>,
    ) -> GatewayResult<LineItem> {
        let body = AddItemRequest {
            comanda_id: tab_id,
            produto_id: product_id,
            qtd: quantity,
            obs: note
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        };
        let value: Value = self.http.post(LINE_ITEMS, &body).await?;
        Ok(lenient_record(value))
    }

    /// `PATCH /item_comanda/{id}`
    pub async fn edit_item(&self, item_id: i64, patch: &LineItemPatch) -> GatewayResult<LineItem> {
        let path = format!("{}/{}", LINE_ITEMS, item_id);
        let value: Value = self.http.patch(&path, patch).await?;
        Ok(lenient_record(value))
    }

    /// `DELETE /item_comanda/{id}`
    pub async fn delete_item(&self, item_id: i64) -> GatewayResult<()> {
        let path = format!("{}/{}", LINE_ITEMS, item_id);
        let _: Value = self.http.delete(&path).await?;
        Ok(())
    }

    // ========== Payments ==========

    /// `POST /pagamento`
    pub async fn record_payment(
        &self,
        tab_id: i64,
        amount_cents: i64,
        method: PaymentMethod,
    ) -> GatewayResult<Payment> {
        let body = PaymentRequest {
            comanda_id: tab_id,
            valor_centavos: amount_cents.max(0),
            metodo: method,
        };
        let value: Value = self.http.post(PAYMENTS, &body).await?;
        Ok(lenient_record(value))
    }
}

/// Object payload the caller depends on; anything else fails to decode.
///
/// Decoded by the transport, so the error keeps the real response status.
struct Strict<T>(T);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Strict<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(D::Error::custom(format!("expected an object, got {}", value)));
        }
        serde_json::from_value(value).map(Strict).map_err(D::Error::custom)
    }
}

/// Decode an echo record the caller only logs; falls back to defaults.
fn lenient_record<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_default()
}
