//! In-memory fake backend
//!
//! Implements the comanda HTTP contract on an axum `Router` so the gateway and
//! controller can be driven through `OneshotHttpClient`. Failures are injected
//! per route with [`FakeBackend::fail`].

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use comanda_client::{ComandaGateway, OneshotHttpClient, TabController};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

type Reply = Result<Json<Value>, (StatusCode, String)>;

#[derive(Debug, Default)]
pub struct Store {
    pub tables: Vec<Value>,
    pub products: Vec<Value>,
    pub tabs: Vec<Value>,
    pub items: Vec<Value>,
    pub payments: Vec<Value>,
    /// Send the four authoritative totals in the tab detail
    pub authoritative_totals: bool,
    /// Answer the open-tab lookup with every tab of the table, closed ones too
    pub ignore_closed_filter: bool,
    /// Routes answering 500, e.g. `"POST /item_comanda"`
    failing: HashSet<String>,
    /// Every request received, as `"METHOD /path"`
    pub calls: Vec<String>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn open_tab_for(&self, table_id: i64) -> Option<&Value> {
        self.tabs
            .iter()
            .find(|t| t["mesa_id"] == json!(table_id) && t["fechada"] != json!(true))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    store: Arc<Mutex<Store>>,
}

impl FakeBackend {
    /// Tables 1..=`tables` (all free) and the default catalog
    pub fn new(tables: i64) -> Self {
        let backend = Self::default();
        {
            let mut store = backend.store();
            store.next_id = 1000;
            store.tables = (1..=tables)
                .map(|id| json!({"id": id, "numero": id, "ativa": true, "created_at": 1_700_000_000_000i64}))
                .collect();
            store.products = vec![
                json!({"id": 3, "nome": "Cerveja", "preco_centavos": 1200, "ativo": true, "preparavel": false}),
                json!({"id": 5, "nome": "Porção de fritas", "preco_centavos": 3500, "ativo": true, "preparavel": true}),
                json!({"id": 8, "nome": "Caipirinha", "preco_centavos": "1800", "ativo": true, "preparavel": true}),
                json!({"id": 9, "nome": "Suco antigo", "preco_centavos": 900, "ativo": false, "preparavel": false}),
            ];
        }
        backend
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    /// Make `route` answer 500 until [`FakeBackend::heal`]
    pub fn fail(&self, route: &str) {
        self.store().failing.insert(route.to_string());
    }

    pub fn heal(&self, route: &str) {
        self.store().failing.remove(route);
    }

    pub fn calls_to(&self, route: &str) -> usize {
        self.store().calls.iter().filter(|c| c.as_str() == route).count()
    }

    /// Seed an open tab with items `(product_id, qty, snapshot_cents)`
    pub fn seed_open_tab(&self, table_id: i64, customer: &str, items: &[(i64, i64, i64)]) -> i64 {
        let mut store = self.store();
        let tab_id = store.next_id();
        store.tabs.push(json!({
            "id": tab_id,
            "mesa_id": table_id,
            "cliente": customer,
            "taxa_garcom": 10,
            "taxa_couvert": 0,
            "fechada": false,
        }));
        for &(product_id, qtd, snapshot) in items {
            let id = store.next_id();
            store.items.push(json!({
                "id": id,
                "comanda_id": tab_id,
                "produto_id": product_id,
                "qtd": qtd,
                "preco_unit_centavos_snapshot": snapshot,
                "impresso_cozinha": false,
            }));
        }
        tab_id
    }

    /// Add a line item behind the controller's back, as another terminal would
    pub fn seed_item(&self, tab_id: i64, product_id: i64, qtd: i64, snapshot: i64) -> i64 {
        let mut store = self.store();
        let id = store.next_id();
        store.items.push(json!({
            "id": id,
            "comanda_id": tab_id,
            "produto_id": product_id,
            "qtd": qtd,
            "preco_unit_centavos_snapshot": snapshot,
            "impresso_cozinha": false,
        }));
        id
    }

    /// Sum of every payment recorded for `tab_id`
    pub fn paid_for(&self, tab_id: i64) -> i64 {
        self.store()
            .payments
            .iter()
            .filter(|p| id_of(p, "comanda_id") == tab_id)
            .map(|p| id_of(p, "valor_centavos"))
            .sum()
    }

    pub fn items_of(&self, tab_id: i64) -> Vec<Value> {
        self.store()
            .items
            .iter()
            .filter(|i| i["comanda_id"] == json!(tab_id))
            .cloned()
            .collect()
    }

    pub fn tab(&self, tab_id: i64) -> Option<Value> {
        self.store().tabs.iter().find(|t| t["id"] == json!(tab_id)).cloned()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/mesa", get(list_tables))
            .route("/produto", get(list_products))
            .route("/get-comanda-by-mesa", get(tabs_by_table))
            .route("/mostrar-comanda", post(tab_detail))
            .route("/abrir-comanda", post(open_tab))
            .route("/comanda/{id}", get(get_tab).patch(patch_tab))
            .route("/item_comanda", post(add_item))
            .route("/item_comanda/{id}", axum::routing::patch(edit_item).delete(delete_item))
            .route("/pagamento", post(record_payment))
            .with_state(self.clone())
    }

    pub fn gateway(&self) -> ComandaGateway<OneshotHttpClient> {
        ComandaGateway::new(OneshotHttpClient::new(self.router()))
    }

    pub fn controller(&self) -> TabController<OneshotHttpClient> {
        TabController::new(self.gateway())
    }

    /// Register the call and fail it when injected
    fn enter(&self, route: String) -> Result<MutexGuard<'_, Store>, (StatusCode, String)> {
        let mut store = self.store();
        let failing = store.failing.contains(&route);
        store.calls.push(route);
        if failing {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "injected failure"}).to_string(),
            ));
        }
        Ok(store)
    }
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, json!({"message": format!("{} not found", what)}).to_string())
}

/// Numbers may arrive as JSON strings
fn id_of(value: &Value, key: &str) -> i64 {
    let field = &value[key];
    field
        .as_i64()
        .or_else(|| field.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or_default()
}

async fn list_tables(State(backend): State<FakeBackend>) -> Reply {
    let store = backend.enter("GET /mesa".into())?;
    Ok(Json(Value::Array(store.tables.clone())))
}

async fn list_products(State(backend): State<FakeBackend>) -> Reply {
    let store = backend.enter("GET /produto".into())?;
    Ok(Json(Value::Array(store.products.clone())))
}

async fn tabs_by_table(
    State(backend): State<FakeBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let table_id: i64 = params
        .get("mesa_id")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let closed = params.get("fechada").map(String::as_str) == Some("true");
    let store = backend.enter(format!("GET /get-comanda-by-mesa?mesa_id={}", table_id))?;
    let tabs: Vec<Value> = store
        .tabs
        .iter()
        .filter(|t| t["mesa_id"] == json!(table_id))
        .filter(|t| store.ignore_closed_filter || (t["fechada"] == json!(true)) == closed)
        .cloned()
        .collect();
    Ok(Json(Value::Array(tabs)))
}

async fn tab_detail(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Reply {
    let store = backend.enter("POST /mostrar-comanda".into())?;
    let table_id = id_of(&body, "mesa_id");
    let table = store
        .tables
        .iter()
        .find(|t| id_of(t, "id") == table_id)
        .cloned()
        .ok_or_else(|| not_found("mesa"))?;
    let tab = store.open_tab_for(table_id).cloned().ok_or_else(|| not_found("comanda"))?;
    let tab_id = id_of(&tab, "id");

    let items: Vec<Value> = store
        .items
        .iter()
        .filter(|i| id_of(i, "comanda_id") == tab_id)
        .map(|item| {
            let product = store
                .products
                .iter()
                .find(|p| p["id"] == item["produto_id"])
                .cloned()
                .unwrap_or(Value::Null);
            let mut joined = item.clone();
            joined["nome"] = product["nome"].clone();
            joined["produto"] = product;
            joined
        })
        .collect();

    let subtotal: i64 = items
        .iter()
        .map(|i| id_of(i, "qtd") * id_of(i, "preco_unit_centavos_snapshot"))
        .sum();
    let mut detail = json!({"comanda": tab, "mesa": table, "itens": items});
    if store.authoritative_totals {
        let service = subtotal / 10;
        detail["subtotal_centavos"] = json!(subtotal);
        detail["taxa_garcom_percent"] = json!(10);
        detail["taxa_garcom_centavos"] = json!(service);
        detail["taxa_couvert_centavos"] = json!(0);
        detail["total_centavos"] = json!(subtotal + service);
    }
    Ok(Json(detail))
}

async fn open_tab(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Reply {
    let mut store = backend.enter("POST /abrir-comanda".into())?;
    let tab_id = store.next_id();
    let tab = json!({
        "id": tab_id,
        "mesa_id": body["mesa_id"],
        "cliente": body["cliente"],
        "taxa_garcom": 10,
        "taxa_couvert": 0,
        "fechada": false,
    });
    store.tabs.push(tab.clone());

    let produtos = body["produtos"].as_array().cloned().unwrap_or_default();
    for produto in produtos {
        let product_id = id_of(&produto, "produto_id");
        let price = store
            .products
            .iter()
            .find(|p| id_of(p, "id") == product_id)
            .map(|p| id_of(p, "preco_centavos"))
            .unwrap_or_default();
        let id = store.next_id();
        store.items.push(json!({
            "id": id,
            "comanda_id": tab_id,
            "produto_id": product_id,
            "qtd": 1,
            "preco_unit_centavos_snapshot": price,
            "impresso_cozinha": false,
        }));
    }
    Ok(Json(tab))
}

async fn get_tab(State(backend): State<FakeBackend>, Path(id): Path<i64>) -> Reply {
    let store = backend.enter(format!("GET /comanda/{}", id))?;
    store
        .tabs
        .iter()
        .find(|t| id_of(t, "id") == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("comanda"))
}

async fn patch_tab(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = backend.enter(format!("PATCH /comanda/{}", id))?;
    let tab = store
        .tabs
        .iter_mut()
        .find(|t| id_of(t, "id") == id)
        .ok_or_else(|| not_found("comanda"))?;
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            tab[key.as_str()] = value.clone();
        }
    }
    Ok(Json(tab.clone()))
}

async fn add_item(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Reply {
    let mut store = backend.enter("POST /item_comanda".into())?;
    let product_id = id_of(&body, "produto_id");
    let price = store
        .products
        .iter()
        .find(|p| id_of(p, "id") == product_id)
        .map(|p| id_of(p, "preco_centavos"))
        .ok_or_else(|| not_found("produto"))?;
    let id = store.next_id();
    let mut item = json!({
        "id": id,
        "comanda_id": body["comanda_id"],
        "produto_id": product_id,
        "qtd": body["qtd"],
        "preco_unit_centavos_snapshot": price,
        "impresso_cozinha": false,
    });
    if let Some(obs) = body.get("obs") {
        item["obs"] = obs.clone();
    }
    store.items.push(item.clone());
    Ok(Json(item))
}

async fn edit_item(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = backend.enter(format!("PATCH /item_comanda/{}", id))?;
    let item = store
        .items
        .iter_mut()
        .find(|i| id_of(i, "id") == id)
        .ok_or_else(|| not_found("item"))?;
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            item[key.as_str()] = value.clone();
        }
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = backend.enter(format!("DELETE /item_comanda/{}", id))?;
    let before = store.items.len();
    store.items.retain(|i| id_of(i, "id") != id);
    if store.items.len() == before {
        return Err(not_found("item"));
    }
    Ok(StatusCode::OK)
}

async fn record_payment(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Reply {
    let mut store = backend.enter("POST /pagamento".into())?;
    let id = store.next_id();
    let payment = json!({
        "id": id,
        "comanda_id": body["comanda_id"],
        "valor_centavos": body["valor_centavos"],
        "metodo": body["metodo"],
        "registrado_em": 1_792_411_200_000i64,
    });
    store.payments.push(payment.clone());
    Ok(Json(payment))
}
