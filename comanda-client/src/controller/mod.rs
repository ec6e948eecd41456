//! View-state controller
//!
//! Drives the workflow `tables → table → open/show tab → items → pay and close`
//! on top of [`ComandaGateway`]. The controller is the single writer of
//! [`ControllerState`]; the presentation layer reads it through
//! [`TabController::snapshot`] and issues actions.
//!
//! Every action:
//! - holds the busy flag for its whole duration (released on drop, whatever
//!   the outcome)
//! - stores a user-facing message in `state.error` when it fails, and also
//!   returns the error
//! - applies nothing once [`TabController::shutdown`] has been called
//!
//! No request is retried; retrying is the user re-issuing the action. Once a
//! payment has been accepted for a tab, only its close can be retried.

mod state;

pub use state::{ControllerSnapshot, ControllerState, TabPresence, ViewState};

use crate::client::HttpClient;
use crate::config::DEFAULT_CUSTOMER;
use crate::error::{ControllerError, ControllerResult, GatewayResult, ValidationError};
use crate::gateway::ComandaGateway;
use shared::models::{PaymentMethod, Product, TabDetail, Table, TableStatus};
use shared::request::{LineItemPatch, TabPatch};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Workflow controller, cheap to clone (shared state)
pub struct TabController<C> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    gateway: ComandaGateway<C>,
    state: RwLock<ControllerState>,
    in_flight: Arc<AtomicUsize>,
    torn_down: CancellationToken,
    default_customer: String,
}

impl<C> Clone for TabController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Busy flag held for the duration of an action
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicUsize>);

impl BusyGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<C: HttpClient> TabController<C> {
    pub fn new(gateway: ComandaGateway<C>) -> Self {
        Self::with_default_customer(gateway, DEFAULT_CUSTOMER)
    }

    /// `default_customer` labels tabs opened with a blank name
    pub fn with_default_customer(gateway: ComandaGateway<C>, default_customer: impl Into<String>) -> Self {
        let default_customer = default_customer.into();
        let default_customer = match default_customer.trim() {
            "" => DEFAULT_CUSTOMER.to_string(),
            name => name.to_string(),
        };
        Self {
            inner: Arc::new(Inner {
                gateway,
                state: RwLock::new(ControllerState::default()),
                in_flight: Arc::new(AtomicUsize::new(0)),
                torn_down: CancellationToken::new(),
                default_customer,
            }),
        }
    }

    pub fn gateway(&self) -> &ComandaGateway<C> {
        &self.inner.gateway
    }

    pub fn default_customer(&self) -> &str {
        &self.inner.default_customer
    }

    // ========== Reads ==========

    pub async fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.inner.state.read().await.clone(),
            busy: self.is_busy(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Report busy until the guard drops
    ///
    /// Taken by callers that spawn an action, so the flag is raised before the
    /// action starts running.
    pub fn hold_busy(&self) -> BusyGuard {
        self.begin()
    }

    /// Stop applying results; in-flight actions still complete their requests
    pub fn shutdown(&self) {
        self.inner.torn_down.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.torn_down.is_cancelled()
    }

    // ========== Actions ==========

    /// Fetch tables (with occupancy) and products concurrently
    ///
    /// On failure the current view is kept so the call can be re-issued.
    pub async fn load_tables(&self) -> ControllerResult<()> {
        let _busy = self.begin();
        self.apply(|s| s.error = None).await;

        match self.fetch_tables_and_products().await {
            Ok((tables, products)) => {
                tracing::debug!(tables = tables.len(), products = products.len(), "tables loaded");
                self.apply(move |s| {
                    s.tables = tables;
                    s.products = products;
                    if !matches!(s.view, ViewState::TabSelected(_)) {
                        s.view = ViewState::TablesLoaded;
                    }
                })
                .await;
                Ok(())
            }
            Err(e) => self.fail(e, "Falha ao carregar mesas", |_| {}).await,
        }
    }

    /// Select a table and load its open tab, if any
    ///
    /// A failed lookup drops the selection and returns to the tables grid.
    pub async fn select_table(&self, table: Table) -> ControllerResult<()> {
        let _busy = self.begin();
        let table_id = table.id;
        self.apply(move |s| {
            s.clear_selection();
            s.selected_table = Some(table);
            s.error = None;
        })
        .await;

        let result: GatewayResult<Option<(TabDetail, Option<i64>)>> = async {
            let open = self.gateway().find_open_tabs(table_id).await?;
            let Some(first) = open.first() else {
                return Ok(None);
            };
            let first_id = first.id;
            let detail = self.gateway().tab_detail(table_id).await?;
            Ok(Some((detail, first_id)))
        }
        .await;

        match result {
            Ok(Some((detail, first_id))) => {
                self.apply(move |s| {
                    s.mark_occupied(table_id, true);
                    s.install_detail(detail, first_id);
                })
                .await;
                Ok(())
            }
            Ok(None) => {
                self.apply(move |s| {
                    s.mark_occupied(table_id, false);
                    s.view = ViewState::TabSelected(TabPresence::Free);
                })
                .await;
                Ok(())
            }
            Err(e) => {
                self.fail(e, "Falha ao carregar comanda", |s| {
                    s.clear_selection();
                    s.view = ViewState::TablesLoaded;
                })
                .await
            }
        }
    }

    /// Leave the selected table without changing anything remotely
    pub async fn deselect(&self) {
        self.apply(|s| {
            s.clear_selection();
            s.view = ViewState::TablesLoaded;
        })
        .await;
    }

    /// Open a tab on the selected table
    ///
    /// A blank `customer` is replaced by the default label. Each product in
    /// `product_ids` is added with quantity 1; an empty list opens an empty tab.
    pub async fn open_tab(&self, customer: &str, product_ids: &[i64]) -> ControllerResult<()> {
        let _busy = self.begin();
        let table = match self.selected_table().await {
            Ok(table) => table,
            Err(e) => return self.fail(e, "Falha ao abrir comanda", |_| {}).await,
        };
        self.apply(|s| s.error = None).await;

        let customer = match customer.trim() {
            "" => self.inner.default_customer.as_str(),
            name => name,
        };

        let tab = match self.gateway().open_tab(table.id, customer, product_ids).await {
            Ok(tab) => tab,
            Err(e) => return self.fail(e, "Falha ao abrir comanda", |_| {}).await,
        };
        tracing::info!(table_id = table.id, tab_id = ?tab.id, customer, "tab opened");

        // The tab exists from here on; a failed reload must not offer to open another one.
        let tab_id = tab.id;
        self.apply(move |s| {
            s.mark_occupied(table.id, true);
            s.tab_id = tab_id;
            s.view = ViewState::TabSelected(TabPresence::Open);
        })
        .await;

        match self.gateway().tab_detail(table.id).await {
            Ok(detail) => {
                self.apply(move |s| s.install_detail(detail, tab_id)).await;
                Ok(())
            }
            Err(e) => self.fail(e, "Comanda aberta, mas falhou ao carregar", |_| {}).await,
        }
    }

    /// Re-fetch the selected tab's detail
    pub async fn reload_tab(&self) -> ControllerResult<()> {
        let _busy = self.begin();
        let table = match self.selected_table().await {
            Ok(table) => table,
            Err(e) => return self.fail(e, "Falha ao recarregar comanda", |_| {}).await,
        };
        self.apply(|s| s.error = None).await;

        match self.gateway().tab_detail(table.id).await {
            Ok(detail) => {
                self.apply(move |s| s.install_detail(detail, None)).await;
                Ok(())
            }
            Err(e) => self.fail(e, "Falha ao recarregar comanda", |_| {}).await,
        }
    }

    pub async fn add_item(&self, product_id: i64, quantity: i64, note: Option<&str>) -> ControllerResult<()> {
        const CONTEXT: &str = "Falha ao adicionar item";
        if quantity < 1 {
            return self.fail(ValidationError::InvalidQuantity(quantity), CONTEXT, |_| {}).await;
        }
        self.mutate(CONTEXT, |tab_id| async move {
            self.gateway().add_item(tab_id, product_id, quantity, note).await?;
            Ok(())
        })
        .await
    }

    /// Apply a partial change to a line item; an empty patch does nothing
    pub async fn edit_item(&self, item_id: i64, patch: LineItemPatch) -> ControllerResult<()> {
        const CONTEXT: &str = "Falha ao alterar item";
        if let Some(quantity) = patch.qtd
            && quantity < 1
        {
            return self.fail(ValidationError::InvalidQuantity(quantity), CONTEXT, |_| {}).await;
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.mutate(CONTEXT, |_| async move {
            self.gateway().edit_item(item_id, &patch).await?;
            Ok(())
        })
        .await
    }

    pub async fn set_item_quantity(&self, item_id: i64, quantity: i64) -> ControllerResult<()> {
        self.edit_item(item_id, LineItemPatch::quantity(quantity)).await
    }

    pub async fn mark_item_printed(&self, item_id: i64) -> ControllerResult<()> {
        self.edit_item(item_id, LineItemPatch::kitchen_printed(true)).await
    }

    pub async fn delete_item(&self, item_id: i64) -> ControllerResult<()> {
        self.mutate("Falha ao remover item", |_| async move {
            self.gateway().delete_item(item_id).await
        })
        .await
    }

    /// Adjust the open tab (customer, service percent, cover, discount)
    ///
    /// A `mesa_id` other than the selected table moves the tab there; the
    /// target must be a known free table and the selection follows the tab.
    pub async fn update_tab(&self, mut patch: TabPatch) -> ControllerResult<()> {
        if let Some(target) = patch.mesa_id {
            let current = self.inner.state.read().await.selected_table.as_ref().map(|t| t.id);
            if current != Some(target) {
                return self.move_tab(target, patch).await;
            }
            patch.mesa_id = None;
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.mutate("Falha ao atualizar comanda", |tab_id| async move {
            self.gateway().patch_tab(tab_id, &patch).await?;
            Ok(())
        })
        .await
    }

    /// Record a payment of the computed total, then close the tab
    ///
    /// On success the selection is cleared and the tables grid reloaded. On
    /// failure the tab stays open for a retry. A payment already accepted for
    /// this tab is not sent again; if the total has grown since, only the
    /// outstanding balance is recorded.
    pub async fn pay_and_close(&self, method: Option<PaymentMethod>) -> ControllerResult<()> {
        const CONTEXT: &str = "Falha ao fechar comanda";
        let _busy = self.begin();

        let Some(method) = method else {
            return self.fail(ValidationError::MissingPaymentMethod, CONTEXT, |_| {}).await;
        };
        let (table, tab_id) = match self.open_tab_target().await {
            Ok(target) => target,
            Err(e) => return self.fail(e, CONTEXT, |_| {}).await,
        };
        let (amount, has_items, paid) = {
            let s = self.inner.state.read().await;
            (s.totals.total, s.item_count() > 0, s.paid_for(tab_id))
        };
        if !has_items {
            return self.fail(ValidationError::EmptyTab, CONTEXT, |_| {}).await;
        }

        self.apply(|s| {
            s.error = None;
            s.view = ViewState::Closing;
        })
        .await;

        let reopen = |s: &mut ControllerState| s.view = ViewState::TabSelected(TabPresence::Open);

        let outstanding = amount - paid.unwrap_or(0);
        if paid.is_some() && outstanding <= 0 {
            tracing::info!(tab_id, "payment already recorded, closing only");
        } else {
            match self.gateway().record_payment(tab_id, outstanding, method).await {
                Ok(payment) => {
                    tracing::info!(
                        tab_id,
                        amount = outstanding,
                        %method,
                        payment_id = ?payment.id,
                        "payment recorded"
                    );
                    self.apply(move |s| s.record_settlement(tab_id, outstanding)).await;
                }
                Err(e) => return self.fail(e, "Falha ao registrar pagamento", reopen).await,
            }
        }

        if let Err(e) = self.gateway().patch_tab(tab_id, &TabPatch::close()).await {
            return self.fail(e, CONTEXT, reopen).await;
        }
        tracing::info!(table_id = table.id, tab_id, "tab closed");

        self.apply(move |s| {
            s.clear_selection();
            s.settlement = None;
            s.mark_occupied(table.id, false);
            s.view = ViewState::TablesLoaded;
        })
        .await;

        match self.fetch_tables_and_products().await {
            Ok((tables, products)) => {
                self.apply(move |s| {
                    s.tables = tables;
                    s.products = products;
                })
                .await;
                Ok(())
            }
            Err(e) => self.fail(e, "Falha ao carregar mesas", |_| {}).await,
        }
    }

    /// Dismiss the current error message
    pub async fn clear_error(&self) {
        self.apply(|s| s.error = None).await;
    }

    // ========== Internals ==========

    fn begin(&self) -> BusyGuard {
        BusyGuard::acquire(&self.inner.in_flight)
    }

    /// Write to the state unless the view is torn down
    async fn apply(&self, update: impl FnOnce(&mut ControllerState)) -> bool {
        if self.is_shut_down() {
            return false;
        }
        let mut state = self.inner.state.write().await;
        if self.is_shut_down() {
            return false;
        }
        update(&mut state);
        true
    }

    /// Surface `err` to the view, apply `recover`, return the error
    async fn fail(
        &self,
        err: impl Into<ControllerError>,
        context: &str,
        recover: impl FnOnce(&mut ControllerState),
    ) -> ControllerResult<()> {
        let err = err.into();
        let message = match &err {
            ControllerError::Gateway(e) => {
                tracing::error!(error = %e, "{}", context);
                format!("{}: {}", context, e)
            }
            other => {
                tracing::warn!(error = %other, "{}", context);
                other.to_string()
            }
        };
        self.apply(move |s| {
            recover(s);
            s.error = Some(message);
        })
        .await;
        Err(err)
    }

    /// Run a tab mutation, then reload the detail to resync totals
    ///
    /// Nothing is applied locally before the reload; on failure the item
    /// list stays as it was.
    async fn mutate<F, Fut>(&self, context: &str, call: F) -> ControllerResult<()>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = GatewayResult<()>>,
    {
        let _busy = self.begin();
        let (table, tab_id) = match self.changeable_tab().await {
            Ok(target) => target,
            Err(e) => return self.fail(e, context, |_| {}).await,
        };
        self.apply(|s| {
            s.error = None;
            s.view = ViewState::ItemMutation;
        })
        .await;

        let result: GatewayResult<TabDetail> = async {
            call(tab_id).await?;
            self.gateway().tab_detail(table.id).await
        }
        .await;

        match result {
            Ok(detail) => {
                self.apply(move |s| s.install_detail(detail, Some(tab_id))).await;
                Ok(())
            }
            Err(e) => {
                self.fail(e, context, |s| s.view = ViewState::TabSelected(TabPresence::Open))
                    .await
            }
        }
    }

    /// Move the open tab to the free table `target`
    async fn move_tab(&self, target: i64, patch: TabPatch) -> ControllerResult<()> {
        const CONTEXT: &str = "Falha ao mover comanda";
        let _busy = self.begin();
        let (from, tab_id) = match self.changeable_tab().await {
            Ok(target) => target,
            Err(e) => return self.fail(e, CONTEXT, |_| {}).await,
        };
        let destination = self
            .inner
            .state
            .read()
            .await
            .table_status(target)
            .map(|t| (t.table.clone(), t.occupied));
        let destination = match destination {
            Some((table, false)) => table,
            Some((_, true)) => {
                return self.fail(ValidationError::TableOccupied(target), CONTEXT, |_| {}).await;
            }
            None => return self.fail(ValidationError::UnknownTable(target), CONTEXT, |_| {}).await,
        };
        self.apply(|s| {
            s.error = None;
            s.view = ViewState::ItemMutation;
        })
        .await;

        if let Err(e) = self.gateway().patch_tab(tab_id, &patch).await {
            return self
                .fail(e, CONTEXT, |s| s.view = ViewState::TabSelected(TabPresence::Open))
                .await;
        }
        tracing::info!(tab_id, from = from.id, to = target, "tab moved");

        // The tab now lives on `target`; the selection follows it.
        self.apply(move |s| {
            s.mark_occupied(from.id, false);
            s.mark_occupied(target, true);
            s.selected_table = Some(destination);
            s.view = ViewState::TabSelected(TabPresence::Open);
        })
        .await;

        match self.gateway().tab_detail(target).await {
            Ok(detail) => {
                self.apply(move |s| s.install_detail(detail, Some(tab_id))).await;
                Ok(())
            }
            Err(e) => self.fail(e, "Comanda movida, mas falhou ao carregar", |_| {}).await,
        }
    }

    async fn selected_table(&self) -> ControllerResult<Table> {
        self.inner
            .state
            .read()
            .await
            .selected_table
            .clone()
            .ok_or(ControllerError::NoTableSelected)
    }

    async fn open_tab_target(&self) -> ControllerResult<(Table, i64)> {
        let state = self.inner.state.read().await;
        let table = state.selected_table.clone().ok_or(ControllerError::NoTableSelected)?;
        let tab_id = state.tab_id.ok_or(ControllerError::NoOpenTab)?;
        Ok((table, tab_id))
    }

    /// Open tab target that still accepts changes (not paid and awaiting close)
    async fn changeable_tab(&self) -> ControllerResult<(Table, i64)> {
        let (table, tab_id) = self.open_tab_target().await?;
        if self.inner.state.read().await.paid_for(tab_id).is_some() {
            return Err(ValidationError::AwaitingClose.into());
        }
        Ok((table, tab_id))
    }

    async fn fetch_tables_and_products(&self) -> GatewayResult<(Vec<TableStatus>, Vec<Product>)> {
        tokio::try_join!(
            self.gateway().list_tables_with_status(),
            self.gateway().list_products()
        )
    }
}
