//! View state held by the controller

use shared::models::{Product, TabDetail, Table, TableStatus};
use shared::totals::{Totals, compute_totals};

/// Whether the selected table has an open tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPresence {
    /// Tab loaded, items and totals available
    Open,
    /// No open tab: the view prompts for tab creation
    Free,
}

/// Workflow position
///
/// `Idle → TablesLoaded → TabSelected{Open|Free} → ItemMutation → Closing → TablesLoaded`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    TablesLoaded,
    TabSelected(TabPresence),
    /// A line item or tab change is in flight
    ItemMutation,
    /// Payment and close in flight
    Closing,
}

/// Payment accepted for a tab whose close has not gone through yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settlement {
    pub(crate) tab_id: i64,
    pub(crate) paid: i64,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub view: ViewState,
    pub tables: Vec<TableStatus>,
    /// Full catalog, inactive products included
    pub products: Vec<Product>,
    pub selected_table: Option<Table>,
    pub tab_id: Option<i64>,
    pub detail: Option<TabDetail>,
    pub totals: Totals,
    pub error: Option<String>,
    pub(crate) settlement: Option<Settlement>,
}

impl ControllerState {
    /// Products offered in pickers
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    pub fn product(&self, product_id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn table_status(&self, table_id: i64) -> Option<&TableStatus> {
        self.tables.iter().find(|t| t.table.id == table_id)
    }

    pub fn item_count(&self) -> usize {
        self.detail.as_ref().map_or(0, |d| d.items.len())
    }

    /// The selected tab is paid but still open: only closing is allowed
    pub fn awaiting_close(&self) -> bool {
        self.tab_id.is_some_and(|id| self.paid_for(id).is_some())
    }

    /// Amount already recorded for `tab_id` by an unfinished close
    pub(crate) fn paid_for(&self, tab_id: i64) -> Option<i64> {
        self.settlement
            .filter(|s| s.tab_id == tab_id)
            .map(|s| s.paid)
    }

    pub(crate) fn record_settlement(&mut self, tab_id: i64, amount: i64) {
        let paid = self.paid_for(tab_id).unwrap_or(0) + amount;
        self.settlement = Some(Settlement { tab_id, paid });
    }

    pub(crate) fn install_detail(&mut self, detail: TabDetail, fallback_tab_id: Option<i64>) {
        self.tab_id = detail.tab_id().or(fallback_tab_id).or(self.tab_id);
        self.totals = compute_totals(&detail);
        self.detail = Some(detail);
        self.view = ViewState::TabSelected(TabPresence::Open);
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_table = None;
        self.tab_id = None;
        self.detail = None;
        self.totals = Totals::default();
    }

    pub(crate) fn mark_occupied(&mut self, table_id: i64, occupied: bool) {
        if let Some(status) = self.tables.iter_mut().find(|t| t.table.id == table_id) {
            status.occupied = occupied;
        }
    }
}

/// Point-in-time copy of the controller state plus the busy flag
#[derive(Debug, Clone, Default)]
pub struct ControllerSnapshot {
    pub state: ControllerState,
    pub busy: bool,
}

impl ControllerSnapshot {
    /// Pay needs at least one line item and no request in flight
    pub fn can_pay(&self) -> bool {
        !self.busy
            && self.state.view == ViewState::TabSelected(TabPresence::Open)
            && self.state.item_count() > 0
    }

    /// Submissions are disabled while a request is in flight
    pub fn can_submit(&self) -> bool {
        !self.busy
    }

    pub fn has_open_tab(&self) -> bool {
        self.state.tab_id.is_some()
            && matches!(
                self.state.view,
                ViewState::TabSelected(TabPresence::Open) | ViewState::ItemMutation | ViewState::Closing
            )
    }
}
