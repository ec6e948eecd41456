//! Application state and key handling
//!
//! The app never talks to the backend itself: every action is spawned on the
//! controller and the next tick picks up the resulting state.

use comanda_client::shared::models::{PaymentMethod, Product, TabDetailItem, TableStatus};
use comanda_client::shared::money::parse_brl;
use comanda_client::shared::request::{LineItemPatch, TabPatch};
use comanda_client::{
    ControllerResult, ControllerSnapshot, NetworkHttpClient, OpenTabForm, TabController,
    TabPresence, ViewState,
};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use rust_decimal::Decimal;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;
use tui_logger::{TuiWidgetEvent, TuiWidgetState};

type Controller = TabController<NetworkHttpClient>;

/// Screen derived from the controller view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Tables,
    /// Selected table is free: open-tab form
    NewTab,
    Tab,
}

/// Modal drawn over the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    ProductPicker,
    Payment,
    Edit(EditTarget),
}

/// Field being typed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    NewTabCustomer,
    Customer,
    Note(i64),
    ServicePercent,
    Cover,
    Discount,
    /// Table number the tab moves to
    MoveTable,
}

impl EditTarget {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NewTabCustomer | Self::Customer => " Cliente ",
            Self::Note(_) => " Observação ",
            Self::ServicePercent => " Taxa de serviço (%) ",
            Self::Cover => " Couvert (R$) ",
            Self::Discount => " Desconto (R$) ",
            Self::MoveTable => " Mover para a mesa nº ",
        }
    }
}

pub struct App {
    controller: Controller,
    pub snapshot: ControllerSnapshot,
    pub overlay: Overlay,
    pub input: Input,
    pub open_form: OpenTabForm,
    pub table_cursor: usize,
    pub item_cursor: usize,
    pub product_cursor: usize,
    pub payment_choice: Option<usize>,
    /// Local hint or form validation message
    pub notice: Option<String>,
    pub logger_state: TuiWidgetState,
    poll_interval: Option<Duration>,
    last_poll: Instant,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: Controller, poll_interval: Option<Duration>) -> Self {
        Self {
            controller,
            snapshot: ControllerSnapshot::default(),
            overlay: Overlay::None,
            input: Input::default(),
            open_form: OpenTabForm::default(),
            table_cursor: 0,
            item_cursor: 0,
            product_cursor: 0,
            payment_choice: None,
            notice: None,
            logger_state: TuiWidgetState::new(),
            poll_interval,
            last_poll: Instant::now(),
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.snapshot.state.view {
            ViewState::Idle | ViewState::TablesLoaded => Screen::Tables,
            ViewState::TabSelected(TabPresence::Free) => Screen::NewTab,
            ViewState::TabSelected(TabPresence::Open)
            | ViewState::ItemMutation
            | ViewState::Closing => Screen::Tab,
        }
    }

    pub fn default_customer(&self) -> &str {
        self.controller.default_customer()
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    pub fn tables(&self) -> &[TableStatus] {
        &self.snapshot.state.tables
    }

    pub fn active_products(&self) -> Vec<&Product> {
        self.snapshot.state.active_products().collect()
    }

    pub fn items(&self) -> &[TabDetailItem] {
        self.snapshot
            .state
            .detail
            .as_ref()
            .map(|d| d.items.as_slice())
            .unwrap_or_default()
    }

    fn selected_item(&self) -> Option<&TabDetailItem> {
        self.items().get(self.item_cursor)
    }

    fn cursor_product_id(&self) -> Option<i64> {
        self.active_products().get(self.product_cursor).map(|p| p.id)
    }

    // ========== Lifecycle ==========

    /// Pull the latest controller state and run the table poll when due
    ///
    /// The poll is skipped while an action is in flight or a table is selected.
    pub async fn tick(&mut self) {
        self.snapshot = self.controller.snapshot().await;
        self.clamp_cursors();

        if let Some(interval) = self.poll_interval
            && self.last_poll.elapsed() >= interval
            && !self.snapshot.busy
            && self.snapshot.state.selected_table.is_none()
        {
            tracing::debug!("polling tables");
            self.refresh();
        }
    }

    pub fn refresh(&mut self) {
        self.last_poll = Instant::now();
        self.spawn(|c| async move { c.load_tables().await });
    }

    pub fn shutdown(&self) {
        self.controller.shutdown();
    }

    /// Run an action in the background; ignored while another is in flight
    fn spawn<F, Fut>(&mut self, action: F)
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = ControllerResult<()>> + Send + 'static,
    {
        if !self.snapshot.can_submit() || self.controller.is_busy() {
            tracing::debug!("action ignored while busy");
            return;
        }
        // Raised before the task runs, so the next tick already reports it
        let busy = self.controller.hold_busy();
        self.snapshot.busy = true;
        self.notice = None;

        let action = action(self.controller.clone());
        tokio::spawn(async move {
            let _busy = busy;
            if let Err(e) = action.await {
                tracing::debug!(error = %e, "action failed");
            }
        });
    }

    fn clamp_cursors(&mut self) {
        let clamp = |cursor: &mut usize, len: usize| *cursor = (*cursor).min(len.saturating_sub(1));
        let (tables, items, products) = (
            self.tables().len(),
            self.items().len(),
            self.active_products().len(),
        );
        clamp(&mut self.table_cursor, tables);
        clamp(&mut self.item_cursor, items);
        clamp(&mut self.product_cursor, products);
    }

    // ========== Keys ==========

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.overlay {
            Overlay::Edit(target) => self.on_edit_key(target, key),
            Overlay::ProductPicker => self.on_picker_key(key),
            Overlay::Payment => self.on_payment_key(key),
            Overlay::None => {
                if self.on_common_key(key) {
                    return;
                }
                match self.screen() {
                    Screen::Tables => self.on_tables_key(key),
                    Screen::NewTab => self.on_new_tab_key(key),
                    Screen::Tab => self.on_tab_key(key),
                }
            }
        }
    }

    /// Log scrolling and error dismissal, available on every screen
    fn on_common_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::PageUp => self.logger_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown => self.logger_state.transition(TuiWidgetEvent::NextPageKey),
            KeyCode::Backspace => {
                self.notice = None;
                let controller = self.controller.clone();
                tokio::spawn(async move { controller.clear_error().await });
            }
            _ => return false,
        }
        true
    }

    fn on_tables_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Left => self.table_cursor = self.table_cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Right => self.table_cursor += 1,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Enter => {
                let Some(status) = self.tables().get(self.table_cursor) else {
                    return;
                };
                let table = status.table.clone();
                self.open_form = OpenTabForm::default();
                self.item_cursor = 0;
                self.product_cursor = 0;
                self.spawn(move |c| async move { c.select_table(table).await });
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn on_new_tab_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.product_cursor = self.product_cursor.saturating_sub(1),
            KeyCode::Down => self.product_cursor += 1,
            KeyCode::Char(' ') => {
                if let Some(id) = self.cursor_product_id() {
                    self.open_form.toggle(id);
                }
            }
            KeyCode::Char('e') => self.begin_edit(EditTarget::NewTabCustomer),
            KeyCode::Enter => {
                if let Err(e) = self.open_form.validate() {
                    self.notice = Some(e.to_string());
                    return;
                }
                let customer = self.open_form.customer.clone();
                let products = self.open_form.product_ids().to_vec();
                self.spawn(move |c| async move { c.open_tab(&customer, &products).await });
            }
            KeyCode::Esc => self.deselect(),
            _ => {}
        }
    }

    fn on_tab_key(&mut self, key: KeyEvent) {
        let item = self.selected_item().and_then(|i| i.id.map(|id| (id, i.quantity)));
        match key.code {
            KeyCode::Up => self.item_cursor = self.item_cursor.saturating_sub(1),
            KeyCode::Down => self.item_cursor += 1,
            KeyCode::Char('a') => {
                self.product_cursor = 0;
                self.overlay = Overlay::ProductPicker;
            }
            KeyCode::Char('+') => {
                if let Some((id, qty)) = item {
                    self.spawn(move |c| async move { c.set_item_quantity(id, qty + 1).await });
                }
            }
            KeyCode::Char('-') => {
                if let Some((id, qty)) = item {
                    self.spawn(move |c| async move { c.set_item_quantity(id, qty - 1).await });
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some((id, _)) = item {
                    self.spawn(move |c| async move { c.delete_item(id).await });
                }
            }
            KeyCode::Char('k') => {
                if let Some((id, _)) = item {
                    self.spawn(move |c| async move { c.mark_item_printed(id).await });
                }
            }
            KeyCode::Char('n') => {
                if let Some((id, _)) = item {
                    self.begin_edit(EditTarget::Note(id));
                }
            }
            KeyCode::Char('c') => self.begin_edit(EditTarget::Customer),
            KeyCode::Char('s') => self.begin_edit(EditTarget::ServicePercent),
            KeyCode::Char('v') => self.begin_edit(EditTarget::Cover),
            KeyCode::Char('x') => self.begin_edit(EditTarget::Discount),
            KeyCode::Char('m') => self.begin_edit(EditTarget::MoveTable),
            KeyCode::Char('u') => self.spawn(|c| async move { c.reload_tab().await }),
            KeyCode::Char('p') => {
                if self.snapshot.can_pay() {
                    self.payment_choice = None;
                    self.overlay = Overlay::Payment;
                } else {
                    self.notice = Some("Adicione itens antes de fechar a conta".to_string());
                }
            }
            KeyCode::Esc => self.deselect(),
            _ => {}
        }
    }

    fn on_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.product_cursor = self.product_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.product_cursor =
                    (self.product_cursor + 1).min(self.active_products().len().saturating_sub(1))
            }
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                if let Some(product_id) = self.cursor_product_id() {
                    self.spawn(move |c| async move { c.add_item(product_id, 1, None).await });
                }
            }
            KeyCode::Esc => self.overlay = Overlay::None,
            _ => {}
        }
    }

    fn on_payment_key(&mut self, key: KeyEvent) {
        let last = PaymentMethod::ALL.len() - 1;
        match key.code {
            KeyCode::Up => self.payment_choice = Some(self.payment_choice.map_or(0, |i| i.saturating_sub(1))),
            KeyCode::Down => self.payment_choice = Some(self.payment_choice.map_or(0, |i| (i + 1).min(last))),
            KeyCode::Char(c @ '1'..='4') => {
                self.payment_choice = c.to_digit(10).map(|d| d as usize - 1);
            }
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                let method = self.payment_choice.and_then(|i| PaymentMethod::ALL.get(i).copied());
                self.spawn(move |c| async move { c.pay_and_close(method).await });
            }
            KeyCode::Esc => self.overlay = Overlay::None,
            _ => {}
        }
    }

    fn on_edit_key(&mut self, target: EditTarget, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                self.submit_edit(target);
            }
            KeyCode::Esc => self.overlay = Overlay::None,
            _ => {
                self.input.handle_event(&Event::Key(key));
            }
        }
    }

    // ========== Edits ==========

    fn begin_edit(&mut self, target: EditTarget) {
        let detail = self.snapshot.state.detail.as_ref();
        let tab = detail.and_then(|d| d.tab.as_ref());
        let current = match target {
            EditTarget::NewTabCustomer => self.open_form.customer.clone(),
            EditTarget::Customer => tab.and_then(|t| t.customer.clone()).unwrap_or_default(),
            EditTarget::Note(id) => self
                .items()
                .iter()
                .find(|i| i.id == Some(id))
                .and_then(|i| i.note.clone())
                .unwrap_or_default(),
            EditTarget::ServicePercent => tab
                .and_then(|t| t.service_percent)
                .or_else(|| detail.and_then(|d| d.service_percent))
                .map(|p| p.normalize().to_string())
                .unwrap_or_default(),
            EditTarget::Cover | EditTarget::Discount | EditTarget::MoveTable => String::new(),
        };
        self.input = Input::new(current);
        self.overlay = Overlay::Edit(target);
    }

    fn submit_edit(&mut self, target: EditTarget) {
        let value = self.input.value().trim().to_string();
        let shown = if value.is_empty() { "(vazio)".to_string() } else { value.clone() };
        self.input.reset();

        let patch = match target {
            EditTarget::NewTabCustomer => {
                self.open_form.customer = value;
                return;
            }
            EditTarget::Note(id) => {
                self.spawn(move |c| async move { c.edit_item(id, LineItemPatch::note(value)).await });
                return;
            }
            EditTarget::Customer if value.is_empty() => None,
            EditTarget::Customer => Some(TabPatch {
                cliente: Some(value),
                ..Default::default()
            }),
            EditTarget::ServicePercent => Decimal::from_str(&value.replace(',', "."))
                .ok()
                .filter(|p| !p.is_sign_negative())
                .map(|p| TabPatch {
                    taxa_garcom: Some(p),
                    ..Default::default()
                }),
            EditTarget::Cover => parse_brl(&value).map(|cents| TabPatch {
                taxa_couvert: Some(cents),
                ..Default::default()
            }),
            EditTarget::Discount => parse_brl(&value).map(|cents| TabPatch {
                desconto_centavos: Some(cents),
                ..Default::default()
            }),
            EditTarget::MoveTable => value
                .parse::<i64>()
                .ok()
                .and_then(|number| self.tables().iter().find(|t| t.table.number == number))
                .map(|t| TabPatch {
                    mesa_id: Some(t.table.id),
                    ..Default::default()
                }),
        };

        match patch {
            Some(patch) => self.spawn(move |c| async move { c.update_tab(patch).await }),
            None => self.notice = Some(format!("Valor inválido: {}", shown)),
        }
    }

    fn deselect(&mut self) {
        self.overlay = Overlay::None;
        self.spawn(|c| async move {
            c.deselect().await;
            Ok(())
        });
    }
}
