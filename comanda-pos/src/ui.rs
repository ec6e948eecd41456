//! Rendering

use crate::app::{App, EditTarget, Overlay, Screen};
use comanda_client::shared::models::PaymentMethod;
use comanda_client::shared::money::format_brl;
use comanda_client::{TabPresence, ViewState};
use ratatui::layout::Flex;
use ratatui::{prelude::*, widgets::*};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

const ACCENT: Color = Color::Cyan;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content + logs
            Constraint::Length(3), // Status / hints
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    draw_header(f, app, chunks[0]);
    match app.screen() {
        Screen::Tables => draw_tables(f, app, main_chunks[0]),
        Screen::NewTab => draw_new_tab(f, app, main_chunks[0]),
        Screen::Tab => draw_tab(f, app, main_chunks[0]),
    }
    draw_logs(f, app, main_chunks[1]);
    draw_footer(f, app, chunks[2]);

    match app.overlay {
        Overlay::None => {}
        Overlay::ProductPicker => draw_product_picker(f, app),
        Overlay::Payment => draw_payment(f, app),
        Overlay::Edit(target) => draw_edit(f, app, target),
    }
}

fn panel(title: impl Into<Line<'static>>) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
}

fn cursor_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let state = &app.snapshot.state;
    let location = match &state.selected_table {
        Some(table) => format!(" Mesa {:02} ", table.number),
        None => " Mesas ".to_string(),
    };
    let activity = match (app.snapshot.busy, state.view) {
        (true, ViewState::Closing) => Span::styled(" FECHANDO... ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        (true, _) => Span::styled(" CARREGANDO... ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        (false, _) => Span::styled(" Pronto ", Style::default().fg(Color::Green)),
    };
    let poll = match app.poll_interval() {
        Some(interval) => format!(" auto {}s ", interval.as_secs()),
        None => " manual ".to_string(),
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" Comanda POS ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("|"),
        Span::raw(location),
        Span::raw("|"),
        activity,
        Span::raw("|"),
        Span::styled(poll, Style::default().fg(Color::DarkGray)),
    ]))
    .block(panel(""));
    f.render_widget(title, area);
}

fn draw_tables(f: &mut Frame, app: &App, area: Rect) {
    let tables = app.tables();
    let free = tables.iter().filter(|t| t.is_free()).count();
    let block = panel(format!(" Mesas ({} livres / {}) ", free, tables.len()));

    if tables.is_empty() {
        let hint = match app.snapshot.state.view {
            ViewState::Idle => "Carregando mesas... (r para recarregar)",
            _ => "Nenhuma mesa cadastrada",
        };
        f.render_widget(Paragraph::new(hint).block(block), area);
        return;
    }

    let items: Vec<ListItem> = tables
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let (label, color) = if status.occupied {
                ("ocupada", Color::Red)
            } else {
                ("livre", Color::Green)
            };
            let line = Line::from(vec![
                Span::raw(format!(" Mesa {:02}  ", status.table.number)),
                Span::styled(label, Style::default().fg(color)),
                if status.table.active {
                    Span::raw("")
                } else {
                    Span::styled("  (inativa)", Style::default().fg(Color::DarkGray))
                },
            ]);
            ListItem::new(line).style(cursor_style(i == app.table_cursor))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn draw_new_tab(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let customer = match app.open_form.customer.trim() {
        "" => Span::styled(
            format!("(em branco: {})", app.default_customer()),
            Style::default().fg(Color::DarkGray),
        ),
        name => Span::raw(name.to_string()),
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![Span::raw("Cliente: "), customer])).block(panel(" Nova comanda ")),
        chunks[0],
    );

    let products = app.active_products();
    let items: Vec<ListItem> = products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mark = if app.open_form.contains(p.id) { "[x]" } else { "[ ]" };
            ListItem::new(format!(" {} {:<28} {:>12}", mark, p.name, format_brl(p.price_cents)))
                .style(cursor_style(i == app.product_cursor))
        })
        .collect();
    f.render_widget(List::new(items).block(panel(" Produtos ")), chunks[1]);

    let catalog: Vec<_> = products.into_iter().cloned().collect();
    let preview = format!(
        " {} produto(s)  Prévia: {}",
        app.open_form.product_ids().len(),
        format_brl(app.open_form.preview_cents(&catalog))
    );
    f.render_widget(Paragraph::new(preview).block(panel("")), chunks[2]);
}

fn draw_tab(f: &mut Frame, app: &App, area: Rect) {
    let state = &app.snapshot.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(8)])
        .split(area);

    let customer = state
        .detail
        .as_ref()
        .and_then(|d| d.customer())
        .unwrap_or("-")
        .to_string();
    let title = match state.tab_id {
        Some(id) => format!(" Comanda #{} | {} ", id, customer),
        None => format!(" Comanda | {} ", customer),
    };

    if state.detail.is_none() {
        let hint = Paragraph::new("Comanda aberta sem detalhes carregados (u para recarregar)")
            .block(panel(title));
        f.render_widget(hint, chunks[0]);
    } else {
        let items: Vec<ListItem> = app
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut spans = vec![
                    Span::raw(format!(" {:>3}x {:<26}", item.quantity, item.display_name())),
                    Span::raw(format!("{:>12}", format_brl(item.line_total_cents()))),
                ];
                if let Some(note) = item.note.as_deref().filter(|n| !n.is_empty()) {
                    spans.push(Span::styled(format!("  ({})", note), Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans)).style(cursor_style(i == app.item_cursor))
            })
            .collect();
        let list = if items.is_empty() {
            List::new(vec![ListItem::new(" Nenhum item (a para adicionar)")])
        } else {
            List::new(items)
        };
        f.render_widget(list.block(panel(title)), chunks[0]);
    }

    let totals = &state.totals;
    let pay_hint = if app.snapshot.can_pay() && state.awaiting_close() {
        Span::styled(" pago, p: concluir fechamento ", Style::default().fg(Color::Yellow))
    } else if app.snapshot.can_pay() {
        Span::styled(" p: fechar conta ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" fechar conta indisponível ", Style::default().fg(Color::DarkGray))
    };
    let lines = vec![
        Line::from(format!(" Subtotal        {:>14}", format_brl(totals.subtotal))),
        Line::from(format!(" Taxa de serviço {:>14}", format_brl(totals.service_charge))),
        Line::from(format!(" Couvert         {:>14}", format_brl(totals.cover_charge))),
        Line::from(format!(" Desconto        {:>14}", format_brl(-totals.discount))),
        Line::from(vec![Span::styled(
            format!(" Total           {:>14}", format_brl(totals.total)),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(pay_hint),
    ];
    f.render_widget(Paragraph::new(lines).block(panel(" Conta ")), chunks[1]);
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(
            Block::default()
                .title(" Logs ")
                .border_style(Style::default().fg(Color::White).add_modifier(Modifier::DIM))
                .borders(Borders::ALL),
        )
        .output_separator('|')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style(Style::default().fg(Color::White))
        .state(&app.logger_state);
    f.render_widget(logs, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let state = &app.snapshot.state;
    let line = if let Some(error) = &state.error {
        Line::from(vec![
            Span::styled(" Erro: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(error.clone(), Style::default().fg(Color::Red)),
            Span::styled("  (Backspace limpa)", Style::default().fg(Color::DarkGray)),
        ])
    } else if let Some(notice) = &app.notice {
        Line::from(Span::styled(format!(" {}", notice), Style::default().fg(Color::Yellow)))
    } else {
        Line::from(Span::styled(hints(app), Style::default().fg(Color::DarkGray)))
    };
    f.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

fn hints(app: &App) -> &'static str {
    match (app.overlay, app.screen()) {
        (Overlay::Edit(_), _) => " Enter confirma | Esc cancela",
        (Overlay::ProductPicker, _) => " ↑↓ escolhe | Enter adiciona | Esc cancela",
        (Overlay::Payment, _) => " 1-4 / ↑↓ forma de pagamento | Enter paga | Esc cancela",
        (Overlay::None, Screen::Tables) => " ↑↓ mesa | Enter abre | r recarrega | q sai",
        (Overlay::None, Screen::NewTab) => {
            " ↑↓ produto | Espaço marca | e cliente | Enter abre comanda | Esc volta"
        }
        (Overlay::None, Screen::Tab) => {
            " a add | +/- qtd | d remove | n obs | k cozinha | c/s/v/x ajustes | m move | u recarrega | p paga | Esc"
        }
    }
}

/// Centered rect using up certain percentage of the available rect
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn draw_product_picker(f: &mut Frame, app: &App) {
    let area = popup_area(f.area(), 60, 60);
    let items: Vec<ListItem> = app
        .active_products()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            ListItem::new(format!(" {:<28} {:>12}", p.name, format_brl(p.price_cents)))
                .style(cursor_style(i == app.product_cursor))
        })
        .collect();
    f.render_widget(Clear, area);
    f.render_widget(List::new(items).block(panel(" Adicionar produto ")), area);
}

fn draw_payment(f: &mut Frame, app: &App) {
    let area = popup_area(f.area(), 40, 40);
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" Total: {}", format_brl(app.snapshot.state.totals.total)),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, method) in PaymentMethod::ALL.iter().enumerate() {
        let selected = app.payment_choice == Some(i);
        let mark = if selected { "(•)" } else { "( )" };
        lines.push(Line::from(Span::styled(
            format!(" {} {}. {}", mark, i + 1, method.label()),
            cursor_style(selected),
        )));
    }
    if app.snapshot.state.view != ViewState::TabSelected(TabPresence::Open) {
        lines.push(Line::from(Span::styled(" aguarde...", Style::default().fg(Color::Yellow))));
    }
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(panel(" Fechar conta ")), area);
}

fn draw_edit(f: &mut Frame, app: &App, target: EditTarget) {
    let area = popup_area(f.area(), 50, 20);
    let area = Rect {
        height: area.height.min(3),
        ..area
    };
    let width = area.width.max(3) - 3;
    let scroll = app.input.visual_scroll(width as usize);
    let input = Paragraph::new(app.input.value())
        .style(Style::default().fg(Color::Yellow))
        .scroll((0, scroll as u16))
        .block(panel(target.title()));
    f.render_widget(Clear, area);
    f.render_widget(input, area);
    f.set_cursor_position((
        area.x + ((app.input.visual_cursor().max(scroll) - scroll) as u16) + 1,
        area.y + 1,
    ));
}
