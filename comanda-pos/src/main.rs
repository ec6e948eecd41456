//! Comanda POS - table-side order terminal
//!
//! Run: `COMANDA_API_BASE_URL=https://api.example.com cargo run -p comanda-pos`
//!
//! `.env` in the working directory is loaded first.

mod app;
mod logger;
mod ui;

use anyhow::Context;
use app::App;
use comanda_client::{ClientConfig, ComandaGateway, TabController};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_dir = std::env::var(logger::LOG_DIR_ENV).ok();
    let _log_guard = logger::init_logger(log_dir.as_deref());

    let config = ClientConfig::from_env().context("invalid configuration")?;
    let http = config
        .build_http_client()
        .context("failed to set up the backend client")?;
    let controller =
        TabController::with_default_customer(ComandaGateway::new(http), config.default_customer.clone());

    tracing::info!(
        base_url = %config.base_url,
        poll_secs = config.tables_poll_interval.map(|d| d.as_secs()),
        "starting comanda-pos"
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(controller, config.tables_poll_interval);
    app.refresh();

    let res = run_app(&mut terminal, &mut app).await;

    // Late results must not land on a torn-down view
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal error")
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick().await;
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
        {
            app.on_key(key);
        }

        if app.should_quit {
            tracing::info!("quitting");
            return Ok(());
        }
    }
}
