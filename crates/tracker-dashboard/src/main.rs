// crates/tracker-dashboard/src/main.rs

mod app;
mod ui;
mod components;
mod network;
mod config;
mod demo;

use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::{io, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tracker_core::{Direction, UserId};
use tracker_store::{RestStore, TableStore, Tracker};

use crate::app::{App, InputMode};
use crate::config::DashboardConfig;
use crate::network::{Command, StoreWorker, WorkerEvent};

#[derive(Parser)]
#[clap(name = "tracker-dashboard")]
#[clap(about = "Terminal dashboard for workstreams, projects and task milestones")]
struct Cli {
    /// TOML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Store base URL (overrides config and TRACKER_STORE_URL)
    #[clap(short = 'u', long)]
    store_url: Option<String>,

    /// Run against an in-memory store with sample data
    #[clap(long)]
    demo: bool,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    /// Log file (the terminal is taken by the UI)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.debug || cli.log_file.is_some() {
        let path = cli
            .log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("tracker-dashboard.log"));
        let file = File::create(&path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        let default_level = if cli.debug { "tracker=debug" } else { "tracker=info" };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.store_url {
        config.store.url = url;
    }

    let today = Local::now().date_naive();
    let (store, user): (Arc<dyn TableStore>, Option<UserId>) = if cli.demo {
        info!("starting with demo data");
        config.session.email = Some(demo::DEMO_EMAIL.to_string());
        let store: Arc<dyn TableStore> = demo::seeded_store(today).await;
        (store, Some(demo::DEMO_USER.into()))
    } else {
        info!(store = %config.store.url, "connecting to store");
        let store = RestStore::new(config.store.clone()).context("invalid store configuration")?;
        (Arc::new(store), config.session.user())
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let app = App::new(&config, today);
    let res = run_app(&mut terminal, app, Tracker::new(store), user).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tracker: Tracker,
    user: Option<UserId>,
) -> Result<()> {
    // Channels between the UI loop and the store worker
    let (tx_to_store, rx_from_app) = mpsc::unbounded_channel::<Command>();
    let (tx_to_app, mut rx_from_store) = mpsc::unbounded_channel::<WorkerEvent>();

    app.set_store_sender(tx_to_store.clone());

    let worker = StoreWorker::new(tracker, tx_to_app);
    let worker_handle = tokio::spawn(worker.run(rx_from_app));

    // Initial load
    if let Some(user) = user {
        tx_to_store.send(Command::LoadProfile(user))?;
    }
    app.request_reload();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        // Handle events with timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key);
                }
            }
        }

        // Apply store results
        while let Ok(event) = rx_from_store.try_recv() {
            app.handle_worker_event(event);
        }

        app.tick(Local::now().date_naive());

        if app.should_quit {
            break;
        }
    }

    worker_handle.abort();
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Modal overlays take every key until closed.
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return;
    }
    if app.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return;
    }
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
            app.toggle_help();
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                app.should_quit = true;
            }
            KeyCode::Tab => {
                app.next_panel();
            }
            KeyCode::BackTab => {
                app.prev_panel();
            }

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_selection_down();
            }

            // Ordering
            KeyCode::Char('K') => {
                app.move_selected(Direction::Up, false);
            }
            KeyCode::Char('J') => {
                app.move_selected(Direction::Down, false);
            }
            KeyCode::Char('g') => {
                app.move_selected(Direction::Up, true);
            }
            KeyCode::Char('G') => {
                app.move_selected(Direction::Down, true);
            }

            // Editing
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                app.toggle_selected_done();
            }
            KeyCode::Char('d') => {
                app.request_delete();
            }
            KeyCode::Char('w') => {
                app.start_workstream_form();
            }
            KeyCode::Char('p') => {
                app.start_project_form();
            }
            KeyCode::Char('t') => {
                app.start_task_form();
            }

            // Calendar
            KeyCode::Char('[') | KeyCode::Left => {
                app.prev_month();
            }
            KeyCode::Char(']') | KeyCode::Right => {
                app.next_month();
            }
            KeyCode::Char('.') => {
                app.this_month();
            }

            KeyCode::Char('r') => {
                app.request_reload();
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                app.toggle_help();
            }

            _ => {}
        },

        InputMode::Editing => match key.code {
            KeyCode::Enter => {
                app.submit_input();
            }
            KeyCode::Esc => {
                app.cancel_input();
            }
            KeyCode::Tab | KeyCode::Down => {
                app.next_field();
            }
            KeyCode::BackTab | KeyCode::Up => {
                app.prev_field();
            }
            KeyCode::Backspace => {
                app.delete_char();
            }
            KeyCode::Char(c) => {
                app.enter_char(c);
            }
            _ => {}
        },
    }
}
