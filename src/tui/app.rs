use crate::api::{DashboardApi, HttpGateway, RawOrder};
use crate::config::DashboardConfig;
use crate::controller::{load_charts, ChartData, Controller, Outcome, Phase, ReloadTicket};
use crate::datefmt::DatePattern;
use crate::error::FetchError;
use crate::export::{DirectorySaver, ExportCoordinator, Notice};
use crate::tui::db::PreferenceStore;
use crate::tui::panels::{dashboard::render_dashboard_panel, orders::render_orders_panel};
use crate::tui::search::SearchBox;
use crate::tui::state::{Tab, TableView, UserPreferences};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Work the event loop has to start on a background task.
#[derive(Debug, PartialEq)]
pub enum Action {
    FetchOrders(ReloadTicket),
    FetchCharts,
    Export,
}

/// Results coming back from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    Orders {
        seq: u64,
        result: Result<Vec<RawOrder>, FetchError>,
    },
    Charts(Result<ChartData, FetchError>),
    Exported(Result<Vec<u8>, FetchError>),
}

pub struct App {
    pub current_tab: Tab,
    pub config: DashboardConfig,
    pub controller: Controller,
    pub table: TableView,
    pub search: SearchBox,
    pub charts: Option<ChartData>,
    pub charts_loading: bool,
    pub charts_error: Option<String>,
    pub date_pattern: DatePattern,
    pub preferences: UserPreferences,
    pub show_help: bool,
    pub should_quit: bool,
    pub message: Option<(String, Instant)>,
    exporter: ExportCoordinator<DirectorySaver, std_mpsc::Sender<Notice>>,
    notices: std_mpsc::Receiver<Notice>,
}

impl App {
    pub fn new(
        config: DashboardConfig,
        date_pattern: DatePattern,
        preferences: UserPreferences,
        restaurant: Option<i64>,
    ) -> Self {
        let current_tab = Tab::from_str(&preferences.last_active_tab);
        let restaurant_id = restaurant
            .or(preferences.restaurant_id)
            .unwrap_or_else(|| config.default_restaurant());
        let (tx, notices) = std_mpsc::channel();
        let exporter = ExportCoordinator::new(DirectorySaver::new(config.resolved_export_dir()), tx);

        Self {
            current_tab,
            table: TableView::new(config.page_size),
            controller: Controller::new(restaurant_id, date_pattern.clone()),
            search: SearchBox::default(),
            charts: None,
            charts_loading: false,
            charts_error: None,
            date_pattern,
            preferences,
            show_help: false,
            should_quit: false,
            message: None,
            config,
            exporter,
            notices,
        }
    }

    /// Initial loads when the dashboard opens.
    pub fn start(&mut self) -> Vec<Action> {
        self.charts_loading = true;
        vec![Action::FetchCharts, Action::FetchOrders(self.controller.begin_reload())]
    }

    pub fn restaurant_name(&self) -> String {
        self.config.restaurant_name(self.controller.filter().restaurant_id)
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if self.search.is_editing() {
            return self.handle_search_key(key, now);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                None
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                None
            }
            KeyCode::Tab => {
                self.current_tab = self.current_tab.next();
                self.preferences.last_active_tab = self.current_tab.as_str().to_string();
                None
            }
            KeyCode::Char('r') => match self.current_tab {
                Tab::Dashboard => self.refresh_charts(),
                Tab::Orders => Some(Action::FetchOrders(self.controller.begin_reload())),
            },
            _ if self.current_tab == Tab::Orders => self.handle_orders_key(key),
            _ => None,
        }
    }

    fn handle_orders_key(&mut self, key: KeyEvent) -> Option<Action> {
        let total = self.controller.view().rows.len();
        match key.code {
            KeyCode::Char('/') => {
                self.search.start_editing();
                None
            }
            KeyCode::Left | KeyCode::Char('h') => self.cycle_restaurant(-1),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_restaurant(1),
            KeyCode::PageDown | KeyCode::Char('n') => {
                self.table.next_page(total);
                None
            }
            KeyCode::PageUp | KeyCode::Char('p') => {
                self.table.prev_page();
                None
            }
            KeyCode::Char('s') => {
                self.table.cycle_sort();
                None
            }
            KeyCode::Char('o') => {
                self.table.flip_direction();
                None
            }
            KeyCode::Char('e') => self.start_export(),
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.search.stop_editing();
                None
            }
            KeyCode::Enter => {
                let text = self.search.submit();
                self.table.reset();
                Some(Action::FetchOrders(self.controller.search(Some(&text))))
            }
            KeyCode::Backspace => {
                self.search.pop(now);
                None
            }
            KeyCode::Char(c) => {
                self.search.push(c, now);
                None
            }
            _ => None,
        }
    }

    fn refresh_charts(&mut self) -> Option<Action> {
        if self.charts_loading {
            return None;
        }
        self.charts_loading = true;
        Some(Action::FetchCharts)
    }

    fn start_export(&mut self) -> Option<Action> {
        if self.controller.view().is_exporting {
            return None;
        }
        self.controller.begin_export();
        Some(Action::Export)
    }

    fn cycle_restaurant(&mut self, step: isize) -> Option<Action> {
        let list = &self.config.restaurants;
        if list.is_empty() {
            return None;
        }
        let current = list
            .iter()
            .position(|r| r.id == self.controller.filter().restaurant_id);
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(list.len() as isize) as usize,
            None => 0,
        };
        let id = list[next].id;

        self.search.clear();
        self.table.reset();
        self.preferences.restaurant_id = Some(id);
        Some(Action::FetchOrders(self.controller.select_restaurant(id)))
    }

    /// Time-driven work: debounced search and notice expiry.
    pub fn tick(&mut self, now: Instant) -> Option<Action> {
        while let Ok(notice) = self.notices.try_recv() {
            self.message = Some((notice.message, now + notice.duration));
        }
        if matches!(&self.message, Some((_, until)) if now >= *until) {
            self.message = None;
        }

        let text = self.search.due(now, self.config.search_debounce())?;
        self.table.reset();
        Some(Action::FetchOrders(self.controller.search(Some(&text))))
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Orders { seq, result } => {
                if self.controller.complete(seq, result) == Outcome::Applied
                    && self.controller.phase() == Phase::Loaded
                {
                    self.table.reset();
                }
            }
            AppEvent::Charts(result) => {
                self.charts_loading = false;
                match result {
                    Ok(charts) => {
                        self.charts = Some(charts);
                        self.charts_error = None;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "chart refresh failed");
                        self.charts_error = Some(e.to_string());
                    }
                }
            }
            AppEvent::Exported(result) => {
                // outcome is reported through the notice channel
                let _ = self.controller.finish_export(&self.exporter, result);
            }
        }
    }
}

fn dispatch(action: Action, gateway: &HttpGateway, tx: &mpsc::UnboundedSender<AppEvent>) {
    let gateway = gateway.clone();
    let tx = tx.clone();
    match action {
        Action::FetchOrders(ticket) => {
            tokio::spawn(async move {
                let result = ticket.fetch(&gateway).await;
                let _ = tx.send(AppEvent::Orders {
                    seq: ticket.seq,
                    result,
                });
            });
        }
        Action::FetchCharts => {
            tokio::spawn(async move {
                let result = load_charts(&gateway).await;
                let _ = tx.send(AppEvent::Charts(result));
            });
        }
        Action::Export => {
            tokio::spawn(async move {
                let result = gateway.export_orders().await;
                let _ = tx.send(AppEvent::Exported(result));
            });
        }
    }
}

pub async fn run_tui(config: DashboardConfig, gateway: HttpGateway, restaurant: Option<i64>) -> anyhow::Result<()> {
    let date_pattern = config.date_pattern()?;
    let store = match PreferenceStore::open_default() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "failed to open preferences db");
            None
        }
    };
    let preferences = store
        .as_ref()
        .map(|s| s.load_user_preferences())
        .unwrap_or_else(UserPreferences::default_prefs);
    let mut app = App::new(config, date_pattern, preferences, restaurant);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let outcome = event_loop(&mut terminal, &mut app, &gateway).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Some(store) = &store {
        if let Err(e) = store.save_user_preferences(&app.preferences) {
            tracing::warn!(error = %e, "failed to save preferences");
        }
    }

    outcome
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    gateway: &HttpGateway,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for action in app.start() {
        dispatch(action, gateway, &tx);
    }

    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = app.handle_key(key, Instant::now()) {
                    dispatch(action, gateway, &tx);
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if let Some(action) = app.tick(Instant::now()) {
            dispatch(action, gateway, &tx);
        }

        if app.should_quit {
            break;
        }

        tokio::task::yield_now().await;
    }

    Ok(())
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(frame.size());

    let title_block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::DarkGray));

    let title_text = match &app.charts {
        Some(charts) => format!(" Restaurant Revenue Dashboard · {} ", charts.current_year),
        None => " Restaurant Revenue Dashboard ".to_string(),
    };

    let title = Paragraph::new(title_text)
        .block(title_block)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(title, chunks[0]);

    if app.show_help {
        render_help_overlay(frame, chunks[1]);
    } else {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(20), Constraint::Min(0)])
            .split(chunks[1]);

        let active_tab = match app.current_tab {
            Tab::Dashboard => 0,
            Tab::Orders => 1,
        };
        frame.render_widget(render_sidebar(&["Dashboard", "Orders"], active_tab), main_chunks[0]);

        match app.current_tab {
            Tab::Dashboard => render_dashboard_panel(frame, app, main_chunks[1]),
            Tab::Orders => render_orders_panel(frame, app, main_chunks[1]),
        }
    }

    let (footer_text, footer_style) = match &app.message {
        Some((msg, _)) => (format!(" {} ", msg), Style::default().fg(Color::Yellow)),
        None if app.show_help => (" [Esc] Close ".to_string(), Style::default().fg(Color::White)),
        None if app.search.is_editing() => (
            " Type to search  [Enter] Submit  [Esc] Done ".to_string(),
            Style::default().fg(Color::White),
        ),
        None => (
            " [Tab] Switch  [r] Reload  [?] Help  [q] Quit ".to_string(),
            Style::default().fg(Color::White),
        ),
    };

    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::DarkGray)),
        )
        .style(footer_style);
    frame.render_widget(footer, chunks[2]);
}

fn render_sidebar<'a>(tabs: &[&'a str], active_tab: usize) -> List<'a> {
    let items: Vec<ListItem> = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let style = if i == active_tab {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!(" {}", tab)).style(style)
        })
        .collect();

    List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Views "))
        .style(Style::default().fg(Color::White))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Keyboard Shortcuts ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let help_rows = [
        Row::new(vec![Cell::from("Tab"), Cell::from("Switch views")]),
        Row::new(vec![Cell::from("r"), Cell::from("Reload current view")]),
        Row::new(vec![Cell::from("←/→"), Cell::from("Previous/next restaurant")]),
        Row::new(vec![Cell::from("/"), Cell::from("Search orders")]),
        Row::new(vec![Cell::from("n/p"), Cell::from("Next/previous page")]),
        Row::new(vec![Cell::from("s"), Cell::from("Cycle sort column")]),
        Row::new(vec![Cell::from("o"), Cell::from("Flip sort direction")]),
        Row::new(vec![Cell::from("e"), Cell::from("Export orders spreadsheet")]),
        Row::new(vec![Cell::from("?"), Cell::from("Toggle help")]),
        Row::new(vec![Cell::from("q/Esc"), Cell::from("Quit")]),
    ];

    let help_table = Table::new(help_rows, [Constraint::Length(15), Constraint::Length(30)])
        .style(Style::default().fg(Color::White));
    frame.render_widget(help_table, inner);
}
