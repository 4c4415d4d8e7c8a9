use crate::controller::Phase;
use crate::tui::app::App;
use crate::tui::state::SortColumn;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

pub fn render_orders_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Orders · {} ", app.restaurant_name()))
        .style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let search_style = if app.search.is_editing() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if app.search.is_editing() { "▏" } else { "" };
    let search = Paragraph::new(Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}{}", app.search.text(), cursor), search_style),
    ]));
    frame.render_widget(search, chunks[0]);

    frame.render_widget(status_line(app), chunks[1]);

    let view = app.controller.view();
    if view.rows.is_empty() {
        let text = match app.controller.phase() {
            Phase::Idle | Phase::Loading => "Loading orders…",
            _ => "No orders found.",
        };
        frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), chunks[2]);
    } else {
        render_table(frame, app, chunks[2]);
    }

    let pages = app.table.page_count(view.rows.len());
    let footer = format!(
        "Page {}/{} · {} orders   [←/→] Restaurant  [/] Search  [n/p] Page  [s/o] Sort  [e] Export",
        app.table.page.min(pages - 1) + 1,
        pages,
        view.rows.len()
    );
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn status_line(app: &App) -> Paragraph<'static> {
    let view = app.controller.view();
    let mut spans = Vec::new();

    match app.controller.phase() {
        Phase::Loading => spans.push(Span::styled("● Loading", Style::default().fg(Color::Yellow))),
        Phase::Loaded => spans.push(Span::styled("● Loaded", Style::default().fg(Color::Green))),
        Phase::Failed => {
            let reason = app
                .controller
                .last_error()
                .map(|e| e.to_string())
                .unwrap_or_default();
            spans.push(Span::styled(
                format!("● Failed: {} (showing previous results)", reason),
                Style::default().fg(Color::Red),
            ));
        }
        Phase::Idle => spans.push(Span::styled("● Idle", Style::default().fg(Color::DarkGray))),
    }

    if view.is_exporting {
        spans.push(Span::styled("  Exporting…", Style::default().fg(Color::Magenta)));
    }

    Paragraph::new(Line::from(spans))
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let header_cells: Vec<String> = SortColumn::ALL
        .iter()
        .map(|col| match app.table.sort {
            Some((sorted, dir)) if sorted == *col => format!("{} {}", col.title(), dir),
            _ => col.title().to_string(),
        })
        .collect();
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .table
        .visible(&app.controller.view().rows, &app.date_pattern)
        .into_iter()
        .map(|order| {
            Row::new(vec![
                order.order_number.to_string(),
                order.order_date.clone(),
                order.item_name.clone(),
                order.quantity.to_string(),
                format!("{:.2}", order.product_price),
                format!("{:.2}", order.total_products),
            ])
            .height(1)
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Length(18),
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .style(Style::default().fg(Color::White));
    frame.render_widget(table, area);
}
