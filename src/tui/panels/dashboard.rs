use crate::controller::ChartData;
use crate::transform::{scale_to_thousands, RevenuePeriodPoint, Series};
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
];

pub fn render_dashboard_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Dashboard ")
        .style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let status = if app.charts_loading {
        Paragraph::new("Loading charts…").style(Style::default().fg(Color::Yellow))
    } else if let Some(err) = &app.charts_error {
        Paragraph::new(format!("Failed to refresh charts: {}", err)).style(Style::default().fg(Color::Red))
    } else {
        Paragraph::new("[r] Refresh").style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(status, chunks[0]);

    let Some(charts) = &app.charts else {
        return;
    };
    render_charts(frame, charts, chunks[1]);
}

fn render_charts(frame: &mut Frame, charts: &ChartData, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_revenue_periods(frame, &charts.revenue_periods, rows[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let product_bars: Vec<Bar> = charts
        .top_products
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value)
                .label(Line::from(p.label.clone()))
                .text_value(format!("{}K", p.value))
        })
        .collect();
    let top_products = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Top 5 Products by Revenue "),
        )
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .data(BarGroup::default().bars(&product_bars));
    frame.render_widget(top_products, bottom[0]);

    let mut compare = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Compare Revenue By Years "),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3);
    for (i, series) in charts.restaurant_series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let bars: Vec<Bar> = series
            .points
            .iter()
            .map(|p| {
                let thousands = scale_to_thousands(p.value);
                Bar::default()
                    .value(thousands)
                    .label(Line::from(p.label.to_string()))
                    .text_value(format!("{}K", thousands))
                    .style(Style::default().fg(color))
            })
            .collect();
        compare = compare.data(
            BarGroup::default()
                .label(Line::from(series.name.clone()))
                .bars(&bars),
        );
    }
    frame.render_widget(compare, bottom[1]);
}

/// One chart per period, side by side.
fn render_revenue_periods(frame: &mut Frame, periods: &[Series<RevenuePeriodPoint>], area: Rect) {
    if periods.is_empty() {
        let empty = Paragraph::new("No revenue periods reported.")
            .block(Block::default().borders(Borders::ALL).title(" Revenue Periods "))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let n = periods.len() as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(periods.iter().map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
        .split(area);

    for (i, period) in periods.iter().enumerate() {
        let bars: Vec<Bar> = period
            .points
            .iter()
            .enumerate()
            .map(|(j, p)| {
                Bar::default()
                    // tenths of a percent keep one decimal of resolution
                    .value((p.value.clamp(0.0, 100.0) * 10.0).round() as u64)
                    .label(Line::from(p.name.clone()))
                    .text_value(format!("{:.1}%", p.value))
                    .style(Style::default().fg(SERIES_COLORS[j % SERIES_COLORS.len()]))
            })
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", period.name)),
            )
            .bar_width(8)
            .bar_gap(2)
            .max(1000)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, columns[i]);
    }
}
