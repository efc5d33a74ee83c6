use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, List, ListItem,
        ListState, Paragraph, Tabs, Wrap,
    },
};

use crate::colormap::{self, Legend, format_magnitude};
use crate::data::Metric;
use crate::nav::{DetailState, NavState};
use crate::series::{ChartKind, Series, SeriesAxis, compose_series, rank_by_metric};
use crate::state::{AppState, ViewTab};

const MAP_HELP: &str = "\
↑/↓: select country
Enter or click: open country
m: next metric
←/→: year
l: linear/log scale
Tab: rankings
q: quit";

const DETAIL_HELP: &str = "\
↑/↓: pick compare country
Enter: compare
d: clear compare
c: chart type
x: x-axis  v: y-axis
Esc/Backspace: back to map
q: quit";

pub fn draw(f: &mut Frame, state: &mut AppState) {
    match state.nav.clone() {
        NavState::MapView => match state.tab {
            ViewTab::Map => draw_map_view(f, state),
            ViewTab::Rankings => draw_rankings(f, state),
        },
        NavState::CountryDetail(detail) => draw_detail(f, state, &detail),
    }
}

fn draw_map_view(f: &mut Frame, state: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(f.area());
    draw_tabs(f, rows[0], 0);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(rows[1]);

    // Country list
    let items: Vec<ListItem> = state
        .dataset
        .codes()
        .iter()
        .map(|c| ListItem::new(format!("{c}  {}", state.dataset.name_for(c))))
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Countries"))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    // Map plus legend
    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(chunks[1]);
    state.map_area = Some(center[0]);
    let highlight = state.dataset.codes().get(state.selected).map(String::as_str);
    let title = format!("{} ({})", state.metric().label(), state.year());
    state.map.render(f, center[0], &title, highlight);
    draw_legend(f, center[1], &state.legend);

    // Info panel
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    let info = Paragraph::new(map_info(state))
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true });
    f.render_widget(info, right[0]);
    let help = Paragraph::new(MAP_HELP)
        .block(Block::default().borders(Borders::ALL).title("Keys"))
        .wrap(Wrap { trim: true });
    f.render_widget(help, right[1]);
}

fn map_info(state: &AppState) -> String {
    let Some(code) = state.dataset.codes().get(state.selected) else {
        return String::from("no countries loaded");
    };
    let name = state.dataset.name_for(code);
    let current = state
        .styled
        .iter()
        .find(|s| &s.code == code)
        .map(|s| s.value.to_string())
        .unwrap_or_else(|| String::from("N/A"));
    let mut text = format!(
        "{name} ({code})\n{} ({}): {current}\n\n",
        state.metric().label(),
        state.year()
    );
    let history = state.dataset.history(code);
    for metric in Metric::MAP_METRICS {
        let latest = history
            .iter()
            .rev()
            .find_map(|r| r.metric(metric).map(|v| (r.year, v)));
        match latest {
            Some((year, v)) => {
                text.push_str(&format!("{} ({year}): {}\n", metric.label(), format_magnitude(v)));
            }
            None => text.push_str(&format!("{}: N/A\n", metric.label())),
        }
    }
    text
}

fn draw_legend(f: &mut Frame, area: Rect, legend: &Legend) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(legend.caption.clone());
    let inner_width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();
    if legend.domain.is_some() && inner_width >= 8 {
        let gradient: Vec<Span> = (0..inner_width)
            .map(|i| {
                let frac = i as f64 / (inner_width - 1) as f64;
                let c = colormap::ramp(frac);
                Span::styled("█", Style::default().fg(Color::Rgb(c.r, c.g, c.b)))
            })
            .collect();
        lines.push(Line::from(gradient));
        lines.push(Line::from(spread_labels(&legend.ticks(3), inner_width)));
    } else {
        lines.push(Line::from("no data for this selection"));
    }
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Lays tick labels on one text row at their ramp positions.
fn spread_labels(ticks: &[(f64, String)], width: usize) -> String {
    let mut row = vec![' '; width];
    for (frac, label) in ticks {
        let len = label.chars().count().min(width);
        let center = (frac * (width.saturating_sub(1)) as f64).round() as usize;
        let start = center.saturating_sub(len / 2).min(width - len);
        for (i, ch) in label.chars().take(len).enumerate() {
            row[start + i] = ch;
        }
    }
    row.into_iter().collect()
}

fn draw_detail(f: &mut Frame, state: &mut AppState, detail: &DetailState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(56),
            Constraint::Percentage(22),
        ])
        .split(f.area());

    // Compare picker
    let candidates = state.compare_candidates();
    let items: Vec<ListItem> = candidates
        .iter()
        .map(|c| ListItem::new(format!("{c}  {}", state.dataset.name_for(c))))
        .collect();
    let mut list_state = ListState::default();
    if !candidates.is_empty() {
        list_state.select(Some(state.compare_sel.min(candidates.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Compare with"))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    // Chart
    let series = compose_series(&state.dataset, detail);
    draw_chart(f, chunks[1], &series, detail);

    // Info panel
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    let info = Paragraph::new(detail_info(state, detail))
        .block(Block::default().borders(Borders::ALL).title("Selection"))
        .wrap(Wrap { trim: true });
    f.render_widget(info, right[0]);
    let help = Paragraph::new(DETAIL_HELP)
        .block(Block::default().borders(Borders::ALL).title("Keys"))
        .wrap(Wrap { trim: true });
    f.render_widget(help, right[1]);
}

fn detail_info(state: &AppState, detail: &DetailState) -> String {
    let name = state.dataset.name_for(&detail.country);
    let compare = match &detail.compare {
        Some(code) => state.dataset.name_for(code).to_string(),
        None => String::from("none"),
    };
    format!(
        "{name} ({})\n\nChart: {}\nX: {}\nY: {}\nCompare: {compare}",
        detail.country,
        detail.chart.label(),
        detail.x_axis.label(),
        detail.y_axis.label()
    )
}

fn draw_chart(f: &mut Frame, area: Rect, series: &[Series], detail: &DetailState) {
    let name = series.first().map(|s| s.label.as_str()).unwrap_or("");
    let title = format!(
        "{} over {} for {name}",
        detail.y_axis.label(),
        detail.x_axis.label()
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    let total_points: usize = series.iter().map(|s| s.points.len()).sum();
    if total_points == 0 {
        let empty = Paragraph::new("No data for this selection")
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, area);
        return;
    }

    let (x_min, x_max, y_min, y_max) = chart_bounds(series);
    let colors = [Color::Cyan, Color::Yellow];
    let datasets: Vec<ChartDataset> = series
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.points.is_empty())
        .map(|(i, s)| {
            ChartDataset::default()
                .name(s.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(graph_type(detail.chart))
                .style(Style::default().fg(colors[i % colors.len()]))
                .data(&s.points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(detail.x_axis.label())
                .bounds([x_min, x_max])
                .labels(axis_labels(x_min, x_max, detail.x_axis == SeriesAxis::Year)),
        )
        .y_axis(
            Axis::default()
                .title(detail.y_axis.label())
                .bounds([y_min, y_max])
                .labels(axis_labels(y_min, y_max, false)),
        );
    f.render_widget(chart, area);
}

/// Resolves the chart kind to its rendering strategy once per draw.
fn graph_type(kind: ChartKind) -> GraphType {
    match kind {
        ChartKind::Line => GraphType::Line,
        ChartKind::Bar => GraphType::Bar,
        ChartKind::Scatter => GraphType::Scatter,
    }
}

fn chart_bounds(series: &[Series]) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for s in series {
        for &(x, y) in &s.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    // A flat axis still needs a non-zero span to plot on.
    if x_max - x_min < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if y_max - y_min < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }
    (x_min, x_max, y_min, y_max)
}

fn axis_labels(min: f64, max: f64, years: bool) -> Vec<String> {
    let mid = (min + max) / 2.0;
    [min, mid, max]
        .iter()
        .map(|v| {
            if years {
                format!("{v:.0}")
            } else {
                format_magnitude(*v)
            }
        })
        .collect()
}

fn draw_rankings(f: &mut Frame, state: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(f.area());
    draw_tabs(f, rows[0], 1);

    let header = format!(
        "Year {}    g: governance metric    c: climate metric    ←/→: year    Tab: map",
        state.year()
    );
    f.render_widget(
        Paragraph::new(header).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    draw_rank_table(f, halves[0], state, state.rank_gov_metric());
    draw_rank_table(f, halves[1], state, state.rank_cli_metric());
}

fn draw_rank_table(f: &mut Frame, area: Rect, state: &AppState, metric: Metric) {
    let rows = rank_by_metric(&state.dataset, state.year(), metric, 10);
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            ListItem::new(format!(
                "{:>2}. {:<28} {}",
                i + 1,
                r.name,
                format_magnitude(r.value)
            ))
        })
        .collect();
    let title = format!("Top 10 by {}", metric.label());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn draw_tabs(f: &mut Frame, area: Rect, selected: usize) {
    let tabs = Tabs::new(vec!["Map", "Rankings"])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}
