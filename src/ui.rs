use crate::app::{App, ConnState, SearchOutcome};
use crate::chart::{ChartModel, ChartSlot};
use crate::format;
use crate::model::{DeviceStatus, ScannerKind};
use crate::view::View;
use chrono::Utc;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
    Row, Table,
};
use ratatui::Frame;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    match app.nav.active() {
        View::Home => draw_home(frame, chunks[1], app),
        View::Stats => draw_stats(frame, chunks[1], app),
        View::Logs => draw_logs(frame, chunks[1], app),
        View::Export => draw_export(frame, chunks[1], app),
    }
    draw_footer(frame, chunks[2], app);

    if app.notifications_open {
        draw_notifications(frame, app);
    }
    if app.search_focused {
        draw_search(frame, app);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let conn_style = match app.conn {
        ConnState::Operational => Style::default().fg(Color::Green),
        ConnState::Unknown => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red),
    };
    let badge = match app.notifications.badge() {
        Some(count) => format!(" [{}]", count),
        None => String::new(),
    };
    let nav: Vec<Span> = View::ALL
        .iter()
        .flat_map(|view| {
            let style = if *view == app.nav.active() {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            [Span::styled(view.nav_label(), style), Span::raw("  ")]
        })
        .collect();

    let mut line = vec![
        Span::styled(app.nav.title(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  |  "),
        Span::styled(app.conn.label(), conn_style),
        Span::raw("  |  "),
        Span::styled(app.filters.time().label(), Style::default().fg(ACCENT)),
        Span::styled(badge, Style::default().fg(Color::Red)),
        Span::raw("  |  "),
    ];
    line.extend(nav);

    let header = Paragraph::new(Line::from(line))
        .block(Block::default().borders(Borders::ALL).title("scandash"));
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let uptime = app.uptime_label(Utc::now());
    let footer = Paragraph::new(format!(
        " 1-4 views | tab scanner [{}] | s start  x stop  m manual | t time filter | / search | n notifications | q quit | uptime {}",
        app.selected_scanner.label(),
        uptime,
    ))
    .style(Style::default().fg(MUTED));
    frame.render_widget(footer, area);
}

// ---------------------------------------------------------------------------
// Home view
// ---------------------------------------------------------------------------

fn draw_home(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(chunks[0]);
    for (i, kind) in ScannerKind::ALL.iter().enumerate() {
        draw_scanner_card(frame, cards[i], app, *kind);
    }

    draw_device_table(frame, chunks[1], app);
}

fn draw_scanner_card(frame: &mut Frame, area: Rect, app: &App, kind: ScannerKind) {
    let status = app.scanners.get(kind);
    let running = status.is_some_and(|s| s.running);
    let state_span = if running {
        Span::styled("SCANNING", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled("IDLE", Style::default().fg(MUTED))
    };
    let count = status.map(|s| s.device_count);
    let last_scan = status.and_then(|s| s.last_scan);

    let lines = vec![
        Line::from(state_span),
        Line::from(format!("Devices: {}", format::count(count))),
        Line::from(format!("Last scan: {}", format::clock(last_scan))),
    ];
    let title = if app.selected_scanner == kind {
        format!("> {} <", kind.label())
    } else {
        kind.label().to_string()
    };
    let border_style = if app.selected_scanner == kind {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    };
    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    frame.render_widget(card, area);
}

fn draw_device_table(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.visible_devices();
    let title = format!("DETECTED DEVICES ({})", visible.len());

    if visible.is_empty() {
        let empty = Paragraph::new("No devices detected yet. Start a scan to begin.")
            .style(Style::default().fg(MUTED))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["TIME", "MAC", "NAME", "TYPE", "RSSI", "STATUS"])
        .style(Style::default().fg(ACCENT).bold());
    let rows: Vec<Row> = visible
        .iter()
        .map(|d| {
            let status = match d.status {
                DeviceStatus::Online => Span::styled("online", Style::default().fg(Color::Green)),
                DeviceStatus::Offline => Span::styled("offline", Style::default().fg(MUTED)),
            };
            Row::new(vec![
                Span::raw(format::clock(d.timestamp)),
                Span::styled(d.mac.clone(), Style::default().fg(ACCENT)),
                Span::raw(format::device_name(d.name.as_deref()).to_string()),
                Span::raw(d.kind.clone().unwrap_or_else(|| "Unknown".to_string())),
                Span::raw(format::signed(d.rssi)),
                status,
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(18),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Stats view
// ---------------------------------------------------------------------------

fn draw_stats(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // overview cards
            Constraint::Min(8),     // charts row 1
            Constraint::Min(8),     // charts row 2
            Constraint::Length(8),  // top devices + figures
        ])
        .split(area);

    draw_overview_cards(frame, chunks[0], app);

    let row1 = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[1]);
    draw_line_chart(frame, row1[0], app.charts.get(ChartSlot::Hourly), "HOURLY ACTIVITY");
    draw_bar_chart(frame, row1[1], app.charts.get(ChartSlot::Daily), "DAILY ACTIVITY");
    draw_bar_chart(frame, row1[2], app.charts.get(ChartSlot::Weekday), "WEEKDAY ACTIVITY");

    let row2 = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[2]);
    draw_heatmap(frame, row2[0], app.charts.get(ChartSlot::Heatmap));
    draw_bar_chart(frame, row2[1], app.charts.get(ChartSlot::Rssi), "RSSI DISTRIBUTION");
    draw_legend_chart(frame, row2[2], app.charts.get(ChartSlot::Vendors), "TOP VENDORS");

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[3]);
    draw_top_devices(frame, bottom[0], app);
    draw_figures(frame, bottom[1], app);
}

fn draw_overview_cards(frame: &mut Frame, area: Rect, app: &App) {
    let cards = app.overview_cards();
    let labels = ["TOTAL SCANS", "UNIQUE DEVICES", "LAST 24H", "LAST HOUR"];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);
    for i in 0..4 {
        let card = Paragraph::new(Line::from(vec![
            Span::styled(cards[i].clone(), Style::default().fg(ACCENT).bold()),
            Span::raw("  "),
            Span::styled(labels[i], Style::default().fg(MUTED)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(card, columns[i]);
    }
}

fn draw_line_chart(frame: &mut Frame, area: Rect, model: Option<&ChartModel>, title: &str) {
    let Some(model) = model else {
        draw_placeholder(frame, area, title);
        return;
    };
    let points: Vec<(f64, f64)> = model
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64, c.value))
        .collect();
    if points.is_empty() {
        draw_placeholder(frame, area, title);
        return;
    }
    let max = model.max_value().max(1.0);
    let color = model.categories[0].color;
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);
    let first = model.categories.first().map(|c| c.label.clone()).unwrap_or_default();
    let last = model.categories.last().map(|c| c.label.clone()).unwrap_or_default();
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len() - 1).max(1) as f64])
                .labels([first, last])
                .style(Style::default().fg(MUTED)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, max])
                .labels(["0".to_string(), format!("{:.0}", max)])
                .style(Style::default().fg(MUTED)),
        );
    frame.render_widget(chart, area);
}

fn draw_bar_chart(frame: &mut Frame, area: Rect, model: Option<&ChartModel>, title: &str) {
    let Some(model) = model else {
        draw_placeholder(frame, area, title);
        return;
    };
    if model.categories.is_empty() {
        draw_placeholder(frame, area, title);
        return;
    }
    let bars: Vec<Bar> = model
        .categories
        .iter()
        .map(|c| {
            Bar::default()
                .label(Line::from(c.label.clone()))
                .value(c.value.round() as u64)
                .style(Style::default().fg(c.color))
        })
        .collect();
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(chart, area);
}

/// Pie/doughnut slices rendered as legend rows with share bars; a terminal
/// has no arcs, the share column carries the same information.
fn draw_legend_chart(frame: &mut Frame, area: Rect, model: Option<&ChartModel>, title: &str) {
    let Some(model) = model else {
        draw_placeholder(frame, area, title);
        return;
    };
    let total = model.total();
    let lines: Vec<Line> = model
        .categories
        .iter()
        .map(|c| {
            let share = if total > 0.0 {
                format!("{:.1}%", c.value / total * 100.0)
            } else {
                format::PLACEHOLDER.to_string()
            };
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(c.color)),
                Span::raw(format!("{:<16}", c.label)),
                Span::styled(format!("{:>6}", c.value.round() as u64), Style::default().fg(ACCENT)),
                Span::styled(format!("  {:>6}", share), Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    let legend = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(legend, area);
}

fn draw_placeholder(frame: &mut Frame, area: Rect, title: &str) {
    let empty = Paragraph::new("No data yet")
        .style(Style::default().fg(MUTED))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(empty, area);
}

/// Color ramp for heatmap cells, quantized from the model's exact
/// `value / max` intensity.
pub fn heat_color(intensity: f64) -> Color {
    if intensity <= 0.0 {
        MUTED
    } else if intensity < 0.25 {
        Color::Blue
    } else if intensity < 0.5 {
        Color::Cyan
    } else if intensity < 0.75 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn draw_heatmap(frame: &mut Frame, area: Rect, model: Option<&ChartModel>) {
    let title = "ACTIVITY HEATMAP (hour x weekday)";
    let Some(model) = model else {
        draw_placeholder(frame, area, title);
        return;
    };
    if model.cells.is_empty() {
        draw_placeholder(frame, area, title);
        return;
    }
    let hours = model.x_labels.len();
    let mut lines = Vec::with_capacity(model.y_labels.len());
    for (day_idx, day) in model.y_labels.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<4}", day),
            Style::default().fg(MUTED),
        )];
        for hour in 0..hours {
            let intensity = model
                .cells
                .iter()
                .find(|c| c.x == hour && c.y == day_idx)
                .map(|c| c.intensity)
                .unwrap_or(0.0);
            spans.push(Span::styled("██", Style::default().fg(heat_color(intensity))));
        }
        lines.push(Line::from(spans));
    }
    let map = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(map, area);
}

fn draw_top_devices(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("TOP DEVICES");
    let Some(top) = &app.top_devices else {
        frame.render_widget(
            Paragraph::new("No devices found")
                .style(Style::default().fg(MUTED))
                .block(block),
            area,
        );
        return;
    };
    let header = Row::new(["#", "MAC", "NAME", "VENDOR", "COUNT", "SHARE"])
        .style(Style::default().fg(ACCENT).bold());
    let rows: Vec<Row> = top
        .devices
        .iter()
        .map(|d| {
            Row::new(vec![
                Span::styled(format!("#{}", d.rank), Style::default().fg(ACCENT).bold()),
                Span::styled(d.mac.clone(), Style::default().fg(ACCENT)),
                Span::raw(format::device_name(d.name.as_deref()).to_string()),
                Span::raw(format::lookup_oui(&d.mac).to_string()),
                Span::raw(d.count.to_string()),
                Span::styled(format::share(d.count, top.total), Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(18),
            Constraint::Min(14),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn draw_figures(frame: &mut Frame, area: Rect, app: &App) {
    let lifetime = app.lifetime.clone().unwrap_or_default();
    let advanced = app.advanced.clone().unwrap_or_default();
    let lines = vec![
        figure("Peak hour", match app.peak_hour {
            Some(h) => format!("{}:00", h),
            None => format::PLACEHOLDER.to_string(),
        }),
        figure("Busiest day", app.max_day.clone().unwrap_or_else(|| format::PLACEHOLDER.to_string())),
        figure("Most active weekday", app.most_active_day.clone().unwrap_or_else(|| format::PLACEHOLDER.to_string())),
        figure("RSSI median", format::signed(app.rssi_median)),
        figure("Avg lifetime", match lifetime.avg_lifetime_minutes {
            Some(v) => format!("{:.1} min", v),
            None => format::PLACEHOLDER.to_string(),
        }),
        figure("Repeat sightings", format::count(lifetime.devices_with_multiple_sightings)),
        figure("Avg scans/device", format::decimal(advanced.avg_scans_per_device)),
        figure("24h growth", format::percent(advanced.growth_rate_24h)),
    ];
    let figures = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("FIGURES"));
    frame.render_widget(figures, area);
}

fn figure(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<20}", label), Style::default().fg(MUTED)),
        Span::styled(value, Style::default().fg(ACCENT)),
    ])
}

// ---------------------------------------------------------------------------
// Logs / export views
// ---------------------------------------------------------------------------

fn draw_logs(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!("SCAN LOGS ({})", app.logs.len());
    if app.logs.is_empty() {
        let empty = Paragraph::new("No log entries. Press 'l' to refresh.")
            .style(Style::default().fg(MUTED))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }
    let lines: Vec<Line> = app
        .logs
        .iter()
        .skip(app.log_scroll)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{:<14}", entry.timestamp.clone().unwrap_or_default()),
                    Style::default().fg(MUTED),
                ),
                Span::styled(format!("{:<18}", entry.mac), Style::default().fg(ACCENT)),
                Span::raw(format::device_name(entry.name.as_deref()).to_string()),
                Span::styled(
                    format!("  [{}]", entry.scanner.clone().unwrap_or_else(|| "?".to_string())),
                    Style::default().fg(MUTED),
                ),
            ])
        })
        .collect();
    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_export(frame: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from("Export the backend's scan data with the active time filter."),
        Line::from(""),
        Line::from(vec![
            Span::styled("  e", Style::default().fg(ACCENT).bold()),
            Span::raw("  export as CSV"),
        ]),
        Line::from(vec![
            Span::styled("  j", Style::default().fg(ACCENT).bold()),
            Span::raw("  export as JSON"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Active filter: {}", app.filters.time().label()),
            Style::default().fg(MUTED),
        )),
        Line::from(Span::styled(
            "Files are saved as scan_stats_<timestamp>.<format>; the outcome shows up in notifications.",
            Style::default().fg(MUTED),
        )),
    ];
    let export = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("DATA EXPORT"));
    frame.render_widget(export, area);
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn overlay(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_notifications(frame: &mut Frame, app: &App) {
    let area = overlay(frame.area(), 60, 16);
    frame.render_widget(Clear, area);
    let now = Utc::now();
    let lines: Vec<Line> = if app.notifications.is_empty() {
        vec![Line::from(Span::styled(
            "No notifications",
            Style::default().fg(MUTED),
        ))]
    } else {
        app.notifications
            .entries()
            .iter()
            .map(|n| {
                let kind_color = match n.kind {
                    crate::notify::NotificationKind::Info => Color::Blue,
                    crate::notify::NotificationKind::Success => Color::Green,
                    crate::notify::NotificationKind::Error => Color::Red,
                };
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(kind_color)),
                    Span::styled(n.title.clone(), Style::default().bold()),
                    Span::raw(format!("  {}", n.message)),
                    Span::styled(
                        format!("  {}", format::time_ago(n.created_at, now)),
                        Style::default().fg(MUTED),
                    ),
                ])
            })
            .collect()
    };
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("NOTIFICATIONS (c clear, n close)"),
    );
    frame.render_widget(panel, area);
}

fn draw_search(frame: &mut Frame, app: &App) {
    let area = overlay(frame.area(), 64, 14);
    frame.render_widget(Clear, area);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(ACCENT)),
            Span::raw(app.search_input.clone()),
            Span::styled("_", Style::default().fg(ACCENT)),
        ]),
        Line::from(""),
    ];
    match &app.search_outcome {
        SearchOutcome::None => {
            lines.push(Line::from(Span::styled(
                "Type at least 2 characters to search devices and logs.",
                Style::default().fg(MUTED),
            )));
        }
        SearchOutcome::Failed => {
            lines.push(Line::from(Span::styled(
                "Search failed",
                Style::default().fg(Color::Red),
            )));
        }
        SearchOutcome::Results(results) if results.is_empty() => {
            lines.push(Line::from(Span::styled(
                "No results found",
                Style::default().fg(MUTED),
            )));
        }
        SearchOutcome::Results(results) => {
            for entry in results.iter().take(10) {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<18}", entry.mac), Style::default().fg(ACCENT)),
                    Span::raw(format::device_name(entry.name.as_deref()).to_string()),
                    Span::styled(
                        format!("  {}", entry.timestamp.clone().unwrap_or_default()),
                        Style::default().fg(MUTED),
                    ),
                ]));
            }
        }
    }
    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("SEARCH (esc to close)"));
    frame.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn placeholder_shows_title_and_hint() {
        let backend = TestBackend::new(30, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw_placeholder(frame, frame.area(), "HOURLY ACTIVITY"))
            .unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("HOURLY ACTIVITY"));
        assert!(rendered.contains("No data yet"));
    }

    #[test]
    fn heat_color_is_monotone_over_intensity() {
        assert_eq!(heat_color(0.0), MUTED);
        assert_eq!(heat_color(0.1), Color::Blue);
        assert_eq!(heat_color(0.3), Color::Cyan);
        assert_eq!(heat_color(0.6), Color::Yellow);
        assert_eq!(heat_color(1.0), Color::Red);
    }

    #[test]
    fn overlay_is_clamped_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = overlay(area, 100, 100);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
    }
}
