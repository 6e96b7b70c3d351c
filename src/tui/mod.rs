//! Ratatui-based dashboard.
//!
//! Two tabs share one date window:
//! - **Series**: pick a catalog series, see its latest value and change, and a
//!   trend chart (or the raw rows)
//! - **Sectors**: latest month-over-month change per sector series as bars,
//!   plus the layered change history
//!
//! The store is read through a [`StoreCache`], so redraws after key presses
//! only touch the file when it changed on disk.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::config::Settings;
use crate::domain::{Catalog, DateRange, Unit, add_months};
use crate::error::AppError;
use crate::present::{
    SectorComparison, Selection, SeriesMetrics, SeriesView, StoreCache, sector_comparison, sector_defs, series_view,
};
use crate::report::{format_change, format_pct_change, format_value, group_thousands, month_label, shows_negative};

mod plotters_chart;

use plotters_chart::{ChartLine, PALETTE, TrendChart, chart_bounds, fmt_month_index, month_index, palette_color};

const NO_DATA: &str = "No data for the selected range";

/// Start the dashboard.
///
/// The store is loaded before the terminal switches modes, so a missing store
/// is reported as a plain error message.
pub fn run(settings: Settings) -> Result<(), AppError> {
    let mut app = App::new(&settings)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Series,
    Sectors,
}

const FIELD_SERIES: usize = 0;
const FIELD_START: usize = 1;
const FIELD_END: usize = 2;

struct App {
    catalog: Catalog,
    sector_ids: Vec<String>,
    tick_rate: Duration,
    cache: StoreCache,
    tab: Tab,
    selected_series: usize,
    selected_field: usize,
    /// User-chosen window; `None` shows the full span of the store.
    range: Option<DateRange>,
    /// Span of the whole store, used to clamp range edits.
    bounds: Option<DateRange>,
    show_table: bool,
    status: String,
    view: Option<SeriesView>,
    sectors: SectorComparison,
}

impl App {
    fn new(settings: &Settings) -> Result<Self, AppError> {
        let mut app = Self {
            catalog: settings.catalog()?,
            sector_ids: settings.dashboard.sector_series.clone(),
            tick_rate: Duration::from_millis(settings.dashboard.tick_rate_ms.max(10)),
            cache: StoreCache::new(settings.store_path()),
            tab: Tab::Series,
            selected_series: 0,
            selected_field: FIELD_SERIES,
            range: None,
            bounds: None,
            show_table: false,
            status: String::new(),
            view: None,
            sectors: SectorComparison::default(),
        };
        let n = app.refresh()?;
        app.status = format!("Loaded {n} rows from {}", app.cache.path().display());
        tracing::info!(rows = n, path = %app.cache.path().display(), "dashboard started");
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(self.tick_rate).map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the dashboard should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Char('s') => {
                self.tab = match self.tab {
                    Tab::Series => Tab::Sectors,
                    Tab::Sectors => Tab::Series,
                };
            }
            KeyCode::Char('t') => {
                self.show_table = !self.show_table;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.cache.invalidate();
                match self.refresh() {
                    Ok(n) => self.status = format!("Reloaded {n} rows."),
                    Err(err) => self.report_error(err),
                }
            }
            KeyCode::Char('a') => {
                self.range = None;
                self.apply("Showing the full span.");
            }
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_END {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_SERIES => {
                let len = self.catalog.len() as i32;
                if len == 0 {
                    return;
                }
                self.selected_series = (self.selected_series as i32 + delta).rem_euclid(len) as usize;
                let name = self
                    .catalog
                    .get(self.selected_series)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                self.apply(&format!("series: {name}"));
            }
            FIELD_START | FIELD_END => {
                let Some(bounds) = self.bounds else {
                    self.status = "Store is empty.".to_string();
                    return;
                };
                let current = self.range.unwrap_or(bounds);
                let (start, end) = if self.selected_field == FIELD_START {
                    let start = bounds.clamp(add_months(current.start, delta));
                    (start.min(current.end), current.end)
                } else {
                    let end = bounds.clamp(add_months(current.end, delta));
                    (current.start, end.max(current.start))
                };
                self.range = DateRange::new(start, end).ok();
                self.apply(&format!("range: {} .. {}", month_label(start), month_label(end)));
            }
            _ => {}
        }
    }

    /// Recompute views after a selection change, keeping errors on the status line.
    fn apply(&mut self, status: &str) {
        match self.refresh() {
            Ok(_) => self.status = status.to_string(),
            Err(err) => self.report_error(err),
        }
    }

    fn report_error(&mut self, err: AppError) {
        tracing::warn!(error = %err, "dashboard refresh failed");
        self.status = err.to_string();
    }

    /// Re-read the store if needed and rebuild the series view and sector comparison.
    fn refresh(&mut self) -> Result<usize, AppError> {
        let rows = self.cache.rows()?;
        self.bounds = DateRange::spanning(rows);

        let selection = Selection::default().with_range(self.range);
        self.view = self
            .catalog
            .get(self.selected_series)
            .map(|series| series_view(rows, series, &selection));

        let sectors = sector_defs(&self.catalog, &self.sector_ids);
        self.sectors = sector_comparison(rows, &sectors, self.range);

        Ok(rows.len())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Series => self.draw_series_tab(frame, chunks[1]),
            Tab::Sectors => self.draw_sectors_tab(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn range_label(&self) -> String {
        match self.range.or(self.bounds) {
            Some(r) => format!("{} .. {}", month_label(r.start), month_label(r.end)),
            None => "-".to_string(),
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tab_style = |tab: Tab| {
            if self.tab == tab {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            }
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("labor", Style::default().fg(Color::Cyan)),
            Span::raw(" - BLS labor market dashboard  "),
            Span::styled(" Series ", tab_style(Tab::Series)),
            Span::raw(" "),
            Span::styled(" Sectors ", tab_style(Tab::Sectors)),
        ]));

        match self.tab {
            Tab::Series => {
                let Some(view) = &self.view else {
                    lines.push(Line::from("No series configured."));
                    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
                    frame.render_widget(p, area);
                    return;
                };
                lines.push(Line::from(Span::styled(
                    format!(
                        "{} ({}) | range: {} | n={}",
                        view.series.name,
                        view.series.id,
                        self.range_label(),
                        view.rows.len()
                    ),
                    Style::default().fg(Color::Gray),
                )));
                lines.push(metrics_line(&view.metrics, view.unit()));
            }
            Tab::Sectors => {
                let names = self
                    .sectors
                    .latest
                    .iter()
                    .map(|l| l.series_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(Line::from(Span::styled(
                    format!("range: {} | sectors: {}", self.range_label(), if names.is_empty() { "-" } else { names.as_str() }),
                    Style::default().fg(Color::Gray),
                )));
                if self.sectors.is_empty() {
                    lines.push(Line::from(Span::styled(NO_DATA, Style::default().fg(Color::Yellow))));
                }
            }
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_series_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);
        if self.show_table {
            self.draw_table(frame, chunks[1]);
        } else {
            self.draw_series_chart(frame, chunks[1]);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        let focused = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let title_style = |field_focused: bool| if field_focused { focused } else { Style::default() };

        let items: Vec<ListItem> = self.catalog.iter().map(|s| ListItem::new(s.name.clone())).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled("Series", title_style(self.selected_field == FIELD_SERIES)))
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(self.selected_series));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let shown = self.range.or(self.bounds);
        let label = |pick: fn(DateRange) -> chrono::NaiveDate| shown.map(|r| month_label(pick(r))).unwrap_or_else(|| "-".to_string());
        let range_items = vec![
            ListItem::new(format!("Start: {}", label(|r| r.start))),
            ListItem::new(format!("End:   {}", label(|r| r.end))),
        ];
        let range_focused = self.selected_field != FIELD_SERIES;
        let range_list = List::new(range_items)
            .block(
                Block::default()
                    .title(Span::styled("Range", title_style(range_focused)))
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut range_state = ListState::default();
        if range_focused {
            range_state.select(Some(self.selected_field - FIELD_START));
        }
        frame.render_stateful_widget(range_list, chunks[1], &mut range_state);
    }

    fn draw_series_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .view
            .as_ref()
            .map(|v| format!("{} trend", v.series.name))
            .unwrap_or_else(|| "Trend".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = self.view.as_ref().filter(|v| !v.rows.is_empty()) else {
            frame.render_widget(no_data(), inner);
            return;
        };

        let lines = vec![ChartLine {
            label: view.series.name.clone(),
            points: view.rows.iter().map(|r| (month_index(r.date), r.value)).collect(),
            color: PALETTE[0],
        }];
        let unit = view.unit();
        render_chart(frame, inner, &lines, unit.label().to_string(), axis_formatter(unit));
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Rows").borders(Borders::ALL);
        let Some(view) = self.view.as_ref().filter(|v| !v.rows.is_empty()) else {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(no_data(), inner);
            return;
        };

        // Most recent rows at the bottom; drop the oldest when the table overflows.
        let visible = area.height.saturating_sub(3) as usize;
        let skip = view.rows.len().saturating_sub(visible);
        let unit = view.unit();
        let rows = view.rows.iter().skip(skip).map(|r| {
            Row::new(vec![
                Cell::from(month_label(r.date)),
                Cell::from(format_value(r.value, unit)),
                Cell::from(r.period_name.clone()),
            ])
        });

        let table = Table::new(rows, [Constraint::Length(9), Constraint::Length(16), Constraint::Min(10)])
            .header(
                Row::new(vec!["Date", "Value", "Period"]).style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block);
        frame.render_widget(table, area);
    }

    fn draw_sectors_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let bar_height = (self.sectors.latest.len() as u16).saturating_mul(2) + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(bar_height.max(4)), Constraint::Min(0)])
            .split(area);

        self.draw_sector_bars(frame, chunks[0]);
        self.draw_sector_history(frame, chunks[1]);
    }

    fn draw_sector_bars(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Latest month-over-month change")
            .borders(Borders::ALL);
        if self.sectors.latest.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(no_data(), inner);
            return;
        }

        // Bars are unsigned; color carries the sign and the text shows the value.
        let bars: Vec<Bar> = self
            .sectors
            .latest
            .iter()
            .map(|l| {
                let unit = self.catalog.by_id(&l.series_id).map(|s| s.unit).unwrap_or(Unit::Count);
                let color = if shows_negative(l.change) { Color::Red } else { Color::Green };
                Bar::default()
                    .label(Line::from(l.series_name.clone()))
                    .value(l.change.abs().round() as u64)
                    .text_value(format!("{} ({})", format_change(l.change, unit), month_label(l.date)))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_sector_history(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Change history").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let lines: Vec<ChartLine> = self
            .sectors
            .latest
            .iter()
            .enumerate()
            .map(|(idx, l)| ChartLine {
                label: l.series_name.clone(),
                points: self
                    .sectors
                    .series_history(&l.series_id)
                    .filter_map(|m| m.change.map(|c| (month_index(m.date), c)))
                    .collect(),
                color: PALETTE[idx % PALETTE.len()],
            })
            .filter(|line| !line.points.is_empty())
            .collect();

        if lines.is_empty() || inner.height < 2 {
            frame.render_widget(no_data(), inner);
            return;
        }

        let legend: Vec<Span> = lines
            .iter()
            .enumerate()
            .flat_map(|(idx, line)| {
                [
                    Span::styled("── ", Style::default().fg(palette_color(idx))),
                    Span::raw(format!("{}  ", line.label)),
                ]
            })
            .collect();
        let legend_rect = Rect { height: 1, ..inner };
        frame.render_widget(Paragraph::new(Line::from(legend)), legend_rect);

        let chart_area = Rect {
            y: inner.y + 1,
            height: inner.height - 1,
            ..inner
        };
        render_chart(frame, chart_area, &lines, "m/m change".to_string(), |v| group_thousands(v, 0));
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  ←/→ adjust  a all  t table  s sectors  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn no_data() -> Paragraph<'static> {
    Paragraph::new(NO_DATA).style(Style::default().fg(Color::Yellow))
}

fn metrics_line(metrics: &SeriesMetrics, unit: Unit) -> Line<'static> {
    match metrics {
        SeriesMetrics::NoData => Line::from(Span::styled(NO_DATA, Style::default().fg(Color::Yellow))),
        SeriesMetrics::Summary(s) => {
            let change_color = if shows_negative(s.change) { Color::Red } else { Color::Green };
            let prior = match s.prior_date {
                Some(d) => format!(" vs {}", month_label(d)),
                None => String::new(),
            };
            Line::from(vec![
                Span::raw(format!("Latest {} ({})  ", format_value(s.latest, unit), month_label(s.latest_date))),
                Span::styled(
                    format!("{} {}", format_change(s.change, unit), format_pct_change(s.pct_change)),
                    Style::default().fg(change_color),
                ),
                Span::raw(format!("{prior}  min {} max {}", format_value(s.min, unit), format_value(s.max, unit))),
            ])
        }
    }
}

fn axis_formatter(unit: Unit) -> fn(f64) -> String {
    match unit {
        Unit::Percentage => |v| format!("{v:.1}%"),
        Unit::Count => |v| group_thousands(v, 0),
        Unit::Currency => |v| format!("${v:.2}"),
    }
}

fn render_chart(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    lines: &[ChartLine],
    y_label: String,
    fmt_y: fn(f64) -> String,
) {
    let Some((x_bounds, y_bounds)) = chart_bounds(lines) else {
        frame.render_widget(no_data(), inner);
        return;
    };

    let (chart_rect, insets) = chart_layout(inner);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, &y_label, fmt_y);
    }

    let widget = TrendChart {
        lines,
        x_bounds,
        y_bounds,
        y_label,
        fmt_y,
    };
    frame.render_widget(widget, chart_rect);
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

#[allow(clippy::too_many_arguments)]
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: &str,
    fmt_y: fn(f64) -> String,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_month_index(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 || start + label_len > inner.x + inner.width {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_y(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("month")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
