use chrono::Local;
use image::RgbaImage;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, List, ListItem, Paragraph, Row, Table},
};
use weather_core::{CurrentPanel, DisplayUnit, ForecastRow, Icon, Status, view::TITLE};

use crate::app::App;

const ACCENT: Color = Color::Rgb(0xee, 0xbb, 0xc3);
const MISSING: &str = "--";

/// Icon size in terminal cells; each cell shows two pixels stacked.
const CURRENT_ICON: (u16, u16) = (12, 6);
const FORECAST_ICON: (u16, u16) = (4, 2);

pub fn draw(f: &mut Frame, app: &App) {
    let state = app.session.state();
    let screen = app.session.screen();

    let forecast_height = if state.forecast_visible { Constraint::Min(4) } else { Constraint::Length(0) };
    let [title, search, toggles, current, forecast, status, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(CURRENT_ICON.1 + 2),
        forecast_height,
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .margin(1)
    .areas(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(
            TITLE,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        title,
    );

    draw_search(f, search, &app.input);
    draw_toggles(f, toggles, state.unit, state.forecast_visible);
    let updated = app
        .session
        .last_report()
        .filter(|_| screen.current.is_some())
        .map(|r| r.fetched_at.with_timezone(&Local).format("%H:%M:%S").to_string());
    draw_current(f, current, screen.current.as_ref(), updated.as_deref());
    if state.forecast_visible {
        draw_forecast(f, forecast, screen.forecast.as_deref());
    }
    draw_status(f, status, &screen.status);
}

fn block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn draw_search(f: &mut Frame, area: Rect, input: &str) {
    let widget = Paragraph::new(input).block(block("City (Enter to search)"));
    f.render_widget(widget, area);

    f.set_cursor_position((cursor_x(area, input), area.y + 1));
}

/// Column after the last typed char, clamped inside the box border.
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    area.x.saturating_add(1).saturating_add(typed).min(max_x)
}

fn checkbox(label: &str, key: &str, checked: bool) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("[{key}] "), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(if checked { "[x] " } else { "[ ] " }),
        Span::styled(label.to_string(), Style::default().fg(ACCENT)),
        Span::raw("   "),
    ]
}

fn draw_toggles(f: &mut Frame, area: Rect, unit: DisplayUnit, forecast_visible: bool) {
    let mut spans = checkbox("Show °F", "F2", unit == DisplayUnit::Fahrenheit);
    spans.extend(checkbox("Show 3-Day Forecast", "F3", forecast_visible));
    spans.push(Span::styled("[Esc] quit", Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_current(f: &mut Frame, area: Rect, panel: Option<&CurrentPanel>, updated: Option<&str>) {
    let title = match updated {
        Some(at) => format!("Current Conditions · updated {at}"),
        None => "Current Conditions".to_string(),
    };
    let outer = block(&title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let Some(panel) = panel else {
        f.render_widget(Paragraph::new(format!(" {MISSING}")), inner);
        return;
    };

    let [icon_area, text_area] =
        Layout::horizontal([Constraint::Length(CURRENT_ICON.0 + 2), Constraint::Min(0)]).areas(inner);

    if let Some(icon) = &panel.icon {
        let lines = icon_lines(icon, CURRENT_ICON.0, CURRENT_ICON.1);
        f.render_widget(Paragraph::new(lines), icon_area.inner(ratatui::layout::Margin::new(1, 0)));
    }

    let rows: Vec<Row> = panel
        .rows()
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(label),
                Cell::from(value.to_string()).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)]);
    f.render_widget(table, text_area);
}

fn draw_forecast(f: &mut Frame, area: Rect, rows: Option<&[ForecastRow]>) {
    let outer = block("3-Day Forecast");

    let items: Vec<ListItem> = match rows {
        Some(rows) if !rows.is_empty() => rows.iter().map(forecast_item).collect(),
        _ => vec![ListItem::new(format!(" {MISSING}"))],
    };

    f.render_widget(List::new(items).block(outer), area);
}

fn forecast_item(row: &ForecastRow) -> ListItem<'static> {
    let (w, h) = FORECAST_ICON;
    let mut lines = match &row.icon {
        Some(icon) => icon_lines(icon, w, h),
        None => (0..h).map(|_| Line::from(" ".repeat(w as usize))).collect(),
    };
    if let Some(first) = lines.first_mut() {
        first.spans.push(Span::raw(" "));
        first.spans.push(Span::styled(row.text.clone(), Style::default().fg(ACCENT)));
    }
    ListItem::new(lines)
}

fn draw_status(f: &mut Frame, area: Rect, status: &Status) {
    let style = match status {
        Status::Idle => Style::default(),
        Status::Loading(_) => Style::default().fg(Color::Yellow),
        Status::Error(_) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    f.render_widget(
        Paragraph::new(Span::styled(status.text(), style)).alignment(Alignment::Center),
        area,
    );
}

/// Renders an icon with upper-half blocks: foreground is the top pixel,
/// background the bottom one.
pub fn icon_lines(icon: &Icon, width: u16, height: u16) -> Vec<Line<'static>> {
    let img = icon.thumbnail(u32::from(width), u32::from(height) * 2);
    half_block_lines(&img)
}

fn half_block_lines(img: &RgbaImage) -> Vec<Line<'static>> {
    let (w, h) = img.dimensions();
    (0..h / 2)
        .map(|row| {
            let spans: Vec<Span> = (0..w)
                .map(|x| {
                    let top = pixel_color(img, x, row * 2);
                    let bottom = pixel_color(img, x, row * 2 + 1);
                    Span::styled("▀", Style::default().fg(top).bg(bottom))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn pixel_color(img: &RgbaImage, x: u32, y: u32) -> Color {
    let [r, g, b, a] = img.get_pixel(x, y).0;
    if a < 128 { Color::Reset } else { Color::Rgb(r, g, b) }
}
