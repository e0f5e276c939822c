//! UI rendering for the TUI

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, ResultsPane, Screen};
use super::filters;
use super::form;
use super::log_pane;
use super::results;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let log_height = if app.log.visible { log_pane::LOG_PANE_HEIGHT } else { 0 };

    // header + main content + log pane (F12) + status bar
    let [header_area, main_area, log_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(log_height),
        Constraint::Length(1),
    ])
    .areas(area);

    let buf = frame.buffer_mut();
    render_header(header_area, buf, app);

    match app.screen {
        Screen::Search => render_search_screen(main_area, buf, app),
        Screen::Results => render_results_screen(main_area, buf, app),
    }

    if app.log.visible {
        log_pane::render(log_area, buf, &app.log);
    }

    render_status(status_area, buf, app);
}

fn render_search_screen(area: Rect, buf: &mut Buffer, app: &App) {
    // Center the form horizontally, keep it near the top.
    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Max(90),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, form_area, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(form::FORM_HEIGHT),
        Constraint::Fill(1),
    ])
    .areas(column);

    form::render(form_area, buf, &app.form, app.is_loading());
}

fn render_results_screen(area: Rect, buf: &mut Buffer, app: &App) {
    let [filters_area, results_area] =
        Layout::horizontal([Constraint::Length(filters::PANEL_WIDTH), Constraint::Fill(1)]).areas(area);

    filters::render(
        filters_area,
        buf,
        &app.filter_panel,
        app.filters(),
        app.price_upper(),
        app.sort_by(),
        app.airlines(),
        &app.currency,
        app.results_pane == ResultsPane::Filters,
    );

    results::render(
        results_area,
        buf,
        &app.status,
        app.view(),
        &app.results,
        app.results_pane == ResultsPane::List,
    );
}

fn render_header(area: Rect, buf: &mut Buffer, app: &App) {
    let title = Span::styled(
        " Skybound",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    );

    let route = match app.last_request() {
        Some(req) if app.screen == Screen::Results => format!(
            "{} -> {}  {}  {} traveler{}  {} offers ",
            req.origin_code,
            req.destination_code,
            req.date.format("%d %b %Y"),
            req.adults,
            if req.adults == 1 { "" } else { "s" },
            app.flights().len()
        ),
        _ => String::new(),
    };

    let left_width = UnicodeWidthStr::width(" Skybound");
    let right_width = UnicodeWidthStr::width(route.as_str());
    let padding_width = area.width.saturating_sub((left_width + right_width) as u16) as usize;

    let header_line = Line::from(vec![
        title,
        Span::raw(" ".repeat(padding_width)),
        Span::styled(route, Style::default().fg(Color::Cyan)),
    ]);

    Paragraph::new(header_line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

fn render_status(area: Rect, buf: &mut Buffer, app: &App) {
    let sep = Span::styled(" | ", Style::default().fg(Color::Gray));
    let hint = |text: &str| Span::styled(text.to_string(), Style::default().fg(Color::Gray));

    let mut spans = vec![Span::raw(" ")];
    match app.screen {
        Screen::Search => {
            spans.extend([
                hint("Tab: next field"),
                sep.clone(),
                hint("Enter: select/search"),
                sep.clone(),
                hint("F2: swap"),
                sep.clone(),
                hint("Esc: quit"),
            ]);
        }
        Screen::Results => {
            spans.extend([
                Span::styled(
                    format!("Tab: {}", app.results_pane.as_str()),
                    Style::default().fg(Color::Cyan),
                ),
                sep.clone(),
                hint(&format!("s: sort ({})", app.sort_by())),
                sep.clone(),
                hint("r: retry"),
                sep.clone(),
                hint("Esc: back"),
                sep.clone(),
                hint("q: quit"),
            ]);
        }
    }
    spans.push(sep);
    spans.push(hint("F12: log"));

    if !app.log.visible {
        if let Some(last) = app.log.last_line() {
            spans.push(Span::styled(
                format!("   {}", last),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Black))
        .render(area, buf);
}
