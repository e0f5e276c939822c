//! Results pane: flight cards, expandable details, price distribution.

use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::filter::price_buckets;
use crate::models::Flight;

/// Bars in the price distribution chart.
const CHART_BUCKETS: usize = 8;
const CHART_HEIGHT: u16 = 9;

/// What the results pane is showing.
#[derive(Debug, Default)]
pub enum SearchStatus {
    /// No search issued yet
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed { message: String, guidance: String },
}

/// Selection and expanded cards. Cards are keyed by offer id so the
/// selection survives re-filtering.
#[derive(Debug, Default)]
pub struct ResultsState {
    pub selected: usize,
    expanded: HashSet<String>,
}

impl ResultsState {
    pub fn reset(&mut self) {
        self.selected = 0;
        self.expanded.clear();
    }

    pub fn select_next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn toggle_details(&mut self, flight: &Flight) {
        if !self.expanded.remove(&flight.id) {
            self.expanded.insert(flight.id.clone());
        }
    }

    pub fn is_expanded(&self, flight: &Flight) -> bool {
        self.expanded.contains(&flight.id)
    }
}

pub fn render(
    area: Rect,
    buf: &mut Buffer,
    status: &SearchStatus,
    view: &[Flight],
    state: &ResultsState,
    focused: bool,
) {
    match status {
        SearchStatus::Idle => render_message(area, buf, "Search for flights to see results here.", Color::Gray),
        SearchStatus::Loading => render_message(area, buf, "Searching flights...", Color::Cyan),
        SearchStatus::Failed { message, guidance } => render_error(area, buf, message, guidance),
        SearchStatus::Loaded => {
            let [list_area, chart_area] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(CHART_HEIGHT)]).areas(area);
            render_list(list_area, buf, view, state, focused);
            render_price_chart(chart_area, buf, view);
        }
    }
}

fn render_message(area: Rect, buf: &mut Buffer, text: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    block.render(area, buf);

    let [_, row, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    Paragraph::new(Line::from(Span::styled(text.to_string(), Style::default().fg(color))).centered())
        .render(row, buf);
}

fn render_error(area: Rect, buf: &mut Buffer, message: &str, guidance: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Something went wrong ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(guidance.to_string(), Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "[ Go Back ]  (Esc)",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .centered()
        .render(inner, buf);
}

fn render_list(area: Rect, buf: &mut Buffer, view: &[Flight], state: &ResultsState, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Rounded)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} Flights found ", view.len()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if view.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No flights match your filters",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Try raising the price limit or clearing the stop and airline filters.",
                Style::default().fg(Color::Gray),
            )),
        ];
        Paragraph::new(lines).centered().render(inner, buf);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_span = (0, 0);
    for (i, flight) in view.iter().enumerate() {
        let is_selected = i == state.selected;
        let start = lines.len();
        lines.extend(card_lines(flight, is_selected, state.is_expanded(flight), inner.width));
        if is_selected {
            selected_span = (start, lines.len());
        }
    }

    // Scroll so the whole selected card is visible where possible.
    let height = inner.height as usize;
    let scroll = if selected_span.1 > height {
        (selected_span.1 - height).min(selected_span.0)
    } else {
        0
    };

    Paragraph::new(lines)
        .scroll((scroll as u16, 0))
        .render(inner, buf);
}

/// One flight card: summary row, stops row, optional details, spacer.
pub fn card_lines(flight: &Flight, selected: bool, expanded: bool, width: u16) -> Vec<Line<'static>> {
    let bg = if selected { Color::DarkGray } else { Color::Reset };
    let base = Style::default().bg(bg);
    let time = base.fg(Color::White).add_modifier(Modifier::BOLD);
    let muted = base.fg(Color::Gray);

    let price = format!("{:.2} {}", flight.price, flight.currency);
    let left = vec![
        Span::styled(format!(" {:<20.20}", flight.airline), base.fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {} ", flight.departure.time), time),
        Span::styled(flight.departure.iata.clone(), muted),
        Span::styled(format!(" --{}--> ", flight.duration), muted),
        Span::styled(format!("{} ", flight.arrival.time), time),
        Span::styled(flight.arrival.iata.clone(), muted),
    ];
    let used: usize = left.iter().map(|s| s.width()).sum();
    let pad = (width as usize).saturating_sub(used + price.len() + 1);

    let mut summary = left;
    summary.push(Span::styled(" ".repeat(pad), base));
    summary.push(Span::styled(price, base.fg(Color::Green).add_modifier(Modifier::BOLD)));
    summary.push(Span::styled(" ", base));

    let stops_color = if flight.stops == 0 { Color::Green } else { Color::Yellow };
    let mut second = vec![
        Span::styled(" ".repeat(22), base),
        Span::styled(flight.stops_label(), base.fg(stops_color)),
    ];
    if !flight.layovers.is_empty() {
        let via: Vec<&str> = flight.layovers.iter().map(|l| l.airport.as_str()).collect();
        second.push(Span::styled(format!(" via {}", via.join(", ")), muted));
    }
    second.push(Span::styled(
        if expanded { "   [-] details" } else { "   [+] details" },
        base.fg(Color::DarkGray),
    ));

    let mut lines = vec![Line::from(summary), Line::from(second).style(base)];
    if expanded {
        lines.extend(detail_lines(flight));
    }
    lines.push(Line::from(""));
    lines
}

fn detail_lines(flight: &Flight) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let terminal = |t: &Option<String>| t.as_ref().map(|t| format!(" T{}", t)).unwrap_or_default();

    lines.push(Line::from(Span::styled(
        format!(
            "     {} {}{}  ->  {} {}{}   {}",
            flight.departure.city,
            flight.departure.iata,
            terminal(&flight.departure.terminal),
            flight.arrival.city,
            flight.arrival.iata,
            terminal(&flight.arrival.terminal),
            flight.date.format("%a %d %b"),
        ),
        Style::default().fg(Color::Gray),
    )));

    for (i, segment) in flight.segments.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("     {:<8}", segment.flight_number), Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(
                    "{} {} -> {} {}  {:>7}  ",
                    segment.departure.time,
                    segment.departure.iata,
                    segment.arrival.time,
                    segment.arrival.iata,
                    segment.duration
                ),
                Style::default().fg(Color::White),
            ),
            Span::styled(segment.carrier.clone(), Style::default().fg(Color::Gray)),
        ]));
        if let Some(layover) = flight.layovers.get(i) {
            lines.push(Line::from(Span::styled(
                format!("       {} layover in {}", layover.duration, layover.airport),
                Style::default().fg(Color::Yellow),
            )));
        }
    }
    lines
}

/// Histogram of the displayed prices. Built from the filtered list, so it
/// tracks the filters.
fn render_price_chart(area: Rect, buf: &mut Buffer, view: &[Flight]) {
    let buckets = price_buckets(view, CHART_BUCKETS);
    let range = match (buckets.first(), buckets.last()) {
        (Some(low), Some(high)) => format!(", {:.0} - {:.0}", low.lower, high.upper),
        _ => String::new(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" Price distribution (shown results{}) ", range),
            Style::default().fg(Color::Gray),
        ));

    if buckets.is_empty() {
        block.render(area, buf);
        return;
    }

    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / buckets.len() as u16).saturating_sub(1).max(1);

    let bars: Vec<Bar> = buckets
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.count as u64)
                .label(Line::from(b.label()))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .render(area, buf);
}
