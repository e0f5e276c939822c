//! Filter panel: price ceiling, stop chips, sort order, airline checkboxes.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::models::{FilterParams, Flight, SortKey};

pub const PRICE_MIN: f64 = 200.0;
pub const PRICE_STEP: f64 = 50.0;

/// Stop chips, left to right.
pub const STOP_CHOICES: [Option<u32>; 4] = [None, Some(0), Some(1), Some(2)];

pub const PANEL_WIDTH: u16 = 32;

/// Selectable row of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRow {
    Price,
    Stops,
    Sort,
    Airline(usize),
}

/// Cursor within the panel; the filter values themselves live in `App`.
#[derive(Debug, Default)]
pub struct FilterPanelState {
    pub cursor: usize,
}

impl FilterPanelState {
    pub fn row(&self, airline_count: usize) -> FilterRow {
        match self.cursor.min(2 + airline_count) {
            0 => FilterRow::Price,
            1 => FilterRow::Stops,
            2 => FilterRow::Sort,
            n => FilterRow::Airline(n - 3),
        }
    }

    pub fn move_down(&mut self, airline_count: usize) {
        if self.cursor < 2 + airline_count {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor on an existing row after the airline list shrinks.
    pub fn clamp(&mut self, airline_count: usize) {
        self.cursor = self.cursor.min(2 + airline_count);
    }
}

/// Top of the slider: the configured default or the dearest offer,
/// whichever is higher, rounded up to a whole step.
pub fn slider_max(default_max: f64, flights: &[Flight]) -> f64 {
    let highest = flights.iter().map(|f| f.price).fold(default_max, f64::max);
    ((highest / PRICE_STEP).ceil() * PRICE_STEP).max(PRICE_MIN + PRICE_STEP)
}

/// Move the ceiling by whole steps within `PRICE_MIN..=upper`.
pub fn step_price(current: f64, steps: i32, upper: f64) -> f64 {
    let snapped = (current / PRICE_STEP).round() * PRICE_STEP;
    (snapped + PRICE_STEP * f64::from(steps)).clamp(PRICE_MIN, upper)
}

/// Next or previous stop chip.
pub fn cycle_stops(current: Option<u32>, forward: bool) -> Option<u32> {
    let idx = STOP_CHOICES.iter().position(|c| *c == current).unwrap_or(0);
    let len = STOP_CHOICES.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    STOP_CHOICES[next]
}

pub fn stop_chip_label(choice: Option<u32>) -> String {
    match choice {
        None => "Any".to_string(),
        Some(0) => "Non-stop".to_string(),
        Some(n) => format!("{} Stop{}", n, if n == 1 { "" } else { "s" }),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn render(
    area: Rect,
    buf: &mut Buffer,
    panel: &FilterPanelState,
    filters: &FilterParams,
    price_upper: f64,
    sort_by: SortKey,
    airlines: &[String],
    currency: &str,
    focused: bool,
) {
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
            " Filters ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let current = panel.row(airlines.len());
    let marker = |row: FilterRow| -> Span<'static> {
        if focused && row == current {
            Span::styled("> ", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("  ")
        }
    };
    let heading = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            marker(FilterRow::Price),
            Span::styled("Max price ", heading),
            Span::styled(
                format!("{:.0} {}", filters.max_price, currency),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![Span::raw("  "), Span::styled(slider(filters.max_price, price_upper, inner.width), Style::default().fg(Color::Cyan))]),
        Line::from(""),
        Line::from(vec![marker(FilterRow::Stops), Span::styled("Stops", heading)]),
    ];

    let mut chips = vec![Span::raw("  ")];
    for choice in STOP_CHOICES {
        let style = if filters.stops == choice {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        chips.push(Span::styled(format!("[{}]", stop_chip_label(choice)), style));
        chips.push(Span::raw(" "));
    }
    lines.push(Line::from(chips));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        marker(FilterRow::Sort),
        Span::styled("Sort ", heading),
        sort_chip(SortKey::Cheapest, sort_by),
        Span::raw(" "),
        sort_chip(SortKey::Fastest, sort_by),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![Span::raw("  "), Span::styled("Airlines", heading)]));
    if airlines.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", Style::default().fg(Color::DarkGray))));
    }
    for (i, airline) in airlines.iter().enumerate() {
        let checked = filters.airlines.contains(airline);
        lines.push(Line::from(vec![
            marker(FilterRow::Airline(i)),
            Span::styled(
                if checked { "[x] " } else { "[ ] " },
                Style::default().fg(if checked { Color::Green } else { Color::Gray }),
            ),
            Span::styled(airline.clone(), Style::default().fg(Color::White)),
        ]));
    }

    // Keep the highlighted airline on screen.
    let cursor_line = match current {
        FilterRow::Airline(i) => 9 + i,
        _ => 0,
    };
    let scroll = cursor_line.saturating_sub(inner.height.saturating_sub(1) as usize);

    Paragraph::new(lines)
        .scroll((scroll as u16, 0))
        .render(inner, buf);
}

fn sort_chip(key: SortKey, current: SortKey) -> Span<'static> {
    let style = if key == current {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("[{}]", key.label()), style)
}

/// Text slider: "200 ====o------ 2000".
fn slider(value: f64, upper: f64, width: u16) -> String {
    let labels = format!("{:.0}", PRICE_MIN).len() + format!("{:.0}", upper).len() + 2;
    let track = (width as usize).saturating_sub(labels + 4).max(4);
    let fraction = ((value - PRICE_MIN) / (upper - PRICE_MIN)).clamp(0.0, 1.0);
    let knob = ((track - 1) as f64 * fraction).round() as usize;
    let mut bar = String::with_capacity(track);
    for i in 0..track {
        bar.push(match i.cmp(&knob) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => 'o',
            std::cmp::Ordering::Greater => '-',
        });
    }
    format!("{:.0} {} {:.0}", PRICE_MIN, bar, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_price_snaps_and_clamps() {
        assert_eq!(step_price(2000.0, 1, 2000.0), 2000.0);
        assert_eq!(step_price(2000.0, -1, 2000.0), 1950.0);
        assert_eq!(step_price(210.0, -1, 2000.0), 200.0);
        assert_eq!(step_price(437.0, 1, 2000.0), 500.0);
        assert_eq!(step_price(200.0, -3, 2000.0), 200.0);
        assert_eq!(step_price(2400.0, 1, 2450.0), 2450.0);
    }

    fn priced(price: f64) -> Flight {
        let endpoint = |iata: &str| crate::models::Endpoint {
            iata: iata.to_string(),
            city: iata.to_string(),
            time: "09:00".to_string(),
            terminal: None,
        };
        Flight {
            id: format!("{}", price),
            airline: "Emirates".to_string(),
            airline_logo: String::new(),
            departure: endpoint("BOM"),
            arrival: endpoint("DXB"),
            duration: "3h".to_string(),
            stops: 0,
            price,
            currency: "USD".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 3, 17).unwrap(),
            layovers: Vec::new(),
            segments: Vec::new(),
        }
    }

    #[test]
    fn test_slider_max_follows_dearest_offer() {
        assert_eq!(slider_max(2000.0, &[]), 2000.0);
        assert_eq!(slider_max(2000.0, &[priced(640.0)]), 2000.0);
        assert_eq!(slider_max(2000.0, &[priced(640.0), priced(2431.7)]), 2450.0);
        assert_eq!(slider_max(5000.0, &[priced(2431.7)]), 5000.0);
        assert_eq!(slider_max(0.0, &[]), PRICE_MIN + PRICE_STEP);
    }

    #[test]
    fn test_cycle_stops_wraps() {
        assert_eq!(cycle_stops(None, true), Some(0));
        assert_eq!(cycle_stops(Some(2), true), None);
        assert_eq!(cycle_stops(None, false), Some(2));
        assert_eq!(cycle_stops(Some(7), true), Some(0));
    }

    #[test]
    fn test_stop_chip_labels() {
        let labels: Vec<_> = STOP_CHOICES.iter().map(|c| stop_chip_label(*c)).collect();
        assert_eq!(labels, vec!["Any", "Non-stop", "1 Stop", "2 Stops"]);
    }

    #[test]
    fn test_cursor_rows() {
        let mut panel = FilterPanelState::default();
        assert_eq!(panel.row(2), FilterRow::Price);
        for _ in 0..10 {
            panel.move_down(2);
        }
        assert_eq!(panel.row(2), FilterRow::Airline(1));

        panel.clamp(0);
        assert_eq!(panel.row(0), FilterRow::Sort);
        panel.move_up();
        assert_eq!(panel.row(0), FilterRow::Stops);
    }

    #[test]
    fn test_slider_knob_position() {
        let bar = slider(PRICE_MIN, 2000.0, 24);
        assert!(bar.starts_with("200 o"));
        let bar = slider(2000.0, 2000.0, 24);
        assert!(bar.ends_with("=o 2000"));
        let bar = slider(45000.0, 45000.0, 24);
        assert!(bar.ends_with("=o 45000"));
    }
}
