//! Search form: origin/destination with autocomplete, date, travelers.

use chrono::{Days, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use super::backend::Field;
use crate::api::offers::{resolve_code, SearchRequest};
use crate::error::FlightError;
use crate::models::{search_airports, Location, AUTOCOMPLETE_LIMIT};

pub const MIN_TRAVELERS: u8 = 1;
pub const MAX_TRAVELERS: u8 = 5;

/// Days between today and the initially selected departure date.
const DEFAULT_DAYS_AHEAD: u64 = 7;

// ---------------------------------------------------------------------------
// Text input
// ---------------------------------------------------------------------------

/// Single-line text input with a char-based cursor.
#[derive(Debug, Default, Clone)]
pub struct TextField {
    pub value: String,
    /// Cursor position (character offset)
    pub cursor: usize,
}

impl TextField {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    /// Replace the whole value and put the cursor at the end.
    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = value.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = self.char_to_byte(self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let byte_pos = self.char_to_byte(self.cursor);
            let prev_byte_pos = self.char_to_byte(self.cursor - 1);
            self.value.drain(prev_byte_pos..byte_pos);
            self.cursor -= 1;
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = self.char_to_byte(self.cursor);
            let next_byte_pos = self.char_to_byte(self.cursor + 1);
            self.value.drain(byte_pos..next_byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn char_to_byte(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Focusable controls, in Tab order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    Origin,
    Destination,
    Date,
    Travelers,
    Submit,
}

impl FormFocus {
    pub fn next(self) -> Self {
        match self {
            FormFocus::Origin => FormFocus::Destination,
            FormFocus::Destination => FormFocus::Date,
            FormFocus::Date => FormFocus::Travelers,
            FormFocus::Travelers => FormFocus::Submit,
            FormFocus::Submit => FormFocus::Origin,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormFocus::Origin => FormFocus::Submit,
            FormFocus::Destination => FormFocus::Origin,
            FormFocus::Date => FormFocus::Destination,
            FormFocus::Travelers => FormFocus::Date,
            FormFocus::Submit => FormFocus::Travelers,
        }
    }

    pub fn field(self) -> Option<Field> {
        match self {
            FormFocus::Origin => Some(Field::Origin),
            FormFocus::Destination => Some(Field::Destination),
            _ => None,
        }
    }
}

/// Autocomplete dropdown for the focused location field.
#[derive(Debug, Default, Clone)]
pub struct Suggestions {
    pub items: Vec<Location>,
    pub selected: usize,
}

impl Suggestions {
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&Location> {
        self.items.get(self.selected)
    }
}

pub struct FormState {
    pub origin: TextField,
    pub destination: TextField,
    pub date: NaiveDate,
    /// Earliest selectable date
    pub today: NaiveDate,
    pub travelers: u8,
    pub focus: FormFocus,
    pub suggestions: Suggestions,
    /// Validation message shown under the form
    pub notice: Option<String>,
}

impl FormState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            origin: TextField::new("Mumbai (BOM)"),
            destination: TextField::new("Dubai (DXB)"),
            date: today
                .checked_add_days(Days::new(DEFAULT_DAYS_AHEAD))
                .unwrap_or(today),
            today,
            travelers: MIN_TRAVELERS,
            focus: FormFocus::default(),
            suggestions: Suggestions::default(),
            notice: None,
        }
    }

    pub fn field(&self, field: Field) -> &TextField {
        match field {
            Field::Origin => &self.origin,
            Field::Destination => &self.destination,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut TextField {
        match field {
            Field::Origin => &mut self.origin,
            Field::Destination => &mut self.destination,
        }
    }

    fn other(field: Field) -> Field {
        match field {
            Field::Origin => Field::Destination,
            Field::Destination => Field::Origin,
        }
    }

    pub fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
        self.suggestions = Suggestions::default();
    }

    /// Recompute the static suggestions for `field` from its current text.
    pub fn refresh_suggestions(&mut self, field: Field) {
        let query = self.field(field).value.clone();
        let exclude = self.field(Self::other(field)).value.clone();
        self.suggestions = Suggestions {
            items: search_airports(&query, Some(&exclude), AUTOCOMPLETE_LIMIT),
            selected: 0,
        };
    }

    /// Put live lookup results in front of the static suggestions. Results
    /// for a keyword the field no longer holds are ignored.
    pub fn merge_live_suggestions(&mut self, field: Field, keyword: &str, live: Vec<Location>) {
        if self.focus.field() != Some(field) || self.field(field).value != keyword {
            return;
        }

        let exclude = self.field(Self::other(field)).value.clone();
        let mut merged: Vec<Location> = Vec::with_capacity(AUTOCOMPLETE_LIMIT);
        for loc in live.into_iter().chain(self.suggestions.items.drain(..)) {
            if loc.display_value() == exclude || merged.iter().any(|m| m.code == loc.code) {
                continue;
            }
            merged.push(loc);
            if merged.len() == AUTOCOMPLETE_LIMIT {
                break;
            }
        }
        self.suggestions = Suggestions {
            items: merged,
            selected: 0,
        };
    }

    /// Copy the highlighted suggestion into the focused field.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(field) = self.focus.field() else {
            return false;
        };
        let Some(choice) = self.suggestions.selected_item().map(Location::display_value) else {
            return false;
        };
        self.field_mut(field).set(&choice);
        self.suggestions = Suggestions::default();
        true
    }

    pub fn swap_locations(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
        self.suggestions = Suggestions::default();
    }

    /// Move the date by `days`, never before today.
    pub fn shift_date(&mut self, days: i64) {
        let shifted = if days >= 0 {
            self.date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.date = date.max(self.today);
        }
    }

    pub fn shift_travelers(&mut self, delta: i8) {
        self.travelers = self
            .travelers
            .saturating_add_signed(delta)
            .clamp(MIN_TRAVELERS, MAX_TRAVELERS);
    }

    /// Build a validated request from the form contents.
    pub fn request(&self) -> Result<SearchRequest, FlightError> {
        let request = SearchRequest::new(
            &resolve_code(&self.origin.value),
            &resolve_code(&self.destination.value),
            self.date,
            self.travelers,
        );
        request.validate()?;
        if request.origin_code == request.destination_code {
            return Err(FlightError::InvalidQuery(
                "origin and destination are the same airport".to_string(),
            ));
        }
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Total height the form needs (fields + button + notice).
pub const FORM_HEIGHT: u16 = 14;

const FIELD_HEIGHT: u16 = 3;

pub fn render(area: Rect, buf: &mut Buffer, state: &FormState, loading: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Where to? ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    let [route_area, when_area, submit_area, notice_area] = Layout::vertical([
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let [origin_area, destination_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(route_area);
    let [date_area, travelers_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(when_area);

    render_text_field(origin_area, buf, "From", &state.origin, state.focus == FormFocus::Origin);
    render_text_field(
        destination_area,
        buf,
        "To (F2 swaps)",
        &state.destination,
        state.focus == FormFocus::Destination,
    );
    render_value(
        date_area,
        buf,
        "Departure (+/-)",
        &state.date.format("%a, %d %b %Y").to_string(),
        state.focus == FormFocus::Date,
    );
    let travelers = format!(
        "{} traveler{}",
        state.travelers,
        if state.travelers == 1 { "" } else { "s" }
    );
    render_value(
        travelers_area,
        buf,
        "Travelers (+/-)",
        &travelers,
        state.focus == FormFocus::Travelers,
    );
    render_submit(submit_area, buf, state.focus == FormFocus::Submit, loading);

    if let Some(ref notice) = state.notice {
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", notice),
            Style::default().fg(Color::Red),
        )))
        .render(notice_area, buf);
    }

    // Dropdown last so it draws over the rows below the focused field.
    let anchor = match state.focus {
        FormFocus::Origin => Some(origin_area),
        FormFocus::Destination => Some(destination_area),
        _ => None,
    };
    if let Some(anchor) = anchor {
        render_suggestions(anchor, area, buf, &state.suggestions);
    }
}

fn field_block(label: &str, focused: bool) -> Block<'static> {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray)))
}

fn render_text_field(area: Rect, buf: &mut Buffer, label: &str, field: &TextField, focused: bool) {
    let block = field_block(label, focused);
    let inner = block.inner(area);
    block.render(area, buf);

    let mut spans = vec![Span::styled(format!(" {}", field.value), Style::default().fg(Color::White))];
    if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    Paragraph::new(Line::from(spans)).render(inner, buf);
}

fn render_value(area: Rect, buf: &mut Buffer, label: &str, value: &str, focused: bool) {
    let block = field_block(label, focused);
    let inner = block.inner(area);
    block.render(area, buf);

    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Paragraph::new(Line::from(Span::styled(format!(" < {} > ", value), style))).render(inner, buf);
}

fn render_submit(area: Rect, buf: &mut Buffer, focused: bool, loading: bool) {
    let label = if loading { " Searching... " } else { " Search flights " };
    let style = match (loading, focused) {
        (true, _) => Style::default().fg(Color::DarkGray),
        (false, true) => Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        (false, false) => Style::default().fg(Color::Black).bg(Color::Cyan),
    };
    let [_, button, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(label.len() as u16),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, row, _] = Layout::vertical([Constraint::Length(1); 3]).areas(button);
    Paragraph::new(Line::from(Span::styled(label, style))).render(row, buf);
}

fn render_suggestions(anchor: Rect, bounds: Rect, buf: &mut Buffer, suggestions: &Suggestions) {
    if suggestions.items.is_empty() {
        return;
    }

    let top = anchor.y + anchor.height;
    let bottom = bounds.y + bounds.height;
    let height = (suggestions.items.len() as u16 + 2).min(bottom.saturating_sub(top));
    if height < 3 {
        return;
    }
    let area = Rect::new(anchor.x, top, anchor.width, height);
    Clear.render(area, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    block.render(area, buf);

    let lines: Vec<Line> = suggestions
        .items
        .iter()
        .enumerate()
        .take(inner.height as usize)
        .map(|(i, loc)| {
            let bg = if i == suggestions.selected {
                Color::DarkGray
            } else {
                Color::Reset
            };
            Line::from(vec![
                Span::styled(
                    format!(" {} ", loc.code),
                    Style::default().fg(Color::Cyan).bg(bg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{}, {}", loc.city, loc.country), Style::default().fg(Color::White).bg(bg)),
                Span::styled(format!("  {}", loc.name), Style::default().fg(Color::Gray).bg(bg)),
            ])
        })
        .collect();
    Paragraph::new(lines).render(inner, buf);
}
