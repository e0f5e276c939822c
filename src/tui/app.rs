//! TUI application state and main event loop

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;

use super::backend::{Backend, BackendCommand, BackendResponse, Field};
use super::filters::{cycle_stops, slider_max, step_price, FilterPanelState, FilterRow};
use super::form::{FormFocus, FormState};
use super::log_pane::{LogBuffer, LogPane};
use super::results::{ResultsState, SearchStatus};
use super::ui;
use crate::api::client::AmadeusClient;
use crate::api::offers::SearchRequest;
use crate::api::TravelApi;
use crate::config::Config;
use crate::filter::{available_airlines, derive_view};
use crate::models::{FilterParams, Flight, SortKey};

/// Redraw interval while idle (~30 fps)
const FRAME_DURATION_MS: u64 = 33;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Search,
    Results,
}

/// Focused pane on the results screen
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ResultsPane {
    Filters,
    #[default]
    List,
}

impl ResultsPane {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultsPane::Filters => "filters",
            ResultsPane::List => "results",
        }
    }
}

/// All UI state. Raw results, filters and sort key change only through
/// setters, and every setter re-derives the displayed list.
pub struct App {
    pub should_exit: bool,
    pub screen: Screen,
    pub form: FormState,
    pub results_pane: ResultsPane,
    pub filter_panel: FilterPanelState,
    pub results: ResultsState,
    pub status: SearchStatus,
    pub log: LogPane,
    pub currency: String,
    filters: FilterParams,
    default_max_price: f64,
    /// Top of the price slider for the current results.
    price_upper: f64,
    sort_by: SortKey,
    flights: Vec<Flight>,
    view: Vec<Flight>,
    airlines: Vec<String>,
    /// Request whose response is awaited; any other response is stale.
    pending: Option<SearchRequest>,
    last_request: Option<SearchRequest>,
}

impl App {
    pub fn new(config: &Config, today: NaiveDate, log: LogPane) -> Self {
        Self {
            should_exit: false,
            screen: Screen::default(),
            form: FormState::new(today),
            results_pane: ResultsPane::default(),
            filter_panel: FilterPanelState::default(),
            results: ResultsState::default(),
            status: SearchStatus::default(),
            log,
            currency: config.currency.clone(),
            filters: FilterParams::with_max_price(config.default_max_price),
            default_max_price: config.default_max_price,
            price_upper: slider_max(config.default_max_price, &[]),
            sort_by: SortKey::default(),
            flights: Vec::new(),
            view: Vec::new(),
            airlines: Vec::new(),
            pending: None,
            last_request: None,
        }
    }

    // -- Accessors --

    pub fn filters(&self) -> &FilterParams {
        &self.filters
    }

    pub fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    pub fn price_upper(&self) -> f64 {
        self.price_upper
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    /// Filtered, sorted list currently on screen.
    pub fn view(&self) -> &[Flight] {
        &self.view
    }

    pub fn airlines(&self) -> &[String] {
        &self.airlines
    }

    pub fn last_request(&self) -> Option<&SearchRequest> {
        self.last_request.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    // -- Setters --

    /// Replace the raw results. Selected airlines that no longer appear are
    /// dropped so they cannot hide every flight. A price ceiling left at the
    /// top of the slider follows the slider's new top.
    pub fn set_flights(&mut self, flights: Vec<Flight>) {
        self.airlines = available_airlines(&flights);
        let present = &self.airlines;
        self.filters.airlines.retain(|a| present.contains(a));

        let upper = slider_max(self.default_max_price, &flights);
        if self.filters.max_price >= self.price_upper || self.filters.max_price > upper {
            self.filters.max_price = upper;
        }
        self.price_upper = upper;

        self.flights = flights;
        self.results.reset();
        self.filter_panel.clamp(self.airlines.len());
        self.refresh_view();
    }

    pub fn set_max_price(&mut self, max_price: f64) {
        self.filters.max_price = max_price;
        self.refresh_view();
    }

    pub fn set_stops(&mut self, stops: Option<u32>) {
        self.filters.stops = stops;
        self.refresh_view();
    }

    pub fn toggle_airline(&mut self, airline: &str) {
        self.filters.toggle_airline(airline);
        self.refresh_view();
    }

    pub fn set_sort(&mut self, sort_by: SortKey) {
        self.sort_by = sort_by;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view = derive_view(&self.flights, &self.filters, self.sort_by);
        self.results.clamp(self.view.len());
    }

    // -- Search lifecycle --

    /// Validate the form and start a search. Returns nothing while another
    /// search is outstanding or when the form is invalid.
    pub fn submit_search(&mut self) -> Option<BackendCommand> {
        if self.is_loading() {
            tracing::debug!("Search already in flight, ignoring submit");
            return None;
        }

        match self.form.request() {
            Ok(request) => Some(self.start_search(request)),
            Err(e) => {
                self.form.notice = Some(format!("{} {}", e, e.guidance()));
                None
            }
        }
    }

    fn start_search(&mut self, request: SearchRequest) -> BackendCommand {
        self.form.notice = None;
        self.form.suggestions = Default::default();
        self.screen = Screen::Results;
        self.results_pane = ResultsPane::List;
        self.status = SearchStatus::Loading;
        self.pending = Some(request.clone());
        self.last_request = Some(request.clone());
        self.set_flights(Vec::new());
        BackendCommand::Search(request)
    }

    /// Run the previous search again from the results screen.
    pub fn retry_search(&mut self) -> Option<BackendCommand> {
        if self.is_loading() {
            return None;
        }
        let request = self.last_request.clone()?;
        Some(self.start_search(request))
    }

    /// Return to the form. A search still in flight is abandoned.
    pub fn go_back(&mut self) {
        self.screen = Screen::Search;
        if self.pending.take().is_some() {
            self.status = SearchStatus::Idle;
        }
    }

    pub fn handle_response(&mut self, resp: BackendResponse) {
        match resp {
            BackendResponse::Flights { request, result } => {
                if self.pending.as_ref() != Some(&request) {
                    tracing::debug!("Dropping stale results for {} -> {}", request.origin_code, request.destination_code);
                    return;
                }
                self.pending = None;
                match result {
                    Ok(flights) => {
                        self.set_flights(flights);
                        self.status = SearchStatus::Loaded;
                    }
                    Err(e) => {
                        self.status = SearchStatus::Failed {
                            message: e.to_string(),
                            guidance: e.guidance().to_string(),
                        };
                    }
                }
            }
            BackendResponse::Locations { field, keyword, results } => {
                if self.screen == Screen::Search {
                    self.form.merge_live_suggestions(field, &keyword, results);
                }
            }
        }
    }

    // -- Input --

    /// Apply one key press and return the backend work it triggers.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return Vec::new();
        }

        match key.code {
            KeyCode::F(12) => {
                self.log.toggle();
                return Vec::new();
            }
            KeyCode::PageUp if self.log.visible => {
                self.log.scroll_up(5);
                return Vec::new();
            }
            KeyCode::PageDown if self.log.visible => {
                self.log.scroll_down(5);
                return Vec::new();
            }
            _ => {}
        }

        match self.screen {
            Screen::Search => self.handle_form_key(key),
            Screen::Results => self.handle_results_key(key).into_iter().collect(),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        let focus = self.form.focus;
        let mut commands = Vec::new();

        match key.code {
            KeyCode::Esc => {
                if self.form.suggestions.items.is_empty() {
                    self.should_exit = true;
                } else {
                    self.form.suggestions = Default::default();
                }
            }
            KeyCode::Tab => commands.extend(self.move_focus(focus.next())),
            KeyCode::BackTab => commands.extend(self.move_focus(focus.previous())),
            KeyCode::F(2) => self.form.swap_locations(),
            KeyCode::Enter => match focus.field() {
                Some(_) => {
                    self.form.accept_suggestion();
                    commands.extend(self.move_focus(focus.next()));
                }
                None => commands.extend(self.submit_search()),
            },
            _ => match focus {
                FormFocus::Origin | FormFocus::Destination => {
                    let field = if focus == FormFocus::Origin { Field::Origin } else { Field::Destination };
                    commands.extend(self.handle_text_key(field, key));
                }
                FormFocus::Date => match key.code {
                    KeyCode::Char('+') | KeyCode::Right | KeyCode::Up => self.form.shift_date(1),
                    KeyCode::Char('-') | KeyCode::Left | KeyCode::Down => self.form.shift_date(-1),
                    _ => {}
                },
                FormFocus::Travelers => match key.code {
                    KeyCode::Char('+') | KeyCode::Right | KeyCode::Up => self.form.shift_travelers(1),
                    KeyCode::Char('-') | KeyCode::Left | KeyCode::Down => self.form.shift_travelers(-1),
                    _ => {}
                },
                FormFocus::Submit => {
                    if key.code == KeyCode::Char(' ') {
                        commands.extend(self.submit_search());
                    }
                }
            },
        }

        commands
    }

    fn handle_text_key(&mut self, field: Field, key: KeyEvent) -> Option<BackendCommand> {
        let input = self.form.field_mut(field);
        match key.code {
            KeyCode::Char(c) => input.insert_char(c),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete_at_cursor(),
            KeyCode::Left => {
                input.move_left();
                return None;
            }
            KeyCode::Right => {
                input.move_right();
                return None;
            }
            KeyCode::Home => {
                input.move_home();
                return None;
            }
            KeyCode::End => {
                input.move_end();
                return None;
            }
            KeyCode::Up => {
                self.form.suggestions.select_previous();
                return None;
            }
            KeyCode::Down => {
                self.form.suggestions.select_next();
                return None;
            }
            _ => return None,
        }

        self.form.notice = None;
        self.form.refresh_suggestions(field);
        Some(BackendCommand::LookupLocations {
            field,
            keyword: self.form.field(field).value.clone(),
        })
    }

    /// Change focus; a lookup pending for the field being left is cancelled.
    fn move_focus(&mut self, to: FormFocus) -> Option<BackendCommand> {
        let leaving = self.form.focus.field();
        self.form.set_focus(to);
        leaving.map(BackendCommand::CancelLookup)
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.go_back();
                return None;
            }
            KeyCode::Char('q') => {
                self.should_exit = true;
                return None;
            }
            KeyCode::Char('r') => return self.retry_search(),
            _ => {}
        }

        if !matches!(self.status, SearchStatus::Loaded) {
            if key.code == KeyCode::Enter && matches!(self.status, SearchStatus::Failed { .. }) {
                self.go_back();
            }
            return None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.results_pane = match self.results_pane {
                    ResultsPane::Filters => ResultsPane::List,
                    ResultsPane::List => ResultsPane::Filters,
                };
            }
            KeyCode::Char('s') => self.set_sort(self.sort_by.toggled()),
            _ => match self.results_pane {
                ResultsPane::Filters => self.handle_filter_key(key),
                ResultsPane::List => self.handle_list_key(key),
            },
        }
        None
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        let row = self.filter_panel.row(self.airlines.len());
        let forward = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.filter_panel.move_up();
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.filter_panel.move_down(self.airlines.len());
                return;
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Enter | KeyCode::Char(' ') => true,
            KeyCode::Left | KeyCode::Char('-') => false,
            _ => return,
        };
        let step = if forward { 1 } else { -1 };

        match row {
            FilterRow::Price => {
                self.set_max_price(step_price(self.filters.max_price, step, self.price_upper))
            }
            FilterRow::Stops => self.set_stops(cycle_stops(self.filters.stops, forward)),
            FilterRow::Sort => self.set_sort(self.sort_by.toggled()),
            FilterRow::Airline(i) => {
                if let Some(airline) = self.airlines.get(i).cloned() {
                    self.toggle_airline(&airline);
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.results.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.results.select_next(self.view.len()),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(flight) = self.view.get(self.results.selected) {
                    self.results.toggle_details(flight);
                }
            }
            _ => {}
        }
    }
}

/// Run the TUI until the user quits. The terminal is restored on every exit
/// path; ratatui's panic hook covers panics.
pub async fn run(config: Config, log_buffer: LogBuffer) -> Result<()> {
    let api: Arc<dyn TravelApi> = Arc::new(AmadeusClient::from_config(&config)?);

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &config, api, log_buffer).await;
    ratatui::restore();
    result
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    config: &Config,
    api: Arc<dyn TravelApi>,
    log_buffer: LogBuffer,
) -> Result<()> {
    let mut backend = Backend::start(api);
    let mut app = App::new(config, Local::now().date_naive(), LogPane::new(log_buffer));
    let mut events = EventStream::new();
    let mut frame_tick = tokio::time::interval(Duration::from_millis(FRAME_DURATION_MS));

    tracing::info!("TUI started");

    while !app.should_exit {
        app.log.refresh();
        terminal.draw(|frame| ui::render(frame, &app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    for cmd in app.handle_key(key) {
                        backend.send(cmd);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(resp) = backend.recv() => app.handle_response(resp),
            _ = frame_tick.tick() => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FlightError, UpstreamError};
    use crate::models::{Endpoint, Location};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(
            &Config::default(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            LogPane::new(LogBuffer::new()),
        )
    }

    fn flight(id: &str, airline: &str, price: f64, stops: u32, duration: &str) -> Flight {
        let endpoint = |iata: &str| Endpoint {
            iata: iata.to_string(),
            city: iata.to_string(),
            time: "09:00".to_string(),
            terminal: None,
        };
        Flight {
            id: id.to_string(),
            airline: airline.to_string(),
            airline_logo: String::new(),
            departure: endpoint("BOM"),
            arrival: endpoint("DXB"),
            duration: duration.to_string(),
            stops,
            price,
            currency: "USD".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 17).unwrap(),
            layovers: Vec::new(),
            segments: Vec::new(),
        }
    }

    fn loaded_app(flights: Vec<Flight>) -> App {
        let mut app = app();
        let Some(BackendCommand::Search(request)) = app.submit_search() else {
            panic!("default form should submit");
        };
        app.handle_response(BackendResponse::Flights {
            request,
            result: Ok(flights),
        });
        app
    }

    fn view_ids(app: &App) -> Vec<&str> {
        app.view().iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_submit_serializes_searches() {
        let mut app = app();

        let first = app.submit_search();
        assert!(matches!(first, Some(BackendCommand::Search(ref r)) if r.origin_code == "BOM" && r.destination_code == "DXB"));
        assert!(app.is_loading());
        assert_eq!(app.screen, Screen::Results);
        assert!(matches!(app.status, SearchStatus::Loading));

        assert!(app.submit_search().is_none());
        assert!(app.retry_search().is_none());
    }

    #[test]
    fn test_results_populate_view_and_airlines() {
        let app = loaded_app(vec![
            flight("1", "Emirates", 640.0, 0, "3h10m"),
            flight("2", "IndiGo", 280.0, 1, "6h"),
            flight("3", "Emirates", 1900.0, 0, "3h"),
        ]);

        assert!(matches!(app.status, SearchStatus::Loaded));
        assert!(!app.is_loading());
        assert_eq!(app.airlines(), ["Emirates", "IndiGo"]);
        assert_eq!(view_ids(&app), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_setters_rederive_view() {
        let mut app = loaded_app(vec![
            flight("1", "Emirates", 640.0, 0, "3h10m"),
            flight("2", "IndiGo", 280.0, 1, "6h"),
            flight("3", "Emirates", 1900.0, 0, "3h"),
        ]);

        app.set_max_price(700.0);
        assert_eq!(view_ids(&app), vec!["2", "1"]);

        app.set_stops(Some(0));
        assert_eq!(view_ids(&app), vec!["1"]);

        app.set_stops(None);
        app.set_sort(SortKey::Fastest);
        assert_eq!(view_ids(&app), vec!["1", "2"]);

        app.toggle_airline("IndiGo");
        assert_eq!(view_ids(&app), vec!["2"]);
        assert_eq!(app.flights().len(), 3);
    }

    #[test]
    fn test_filter_panel_keys() {
        let mut app = loaded_app(vec![
            flight("1", "Emirates", 640.0, 0, "3h10m"),
            flight("2", "IndiGo", 280.0, 1, "6h"),
        ]);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.results_pane, ResultsPane::Filters);

        // Price row: 2000 -> 1950
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.filters().max_price, 1950.0);

        // Stops row: Any -> Non-stop
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.filters().stops, Some(0));
        assert_eq!(view_ids(&app), vec!["1"]);

        // Sort toggle from anywhere
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.sort_by(), SortKey::Fastest);

        // Second airline checkbox
        for _ in 0..3 {
            app.handle_key(key(KeyCode::Down));
        }
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.filters().airlines.contains("IndiGo"));
        assert!(app.view().is_empty());
    }

    #[test]
    fn test_price_ceiling_reaches_dearest_offer() {
        let mut app = loaded_app(vec![
            flight("1", "Emirates", 2450.0, 0, "3h"),
            flight("2", "IndiGo", 640.0, 1, "6h"),
        ]);
        assert_eq!(app.price_upper(), 2450.0);
        assert_eq!(app.filters().max_price, 2450.0);
        assert_eq!(view_ids(&app), vec!["2", "1"]);

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.filters().max_price, 2400.0);
        assert_eq!(view_ids(&app), vec!["2"]);

        for _ in 0..20 {
            app.handle_key(key(KeyCode::Right));
        }
        assert_eq!(app.filters().max_price, 2450.0);
        assert_eq!(view_ids(&app), vec!["2", "1"]);
    }

    #[test]
    fn test_lowered_ceiling_survives_new_results() {
        let mut app = loaded_app(vec![flight("1", "Emirates", 2450.0, 0, "3h")]);
        app.set_max_price(900.0);

        app.set_flights(vec![
            flight("2", "Emirates", 3100.0, 0, "3h"),
            flight("3", "IndiGo", 800.0, 1, "6h"),
        ]);
        assert_eq!(app.price_upper(), 3100.0);
        assert_eq!(app.filters().max_price, 900.0);
        assert_eq!(view_ids(&app), vec!["3"]);

        // Cheaper results shrink the slider under a ceiling left at the top.
        app.set_max_price(3100.0);
        app.set_flights(vec![flight("4", "IndiGo", 300.0, 0, "3h")]);
        assert_eq!(app.price_upper(), 2000.0);
        assert_eq!(app.filters().max_price, 2000.0);
    }

    #[test]
    fn test_missing_airline_selection_is_dropped_on_new_results() {
        let mut app = loaded_app(vec![flight("1", "Emirates", 640.0, 0, "3h")]);
        app.toggle_airline("Emirates");

        let Some(BackendCommand::Search(request)) = app.retry_search() else {
            panic!("retry should search");
        };
        app.handle_response(BackendResponse::Flights {
            request,
            result: Ok(vec![flight("9", "Qatar Airways", 500.0, 1, "5h")]),
        });
        assert!(app.filters().airlines.is_empty());
        assert_eq!(view_ids(&app), vec!["9"]);
    }

    #[test]
    fn test_error_and_go_back() {
        let mut app = app();
        let Some(BackendCommand::Search(request)) = app.submit_search() else {
            panic!("default form should submit");
        };
        app.handle_response(BackendResponse::Flights {
            request,
            result: Err(FlightError::Search(UpstreamError::Timeout {
                url: "https://test.api.amadeus.com/v2/shopping/flight-offers".into(),
            })),
        });

        match &app.status {
            SearchStatus::Failed { message, guidance } => {
                assert!(message.contains("timed out"));
                assert_eq!(guidance, "Go back and search again.");
            }
            other => panic!("unexpected status {:?}", other),
        }

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Search);
    }

    #[test]
    fn test_stale_response_after_going_back_is_ignored() {
        let mut app = app();
        let Some(BackendCommand::Search(request)) = app.submit_search() else {
            panic!("default form should submit");
        };
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Search);
        assert!(!app.is_loading());

        app.handle_response(BackendResponse::Flights {
            request,
            result: Ok(vec![flight("1", "Emirates", 640.0, 0, "3h")]),
        });
        assert!(app.flights().is_empty());
        assert!(matches!(app.status, SearchStatus::Idle));
    }

    #[test]
    fn test_invalid_form_shows_notice() {
        let mut app = app();
        app.form.origin.set("Atlantis");
        assert!(app.submit_search().is_none());
        assert!(app.form.notice.as_deref().unwrap_or("").contains("IATA"));
        assert_eq!(app.screen, Screen::Search);
    }

    #[test]
    fn test_typing_schedules_lookup_and_tab_cancels() {
        let mut app = app();
        app.form.origin.set("");

        app.handle_key(key(KeyCode::Char('l')));
        let cmds = app.handle_key(key(KeyCode::Char('o')));
        assert!(matches!(
            cmds.as_slice(),
            [BackendCommand::LookupLocations { field: Field::Origin, keyword }] if keyword == "lo"
        ));
        assert!(!app.form.suggestions.items.is_empty());

        app.handle_response(BackendResponse::Locations {
            field: Field::Origin,
            keyword: "lo".into(),
            results: vec![Location {
                code: "LCY".into(),
                city: "London".into(),
                country: "United Kingdom".into(),
                name: "City".into(),
            }],
        });
        assert_eq!(app.form.suggestions.items[0].code, "LCY");

        let cmds = app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.form.origin.value, "London (LCY)");
        assert_eq!(app.form.focus, FormFocus::Destination);
        assert!(matches!(cmds.as_slice(), [BackendCommand::CancelLookup(Field::Origin)]));
    }

    #[test]
    fn test_form_keys_adjust_date_and_travelers() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.form.focus, FormFocus::Date);
        app.handle_key(key(KeyCode::Char('+')));
        assert_eq!(app.form.date, NaiveDate::from_ymd_opt(2026, 3, 18).unwrap());

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.form.travelers, 3);

        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.form.origin.value, "Dubai (DXB)");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_exit);

        let mut app = loaded_app(Vec::new());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_exit);
    }
}
