use ratatui::widgets::ListState;

use crate::status::{tally, StatusResult};

/// State of the terminal dashboard.
pub struct App {
    /// Results of the latest completed pass, in registry order.
    pub results: Vec<StatusResult>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Set by the `r` key; cleared by the main loop once forwarded.
    pub refresh_requested: bool,
    /// Last poll status message.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            refresh_requested: false,
            status: "Starting…".into(),
        }
    }

    /// Replace the rows with a new pass, keeping the selection in bounds.
    pub fn set_results(&mut self, results: Vec<StatusResult>) {
        let [green, yellow, red, unknown] = tally(&results).map(|(_, n)| n);
        self.status = format!(
            "Checked {} providers: {green} up, {yellow} degraded, {red} down, {unknown} unknown",
            results.len()
        );
        self.results = results;

        match self.list_state.selected() {
            _ if self.results.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.results.len() => {
                self.list_state.select(Some(self.results.len() - 1))
            }
            _ => {}
        }
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
        self.status = "Refreshing…".into();
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.results.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.results.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.results.is_empty() {
            self.list_state.select(Some(self.results.len() - 1));
        }
    }
}
