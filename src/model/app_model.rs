//! Main application model with state management

use std::time::{Duration, Instant};

use super::search::SearchState;
use super::transport::Transport;
use super::types::{ActiveSection, UiState};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Main application model containing all state
pub struct AppModel {
    ui_state: UiState,
    search: SearchState,
    transport: Transport,
    should_quit: bool,
}

impl AppModel {
    pub fn new(volume: f32) -> Self {
        Self {
            ui_state: UiState::default(),
            search: SearchState::new(),
            transport: Transport::new(volume),
            should_quit: false,
        }
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchState {
        &mut self.search
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn cycle_section(&mut self) {
        self.ui_state.active_section = self.ui_state.active_section.next();
    }

    pub fn set_active_section(&mut self, section: ActiveSection) {
        self.ui_state.active_section = section;
    }

    pub fn search_query(&self) -> &str {
        &self.ui_state.search_query
    }

    pub fn clear_search_query(&mut self) {
        self.ui_state.search_query.clear();
    }

    pub fn append_to_search(&mut self, c: char) {
        self.ui_state.search_query.push(c);
    }

    pub fn backspace_search(&mut self) {
        self.ui_state.search_query.pop();
    }

    pub fn set_error(&mut self, message: String) {
        self.ui_state.error_message = Some(message);
        self.ui_state.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.ui_state.error_message = None;
        self.ui_state.error_timestamp = None;
    }

    pub fn has_error(&self) -> bool {
        self.ui_state.error_message.is_some()
    }

    pub fn auto_clear_old_errors(&mut self) {
        let expired = self
            .ui_state
            .error_timestamp
            .is_some_and(|at| at.elapsed() >= ERROR_DISPLAY_TIME);
        if expired {
            self.clear_error();
        }
    }

    pub fn show_help_popup(&mut self) {
        self.ui_state.show_help_popup = true;
    }

    pub fn hide_help_popup(&mut self) {
        self.ui_state.show_help_popup = false;
    }

    pub fn is_help_popup_open(&self) -> bool {
        self.ui_state.show_help_popup
    }
}
