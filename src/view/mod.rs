//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, column widths)
//! - `layout`: Top bar (search input + volume)
//! - `content`: Results list and now-playing panel
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ResultsView, Transport, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, transport: &Transport, ui_state: &UiState, results: &ResultsView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + volume
                Constraint::Min(0),    // Results + now playing
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, transport.volume());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(65), // Results
                Constraint::Percentage(35), // Now playing
            ])
            .split(chunks[1]);

        let playing_url = transport.selection().map(|s| s.preview_url.as_str());
        content::render_results(frame, main_chunks[0], ui_state, results, playing_url);
        content::render_now_playing(frame, main_chunks[1], transport);

        progress::render_progress_bar(frame, chunks[2], transport);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
