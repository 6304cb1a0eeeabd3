//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::playback::SEEK_STEP;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let mut model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error();
            }
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup();
            }
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            model.set_should_quit(true);
            return Ok(());
        }

        // Handle search input when in search section
        if model.ui_state().active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab | KeyCode::BackTab => model.cycle_section(),
                KeyCode::Enter => {
                    let query = model.search_query().to_string();
                    drop(model);
                    self.perform_search(&query).await;
                }
                KeyCode::Esc => model.clear_search_query(),
                KeyCode::Backspace => model.backspace_search(),
                KeyCode::Char(c) => model.append_to_search(c),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true),
            KeyCode::Tab | KeyCode::BackTab => model.cycle_section(),
            KeyCode::Up => model.search_mut().move_up(),
            KeyCode::Down => model.search_mut().move_down(),
            KeyCode::Enter => {
                drop(model);
                self.play_selected_result().await;
            }
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Left => {
                drop(model);
                self.seek_relative(-SEEK_STEP).await;
            }
            KeyCode::Right => {
                drop(model);
                self.seek_relative(SEEK_STEP).await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            // Focus search
            KeyCode::Char('/') | KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search);
            }
            // Search again with the current query
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let query = model.search_query().to_string();
                drop(model);
                self.perform_search(&query).await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => model.show_help_popup(),
            _ => {}
        }
        Ok(())
    }
}
