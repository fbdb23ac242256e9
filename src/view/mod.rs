//! View module - UI rendering
//!
//! Rendering for the terminal player using ratatui. It is organized into
//! submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Sidebar with sections and now playing
//! - `content`: Song list of the active section
//! - `progress`: Progress bar rendering
//! - `overlays`: Help popup

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlayerState, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlayerState, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Main content (sidebar + song list)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar
                Constraint::Percentage(70), // Song list
            ])
            .split(chunks[0]);

        layout::render_sidebar(frame, main_chunks[0], ui_state, playback);

        let current_song = playback.current_song.as_ref().map(|song| &song.id);
        content::render_main_content(frame, main_chunks[1], ui_state, current_song);

        progress::render_progress_bar(frame, chunks[1], playback);

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
