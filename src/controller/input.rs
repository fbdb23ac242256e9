//! Key event handling for the terminal UI

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{Song, UiState};
use super::PlaybackCoordinator;

pub const SEEK_STEP_MS: u64 = 10_000;

/// Turns key presses into coordinator commands and keeps the UI's copies of
/// the side lists current.
pub struct AppController {
    coordinator: PlaybackCoordinator,
    pub ui: UiState,
}

impl AppController {
    pub fn new(coordinator: PlaybackCoordinator, library: Vec<Song>) -> Self {
        Self {
            coordinator,
            ui: UiState::new(library),
        }
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    pub async fn refresh_lists(&mut self) {
        self.ui.favorites = self.coordinator.favorites().await;
        self.ui.recently_played = self.coordinator.recently_played().await;
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.ui.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?')) {
                self.ui.show_help_popup = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.ui.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui.should_quit = true;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.ui.cycle_section_backward();
                } else {
                    self.ui.cycle_section_forward();
                }
            }
            KeyCode::BackTab => self.ui.cycle_section_backward(),
            KeyCode::Up => self.ui.move_up(),
            KeyCode::Down => self.ui.move_down(),
            KeyCode::Enter => self.play_selected().await,
            KeyCode::Char(' ') => self.coordinator.toggle_play_pause().await,
            KeyCode::Char('n') | KeyCode::Char('N') => self.coordinator.play_next().await,
            KeyCode::Char('p') | KeyCode::Char('P') => self.coordinator.play_previous().await,
            KeyCode::Right => self.seek_by(SEEK_STEP_MS as i64).await,
            KeyCode::Left => self.seek_by(-(SEEK_STEP_MS as i64)).await,
            KeyCode::Char('f') | KeyCode::Char('F') => self.toggle_favorite().await,
            KeyCode::Char('h') | KeyCode::Char('?') => self.ui.show_help_popup = true,
            _ => return,
        }
        self.refresh_lists().await;
    }

    /// Plays the selected song with the whole visible section as the queue.
    async fn play_selected(&self) {
        let section = self.ui.active_section;
        let Some(song) = self.ui.selected_song().cloned() else {
            return;
        };
        let playlist = self.ui.songs(section).to_vec();
        let index = self.ui.selected(section);
        self.coordinator.play_song(song, Some(playlist), index).await;
    }

    async fn seek_by(&self, delta_ms: i64) {
        let state = self.coordinator.state();
        if state.current_song.is_none() {
            return;
        }
        let mut target = state.current_time_ms.saturating_add_signed(delta_ms);
        if state.duration_ms > 0 {
            target = target.min(state.duration_ms);
        }
        self.coordinator.set_position(target).await;
    }

    /// Favorites the selected song, or the current one when nothing is selected.
    async fn toggle_favorite(&self) {
        let song = self
            .ui
            .selected_song()
            .cloned()
            .or_else(|| self.coordinator.state().current_song);
        if let Some(song) = song {
            self.coordinator.toggle_favorite(song).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_support::*;
    use crate::audio::testing::EngineCall;
    use crate::model::{PlaybackStatus, Section};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn controller(ids: &[&str]) -> (AppController, Fixture) {
        let f = fixture().await;
        let app = AppController::new(f.coordinator.clone(), songs(ids));
        (app, f)
    }

    #[tokio::test]
    async fn test_enter_queues_the_visible_section() {
        let (mut app, f) = controller(&["a", "b", "c"]).await;

        app.handle_key_event(press(KeyCode::Down)).await;
        app.handle_key_event(press(KeyCode::Enter)).await;

        let state = f.coordinator.state();
        assert_eq!(state.playlist.len(), 3);
        assert_eq!(state.current_index, Some(1));
        assert_eq!(app.ui.recently_played.len(), 1);
    }

    #[tokio::test]
    async fn test_favorite_key_updates_favorites_section() {
        let (mut app, _f) = controller(&["a", "b"]).await;

        app.handle_key_event(press(KeyCode::Char('f'))).await;
        assert_eq!(app.ui.favorites.len(), 1);

        app.handle_key_event(press(KeyCode::Tab)).await;
        assert_eq!(app.ui.active_section, Section::Favorites);
        app.handle_key_event(press(KeyCode::Char('f'))).await;
        assert!(app.ui.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_seek_keys_are_clamped() {
        let (mut app, f) = controller(&["a"]).await;
        app.handle_key_event(press(KeyCode::Enter)).await;
        f.engine.emit(PlaybackStatus {
            is_loaded: true,
            is_playing: true,
            position_ms: 4_000,
            duration_ms: 12_000,
            did_just_finish: false,
        });

        app.handle_key_event(press(KeyCode::Left)).await;
        assert_eq!(f.coordinator.state().current_time_ms, 0);

        app.handle_key_event(press(KeyCode::Right)).await;
        app.handle_key_event(press(KeyCode::Right)).await;
        assert_eq!(f.coordinator.state().current_time_ms, 12_000);
        assert_eq!(f.engine.count(&EngineCall::Seek(12_000)), 1);
    }

    #[tokio::test]
    async fn test_help_popup_swallows_keys() {
        let (mut app, f) = controller(&["a"]).await;
        app.handle_key_event(press(KeyCode::Char('h'))).await;
        app.handle_key_event(press(KeyCode::Enter)).await;
        assert!(f.coordinator.state().current_song.is_none());

        app.handle_key_event(press(KeyCode::Esc)).await;
        app.handle_key_event(press(KeyCode::Char('q'))).await;
        assert!(app.ui.should_quit);
    }
}
