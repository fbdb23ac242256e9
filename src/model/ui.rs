//! Terminal UI state

use super::song::{Song, SongId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Library,
    Favorites,
    RecentlyPlayed,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Library, Section::Favorites, Section::RecentlyPlayed];

    pub fn title(self) -> &'static str {
        match self {
            Section::Library => "Library",
            Section::Favorites => "Favorites",
            Section::RecentlyPlayed => "Recently Played",
        }
    }

    fn index(self) -> usize {
        match self {
            Section::Library => 0,
            Section::Favorites => 1,
            Section::RecentlyPlayed => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_section: Section,
    selected: [usize; 3],
    pub library: Vec<Song>,
    pub favorites: Vec<Song>,
    pub recently_played: Vec<Song>,
    pub show_help_popup: bool,
    pub should_quit: bool,
}

impl UiState {
    pub fn new(library: Vec<Song>) -> Self {
        Self {
            library,
            ..Self::default()
        }
    }

    pub fn songs(&self, section: Section) -> &[Song] {
        match section {
            Section::Library => &self.library,
            Section::Favorites => &self.favorites,
            Section::RecentlyPlayed => &self.recently_played,
        }
    }

    pub fn active_songs(&self) -> &[Song] {
        self.songs(self.active_section)
    }

    /// Selection in `section`, clamped to its current length.
    pub fn selected(&self, section: Section) -> usize {
        let len = self.songs(section).len();
        self.selected[section.index()].min(len.saturating_sub(1))
    }

    pub fn selected_song(&self) -> Option<&Song> {
        self.active_songs().get(self.selected(self.active_section))
    }

    pub fn is_favorite(&self, id: &SongId) -> bool {
        self.favorites.iter().any(|song| &song.id == id)
    }

    pub fn cycle_section_forward(&mut self) {
        self.active_section = self.active_section.next();
    }

    pub fn cycle_section_backward(&mut self) {
        self.active_section = self.active_section.previous();
    }

    pub fn move_up(&mut self) {
        let section = self.active_section;
        let current = self.selected(section);
        self.selected[section.index()] = current.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let section = self.active_section;
        let len = self.songs(section).len();
        let current = self.selected(section);
        if current + 1 < len {
            self.selected[section.index()] = current + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(n: usize) -> Vec<Song> {
        (0..n)
            .map(|i| Song::new(format!("s{}", i), format!("Song {}", i), format!("/m/{}.mp3", i)))
            .collect()
    }

    #[test]
    fn test_sections_cycle_both_ways() {
        let mut ui = UiState::default();
        ui.cycle_section_forward();
        assert_eq!(ui.active_section, Section::Favorites);
        ui.cycle_section_backward();
        ui.cycle_section_backward();
        assert_eq!(ui.active_section, Section::RecentlyPlayed);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut ui = UiState::new(library(2));
        ui.move_up();
        assert_eq!(ui.selected(Section::Library), 0);
        ui.move_down();
        ui.move_down();
        assert_eq!(ui.selected(Section::Library), 1);

        ui.library.truncate(1);
        assert_eq!(ui.selected_song().map(|s| s.id.as_str()), Some("s0"));
    }

    #[test]
    fn test_selection_is_kept_per_section() {
        let mut ui = UiState::new(library(3));
        ui.favorites = library(3);
        ui.move_down();
        ui.cycle_section_forward();
        assert_eq!(ui.selected(Section::Favorites), 0);
        assert_eq!(ui.selected(Section::Library), 1);
        assert!(ui.is_favorite(&SongId::from("s2")));
    }
}
