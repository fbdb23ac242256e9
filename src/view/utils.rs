//! Utility functions for rendering UI components

use crate::model::Song;

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Character widths of the song list columns, laid out as
/// `"{marker}{#}  {fav}  {title}  {artist}  {album}  {duration}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SongColumns {
    pub index: usize,
    pub title: usize,
    pub artist: usize,
    pub album: usize,
}

impl SongColumns {
    const GAP: usize = 2;
    const MARKER: usize = 1;
    const FAVORITE: usize = 2;
    const DURATION: usize = 5;

    /// Title takes half of the free width, artist and album share the rest.
    /// The album column is dropped below 12 characters.
    pub fn fit(content_width: usize, song_count: usize) -> Self {
        let index = song_count.max(1).to_string().len();
        let fixed = Self::MARKER + index + Self::FAVORITE + Self::DURATION + 4 * Self::GAP;
        let free = content_width.saturating_sub(fixed);
        let title = free / 2;
        let rest = free - title;
        let (artist, album) = if rest / 2 >= 12 + Self::GAP {
            let album = rest / 2 - Self::GAP;
            (rest - album - Self::GAP, album)
        } else {
            (rest, 0)
        };
        Self { index, title, artist, album }
    }

    pub fn header(&self) -> String {
        self.line(" ", "#", "  ", "Title", "Artist", "Album", "Time")
    }

    pub fn row(&self, playing: bool, number: usize, favorite: bool, song: &Song) -> String {
        let duration = song
            .duration_hint_ms()
            .map(format_duration)
            .unwrap_or_else(|| "--:--".to_string());
        self.line(
            if playing { "▶" } else { " " },
            &number.to_string(),
            if favorite { "💚" } else { "  " },
            &song.title,
            song.artist_or_unknown(),
            song.album.as_deref().unwrap_or(""),
            &duration,
        )
    }

    fn line(&self, marker: &str, number: &str, favorite: &str, title: &str, artist: &str, album: &str, duration: &str) -> String {
        let gap = " ".repeat(Self::GAP);
        let mut line = format!(
            "{marker}{number:>width$}{gap}{favorite}{gap}{}{gap}{}",
            truncate_string(title, self.title),
            truncate_string(artist, self.artist),
            width = self.index,
        );
        if self.album > 0 {
            line.push_str(&gap);
            line.push_str(&truncate_string(album, self.album));
        }
        line.push_str(&gap);
        line.push_str(&format!("{:>width$}", duration, width = Self::DURATION));
        line
    }
}
