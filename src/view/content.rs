//! Main content area: the song list of the active section

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding},
    Frame,
};

use crate::model::{Song, SongId, UiState};
use super::utils::{render_scrollable_list, SongColumns};

pub fn render_main_content(frame: &mut Frame, area: Rect, ui_state: &UiState, current_song: Option<&SongId>) {
    let section = ui_state.active_section;
    let songs = ui_state.songs(section);
    let selected = ui_state.selected(section);
    let content_width = area.width.saturating_sub(4) as usize;

    let mut items = render_song_items(songs, selected, ui_state, current_song, content_width);
    if songs.is_empty() {
        items.push(ListItem::new("       No songs here yet").style(Style::default().fg(Color::DarkGray)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", section.title()))
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    // +1 for the header row
    render_scrollable_list(frame, area, items, selected + 1, block);
}

fn render_song_items(
    songs: &[Song],
    selected: usize,
    ui_state: &UiState,
    current_song: Option<&SongId>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let columns = SongColumns::fit(content_width, songs.len());

    let mut items = vec![ListItem::new(columns.header())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))];

    items.extend(songs.iter().enumerate().map(|(i, song)| {
        let is_playing = current_song == Some(&song.id);
        let style = if i == selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        ListItem::new(columns.row(is_playing, i + 1, ui_state.is_favorite(&song.id), song)).style(style)
    }));

    items
}
