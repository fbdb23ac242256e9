//! Layout rendering (sidebar with sections and now playing)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{PlayerState, Section, UiState};

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState, playback: &PlayerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Sections (3 items + 2 borderlines)
            Constraint::Min(0),    // Now playing
        ])
        .split(area);

    let section_items: Vec<ListItem> = Section::ALL
        .iter()
        .map(|&section| {
            let count = ui_state.songs(section).len();
            let style = if section == ui_state.active_section {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{} ({})", section.title(), count)).style(style)
        })
        .collect();

    let sections = List::new(section_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(sections, chunks[0]);

    let now_playing = match &playback.current_song {
        Some(song) => {
            let favorite = if ui_state.is_favorite(&song.id) { "💚 " } else { "" };
            let mut text = format!("{}{}\n{}", favorite, song.title, song.artist_or_unknown());
            if let Some(album) = &song.album {
                text.push('\n');
                text.push_str(album);
            }
            if let Some(index) = playback.current_index {
                text.push_str(&format!("\n\n{} / {} in queue", index + 1, playback.playlist.len()));
            }
            text
        }
        None => "Nothing playing".to_string(),
    };

    let widget = Paragraph::new(now_playing)
        .style(Style::default().fg(Color::Cyan))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 🎵 Now Playing ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, chunks[1]);
}
