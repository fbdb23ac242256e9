//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlayerState;
use super::utils::format_duration;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlayerState) {
    let status_text = match &playback.current_song {
        None => " No song playing".to_string(),
        Some(song) => {
            let icon = if playback.is_playing { " ▶" } else { "⏸ " };
            match &song.album {
                Some(album) => format!("{} {} | {} ({})", icon, song.title, song.artist_or_unknown(), album),
                None => format!("{} {} | {}", icon, song.title, song.artist_or_unknown()),
            }
        }
    };

    let time_str = format!(
        "{} / {}",
        format_duration(playback.current_time_ms),
        format_duration(playback.duration_ms)
    );

    let controls_info = " Space play/pause | n/p skip | ←/→ seek | f favorite | h help ";

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio(playback))
        .label(time_str);

    frame.render_widget(gauge, area);
}

fn progress_ratio(playback: &PlayerState) -> f64 {
    if playback.duration_ms > 0 {
        (playback.current_time_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
