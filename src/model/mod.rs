//! Model module - playback data types and state
//!
//! - `song`: catalog song records
//! - `playback`: queue, engine status, and the commanded/confirmed state merge
//! - `lists`: recently-played and favorites lists
//! - `ui`: terminal UI selection state

mod song;
mod playback;
mod lists;
mod ui;

pub use song::{LyricLine, Song, SongId};

pub use playback::{
    merge, CommandedPlayback, ConfirmedPlayback, PlaybackLedger, PlaybackPhase,
    PlaybackStatus, PlayerState, Queue,
};

pub use lists::{Favorites, RecentlyPlayed, RECENTLY_PLAYED_LIMIT};

pub use ui::{Section, UiState};
