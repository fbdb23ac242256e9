//! Playback-related types and state management
//!
//! `PlayerState` is never written field by field. The coordinator keeps two
//! layers, what it has *commanded* and what the engine has *confirmed*, and
//! every published state is produced by [`merge`].

use super::song::Song;

/// One status report from the audio engine (or synthesized by the adapter).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// The engine reached the end of the resource on its own.
    pub fn is_completion(&self) -> bool {
        !self.is_playing && self.did_just_finish
    }
}

/// Read-only projection of playback handed to the UI and the notification bridge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub current_time_ms: u64,
    pub duration_ms: u64,
    pub playlist: Vec<Song>,
    /// `None` iff `playlist` is empty
    pub current_index: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
    Finished,
}

impl PlayerState {
    pub fn phase(&self, finished: bool) -> PlaybackPhase {
        match (&self.current_song, self.is_playing) {
            (None, _) => PlaybackPhase::Idle,
            (Some(_), true) => PlaybackPhase::Playing,
            (Some(_), false) if finished => PlaybackPhase::Finished,
            (Some(_), false) => PlaybackPhase::Paused,
        }
    }
}

/// The play queue. `index` always points into `songs`, or is `None` when empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Queue {
    songs: Vec<Song>,
    index: Option<usize>,
}

impl Queue {
    /// Builds the queue for `song`. An empty list becomes a singleton queue.
    /// When `start_index` does not point at `song`, the song is looked up by
    /// id; if it is not in the list at all, the queue falls back to `[song]`.
    pub fn for_song(song: &Song, playlist: Vec<Song>, start_index: usize) -> Self {
        if playlist.is_empty() {
            return Self::singleton(song.clone());
        }

        let index = match playlist.get(start_index) {
            Some(candidate) if candidate.id == song.id => Some(start_index),
            _ => playlist.iter().position(|s| s.id == song.id),
        };

        match index {
            Some(index) => Self {
                songs: playlist,
                index: Some(index),
            },
            None => {
                tracing::warn!(
                    song_id = %song.id,
                    start_index,
                    "Song not found in supplied playlist, playing it as a single-song queue"
                );
                Self::singleton(song.clone())
            }
        }
    }

    pub fn singleton(song: Song) -> Self {
        Self {
            songs: vec![song],
            index: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Song> {
        self.index.and_then(|i| self.songs.get(i))
    }

    /// Index after the current one, wrapping to the start.
    pub fn next_index(&self) -> Option<usize> {
        if self.songs.is_empty() {
            return None;
        }
        let current = self.index.unwrap_or(self.songs.len() - 1);
        Some((current + 1) % self.songs.len())
    }

    /// Index before the current one, wrapping to the end.
    pub fn previous_index(&self) -> Option<usize> {
        if self.songs.is_empty() {
            return None;
        }
        match self.index {
            Some(0) | None => Some(self.songs.len() - 1),
            Some(i) => Some(i - 1),
        }
    }
}

/// Last engine-reported values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfirmedPlayback {
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub finished: bool,
}

/// Optimistic writes waiting for the engine to catch up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandedPlayback {
    pub is_playing: Option<bool>,
    pub position_ms: Option<u64>,
    pub duration_ms: Option<u64>,
}

/// Single merge point for the two state sources. Commanded values win until
/// the next engine tick clears them.
pub fn merge(queue: &Queue, commanded: CommandedPlayback, confirmed: ConfirmedPlayback) -> PlayerState {
    PlayerState {
        current_song: queue.current().cloned(),
        is_playing: commanded.is_playing.unwrap_or(confirmed.is_playing),
        current_time_ms: commanded.position_ms.unwrap_or(confirmed.position_ms),
        duration_ms: commanded.duration_ms.unwrap_or(confirmed.duration_ms),
        playlist: queue.songs().to_vec(),
        current_index: queue.index(),
    }
}

/// Everything the coordinator owns about playback
#[derive(Clone, Debug, Default)]
pub struct PlaybackLedger {
    queue: Queue,
    commanded: CommandedPlayback,
    confirmed: ConfirmedPlayback,
}

impl PlaybackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn is_finished(&self) -> bool {
        self.confirmed.finished
    }

    /// Switches to a new queue position and optimistically marks it playing from 0.
    pub fn start(&mut self, queue: Queue) {
        let duration_hint = queue
            .current()
            .and_then(Song::duration_hint_ms)
            .unwrap_or(0);
        self.queue = queue;
        self.confirmed = ConfirmedPlayback {
            duration_ms: duration_hint,
            ..ConfirmedPlayback::default()
        };
        self.commanded = CommandedPlayback {
            is_playing: Some(true),
            position_ms: Some(0),
            duration_ms: None,
        };
    }

    pub fn command_playing(&mut self, is_playing: bool) {
        self.commanded.is_playing = Some(is_playing);
    }

    pub fn command_position(&mut self, position_ms: u64) {
        self.commanded.position_ms = Some(position_ms);
    }

    pub fn command_duration(&mut self, duration_ms: u64) {
        self.commanded.duration_ms = Some(duration_ms);
    }

    /// Folds an engine tick into the confirmed layer. The engine is
    /// authoritative once it reports, so pending commands are dropped.
    pub fn confirm(&mut self, status: &PlaybackStatus) {
        if !status.is_loaded {
            return;
        }
        self.confirmed.is_playing = status.is_playing;
        self.confirmed.position_ms = status.position_ms;
        if status.duration_ms > 0 {
            self.confirmed.duration_ms = status.duration_ms;
        }
        self.confirmed.finished = status.is_completion();
        self.commanded = CommandedPlayback::default();
    }

    /// Nothing is playing: the load failed or playback was torn down.
    pub fn mark_stopped(&mut self) {
        self.commanded.is_playing = None;
        self.confirmed.is_playing = false;
    }

    pub fn snapshot(&self) -> PlayerState {
        merge(&self.queue, self.commanded, self.confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs(ids: &[&str]) -> Vec<Song> {
        ids.iter()
            .map(|id| Song::new(*id, format!("Song {}", id), format!("/music/{}.mp3", id)))
            .collect()
    }

    #[test]
    fn test_empty_playlist_becomes_singleton_queue() {
        let song = Song::new("a", "A", "/a.mp3");
        let queue = Queue::for_song(&song, Vec::new(), 0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.index(), Some(0));
        assert_eq!(queue.current().map(|s| &s.id), Some(&song.id));
    }

    #[test]
    fn test_mismatched_start_index_is_resolved_by_id() {
        let list = songs(&["a", "b", "c"]);
        let queue = Queue::for_song(&list[2], list.clone(), 0);
        assert_eq!(queue.index(), Some(2));
    }

    #[test]
    fn test_song_missing_from_playlist_falls_back_to_singleton() {
        let list = songs(&["a", "b"]);
        let stranger = Song::new("z", "Z", "/z.mp3");
        let queue = Queue::for_song(&stranger, list, 1);
        assert_eq!(queue.songs().len(), 1);
        assert_eq!(queue.current().map(|s| s.id.as_str()), Some("z"));
    }

    #[test]
    fn test_index_wraps_in_both_directions() {
        let list = songs(&["a", "b", "c"]);
        let last = Queue::for_song(&list[2], list.clone(), 2);
        assert_eq!(last.next_index(), Some(0));

        let first = Queue::for_song(&list[0], list.clone(), 0);
        assert_eq!(first.previous_index(), Some(2));
        assert_eq!(Queue::default().next_index(), None);
        assert_eq!(Queue::default().previous_index(), None);
    }

    #[test]
    fn test_commanded_values_win_until_engine_tick() {
        let list = songs(&["a"]);
        let mut ledger = PlaybackLedger::new();
        ledger.start(Queue::for_song(&list[0], list.clone(), 0));

        let state = ledger.snapshot();
        assert!(state.is_playing);
        assert_eq!(state.current_time_ms, 0);

        ledger.command_position(30_000);
        assert_eq!(ledger.snapshot().current_time_ms, 30_000);

        ledger.confirm(&PlaybackStatus {
            is_loaded: true,
            is_playing: true,
            position_ms: 31_000,
            duration_ms: 60_000,
            did_just_finish: false,
        });
        let state = ledger.snapshot();
        assert_eq!(state.current_time_ms, 31_000);
        assert_eq!(state.duration_ms, 60_000);
    }

    #[test]
    fn test_unloaded_tick_is_ignored() {
        let list = songs(&["a"]);
        let mut ledger = PlaybackLedger::new();
        ledger.start(Queue::for_song(&list[0], list.clone(), 0));
        ledger.confirm(&PlaybackStatus::default());
        assert!(ledger.snapshot().is_playing);
    }

    #[test]
    fn test_completion_marks_finished_phase() {
        let list = songs(&["a"]);
        let mut ledger = PlaybackLedger::new();
        ledger.start(Queue::for_song(&list[0], list.clone(), 0));
        ledger.confirm(&PlaybackStatus {
            is_loaded: true,
            is_playing: false,
            position_ms: 1_000,
            duration_ms: 1_000,
            did_just_finish: true,
        });
        let state = ledger.snapshot();
        assert_eq!(state.phase(ledger.is_finished()), PlaybackPhase::Finished);
        assert_eq!(PlayerState::default().phase(false), PlaybackPhase::Idle);
    }
}
