//! Playback control methods

use crate::model::{PlaybackPhase, Queue, Song};

use super::PlaybackCoordinator;

impl PlaybackCoordinator {
    /// Plays `song`, queueing `playlist` (or `[song]` when absent or empty)
    /// with `start_index` as the current position.
    pub async fn play_song(&self, song: Song, playlist: Option<Vec<Song>>, start_index: usize) {
        let queue = Queue::for_song(&song, playlist.unwrap_or_default(), start_index);
        tracing::debug!(
            song_id = %song.id,
            queue_len = queue.len(),
            index = ?queue.index(),
            "play_song"
        );
        self.shared.update(|ledger| ledger.start(queue));

        self.add_to_recently_played(song.clone()).await;

        let loaded = self.shared.adapter.play_song(&song, self.status_callback()).await;
        if !loaded {
            self.shared.update(|ledger| {
                let still_current = ledger.queue().current().is_some_and(|s| s.id == song.id);
                if still_current {
                    ledger.mark_stopped();
                }
            });
        }
    }

    /// Pauses or resumes depending on the current state, writing the new
    /// `is_playing` immediately instead of waiting for the engine.
    pub async fn toggle_play_pause(&self) {
        let state = self.state();
        let Some(current) = state.current_song.clone() else {
            tracing::debug!("Toggle ignored, nothing queued");
            return;
        };

        let finished = self.phase() == PlaybackPhase::Finished;
        if !state.is_playing && (finished || !self.shared.adapter.is_loaded()) {
            tracing::debug!(song_id = %current.id, finished, "Nothing to resume, restarting current song");
            let index = state.current_index.unwrap_or(0);
            self.play_song(current, Some(state.playlist), index).await;
            return;
        }

        if state.is_playing {
            self.shared.adapter.pause().await;
            self.shared.update(|ledger| ledger.command_playing(false));
            tracing::info!(action = "paused", "Playback toggled");
        } else {
            self.shared.adapter.resume().await;
            self.shared.update(|ledger| ledger.command_playing(true));
            tracing::info!(action = "resumed", "Playback toggled");
        }
    }

    pub async fn play_next(&self) {
        let target = {
            let ledger = self.shared.ledger();
            let queue = ledger.queue();
            queue.next_index().map(|index| (index, queue.songs().to_vec()))
        };
        match target {
            Some((index, playlist)) => {
                tracing::debug!(index, "Skipping to next song");
                self.play_song(playlist[index].clone(), Some(playlist), index).await;
            }
            None => tracing::debug!("Next ignored, playlist is empty"),
        }
    }

    pub async fn play_previous(&self) {
        let target = {
            let ledger = self.shared.ledger();
            let queue = ledger.queue();
            queue.previous_index().map(|index| (index, queue.songs().to_vec()))
        };
        match target {
            Some((index, playlist)) => {
                tracing::debug!(index, "Skipping to previous song");
                self.play_song(playlist[index].clone(), Some(playlist), index).await;
            }
            None => tracing::debug!("Previous ignored, playlist is empty"),
        }
    }

    /// Seeks, then shows the new position right away so the progress bar
    /// does not snap back before the next tick.
    pub async fn set_position(&self, position_ms: u64) {
        self.shared.adapter.set_position(position_ms).await;
        self.shared.update(|ledger| ledger.command_position(position_ms));
    }

    pub fn set_current_time(&self, position_ms: u64) {
        self.shared.update(|ledger| ledger.command_position(position_ms));
    }

    pub fn set_duration(&self, duration_ms: u64) {
        self.shared.update(|ledger| ledger.command_duration(duration_ms));
    }

    pub fn set_is_playing(&self, is_playing: bool) {
        self.shared.update(|ledger| ledger.command_playing(is_playing));
    }

    /// Releases the audio resource and stops the event loop.
    pub async fn shutdown(&self) {
        tracing::info!("Playback coordinator shutting down");
        self.shared.adapter.cleanup().await;
        self.shared.update(|ledger| ledger.mark_stopped());
        self.post(super::CoordinatorEvent::Shutdown);
    }
}
