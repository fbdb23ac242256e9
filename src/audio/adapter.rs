//! Audio engine adapter
//!
//! Owns the single active audio session. Tracks which song is loaded, keeps an
//! internal playing flag in step with the engine, and forwards every status
//! tick to the callback registered by the last `play_song`.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Mutex as AsyncMutex;

use crate::model::{PlaybackStatus, Song};
use super::engine::{AudioEngine, SessionOptions, StatusSink};

/// Callback registered with [`AudioAdapter::play_song`]
pub type StatusCallback = Arc<dyn Fn(PlaybackStatus) + Send + Sync>;

#[derive(Default)]
struct AdapterState {
    current_song: Option<Song>,
    loaded: bool,
    is_playing: bool,
    /// Bumped on every load/stop so ticks from a superseded resource are dropped
    generation: u64,
    /// Generation of the most recent load handed to the engine
    issued_load: u64,
    last_status: PlaybackStatus,
    callback: Option<StatusCallback>,
}

fn lock(state: &Mutex<AdapterState>) -> MutexGuard<'_, AdapterState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct AudioAdapter {
    engine: Arc<dyn AudioEngine>,
    session_options: SessionOptions,
    session_ready: AsyncMutex<bool>,
    state: Arc<Mutex<AdapterState>>,
}

impl AudioAdapter {
    pub fn new(engine: Arc<dyn AudioEngine>) -> Self {
        Self::with_session_options(engine, SessionOptions::default())
    }

    pub fn with_session_options(engine: Arc<dyn AudioEngine>, session_options: SessionOptions) -> Self {
        Self {
            engine,
            session_options,
            session_ready: AsyncMutex::new(false),
            state: Arc::new(Mutex::new(AdapterState::default())),
        }
    }

    /// Configures the engine session once. A failed attempt is retried on the
    /// next use.
    async fn ensure_session(&self) {
        let mut ready = self.session_ready.lock().await;
        if *ready {
            return;
        }
        match self.engine.configure_session(self.session_options).await {
            Ok(()) => {
                tracing::debug!(options = ?self.session_options, "Audio session configured");
                *ready = true;
            }
            Err(e) => tracing::error!(error = %e, "Failed to configure audio session"),
        }
    }

    /// Loads and autoplays `song`, replacing whatever was loaded.
    ///
    /// Returns `false` if the source could not be loaded. If the same song is
    /// already loaded and playing this is a successful no-op.
    pub async fn play_song(&self, song: &Song, on_status: StatusCallback) -> bool {
        {
            let state = lock(&self.state);
            let same_song = state.current_song.as_ref().is_some_and(|s| s.id == song.id);
            if same_song && state.is_playing {
                tracing::debug!(song_id = %song.id, title = %song.title, "Song is already playing");
                return true;
            }
        }

        self.ensure_session().await;

        let was_loaded = lock(&self.state).loaded;
        if was_loaded {
            if let Err(e) = self.engine.unload().await {
                tracing::warn!(error = %e, "Failed to release previous resource");
            }
        }

        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.loaded = false;
            state.current_song = Some(song.clone());
            state.callback = Some(on_status);
            state.is_playing = true;
            state.last_status = PlaybackStatus::default();
            state.issued_load = state.generation;
            state.generation
        };

        tracing::info!(song_id = %song.id, title = %song.title, uri = %song.source_uri, "Playing song");

        match self.engine.load(&song.source_uri, true, self.status_sink(generation)).await {
            Ok(()) => {
                let orphaned = {
                    let mut state = lock(&self.state);
                    if state.generation == generation {
                        state.loaded = true;
                    }
                    // Stopped mid-load with no newer load to replace the resource
                    state.generation != generation && state.issued_load == generation
                };
                if orphaned {
                    tracing::debug!(song_id = %song.id, "Releasing resource loaded after stop");
                    if let Err(e) = self.engine.unload().await {
                        tracing::warn!(error = %e, "Failed to release orphaned resource");
                    }
                }
                true
            }
            Err(e) => {
                tracing::error!(song_id = %song.id, error = %e, "Failed to load song");
                let mut state = lock(&self.state);
                if state.generation == generation {
                    state.is_playing = false;
                    state.loaded = false;
                }
                false
            }
        }
    }

    pub async fn pause(&self) {
        if !lock(&self.state).loaded {
            tracing::debug!("Pause ignored, nothing loaded");
            return;
        }
        if let Err(e) = self.engine.pause().await {
            tracing::warn!(error = %e, "Engine pause failed");
            return;
        }
        self.set_flag_and_synthesize(false);
    }

    pub async fn resume(&self) {
        if !lock(&self.state).loaded {
            tracing::debug!("Resume ignored, nothing loaded");
            return;
        }
        if let Err(e) = self.engine.play().await {
            tracing::warn!(error = %e, "Engine resume failed");
            return;
        }
        self.set_flag_and_synthesize(true);
    }

    /// Reports the new flag right away instead of waiting for the next engine tick.
    fn set_flag_and_synthesize(&self, is_playing: bool) {
        let (callback, status) = {
            let mut state = lock(&self.state);
            state.is_playing = is_playing;
            state.last_status.is_playing = is_playing;
            state.last_status.did_just_finish = false;
            let status = PlaybackStatus {
                is_loaded: true,
                is_playing,
                position_ms: state.last_status.position_ms,
                duration_ms: state.last_status.duration_ms,
                did_just_finish: false,
            };
            (state.callback.clone(), status)
        };
        tracing::debug!(is_playing, "Audio adapter flag updated");
        if let Some(callback) = callback {
            callback(status);
        }
    }

    pub async fn stop(&self) {
        let was_loaded = {
            let mut state = lock(&self.state);
            let was_loaded = state.loaded;
            state.generation += 1;
            state.loaded = false;
            state.is_playing = false;
            state.current_song = None;
            state.last_status = PlaybackStatus::default();
            was_loaded
        };
        if was_loaded {
            if let Err(e) = self.engine.unload().await {
                tracing::warn!(error = %e, "Failed to release resource on stop");
            }
        }
    }

    pub async fn set_position(&self, position_ms: u64) {
        if !lock(&self.state).loaded {
            tracing::debug!(position_ms, "Seek ignored, nothing loaded");
            return;
        }
        match self.engine.seek(position_ms).await {
            Ok(()) => lock(&self.state).last_status.position_ms = position_ms,
            Err(e) => tracing::warn!(position_ms, error = %e, "Engine seek failed"),
        }
    }

    /// Stops playback and forgets the registered callback.
    pub async fn cleanup(&self) {
        self.stop().await;
        lock(&self.state).callback = None;
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).is_playing
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.state).loaded
    }

    pub fn current_song(&self) -> Option<Song> {
        lock(&self.state).current_song.clone()
    }

    fn status_sink(&self, generation: u64) -> StatusSink {
        let state = Arc::clone(&self.state);
        Arc::new(move |status| Self::handle_status(&state, generation, status))
    }

    fn handle_status(state: &Mutex<AdapterState>, generation: u64, status: PlaybackStatus) {
        let callback = {
            let mut state = lock(state);
            if state.generation != generation {
                tracing::trace!(generation, "Dropping tick from superseded resource");
                return;
            }

            if status.is_loaded {
                if status.is_completion() {
                    state.is_playing = false;
                    tracing::info!("Song finished");
                } else if status.is_playing != state.is_playing {
                    state.is_playing = status.is_playing;
                    tracing::debug!(is_playing = status.is_playing, "Syncing adapter flag to engine");
                }
                state.last_status = status;
            }
            state.callback.clone()
        };

        if let Some(callback) = callback {
            callback(status);
        }
    }
}
