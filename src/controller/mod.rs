//! Controller module - the playback coordinator
//!
//! The coordinator is the only writer of playback state. Commands arrive from
//! the UI (direct calls) and from the notification bridge (posted events);
//! engine ticks arrive through the adapter's status callback. It is organized
//! into submodules by responsibility:
//!
//! - `playback`: playback commands (play, toggle, next/previous, seek)
//! - `player_events`: status reconciliation and the posted-event loop
//! - `library`: recently-played and favorites operations
//! - `input`: terminal key handling on top of the coordinator

mod playback;
mod player_events;
mod library;
mod input;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};

use crate::audio::AudioAdapter;
use crate::model::{Favorites, PlaybackLedger, PlaybackPhase, PlayerState, RecentlyPlayed};
use crate::store::{KeyValueStore, PersistedLists};

pub use input::{AppController, SEEK_STEP_MS};
pub use player_events::{CoordinatorEvent, EventQueue};

#[derive(Clone, Copy, Debug)]
pub struct CoordinatorOptions {
    /// Pause between a song finishing and the next one starting
    pub auto_advance_delay: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            auto_advance_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Default)]
struct SongLists {
    recently_played: RecentlyPlayed,
    favorites: Favorites,
}

struct Shared {
    adapter: Arc<AudioAdapter>,
    ledger: Mutex<PlaybackLedger>,
    lists: AsyncMutex<SongLists>,
    persisted: PersistedLists,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    state_tx: watch::Sender<PlayerState>,
    options: CoordinatorOptions,
}

impl Shared {
    fn ledger(&self) -> MutexGuard<'_, PlaybackLedger> {
        match self.ledger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Applies a mutation and publishes the merged state.
    fn update<R>(&self, mutate: impl FnOnce(&mut PlaybackLedger) -> R) -> R {
        let mut ledger = self.ledger();
        let result = mutate(&mut ledger);
        self.state_tx.send_replace(ledger.snapshot());
        result
    }

    fn post(&self, event: CoordinatorEvent) {
        if let Err(mpsc::error::SendError(event)) = self.events.send(event) {
            tracing::warn!(?event, "Coordinator event loop is not running, dropping event");
        }
    }
}

#[derive(Clone)]
pub struct PlaybackCoordinator {
    shared: Arc<Shared>,
}

impl PlaybackCoordinator {
    /// Creates the coordinator and loads the persisted lists. The returned
    /// queue must be handed to [`PlaybackCoordinator::run`].
    pub async fn start(
        adapter: Arc<AudioAdapter>,
        store: Arc<dyn KeyValueStore>,
        options: CoordinatorOptions,
    ) -> (Self, EventQueue) {
        let persisted = PersistedLists::new(store);
        let loaded = persisted.load().await;
        let lists = SongLists {
            recently_played: RecentlyPlayed::from_stored(loaded.recently_played),
            favorites: Favorites::from_stored(loaded.favorites),
        };

        let (events, receiver) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(PlayerState::default());

        let coordinator = Self {
            shared: Arc::new(Shared {
                adapter,
                ledger: Mutex::new(PlaybackLedger::new()),
                lists: AsyncMutex::new(lists),
                persisted,
                events,
                state_tx,
                options,
            }),
        };
        (coordinator, EventQueue::new(receiver))
    }

    /// Snapshot of the current playback state
    pub fn state(&self) -> PlayerState {
        self.shared.ledger().snapshot()
    }

    pub fn phase(&self) -> PlaybackPhase {
        let ledger = self.shared.ledger();
        ledger.snapshot().phase(ledger.is_finished())
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.shared.state_tx.subscribe()
    }

    /// Queues an event for the run loop.
    pub fn post(&self, event: CoordinatorEvent) {
        self.shared.post(event);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::audio::testing::ScriptedEngine;
    use crate::model::Song;
    use crate::store::MemoryStore;

    pub struct Fixture {
        pub coordinator: PlaybackCoordinator,
        pub events: EventQueue,
        pub engine: Arc<ScriptedEngine>,
        pub store: MemoryStore,
    }

    pub async fn fixture() -> Fixture {
        fixture_with_store(MemoryStore::new()).await
    }

    pub async fn fixture_with_store(store: MemoryStore) -> Fixture {
        let engine = Arc::new(ScriptedEngine::new());
        let adapter = Arc::new(AudioAdapter::new(engine.clone()));
        let options = CoordinatorOptions {
            auto_advance_delay: Duration::ZERO,
        };
        let (coordinator, events) =
            PlaybackCoordinator::start(adapter, Arc::new(store.clone()), options).await;
        Fixture {
            coordinator,
            events,
            engine,
            store,
        }
    }

    pub fn song(id: &str) -> Song {
        Song::new(id, format!("Song {}", id.to_uppercase()), format!("/music/{}.mp3", id))
    }

    pub fn songs(ids: &[&str]) -> Vec<Song> {
        ids.iter().map(|id| song(id)).collect()
    }

    /// `current_index` is valid, `None` iff the playlist is empty, and
    /// `current_song` is the song at that index.
    pub fn assert_index_invariant(state: &PlayerState) {
        match state.current_index {
            None => {
                assert!(state.playlist.is_empty());
                assert!(state.current_song.is_none());
            }
            Some(index) => {
                assert!(index < state.playlist.len());
                assert_eq!(state.current_song.as_ref(), Some(&state.playlist[index]));
            }
        }
    }
}
