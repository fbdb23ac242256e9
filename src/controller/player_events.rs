//! Engine status reconciliation and the coordinator's event loop

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;

use crate::audio::StatusCallback;
use crate::model::{PlaybackStatus, SongId};

use super::{PlaybackCoordinator, Shared};

/// Work posted to the coordinator instead of being run inline
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// The given song finished and another one is queued.
    AdvanceQueue(SongId),
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    Seek(u64),
    Shutdown,
}

/// Receiving end of the coordinator's event channel
pub struct EventQueue {
    receiver: mpsc::UnboundedReceiver<CoordinatorEvent>,
}

impl EventQueue {
    pub(super) fn new(receiver: mpsc::UnboundedReceiver<CoordinatorEvent>) -> Self {
        Self { receiver }
    }

    pub async fn recv(&mut self) -> Option<CoordinatorEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<CoordinatorEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Shared {
    /// Mirrors an engine tick into the ledger. A completion with more than one
    /// song queued posts an advance; it never starts the next song from here.
    fn on_status(&self, status: PlaybackStatus) {
        if !status.is_loaded {
            return;
        }

        let advance = self.update(|ledger| {
            ledger.confirm(&status);
            if status.is_completion() && ledger.queue().len() > 1 {
                ledger.queue().current().map(|song| song.id.clone())
            } else {
                None
            }
        });

        if status.is_completion() {
            tracing::debug!(advance = advance.is_some(), "Song completed");
        } else {
            tracing::trace!(
                is_playing = status.is_playing,
                position_ms = status.position_ms,
                duration_ms = status.duration_ms,
                "Engine status"
            );
        }

        if let Some(finished) = advance {
            self.post(CoordinatorEvent::AdvanceQueue(finished));
        }
    }
}

impl PlaybackCoordinator {
    /// Callback handed to the adapter for each load. Holds the coordinator
    /// weakly so the adapter does not keep it alive.
    pub(super) fn status_callback(&self) -> StatusCallback {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Arc::new(move |status| {
            if let Some(shared) = shared.upgrade() {
                shared.on_status(status);
            }
        })
    }

    /// Drains posted events until [`CoordinatorEvent::Shutdown`].
    pub async fn run(self, mut events: EventQueue) {
        tracing::info!("Starting coordinator event loop");
        while let Some(event) = events.recv().await {
            if event == CoordinatorEvent::Shutdown {
                break;
            }
            self.handle_event(event).await;
        }
        tracing::debug!("Coordinator event loop shutting down");
    }

    pub async fn handle_event(&self, event: CoordinatorEvent) {
        tracing::debug!(?event, "Handling coordinator event");
        match event {
            CoordinatorEvent::AdvanceQueue(finished) => {
                let delay = self.shared.options.auto_advance_delay;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let current = self.state().current_song.map(|song| song.id);
                if current.as_ref() != Some(&finished) {
                    tracing::debug!(%finished, "Another song started meanwhile, skipping advance");
                    return;
                }
                self.play_next().await;
            }
            CoordinatorEvent::Play => {
                if !self.state().is_playing {
                    self.toggle_play_pause().await;
                }
            }
            CoordinatorEvent::Pause => {
                if self.state().is_playing {
                    self.toggle_play_pause().await;
                }
            }
            CoordinatorEvent::TogglePlayPause => self.toggle_play_pause().await,
            CoordinatorEvent::Next => self.play_next().await,
            CoordinatorEvent::Previous => self.play_previous().await,
            CoordinatorEvent::Seek(position_ms) => self.set_position(position_ms).await,
            CoordinatorEvent::Shutdown => {}
        }
    }
}
