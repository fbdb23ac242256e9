//! Notification / external-control bridge
//!
//! Projects the coordinator's state onto an OS notification surface and turns
//! taps on that surface into coordinator commands. Notification failures are
//! logged and swallowed; playback never depends on them.
//!
//! - `media_controls`: MPRIS/SMTC/Now Playing surface via `souvlaki`
//! - `log_surface`: plain-text fallback when no platform surface is available

mod media_controls;
mod log_surface;

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::watch;

use crate::controller::{CoordinatorEvent, PlaybackCoordinator};
use crate::error::NotificationError;
use crate::model::{PlayerState, Song, SongId};

pub use media_controls::MediaControlsSurface;
pub use log_surface::LogSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationPriority {
    Default,
    High,
}

/// What gets shown for the current song
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationContent {
    /// Display line, e.g. `"▶ Midnight City"`
    pub title: String,
    /// Display line, e.g. `"M83 • Playing"`
    pub body: String,
    pub song_id: SongId,
    pub song_title: String,
    pub artist: String,
    pub album: Option<String>,
    pub cover_url: Option<String>,
    pub duration_ms: Option<u64>,
    pub is_playing: bool,
    pub priority: NotificationPriority,
    pub sticky: bool,
}

impl NotificationContent {
    pub fn for_song(song: &Song, is_playing: bool, elevated: bool) -> Self {
        let (icon, status_text) = if is_playing {
            ("▶", "Playing")
        } else {
            ("⏸", "Paused")
        };
        let artist = song.artist_or_unknown().to_string();

        Self {
            title: format!("{} {}", icon, song.title),
            body: format!("{} • {}", artist, status_text),
            song_id: song.id.clone(),
            song_title: song.title.clone(),
            artist,
            album: song.album.clone(),
            cover_url: song.image.clone(),
            duration_ms: song.duration_hint_ms(),
            is_playing,
            priority: if elevated {
                NotificationPriority::High
            } else {
                NotificationPriority::Default
            },
            sticky: elevated,
        }
    }
}

/// A tap or media-key press on the notification surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    SeekTo(u64),
    OpenPlayer,
}

pub type ResponseListener = Arc<dyn Fn(ControlAction) + Send + Sync>;

/// OS notification display and dismissal. Fire-and-forget: a successful
/// return only means the request was handed to the platform.
pub trait NotificationSurface: Send + Sync {
    fn request_permission(&self) -> Result<PermissionStatus, NotificationError>;

    /// Registers the single listener for tap responses, replacing any previous one.
    fn set_response_listener(&self, listener: ResponseListener) -> Result<(), NotificationError>;

    fn present(&self, content: &NotificationContent) -> Result<NotificationId, NotificationError>;

    fn dismiss(&self, id: NotificationId) -> Result<(), NotificationError>;

    /// Whether the surface can keep a high-priority, non-dismissable entry.
    fn supports_sticky(&self) -> bool;
}

/// Handlers the bridge invokes for notification taps
pub trait PlaybackControls: Send + Sync {
    fn on_play(&self);
    fn on_pause(&self);
    fn on_next(&self);
    fn on_previous(&self);
    fn on_toggle(&self);
    fn on_open_player(&self);

    fn on_seek(&self, _position_ms: u64) {}
}

/// The coordinator itself is a stable control target: taps are posted to its
/// event queue and read current state when handled.
impl PlaybackControls for PlaybackCoordinator {
    fn on_play(&self) {
        self.post(CoordinatorEvent::Play);
    }

    fn on_pause(&self) {
        self.post(CoordinatorEvent::Pause);
    }

    fn on_next(&self) {
        self.post(CoordinatorEvent::Next);
    }

    fn on_previous(&self) {
        self.post(CoordinatorEvent::Previous);
    }

    fn on_open_player(&self) {
        tracing::info!("Open player requested from notification");
    }

    fn on_toggle(&self) {
        self.post(CoordinatorEvent::TogglePlayPause);
    }

    fn on_seek(&self, position_ms: u64) {
        self.post(CoordinatorEvent::Seek(position_ms));
    }
}

type SharedControls = Arc<RwLock<Option<Arc<dyn PlaybackControls>>>>;

#[derive(Default)]
struct BridgeState {
    initialized: bool,
    current_id: Option<NotificationId>,
}

pub struct NotificationBridge {
    surface: Arc<dyn NotificationSurface>,
    state: Mutex<BridgeState>,
    controls: SharedControls,
}

impl NotificationBridge {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self {
            surface,
            state: Mutex::new(BridgeState::default()),
            controls: Arc::new(RwLock::new(None)),
        }
    }

    fn state(&self) -> MutexGuard<'_, BridgeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Requests permission and registers the tap listener. Runs once; a
    /// failed attempt still counts so it is not retried on every refresh.
    pub fn initialize(&self) {
        let mut state = self.state();
        if state.initialized {
            return;
        }
        state.initialized = true;
        drop(state);

        match self.surface.request_permission() {
            Ok(PermissionStatus::Granted) => tracing::debug!("Notification permission granted"),
            Ok(status) => tracing::warn!(?status, "Notification permission not granted"),
            Err(e) => tracing::warn!(error = %e, "Notification permission request failed"),
        }

        let controls = Arc::clone(&self.controls);
        let listener: ResponseListener = Arc::new(move |action| Self::dispatch(&controls, action));
        match self.surface.set_response_listener(listener) {
            Ok(()) => tracing::info!("Notification bridge initialized"),
            Err(e) => tracing::error!(error = %e, "Failed to register notification listener"),
        }
    }

    fn dispatch(controls: &SharedControls, action: ControlAction) {
        let controls = match controls.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let Some(controls) = controls else {
            tracing::debug!(?action, "Notification action ignored, no controls bound");
            return;
        };

        tracing::debug!(?action, "Notification action");
        match action {
            ControlAction::Play => controls.on_play(),
            ControlAction::Pause => controls.on_pause(),
            ControlAction::Toggle => controls.on_toggle(),
            ControlAction::Next => controls.on_next(),
            ControlAction::Previous => controls.on_previous(),
            ControlAction::SeekTo(position_ms) => controls.on_seek(position_ms),
            ControlAction::OpenPlayer => controls.on_open_player(),
        }
    }

    pub fn set_controls(&self, controls: Arc<dyn PlaybackControls>) {
        let mut slot = match self.controls.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(controls);
    }

    /// Replaces any existing notification with one for `song`.
    pub fn show_playing_notification(&self, song: &Song, is_playing: bool) {
        self.initialize();

        let previous = self.state().current_id.take();
        if let Some(id) = previous {
            if let Err(e) = self.surface.dismiss(id) {
                tracing::warn!(error = %e, "Failed to dismiss previous notification");
            }
        }

        let content = NotificationContent::for_song(song, is_playing, self.surface.supports_sticky());
        match self.surface.present(&content) {
            Ok(id) => {
                self.state().current_id = Some(id);
                tracing::debug!(song_id = %song.id, is_playing, id = id.0, "Playback notification shown");
            }
            Err(e) => tracing::warn!(song_id = %song.id, error = %e, "Failed to show playback notification"),
        }
    }

    pub fn update_notification(&self, song: &Song, is_playing: bool) {
        self.show_playing_notification(song, is_playing);
    }

    pub fn hide_notification(&self) {
        let current = self.state().current_id.take();
        if let Some(id) = current {
            match self.surface.dismiss(id) {
                Ok(()) => tracing::debug!("Playback notification hidden"),
                Err(e) => tracing::warn!(error = %e, "Failed to hide playback notification"),
            }
        }
    }

    pub fn cleanup(&self) {
        self.hide_notification();
        let mut slot = match self.controls.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = None;
        drop(slot);
        self.state().initialized = false;
    }

    /// Refreshes the notification whenever the current song or its playing
    /// flag changes. Ends when the state sender is dropped.
    pub async fn follow(self: Arc<Self>, mut state_rx: watch::Receiver<PlayerState>) {
        let mut last_shown: Option<(SongId, bool)> = None;
        loop {
            let projection = {
                let state = state_rx.borrow_and_update();
                state.current_song.clone().map(|song| (song, state.is_playing))
            };
            let key = projection.as_ref().map(|(song, playing)| (song.id.clone(), *playing));

            if key != last_shown {
                match projection {
                    Some((song, is_playing)) => self.show_playing_notification(&song, is_playing),
                    None => self.hide_notification(),
                }
                last_shown = key;
            }

            if state_rx.changed().await.is_err() {
                break;
            }
        }
        tracing::debug!("Notification follower stopped");
    }
}
