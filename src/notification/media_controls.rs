//! OS media controls surface (MPRIS/SMTC/Now Playing) via `souvlaki`.
//!
//! `MediaControls` is created on and owned by its own thread; the surface
//! handle only holds a command channel into it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use souvlaki::{MediaControlEvent, MediaControls, MediaMetadata, MediaPlayback, PlatformConfig};

use crate::error::NotificationError;
use super::{
    ControlAction, NotificationContent, NotificationId, NotificationSurface, PermissionStatus,
    ResponseListener,
};

const MEDIA_CONTROLS_THREAD_NAME: &str = "melody-media-controls";

type ListenerSlot = Arc<RwLock<Option<ResponseListener>>>;

enum SurfaceCommand {
    Show(NotificationContent),
    Clear,
}

pub struct MediaControlsSurface {
    commands: mpsc::Sender<SurfaceCommand>,
    listener: ListenerSlot,
    next_id: AtomicU64,
}

impl MediaControlsSurface {
    /// Starts the platform backend. Fails when the platform has no media
    /// control service (no D-Bus session, unsupported OS).
    pub fn new(display_name: &str, dbus_name: &str) -> Result<Self, NotificationError> {
        let listener: ListenerSlot = Arc::new(RwLock::new(None));
        let (commands, receiver) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let display_name = display_name.to_string();
        let dbus_name = dbus_name.to_string();
        let thread_listener = Arc::clone(&listener);
        thread::Builder::new()
            .name(MEDIA_CONTROLS_THREAD_NAME.to_string())
            .spawn(move || {
                let controls = match create_controls(&display_name, &dbus_name, thread_listener) {
                    Ok(controls) => {
                        let _ = ready_tx.send(Ok(()));
                        controls
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                run(controls, receiver);
            })
            .map_err(|e| NotificationError::Platform(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!("Media controls surface started");
                Ok(Self {
                    commands,
                    listener,
                    next_id: AtomicU64::new(1),
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(NotificationError::Platform(
                "media controls thread exited during startup".to_string(),
            )),
        }
    }

    fn send(&self, command: SurfaceCommand) -> Result<(), NotificationError> {
        self.commands
            .send(command)
            .map_err(|_| NotificationError::Unavailable("media controls thread stopped".to_string()))
    }
}

impl NotificationSurface for MediaControlsSurface {
    fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
        Ok(PermissionStatus::Granted)
    }

    fn set_response_listener(&self, listener: ResponseListener) -> Result<(), NotificationError> {
        let mut slot = match self.listener.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(listener);
        Ok(())
    }

    fn present(&self, content: &NotificationContent) -> Result<NotificationId, NotificationError> {
        self.send(SurfaceCommand::Show(content.clone()))?;
        Ok(NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn dismiss(&self, _id: NotificationId) -> Result<(), NotificationError> {
        self.send(SurfaceCommand::Clear)
    }

    fn supports_sticky(&self) -> bool {
        true
    }
}

#[cfg(not(target_os = "windows"))]
fn create_controls(
    display_name: &str,
    dbus_name: &str,
    listener: ListenerSlot,
) -> Result<MediaControls, NotificationError> {
    let mut controls = MediaControls::new(PlatformConfig {
        display_name,
        dbus_name,
        hwnd: None,
    })
    .map_err(|e| NotificationError::Unavailable(format!("{:?}", e)))?;

    controls
        .attach(move |event| {
            let Some(action) = map_control_event(event) else {
                return;
            };
            let listener = match listener.read() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };
            if let Some(listener) = listener {
                listener(action);
            }
        })
        .map_err(|e| NotificationError::Platform(format!("{:?}", e)))?;

    Ok(controls)
}

#[cfg(target_os = "windows")]
fn create_controls(
    _display_name: &str,
    _dbus_name: &str,
    _listener: ListenerSlot,
) -> Result<MediaControls, NotificationError> {
    // souvlaki needs an HWND on Windows and a terminal app has none to give
    Err(NotificationError::Unavailable(
        "media controls need a window handle on Windows".to_string(),
    ))
}

fn run(mut controls: MediaControls, commands: mpsc::Receiver<SurfaceCommand>) {
    while let Ok(command) = commands.recv() {
        let result = match command {
            SurfaceCommand::Show(content) => show(&mut controls, &content),
            SurfaceCommand::Clear => clear(&mut controls),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Media controls update failed");
        }
    }
    tracing::debug!("Media controls thread exiting");
}

fn show(controls: &mut MediaControls, content: &NotificationContent) -> Result<(), NotificationError> {
    controls
        .set_metadata(MediaMetadata {
            title: Some(content.song_title.as_str()),
            artist: Some(content.artist.as_str()),
            album: content.album.as_deref(),
            cover_url: content.cover_url.as_deref(),
            duration: content.duration_ms.map(Duration::from_millis),
        })
        .map_err(|e| NotificationError::Platform(format!("{:?}", e)))?;

    let playback = if content.is_playing {
        MediaPlayback::Playing { progress: None }
    } else {
        MediaPlayback::Paused { progress: None }
    };
    controls
        .set_playback(playback)
        .map_err(|e| NotificationError::Platform(format!("{:?}", e)))
}

fn clear(controls: &mut MediaControls) -> Result<(), NotificationError> {
    controls
        .set_playback(MediaPlayback::Stopped)
        .map_err(|e| NotificationError::Platform(format!("{:?}", e)))?;
    controls
        .set_metadata(MediaMetadata::default())
        .map_err(|e| NotificationError::Platform(format!("{:?}", e)))
}

/// Relative seeks and volume/URI requests have no coordinator counterpart.
fn map_control_event(event: MediaControlEvent) -> Option<ControlAction> {
    match event {
        MediaControlEvent::Play => Some(ControlAction::Play),
        MediaControlEvent::Pause | MediaControlEvent::Stop => Some(ControlAction::Pause),
        MediaControlEvent::Toggle => Some(ControlAction::Toggle),
        MediaControlEvent::Next => Some(ControlAction::Next),
        MediaControlEvent::Previous => Some(ControlAction::Previous),
        MediaControlEvent::SetPosition(position) => {
            Some(ControlAction::SeekTo(position.0.as_millis() as u64))
        }
        MediaControlEvent::Raise => Some(ControlAction::OpenPlayer),
        MediaControlEvent::Seek(_)
        | MediaControlEvent::SeekBy(_, _)
        | MediaControlEvent::SetVolume(_)
        | MediaControlEvent::OpenUri(_)
        | MediaControlEvent::Quit => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souvlaki::{MediaPosition, SeekDirection};

    #[test]
    fn test_transport_events_map_to_actions() {
        assert_eq!(map_control_event(MediaControlEvent::Play), Some(ControlAction::Play));
        assert_eq!(map_control_event(MediaControlEvent::Stop), Some(ControlAction::Pause));
        assert_eq!(map_control_event(MediaControlEvent::Toggle), Some(ControlAction::Toggle));
        assert_eq!(map_control_event(MediaControlEvent::Previous), Some(ControlAction::Previous));
        assert_eq!(map_control_event(MediaControlEvent::Raise), Some(ControlAction::OpenPlayer));
    }

    #[test]
    fn test_set_position_maps_to_absolute_seek() {
        let event = MediaControlEvent::SetPosition(MediaPosition(Duration::from_millis(42_500)));
        assert_eq!(map_control_event(event), Some(ControlAction::SeekTo(42_500)));
    }

    #[test]
    fn test_unsupported_events_are_dropped() {
        assert_eq!(map_control_event(MediaControlEvent::Seek(SeekDirection::Forward)), None);
        assert_eq!(map_control_event(MediaControlEvent::SetVolume(0.5)), None);
        assert_eq!(map_control_event(MediaControlEvent::Quit), None);
    }
}
