//! `rodio`-backed engine running on a dedicated audio thread
//!
//! The output stream is not shareable across threads, so the thread owns it
//! and everything else talks to it through a command channel. Each command
//! carries a oneshot reply that the async side awaits.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use futures::future::BoxFuture;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::oneshot;

use crate::error::EngineError;
use crate::model::PlaybackStatus;
use super::engine::{AudioEngine, SessionOptions, StatusSink};

const AUDIO_THREAD_NAME: &str = "melody-audio";

type Reply = oneshot::Sender<Result<(), EngineError>>;

enum EngineCommand {
    Configure { options: SessionOptions, reply: Reply },
    Load { uri: String, autoplay: bool, sink: StatusSink, reply: Reply },
    Play { reply: Reply },
    Pause { reply: Reply },
    Seek { position_ms: u64, reply: Reply },
    Unload { reply: Reply },
}

pub struct RodioEngine {
    commands: mpsc::Sender<EngineCommand>,
}

impl RodioEngine {
    /// Spawns the audio thread. Ticks are emitted every `tick_interval` while
    /// a resource is loaded.
    pub fn spawn(tick_interval: Duration) -> std::io::Result<Self> {
        let (commands, receiver) = mpsc::channel();
        thread::Builder::new()
            .name(AUDIO_THREAD_NAME.to_string())
            .spawn(move || AudioThread::new(tick_interval).run(receiver))?;
        Ok(Self { commands })
    }

    fn request(&self, build: impl FnOnce(Reply) -> EngineCommand) -> BoxFuture<'_, Result<(), EngineError>> {
        let (reply, response) = oneshot::channel();
        let sent = self.commands.send(build(reply));
        Box::pin(async move {
            if sent.is_err() {
                return Err(EngineError::Disconnected);
            }
            response.await.unwrap_or(Err(EngineError::Disconnected))
        })
    }
}

impl AudioEngine for RodioEngine {
    fn configure_session(&self, options: SessionOptions) -> BoxFuture<'_, Result<(), EngineError>> {
        self.request(|reply| EngineCommand::Configure { options, reply })
    }

    fn load<'a>(
        &'a self,
        uri: &'a str,
        autoplay: bool,
        sink: StatusSink,
    ) -> BoxFuture<'a, Result<(), EngineError>> {
        let uri = uri.to_string();
        self.request(move |reply| EngineCommand::Load { uri, autoplay, sink, reply })
    }

    fn play(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        self.request(|reply| EngineCommand::Play { reply })
    }

    fn pause(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        self.request(|reply| EngineCommand::Pause { reply })
    }

    fn seek(&self, position_ms: u64) -> BoxFuture<'_, Result<(), EngineError>> {
        self.request(move |reply| EngineCommand::Seek { position_ms, reply })
    }

    fn unload(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        self.request(|reply| EngineCommand::Unload { reply })
    }
}

/// Maps a catalog URI to a local path. Only local files are playable.
fn resolve_uri(uri: &str) -> Result<PathBuf, EngineError> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Err(EngineError::load(uri, "remote sources are not supported by this engine"));
    }
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    if path.is_empty() {
        return Err(EngineError::load(uri, "empty source URI"));
    }
    Ok(PathBuf::from(path))
}

struct LoadedTrack {
    sink: Sink,
    status_sink: StatusSink,
    duration_ms: u64,
    finish_reported: bool,
}

struct AudioThread {
    tick_interval: Duration,
    stream: Option<OutputStream>,
    track: Option<LoadedTrack>,
}

impl AudioThread {
    fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            stream: None,
            track: None,
        }
    }

    fn run(mut self, receiver: mpsc::Receiver<EngineCommand>) {
        tracing::info!("Audio thread started");
        loop {
            match receiver.recv_timeout(self.tick_interval) {
                Ok(command) => self.handle(command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.tick();
        }
        if let Some(track) = self.track.take() {
            track.sink.stop();
        }
        tracing::info!("Audio thread shutting down");
    }

    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Configure { options, reply } => {
                let result = self.open_stream().map(|_| ());
                if result.is_ok() {
                    // Desktop outputs have no session categories; the options
                    // are recorded for diagnostics only.
                    tracing::debug!(?options, "Output stream ready");
                }
                let _ = reply.send(result);
            }
            EngineCommand::Load { uri, autoplay, sink, reply } => {
                let _ = reply.send(self.load(&uri, autoplay, sink));
            }
            EngineCommand::Play { reply } => {
                let _ = reply.send(self.with_track("play", |track| {
                    track.sink.play();
                    Ok(())
                }));
            }
            EngineCommand::Pause { reply } => {
                let _ = reply.send(self.with_track("pause", |track| {
                    track.sink.pause();
                    Ok(())
                }));
            }
            EngineCommand::Seek { position_ms, reply } => {
                let _ = reply.send(self.with_track("seek", |track| {
                    track
                        .sink
                        .try_seek(Duration::from_millis(position_ms))
                        .map_err(|e| EngineError::command("seek", e))?;
                    track.finish_reported = false;
                    Ok(())
                }));
            }
            EngineCommand::Unload { reply } => {
                if let Some(track) = self.track.take() {
                    track.sink.stop();
                }
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn open_stream(&mut self) -> Result<&OutputStream, EngineError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| EngineError::Session(e.to_string()))?;
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| EngineError::Session("output stream missing".to_string()))
    }

    fn load(&mut self, uri: &str, autoplay: bool, status_sink: StatusSink) -> Result<(), EngineError> {
        if let Some(previous) = self.track.take() {
            previous.sink.stop();
        }

        let path = resolve_uri(uri)?;
        let file = File::open(&path).map_err(|e| EngineError::load(uri, e))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::load(uri, e))?;
        let duration_ms = decoder
            .total_duration()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let stream = self.open_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        if !autoplay {
            sink.pause();
        }
        sink.append(decoder);

        tracing::debug!(uri, duration_ms, "Resource loaded");
        self.track = Some(LoadedTrack {
            sink,
            status_sink,
            duration_ms,
            finish_reported: false,
        });
        Ok(())
    }

    fn with_track(
        &mut self,
        command: &'static str,
        action: impl FnOnce(&mut LoadedTrack) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        match self.track.as_mut() {
            Some(track) => action(track),
            None => Err(EngineError::command(command, "no resource loaded")),
        }
    }

    fn tick(&mut self) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        if track.finish_reported {
            return;
        }

        let status = if track.sink.empty() {
            track.finish_reported = true;
            PlaybackStatus {
                is_loaded: true,
                is_playing: false,
                position_ms: track.duration_ms,
                duration_ms: track.duration_ms,
                did_just_finish: true,
            }
        } else {
            PlaybackStatus {
                is_loaded: true,
                is_playing: !track.sink.is_paused(),
                position_ms: track.sink.get_pos().as_millis() as u64,
                duration_ms: track.duration_ms,
                did_just_finish: false,
            }
        };
        (track.status_sink)(status);
    }
}
