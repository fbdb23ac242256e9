//! The platform audio primitive the adapter drives

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::EngineError;
use crate::model::PlaybackStatus;

/// Receives status ticks from an engine. Called from whatever thread the
/// engine emits on, so implementations must not block.
pub type StatusSink = Arc<dyn Fn(PlaybackStatus) + Send + Sync>;

/// How the playback session interacts with the rest of the system
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptionMode {
    /// Take exclusive focus; other audio is paused rather than mixed.
    DoNotMix,
    DuckOthers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    pub stays_active_in_background: bool,
    pub interruption: InterruptionMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            stays_active_in_background: true,
            interruption: InterruptionMode::DoNotMix,
        }
    }
}

/// Load-by-URI audio engine with asynchronous status ticks.
///
/// At most one resource is loaded at a time. `load` replaces whatever the
/// engine held; ticks for the new resource go to the supplied sink.
pub trait AudioEngine: Send + Sync {
    fn configure_session(&self, options: SessionOptions) -> BoxFuture<'_, Result<(), EngineError>>;

    fn load<'a>(
        &'a self,
        uri: &'a str,
        autoplay: bool,
        sink: StatusSink,
    ) -> BoxFuture<'a, Result<(), EngineError>>;

    fn play(&self) -> BoxFuture<'_, Result<(), EngineError>>;

    fn pause(&self) -> BoxFuture<'_, Result<(), EngineError>>;

    fn seek(&self, position_ms: u64) -> BoxFuture<'_, Result<(), EngineError>>;

    /// Stops playback and releases the loaded resource.
    fn unload(&self) -> BoxFuture<'_, Result<(), EngineError>>;
}
