//! Scriptable engine for tests: records commands and injects ticks synchronously

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::sync::Notify;

use crate::error::EngineError;
use crate::model::PlaybackStatus;
use super::engine::{AudioEngine, SessionOptions, StatusSink};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    ConfigureSession,
    Load(String),
    Play,
    Pause,
    Seek(u64),
    Unload,
}

#[derive(Default)]
struct Script {
    calls: Vec<EngineCall>,
    failing_uris: HashSet<String>,
    sink: Option<StatusSink>,
    duration_ms: u64,
    holding: bool,
    load_gate: Option<Arc<Notify>>,
}

#[derive(Default)]
pub struct ScriptedEngine {
    script: Mutex<Script>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_loads_of(&self, uri: &str) {
        self.script.lock().unwrap().failing_uris.insert(uri.to_string());
    }

    pub fn set_duration(&self, duration_ms: u64) {
        self.script.lock().unwrap().duration_ms = duration_ms;
    }

    /// Makes every later `load` wait until the returned gate is notified.
    pub fn hold_loads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script.lock().unwrap().load_gate = Some(Arc::clone(&gate));
        gate
    }

    /// Whether a resource is loaded and not yet unloaded.
    pub fn is_holding(&self) -> bool {
        self.script.lock().unwrap().holding
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.script.lock().unwrap().calls.iter().filter(|c| *c == call).count()
    }

    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Load(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    pub fn sink(&self) -> Option<StatusSink> {
        self.script.lock().unwrap().sink.clone()
    }

    /// Delivers a tick to the sink of the most recent load.
    pub fn emit(&self, status: PlaybackStatus) {
        if let Some(sink) = self.sink() {
            sink(status);
        }
    }

    /// Delivers the end-of-resource tick.
    pub fn finish(&self) {
        let duration_ms = self.script.lock().unwrap().duration_ms;
        self.emit(PlaybackStatus {
            is_loaded: true,
            is_playing: false,
            position_ms: duration_ms,
            duration_ms,
            did_just_finish: true,
        });
    }

    fn record(&self, call: EngineCall) {
        self.script.lock().unwrap().calls.push(call);
    }
}

impl AudioEngine for ScriptedEngine {
    fn configure_session(&self, _options: SessionOptions) -> BoxFuture<'_, Result<(), EngineError>> {
        self.record(EngineCall::ConfigureSession);
        Box::pin(async { Ok(()) })
    }

    fn load<'a>(
        &'a self,
        uri: &'a str,
        _autoplay: bool,
        sink: StatusSink,
    ) -> BoxFuture<'a, Result<(), EngineError>> {
        let gate = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(EngineCall::Load(uri.to_string()));
            script.load_gate.clone()
        };
        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let mut script = self.script.lock().unwrap();
            if script.failing_uris.contains(uri) {
                Err(EngineError::load(uri, "scripted failure"))
            } else {
                script.sink = Some(sink);
                script.holding = true;
                Ok(())
            }
        })
    }

    fn play(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        self.record(EngineCall::Play);
        Box::pin(async { Ok(()) })
    }

    fn pause(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        self.record(EngineCall::Pause);
        Box::pin(async { Ok(()) })
    }

    fn seek(&self, position_ms: u64) -> BoxFuture<'_, Result<(), EngineError>> {
        self.record(EngineCall::Seek(position_ms));
        Box::pin(async { Ok(()) })
    }

    fn unload(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        self.record(EngineCall::Unload);
        self.script.lock().unwrap().holding = false;
        Box::pin(async { Ok(()) })
    }
}
