//! Audio module - engine abstraction and the adapter the coordinator drives
//!
//! - `engine`: the `AudioEngine` trait (load-by-URI, status ticks, unload)
//! - `adapter`: the single audio session the coordinator talks to
//! - `rodio_engine`: desktop engine on a dedicated audio thread

mod engine;
mod adapter;
mod rodio_engine;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{AudioEngine, InterruptionMode, SessionOptions, StatusSink};
pub use adapter::{AudioAdapter, StatusCallback};
pub use rodio_engine::RodioEngine;
