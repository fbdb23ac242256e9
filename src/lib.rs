//! Playback core of a music player: audio engine adapter, playback
//! coordinator, notification bridge and persisted song lists, plus the
//! terminal front end used by the `melody-rs` binary.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod notification;
pub mod store;
pub mod view;
