//! Adaptive playback: backend selection, engine implementations, and the
//! per-target session lifecycle.

pub mod classification;
pub mod engines;
pub mod session;

pub use classification::select_backend;
pub use engines::{EngineFactory, HttpEngineFactory, StreamingEngine};
pub use session::PlaybackSessionManager;
