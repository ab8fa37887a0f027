//! Centralized error handling for the player core.
//!
//! Error taxonomy:
//!
//! - **Engine errors**: a streaming backend failed to initialize or load
//! - **Playback errors**: engine failure tagged with the attempted backend
//! - **Player errors**: umbrella for the binary (playback, config, I/O)
//!
//! Malformed playlist entries are deliberately absent: the parser skips
//! them and returns fewer channels instead of failing.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using PlayerError
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Convenience type alias for engine-level Results
pub type EngineResult<T> = Result<T, EngineError>;
