//! Playlist ingestion and adaptive playback backend selection.
//!
//! Two subsystems make up the core:
//!
//! - [`playlist`] turns extended-M3U text into an ordered, grouped channel
//!   collection and owns its replacement semantics.
//! - [`playback`] decides which streaming backend (segmented-HLS, MPEG-DASH,
//!   or a generic-adaptive fallback) should own a playback target for a
//!   given URL, and manages that engine's lifecycle so exactly one is ever
//!   attached.
//!
//! [`Player`] wraps both behind the three calls a UI needs: parse playlist
//! text, play a URL, release playback.

pub mod config;
pub mod errors;
pub mod models;
pub mod playback;
pub mod player;
pub mod playlist;

pub use config::PlayerConfig;
pub use errors::{EngineError, PlaybackError, PlayerError, PlayerResult};
pub use models::{
    BackendKind, Channel, ChannelGroup, ChannelListUpdate, PlaybackPhase, PlaybackStatus,
    PlaybackTarget,
};
pub use playback::{
    EngineFactory, HttpEngineFactory, PlaybackSessionManager, StreamingEngine, select_backend,
};
pub use player::Player;
pub use playlist::{ChannelStore, UNCATEGORIZED_GROUP, group_channels, parse_channels};
