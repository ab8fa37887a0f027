//! Domain models shared across the playlist and playback subsystems.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One playable entry from a parsed playlist.
///
/// Channels are immutable after parsing except for `is_favorite`, which is
/// only ever flipped through [`crate::playlist::store::ChannelStore`] so that
/// renderers holding an older snapshot stay consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// `channel-<n>`, n assigned in parse order. Unique and order-stable
    /// within one parse result; not persisted across re-parses.
    pub id: String,
    pub name: String,
    pub url: String,
    pub logo: Option<String>,
    /// Category label. Parsing substitutes the literal sentinel
    /// [`crate::playlist::parser::UNCATEGORIZED_GROUP`] when the playlist
    /// carries no `group-title`.
    pub group: String,
    pub epg_id: Option<String>,
    pub language: Option<String>,
    pub is_favorite: bool,
}

/// Contiguous run of channels sharing a group, derived from an
/// already-sorted channel list for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub name: String,
    pub channels: Vec<Channel>,
}

/// Event emitted whenever the channel collection is wholesale replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelListUpdate {
    pub channel_count: usize,
    pub group_count: usize,
    pub replaced_at: DateTime<Utc>,
}

/// Which streaming backend owns (or would own) the playback element.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    SegmentedHls,
    Dash,
    GenericAdaptive,
    None,
}

/// Phase of the per-target playback state machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackPhase {
    Idle,
    Releasing,
    Selecting,
    Attaching,
    Attached,
    Failed,
}

/// Snapshot of a playback target's state, published on every transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub phase: PlaybackPhase,
    pub backend: BackendKind,
    pub media_url: Option<String>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlaybackStatus {
    pub fn idle() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            backend: BackendKind::None,
            media_url: None,
            error: None,
            updated_at: Utc::now(),
        }
    }
}

/// Handle for the shared playback element.
///
/// The session manager keys its session records on this handle instead of
/// hanging engine state off the element itself, so all mutable playback
/// state lives in one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackTarget {
    pub id: Uuid,
}

impl PlaybackTarget {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for PlaybackTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaybackTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_display_is_kebab_case() {
        assert_eq!(BackendKind::SegmentedHls.to_string(), "segmented-hls");
        assert_eq!(BackendKind::Dash.to_string(), "dash");
        assert_eq!(BackendKind::GenericAdaptive.to_string(), "generic-adaptive");
        assert_eq!(BackendKind::None.to_string(), "none");
    }

    #[test]
    fn backend_kind_serde_round_trip() {
        let json = serde_json::to_string(&BackendKind::SegmentedHls).unwrap();
        assert_eq!(json, "\"segmented-hls\"");
        let parsed: BackendKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BackendKind::SegmentedHls);
    }
}
