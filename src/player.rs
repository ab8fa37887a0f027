//! Facade tying the channel store and the session manager together behind
//! the three entry points a UI collaborator needs: parse, play, release.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::PlayerConfig;
use crate::errors::PlaybackError;
use crate::models::{Channel, PlaybackStatus, PlaybackTarget};
use crate::playback::engines::{EngineFactory, HttpEngineFactory};
use crate::playback::session::PlaybackSessionManager;
use crate::playlist::store::{ChannelStore, UpdateReceiver};

/// A player core with a single playback target, the common case of one
/// video element per page.
pub struct Player {
    store: ChannelStore,
    sessions: PlaybackSessionManager,
    target: PlaybackTarget,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_factory(Arc::new(HttpEngineFactory::new(config)))
    }

    pub fn with_factory(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            store: ChannelStore::new(),
            sessions: PlaybackSessionManager::new(factory),
            target: PlaybackTarget::new(),
        }
    }

    /// Parse playlist text and replace the channel collection.
    pub fn parse_channels(&self, content: &str) -> Arc<Vec<Channel>> {
        self.store.load_playlist(content)
    }

    /// Current channel collection snapshot.
    pub fn channels(&self) -> Arc<Vec<Channel>> {
        self.store.snapshot()
    }

    /// Flip a channel's favorite flag (copy-on-write in the store).
    pub fn set_favorite(&self, channel_id: &str, favorite: bool) -> bool {
        self.store.set_favorite(channel_id, favorite)
    }

    /// Attach the right backend for `url` and wait for its readiness.
    pub async fn play_url(&self, url: &str) -> Result<PlaybackStatus, PlaybackError> {
        self.sessions.attach(&self.target, url).await
    }

    /// Play a channel selected from the parsed collection.
    pub async fn play_channel(&self, channel: &Channel) -> Result<PlaybackStatus, PlaybackError> {
        self.sessions.attach(&self.target, &channel.url).await
    }

    /// Tear down the attached backend, if any.
    pub async fn release_playback(&self) {
        self.sessions.release(&self.target).await;
    }

    /// Observe playback state transitions.
    pub async fn subscribe_playback(&self) -> watch::Receiver<PlaybackStatus> {
        self.sessions.subscribe(&self.target).await
    }

    /// Observe channel collection replacements.
    pub fn subscribe_channels(&self) -> UpdateReceiver {
        self.store.subscribe()
    }

    /// Current playback status snapshot.
    pub async fn playback_status(&self) -> PlaybackStatus {
        self.sessions.status(&self.target).await
    }
}
