//! Shared channel collection with wholesale replacement semantics.
//!
//! The store owns the result of the most recent parse. Every successful
//! parse replaces the whole collection (never a merge) and notifies
//! subscribers. Favorite toggles are copy-on-write so any renderer holding
//! an older snapshot keeps a consistent view.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;

use crate::models::{Channel, ChannelListUpdate};

use super::parser::parse_channels;

pub type UpdateReceiver = broadcast::Receiver<ChannelListUpdate>;

pub struct ChannelStore {
    channels: RwLock<Arc<Vec<Channel>>>,
    update_tx: broadcast::Sender<ChannelListUpdate>,
}

impl ChannelStore {
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(64);
        Self {
            channels: RwLock::new(Arc::new(Vec::new())),
            update_tx,
        }
    }

    /// Subscribe to collection replacement events.
    pub fn subscribe(&self) -> UpdateReceiver {
        self.update_tx.subscribe()
    }

    /// Parse playlist text and replace the collection with the result.
    pub fn load_playlist(&self, content: &str) -> Arc<Vec<Channel>> {
        self.replace(parse_channels(content))
    }

    /// Wholesale replacement of the channel collection.
    pub fn replace(&self, channels: Vec<Channel>) -> Arc<Vec<Channel>> {
        let next = Arc::new(channels);

        let mut group_count = 0;
        let mut last_group: Option<&str> = None;
        for channel in next.iter() {
            if last_group != Some(channel.group.as_str()) {
                group_count += 1;
                last_group = Some(channel.group.as_str());
            }
        }

        *self.write_guard() = next.clone();

        info!(
            channels = next.len(),
            groups = group_count,
            "channel collection replaced"
        );
        let _ = self.update_tx.send(ChannelListUpdate {
            channel_count: next.len(),
            group_count,
            replaced_at: Utc::now(),
        });
        next
    }

    /// Cheap snapshot of the current collection.
    pub fn snapshot(&self) -> Arc<Vec<Channel>> {
        self.read_guard().clone()
    }

    /// Toggle a channel's favorite flag. Copy-on-write: a fresh vector is
    /// swapped in whole. Returns false when the id is unknown.
    pub fn set_favorite(&self, id: &str, favorite: bool) -> bool {
        let mut guard = self.write_guard();
        if !guard.iter().any(|c| c.id == id) {
            return false;
        }
        let next: Vec<Channel> = guard
            .iter()
            .cloned()
            .map(|mut channel| {
                if channel.id == id {
                    channel.is_favorite = favorite;
                }
                channel
            })
            .collect();
        *guard = Arc::new(next);
        true
    }

    // Lock poisoning only happens if a writer panicked; the data is still
    // coherent for this store's swap-only writes, so recover the guard.
    fn read_guard(&self) -> RwLockReadGuard<'_, Arc<Vec<Channel>>> {
        match self.channels.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Arc<Vec<Channel>>> {
        match self.channels.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST: &str = concat!(
        "#EXTINF:-1 group-title=\"News\",Channel A\nhttp://x/a\n",
        "#EXTINF:-1 group-title=\"Sports\",Channel B\nhttp://x/b\n",
    );

    #[test]
    fn load_replaces_collection_and_notifies() {
        let store = ChannelStore::new();
        let mut updates = store.subscribe();

        let first = store.load_playlist(PLAYLIST);
        assert_eq!(first.len(), 2);
        let update = updates.try_recv().unwrap();
        assert_eq!(update.channel_count, 2);
        assert_eq!(update.group_count, 2);

        let second = store.load_playlist("#EXTINF:-1,Solo\nhttp://x/solo\n");
        assert_eq!(second.len(), 1);
        assert_eq!(store.snapshot().len(), 1, "replacement, not merge");
    }

    #[test]
    fn set_favorite_is_copy_on_write() {
        let store = ChannelStore::new();
        store.load_playlist(PLAYLIST);

        let before = store.snapshot();
        assert!(store.set_favorite("channel-1", true));

        let after = store.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(
            before.iter().all(|c| !c.is_favorite),
            "old snapshot is untouched"
        );
        assert!(after.iter().any(|c| c.id == "channel-1" && c.is_favorite));
    }

    #[test]
    fn set_favorite_unknown_id_is_refused() {
        let store = ChannelStore::new();
        store.load_playlist(PLAYLIST);
        let before = store.snapshot();
        assert!(!store.set_favorite("channel-99", true));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }
}
