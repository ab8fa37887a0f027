//! Playlist ingestion: extended-M3U parsing plus the shared channel store.

pub mod parser;
pub mod store;

pub use parser::{UNCATEGORIZED_GROUP, group_channels, parse_channels};
pub use store::ChannelStore;
