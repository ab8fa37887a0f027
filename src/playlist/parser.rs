//! Extended-M3U playlist parsing.
//!
//! The parser is pure and synchronous: one pass over the input text, no
//! network access, no shared state. Malformed or incomplete entries are
//! skipped, never surfaced as errors, so a playlist full of garbage simply
//! yields fewer channels.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{Channel, ChannelGroup};

/// Sentinel group assigned to channels without a `group-title` attribute.
/// It sorts by its literal string like any other group.
pub const UNCATEGORIZED_GROUP: &str = "Uncategorized";

/// Metadata collected from an `#EXTINF:` line, waiting for its URL line.
struct PendingChannel {
    name: String,
    logo: Option<String>,
    group: Option<String>,
    epg_id: Option<String>,
    language: Option<String>,
}

impl PendingChannel {
    fn into_channel(self, id: String, url: String) -> Channel {
        Channel {
            id,
            name: self.name,
            url,
            logo: self.logo,
            group: self.group.unwrap_or_else(|| UNCATEGORIZED_GROUP.to_string()),
            epg_id: self.epg_id,
            language: self.language,
            is_favorite: false,
        }
    }
}

/// Parse extended-M3U text into channels, sorted by (group, name).
///
/// An `#EXTINF:` line opens a pending record; the first following non-empty
/// line that is not a comment becomes its URL and finalizes it. A second
/// `#EXTINF:` before any URL replaces the pending record, and a pending
/// record left over at end of input is dropped. Channel ids are assigned in
/// finalization order, before the final sort.
pub fn parse_channels(content: &str) -> Vec<Channel> {
    let mut channels: Vec<Channel> = Vec::new();
    let mut pending: Option<PendingChannel> = None;

    for raw in content.lines() {
        let line = raw.trim();

        if line.starts_with("#EXTINF:") {
            // A new metadata line supersedes any record still waiting for
            // its URL; the incomplete one is silently dropped.
            pending = parse_extinf_line(line);
        } else if line.is_empty() || line.starts_with('#') {
            // Comments and blank lines never break a pending record.
            continue;
        } else if let Some(meta) = pending.take() {
            let id = format!("channel-{}", channels.len() + 1);
            channels.push(meta.into_channel(id, line.to_string()));
        }
    }

    debug!(channels = channels.len(), "playlist parse complete");

    channels.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    channels
}

/// Partition an already-sorted channel list into display groups.
///
/// Because the input is sorted by group first, one linear pass is enough
/// and every group's members come out contiguous.
pub fn group_channels(channels: &[Channel]) -> Vec<ChannelGroup> {
    let mut groups: Vec<ChannelGroup> = Vec::new();
    for channel in channels {
        match groups.last_mut() {
            Some(group) if group.name == channel.group => {
                group.channels.push(channel.clone());
            }
            _ => groups.push(ChannelGroup {
                name: channel.group.clone(),
                channels: vec![channel.clone()],
            }),
        }
    }
    groups
}

fn parse_extinf_line(line: &str) -> Option<PendingChannel> {
    // Display name is everything after the LAST comma; attribute values may
    // themselves contain commas.
    let comma = line.rfind(',')?;
    let name = line[comma + 1..].trim();
    if name.is_empty() {
        return None;
    }

    let attributes_part = &line["#EXTINF:".len()..comma];
    let mut logo = None;
    let mut group = None;
    let mut epg_id = None;
    let mut language = None;

    // Each attribute is optional and independent; an unknown key is ignored.
    for (key, value) in parse_attributes(attributes_part) {
        match key.as_str() {
            "tvg-logo" => logo = Some(value),
            "group-title" => group = Some(value),
            "tvg-id" => epg_id = Some(value),
            "tvg-language" => language = Some(value),
            _ => {}
        }
    }

    Some(PendingChannel {
        name: name.to_string(),
        logo,
        group,
        epg_id,
        language,
    })
}

/// Scan `key="value"` pairs out of the attribute section of an EXTINF line.
/// Unquoted tokens (like the leading duration) are not attributes and are
/// left alone.
fn parse_attributes(attributes: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = attributes;

    while let Some(eq) = rest.find("=\"") {
        let key = rest[..eq]
            .rsplit([' ', '\t'])
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        let after = &rest[eq + 2..];
        let Some(close) = after.find('"') else {
            break;
        };
        if !key.is_empty() {
            attrs.push((key, after[..close].to_string()));
        }
        rest = &after[close + 1..];
    }

    attrs
}

/// Locale-aware-ish name ordering: Unicode lowercase fold first, byte order
/// as the tiebreak so the sort stays total and deterministic.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
