//! Backend selection for a media URL.
//!
//! A priority-ordered, mutually exclusive decision: segmented-HLS wins when
//! the runtime supports it and the URL looks like HLS, DASH is checked
//! second, and the generic-adaptive engine is the universal fallback, so
//! selection itself can never fail.

use tracing::debug;

use crate::models::BackendKind;

const HLS_MIME_MARKER: &str = "application/x-mpegurl";
const DASH_MIME_MARKER: &str = "application/dash+xml";

/// Pick the backend that should own the playback element for `url`.
///
/// Suffix checks ignore any query string or fragment; MIME markers are
/// matched anywhere in the URL (they commonly show up in query parameters
/// handed through from upstream providers).
pub fn select_backend(url: &str, hls_supported: bool) -> BackendKind {
    let lower = url.to_lowercase();
    let base = strip_query_and_fragment(&lower);

    let backend = if hls_supported && (base.ends_with(".m3u8") || lower.contains(HLS_MIME_MARKER)) {
        BackendKind::SegmentedHls
    } else if base.ends_with(".mpd") || lower.contains(DASH_MIME_MARKER) {
        BackendKind::Dash
    } else {
        BackendKind::GenericAdaptive
    };

    debug!(url, backend = %backend, "backend selected");
    backend
}

fn strip_query_and_fragment(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(pos) => &url[..pos],
        None => url,
    }
}
