//! Streaming engine abstraction and the HTTP-backed implementations.
//!
//! The session manager only ever talks to [`StreamingEngine`] through an
//! [`EngineFactory`], so tests inject scripted engines and the binary wires
//! in [`HttpEngineFactory`] with real manifest probing.

use futures::StreamExt;
use futures::future::BoxFuture;
use reqwest::Client;

use crate::config::{NetworkConfig, PlayerConfig};
use crate::errors::{EngineError, EngineResult};
use crate::models::{BackendKind, PlaybackTarget};

mod dash;
mod generic;
mod hls;

pub use dash::DashEngine;
pub use generic::GenericEngine;
pub use hls::HlsEngine;

/// One streaming backend instance, exclusively owned by a playback session.
///
/// `begin_attach` starts loading synchronously and hands back a future that
/// resolves on the backend's readiness signal. Splitting the two lets the
/// session keep ownership of the engine while readiness is pending, so a
/// newer attach can destroy it mid-load.
pub trait StreamingEngine: Send {
    fn kind(&self) -> BackendKind;

    /// Start loading `url` into the playback target. The returned future
    /// carries the backend-specific readiness outcome.
    fn begin_attach(
        &mut self,
        target: &PlaybackTarget,
        url: &str,
    ) -> BoxFuture<'static, EngineResult<()>>;

    /// Best-effort synchronous release of engine resources. Idempotent;
    /// destroying an engine that never finished loading is a no-op.
    fn destroy(&mut self);
}

/// Creates engines for the session manager and answers the runtime-support
/// probe consulted during backend selection.
pub trait EngineFactory: Send + Sync {
    /// Whether this runtime can host the segmented-HLS engine.
    fn hls_supported(&self) -> bool;

    fn create(&self, kind: BackendKind) -> Box<dyn StreamingEngine>;
}

/// Default factory: engines that validate their media source over HTTP.
pub struct HttpEngineFactory {
    client: Client,
    config: PlayerConfig,
}

impl HttpEngineFactory {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl EngineFactory for HttpEngineFactory {
    fn hls_supported(&self) -> bool {
        true
    }

    fn create(&self, kind: BackendKind) -> Box<dyn StreamingEngine> {
        match kind {
            BackendKind::SegmentedHls => Box::new(HlsEngine::new(
                self.client.clone(),
                self.config.hls.clone(),
                self.config.network.clone(),
            )),
            BackendKind::Dash => Box::new(DashEngine::new(
                self.client.clone(),
                self.config.dash.clone(),
                self.config.network.clone(),
            )),
            BackendKind::GenericAdaptive | BackendKind::None => Box::new(GenericEngine::new(
                self.client.clone(),
                self.config.network.clone(),
            )),
        }
    }
}

/// Fetch a manifest body with a hard size cap, so a mislabelled endpoint
/// streaming endless media bytes cannot balloon memory.
pub(crate) async fn fetch_manifest_bounded(
    client: &Client,
    url: &str,
    network: &NetworkConfig,
) -> EngineResult<String> {
    let timeout_secs = network.manifest_timeout.as_secs();
    let response = client
        .get(url)
        .timeout(network.manifest_timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout {
                    seconds: timeout_secs,
                }
            } else {
                EngineError::Http(e.to_string())
            }
        })?;

    if !response.status().is_success() {
        return Err(EngineError::Http(format!(
            "non-success status: {}",
            response.status()
        )));
    }

    let mut stream = response.bytes_stream();
    let mut collected: Vec<u8> = Vec::with_capacity(8192);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| EngineError::Http(e.to_string()))?;
        if collected.len() + chunk.len() > network.max_manifest_bytes {
            collected.extend_from_slice(&chunk[..network.max_manifest_bytes - collected.len()]);
            break;
        }
        collected.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&collected).to_string())
}

/// Reject URLs the HTTP engines cannot possibly load before any network
/// round-trip happens.
pub(crate) fn validate_media_url(raw: &str) -> EngineResult<url::Url> {
    let parsed =
        url::Url::parse(raw).map_err(|e| EngineError::Unavailable(format!("invalid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(EngineError::Unavailable(format!(
            "unsupported URL scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_media_url_accepts_http_schemes() {
        assert!(validate_media_url("http://x/video.m3u8").is_ok());
        assert!(validate_media_url("https://x/video.mpd").is_ok());
    }

    #[test]
    fn validate_media_url_rejects_garbage() {
        assert!(matches!(
            validate_media_url("not a url"),
            Err(EngineError::Unavailable(_))
        ));
        assert!(matches!(
            validate_media_url("ftp://x/file.ts"),
            Err(EngineError::Unavailable(_))
        ));
    }

    #[test]
    fn factory_creates_matching_engine_kinds() {
        let factory = HttpEngineFactory::new(PlayerConfig::default());
        assert_eq!(
            factory.create(BackendKind::SegmentedHls).kind(),
            BackendKind::SegmentedHls
        );
        assert_eq!(factory.create(BackendKind::Dash).kind(), BackendKind::Dash);
        assert_eq!(
            factory.create(BackendKind::GenericAdaptive).kind(),
            BackendKind::GenericAdaptive
        );
    }
}
