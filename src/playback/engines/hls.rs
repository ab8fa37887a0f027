//! Segmented-HLS engine.
//!
//! Readiness is the manifest-parsed signal: the engine fetches the playlist
//! (bounded) and validates the `#EXTM3U` header. Any engine error during
//! attachment rejects the attach outcome instead of being swallowed.

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use crate::config::{HlsConfig, NetworkConfig};
use crate::errors::{EngineError, EngineResult};
use crate::models::{BackendKind, PlaybackTarget};

use super::{StreamingEngine, fetch_manifest_bounded, validate_media_url};

pub struct HlsEngine {
    client: Client,
    config: HlsConfig,
    network: NetworkConfig,
    attached_url: Option<String>,
}

impl HlsEngine {
    pub fn new(client: Client, config: HlsConfig, network: NetworkConfig) -> Self {
        Self {
            client,
            config,
            network,
            attached_url: None,
        }
    }
}

impl StreamingEngine for HlsEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::SegmentedHls
    }

    fn begin_attach(
        &mut self,
        target: &PlaybackTarget,
        url: &str,
    ) -> BoxFuture<'static, EngineResult<()>> {
        debug!(
            target = %target,
            url,
            enable_worker = self.config.enable_worker,
            low_latency = self.config.low_latency,
            back_buffer_secs = self.config.back_buffer.as_secs(),
            "loading HLS source"
        );
        self.attached_url = Some(url.to_string());

        let client = self.client.clone();
        let network = self.network.clone();
        let url = url.to_string();

        Box::pin(async move {
            validate_media_url(&url)?;
            let manifest = fetch_manifest_bounded(&client, &url, &network).await?;
            if !manifest.trim_start().starts_with("#EXTM3U") {
                return Err(EngineError::InvalidManifest(
                    "missing #EXTM3U header".to_string(),
                ));
            }
            debug!(url = %url, "HLS manifest parsed");
            Ok(())
        })
    }

    fn destroy(&mut self) {
        if let Some(url) = self.attached_url.take() {
            debug!(url = %url, "HLS engine destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    #[test]
    fn destroy_without_attach_is_a_noop() {
        let config = PlayerConfig::default();
        let mut engine = HlsEngine::new(Client::new(), config.hls, config.network);
        engine.destroy();
        engine.destroy();
    }

    #[tokio::test]
    async fn attach_rejects_invalid_url_before_any_request() {
        let config = PlayerConfig::default();
        let mut engine = HlsEngine::new(Client::new(), config.hls, config.network);
        let outcome = engine
            .begin_attach(&PlaybackTarget::new(), "not-a-url")
            .await;
        assert!(matches!(outcome, Err(EngineError::Unavailable(_))));
    }
}
