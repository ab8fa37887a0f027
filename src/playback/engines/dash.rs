//! MPEG-DASH engine.
//!
//! Initialization is fire-and-forget: attach resolves as soon as the load
//! is issued, matching the engine's contract of having no explicit ready
//! callback. The manifest probe runs as a detached task whose outcome is
//! only logged.

use futures::future::BoxFuture;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{DashConfig, NetworkConfig};
use crate::errors::EngineResult;
use crate::models::{BackendKind, PlaybackTarget};

use super::{StreamingEngine, fetch_manifest_bounded, validate_media_url};

pub struct DashEngine {
    client: Client,
    config: DashConfig,
    network: NetworkConfig,
    probe: Option<JoinHandle<()>>,
    attached_url: Option<String>,
}

impl DashEngine {
    pub fn new(client: Client, config: DashConfig, network: NetworkConfig) -> Self {
        Self {
            client,
            config,
            network,
            probe: None,
            attached_url: None,
        }
    }
}

impl StreamingEngine for DashEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::Dash
    }

    fn begin_attach(
        &mut self,
        target: &PlaybackTarget,
        url: &str,
    ) -> BoxFuture<'static, EngineResult<()>> {
        debug!(
            target = %target,
            url,
            low_latency = self.config.low_latency,
            default_abr = self.config.use_default_abr_rules,
            initial_bitrate_kbps = self.config.initial_bitrate_kbps,
            "initializing DASH engine"
        );

        if let Err(e) = validate_media_url(url) {
            return Box::pin(async move { Err(e) });
        }

        self.attached_url = Some(url.to_string());

        let client = self.client.clone();
        let network = self.network.clone();
        let probe_url = url.to_string();
        self.probe = Some(tokio::spawn(async move {
            match fetch_manifest_bounded(&client, &probe_url, &network).await {
                Ok(manifest) if manifest.contains("<MPD") => {
                    debug!(url = %probe_url, "DASH manifest fetched");
                }
                Ok(_) => {
                    warn!(url = %probe_url, "DASH manifest does not look like an MPD document");
                }
                Err(e) => {
                    warn!(url = %probe_url, error = %e, "DASH manifest probe failed");
                }
            }
        }));

        // No ready callback to wait for; initialization has been issued.
        Box::pin(async { Ok(()) })
    }

    fn destroy(&mut self) {
        if let Some(probe) = self.probe.take() {
            probe.abort();
        }
        if let Some(url) = self.attached_url.take() {
            debug!(url = %url, "DASH engine destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::errors::EngineError;

    #[tokio::test]
    async fn attach_resolves_without_waiting_for_the_probe() {
        let config = PlayerConfig::default();
        let mut engine = DashEngine::new(Client::new(), config.dash, config.network);
        // An unroutable URL still attaches; only the background probe fails.
        let outcome = engine
            .begin_attach(&PlaybackTarget::new(), "http://127.0.0.1:1/video.mpd")
            .await;
        assert!(outcome.is_ok());
        engine.destroy();
    }

    #[tokio::test]
    async fn attach_rejects_malformed_url() {
        let config = PlayerConfig::default();
        let mut engine = DashEngine::new(Client::new(), config.dash, config.network);
        let outcome = engine.begin_attach(&PlaybackTarget::new(), "::nope::").await;
        assert!(matches!(outcome, Err(EngineError::Unavailable(_))));
    }
}
