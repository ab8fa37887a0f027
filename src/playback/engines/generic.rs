//! Generic-adaptive fallback engine.
//!
//! Catch-all for URLs that are neither HLS nor DASH, including plain
//! progressive video. The engine's asynchronous load is awaited directly;
//! its completion or rejection is the attach outcome.

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::{BackendKind, PlaybackTarget};

use super::{StreamingEngine, validate_media_url};

pub struct GenericEngine {
    client: Client,
    network: NetworkConfig,
    attached_url: Option<String>,
}

impl GenericEngine {
    pub fn new(client: Client, network: NetworkConfig) -> Self {
        Self {
            client,
            network,
            attached_url: None,
        }
    }
}

impl StreamingEngine for GenericEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::GenericAdaptive
    }

    fn begin_attach(
        &mut self,
        target: &PlaybackTarget,
        url: &str,
    ) -> BoxFuture<'static, EngineResult<()>> {
        debug!(target = %target, url, "loading media through generic engine");
        self.attached_url = Some(url.to_string());

        let client = self.client.clone();
        let timeout = self.network.manifest_timeout;
        let url = url.to_string();

        Box::pin(async move {
            validate_media_url(&url)?;
            let response = client.get(&url).timeout(timeout).send().await.map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout {
                        seconds: timeout.as_secs(),
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
            debug!(url = %url, "generic engine load complete");
            Ok(())
        })
    }

    fn destroy(&mut self) {
        if let Some(url) = self.attached_url.take() {
            debug!(url = %url, "generic engine destroyed");
        }
    }
}
