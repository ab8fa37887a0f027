use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::errors::{PlayerError, PlayerResult};

pub mod duration_serde;

use duration_serde::duration;

/// Segmented-HLS engine tuning, applied whenever that backend is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    /// Offload manifest/segment parsing to a worker
    pub enable_worker: bool,
    pub low_latency: bool,
    /// Back-buffer retained behind the playhead
    #[serde(with = "duration")]
    pub back_buffer: Duration,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency: true,
            back_buffer: Duration::from_secs(90),
        }
    }
}

/// MPEG-DASH engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub low_latency: bool,
    /// Keep the engine's default adaptive-bitrate rule selection
    pub use_default_abr_rules: bool,
    /// Starting bitrate in kbps; unset lets the engine pick
    pub initial_bitrate_kbps: Option<u32>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            low_latency: true,
            use_default_abr_rules: true,
            initial_bitrate_kbps: None,
        }
    }
}

/// Network limits shared by all engines when probing manifests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(with = "duration")]
    pub manifest_timeout: Duration,
    /// Defensive upper bound on how much of a manifest body is read
    pub max_manifest_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            manifest_timeout: Duration::from_secs(6),
            max_manifest_bytes: 256 * 1024,
        }
    }
}

/// Top-level player configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub hls: HlsConfig,
    pub dash: DashConfig,
    pub network: NetworkConfig,
}

impl PlayerConfig {
    /// Load configuration from the `M3U_PLAYER_CONFIG` env var, falling back
    /// to defaults when it is unset or the file does not exist.
    pub fn load() -> PlayerResult<Self> {
        match std::env::var("M3U_PLAYER_CONFIG") {
            Ok(path) => Self::load_from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file. A missing file is not an error;
    /// defaults are returned so the player works out of the box.
    pub fn load_from_file(config_file: &Path) -> PlayerResult<Self> {
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents).map_err(|e| {
                PlayerError::configuration(format!(
                    "failed to parse {}: {e}",
                    config_file.display()
                ))
            })
        } else {
            info!(
                config_file = %config_file.display(),
                "config file not found, using defaults"
            );
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PlayerConfig::default();
        assert!(config.hls.enable_worker);
        assert!(config.hls.low_latency);
        assert_eq!(config.hls.back_buffer, Duration::from_secs(90));
        assert!(config.dash.low_latency);
        assert!(config.dash.use_default_abr_rules);
        assert_eq!(config.dash.initial_bitrate_kbps, None);
        assert_eq!(config.network.manifest_timeout, Duration::from_secs(6));
        assert_eq!(config.network.max_manifest_bytes, 256 * 1024);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: PlayerConfig = toml::from_str(
            r#"
            [hls]
            back_buffer = "30s"

            [network]
            manifest_timeout = "2s"
            "#,
        )
        .unwrap();
        assert_eq!(config.hls.back_buffer, Duration::from_secs(30));
        assert!(config.hls.enable_worker, "unset field keeps its default");
        assert_eq!(config.network.manifest_timeout, Duration::from_secs(2));
        assert_eq!(config.network.max_manifest_bytes, 256 * 1024);
    }

    #[test]
    fn duration_accepts_bare_seconds() {
        let config: PlayerConfig = toml::from_str(
            r#"
            [hls]
            back_buffer = 45
            "#,
        )
        .unwrap();
        assert_eq!(config.hls.back_buffer, Duration::from_secs(45));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config =
            PlayerConfig::load_from_file(Path::new("/nonexistent/m3u-player.toml")).unwrap();
        assert_eq!(config.network.max_manifest_bytes, 256 * 1024);
    }

    #[test]
    fn config_serializes_durations_human_readable() {
        let rendered = toml::to_string_pretty(&PlayerConfig::default()).unwrap();
        assert!(rendered.contains("back_buffer = \"1m 30s\""));
    }
}
