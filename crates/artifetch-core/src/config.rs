//! Per-request download configuration and process-wide transport settings.

use crate::error::{FetchError, Result};
use crate::hash::{HashKind, Hasher};
use crate::source::{self, SourceDescriptor};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-Agent sent when the request does not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("artifetch/", env!("CARGO_PKG_VERSION"));

/// One fetch request. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadConfig {
    /// URL or path: `http`, `https`, `file`, `smb`, or a bare path.
    pub source_locator: String,
    /// Destination. Optional only for local sources used without copying.
    pub target_path: Option<PathBuf>,
    /// Copy local/share sources into `target_path` instead of using them in place.
    pub copy_on_local: bool,
    pub expected_checksum: Option<Vec<u8>>,
    /// Algorithm name understood by [`HashKind::from_name`].
    pub hash_algorithm: Option<String>,
    pub user_agent: Option<String>,
}

impl DownloadConfig {
    pub fn builder(source_locator: impl Into<String>) -> DownloadConfigBuilder {
        DownloadConfigBuilder {
            config: DownloadConfig {
                source_locator: source_locator.into(),
                ..DownloadConfig::default()
            },
        }
    }

    /// Fresh accumulator for the configured algorithm, if it is one we know.
    pub fn hasher(&self) -> Option<Hasher> {
        self.hash_algorithm
            .as_deref()
            .and_then(HashKind::from_name)
            .map(HashKind::hasher)
    }

    /// True when a checksum can actually be enforced.
    pub fn verifies(&self) -> bool {
        self.expected_checksum.is_some() && self.hasher().is_some()
    }

    pub fn user_agent_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(fallback)
    }

    /// Checks the request and resolves its source.
    pub fn validate(&self) -> Result<SourceDescriptor> {
        let descriptor = source::resolve(&self.source_locator)?;
        self.validate_for(&descriptor)?;
        Ok(descriptor)
    }

    /// Checks everything that does not depend on resolving the locator.
    pub(crate) fn validate_for(&self, descriptor: &SourceDescriptor) -> Result<()> {
        if let Some(expected) = &self.expected_checksum {
            let name = self.hash_algorithm.as_deref().ok_or_else(|| {
                FetchError::Config("checksum given without a hash algorithm".into())
            })?;
            let kind = HashKind::from_name(name).ok_or_else(|| {
                FetchError::Config(format!("unsupported hash algorithm {:?}", name))
            })?;
            if expected.is_empty() {
                return Err(FetchError::Config("empty checksum".into()));
            }
            if expected.len() != kind.output_len() {
                tracing::warn!(
                    "{} checksum is {} bytes, expected {}; it can never match",
                    kind,
                    expected.len(),
                    kind.output_len()
                );
            }
        }

        let needs_target = descriptor.is_network() || self.copy_on_local;
        match &self.target_path {
            None if needs_target => Err(FetchError::Config(format!(
                "a target path is required to {} {}",
                if descriptor.is_network() { "download" } else { "copy" },
                self.source_locator
            ))),
            Some(p) if p.as_os_str().is_empty() => {
                Err(FetchError::Config("target path is empty".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Builder for [`DownloadConfig`].
#[derive(Debug, Clone)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.target_path = Some(path.into());
        self
    }

    pub fn copy_on_local(mut self, copy: bool) -> Self {
        self.config.copy_on_local = copy;
        self
    }

    pub fn checksum(mut self, algorithm: impl Into<String>, expected: impl Into<Vec<u8>>) -> Self {
        self.config.hash_algorithm = Some(algorithm.into());
        self.config.expected_checksum = Some(expected.into());
        self
    }

    /// Like [`checksum`](Self::checksum) with the digest given as hex.
    pub fn checksum_hex(self, algorithm: impl Into<String>, expected_hex: &str) -> Result<Self> {
        let bytes = hex::decode(expected_hex.trim())
            .map_err(|e| FetchError::Config(format!("checksum is not hex: {}", e)))?;
        Ok(self.checksum(algorithm, bytes))
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    pub fn build(self) -> DownloadConfig {
        self.config
    }
}

/// Transport tuning loaded from `~/.config/artifetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// User-Agent for requests that do not set their own.
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    pub max_redirects: u32,
    /// Minimum spacing of byte-progress messages sent to the progress sink.
    pub progress_interval_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_redirects: 10,
            progress_interval_ms: 1000,
        }
    }
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("artifetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load settings from the default location, creating a default file if none exists.
pub fn load_or_init() -> anyhow::Result<TransportSettings> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> anyhow::Result<TransportSettings> {
    if !path.exists() {
        let default_cfg = TransportSettings::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TransportSettings =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
