//! The download client: checksum short-circuit, materialisation by source
//! kind, verification and cleanup.

use crate::checksum;
use crate::config::{DownloadConfig, TransportSettings};
use crate::control::CancelToken;
use crate::downloader::NetworkFetch;
use crate::error::{FetchError, Result};
use crate::local;
use crate::progress::ProgressSink;
use crate::source::{same_file, SourceDescriptor};
use crate::transport::TransferFailure;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A file ready for verification, and whether this fetch created it.
struct Candidate {
    path: PathBuf,
    /// True for fetched or copied content, which is ours to delete. False
    /// for a local source used in place.
    produced: bool,
}

/// Fetches one artifact described by a [`DownloadConfig`].
///
/// `get` runs one attempt to completion. A transport failure leaves the
/// partial target behind, and calling `get` again resumes it.
pub struct DownloadClient {
    config: DownloadConfig,
    sink: Arc<dyn ProgressSink>,
    settings: TransportSettings,
    cancel: Option<CancelToken>,
}

impl DownloadClient {
    pub fn new(config: DownloadConfig, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            config,
            sink,
            settings: TransportSettings::default(),
            cancel: None,
        }
    }

    pub fn with_settings(mut self, settings: TransportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Checks `path` against the configured checksum. Trivially true when
    /// no checksum or no usable algorithm is configured.
    pub fn verify_checksum(&self, path: &Path) -> Result<bool> {
        checksum::verify_checksum(
            path,
            self.config.hasher(),
            self.config.expected_checksum.as_deref(),
        )
    }

    /// Fetches or locates the artifact and returns the path of the verified
    /// result.
    pub fn get(&self) -> Result<PathBuf> {
        let descriptor = self.config.validate()?;
        tracing::debug!("resolved {} to {}", self.config.source_locator, descriptor);
        self.sink.say(&format!("Retrieving {}", self.config.source_locator));

        if let Some(path) = self.already_present()? {
            return Ok(path);
        }

        let candidate = self.materialize(&descriptor)?;
        self.accept(candidate)
    }

    /// Checksum short-circuit: an existing target that already matches the
    /// configured digest is the result, whatever the source.
    fn already_present(&self) -> Result<Option<PathBuf>> {
        let Some(target) = self.config.target_path.as_deref() else {
            return Ok(None);
        };
        if !self.config.verifies() || !target.is_file() {
            return Ok(None);
        }
        if self.verify_checksum(target)? {
            tracing::info!("{} already matches its checksum", target.display());
            let msg = format!("Found already downloaded, verified: {}", target.display());
            self.sink.say(&msg);
            return Ok(Some(target.to_path_buf()));
        }
        tracing::debug!("{} exists but does not match; fetching", target.display());
        Ok(None)
    }

    fn materialize(&self, descriptor: &SourceDescriptor) -> Result<Candidate> {
        match descriptor {
            SourceDescriptor::Network(url) => {
                let target = self.required_target()?;
                let size = NetworkFetch {
                    url: url.as_str(),
                    target,
                    user_agent: self.config.user_agent_or(&self.settings.user_agent),
                    settings: &self.settings,
                    sink: self.sink.as_ref(),
                    cancel: self.cancel.as_ref(),
                }
                .run()?;
                tracing::info!("downloaded {} ({} bytes) to {}", url, size, target.display());
                Ok(Candidate {
                    path: target.to_path_buf(),
                    produced: true,
                })
            }
            SourceDescriptor::LocalFile(_) | SourceDescriptor::Share { .. } => {
                let source = descriptor.local_path().ok_or_else(|| {
                    FetchError::Config(format!("{} has no local path", descriptor))
                })?;
                if self.config.copy_on_local {
                    self.copy(&source)
                } else {
                    fs::metadata(&source).map_err(|e| FetchError::fs("stat", &source, e))?;
                    self.sink.say(&format!("Using {} in place", source.display()));
                    Ok(Candidate {
                        path: source,
                        produced: false,
                    })
                }
            }
        }
    }

    fn copy(&self, source: &Path) -> Result<Candidate> {
        let target = self.required_target()?;
        if same_file(source, target) {
            // Nothing is copied, so the file is still the caller's own.
            tracing::debug!("{} is already the target; not copying", source.display());
            return Ok(Candidate {
                path: target.to_path_buf(),
                produced: false,
            });
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(TransferFailure::Cancelled.into());
        }
        self.sink.say(&format!("Copying {} to {}", source.display(), target.display()));
        let n = local::copy_into(source, target)?;
        self.sink.say(&format!("Copied {} bytes", n));
        Ok(Candidate {
            path: target.to_path_buf(),
            produced: true,
        })
    }

    /// Verifies the candidate. Mismatching content we produced is deleted;
    /// a source used in place is never touched.
    fn accept(&self, candidate: Candidate) -> Result<PathBuf> {
        if self.verify_checksum(&candidate.path)? {
            if self.config.verifies() {
                let msg = format!("Verified checksum of {}", candidate.path.display());
                self.sink.say(&msg);
            }
            return Ok(candidate.path);
        }

        let expected = self.config.expected_checksum.clone().unwrap_or_default();
        tracing::warn!(
            "checksum mismatch for {} (expected {})",
            candidate.path.display(),
            hex::encode(&expected)
        );
        if candidate.produced {
            let msg = format!("Checksum mismatch, removing {}", candidate.path.display());
            self.sink.say(&msg);
            if let Err(e) = fs::remove_file(&candidate.path) {
                tracing::warn!("failed to remove {}: {}", candidate.path.display(), e);
            }
        }
        Err(FetchError::Checksum { expected })
    }

    fn required_target(&self) -> Result<&Path> {
        self.config
            .target_path
            .as_deref()
            .ok_or_else(|| FetchError::Config("no target path configured".into()))
    }
}
