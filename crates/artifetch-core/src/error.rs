//! Error taxonomy for a single fetch.
//!
//! Every failure of `DownloadClient::get` is one of four kinds. None of them
//! is retried internally; the caller decides whether to call `get` again.

use std::io;
use std::path::{Path, PathBuf};

/// Terminal status of one `get()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    ConfigInvalid,
    ChecksumFailed,
    TransportFailed,
    FilesystemFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Unsupported scheme, unusable hash algorithm, missing target path.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// HEAD/GET failure, non-success status, or a stalled/cancelled transfer.
    /// Any partially written target is left on disk for a later resume.
    #[error("transfer failed: {0}")]
    Transport(String),

    /// Digest mismatch. The message text is relied upon by callers.
    #[error("checksums didn't match expected: {}", hex::encode(.expected))]
    Checksum { expected: Vec<u8> },

    #[error("{op} {}: {source}", .path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> FetchStatus {
        match self {
            FetchError::Config(_) => FetchStatus::ConfigInvalid,
            FetchError::Transport(_) => FetchStatus::TransportFailed,
            FetchError::Checksum { .. } => FetchStatus::ChecksumFailed,
            FetchError::Filesystem { .. } => FetchStatus::FilesystemFailed,
        }
    }

    pub(crate) fn fs(op: &'static str, path: &Path, source: io::Error) -> Self {
        FetchError::Filesystem {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_message_is_hex_of_expected() {
        let err = FetchError::Checksum {
            expected: b"nope".to_vec(),
        };
        assert_eq!(err.to_string(), "checksums didn't match expected: 6e6f7065");
        assert_eq!(err.status(), FetchStatus::ChecksumFailed);
    }

    #[test]
    fn filesystem_message_names_path() {
        let err = FetchError::fs(
            "open",
            Path::new("/no/such/file"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("open /no/such/file"), "{}", msg);
        assert_eq!(err.status(), FetchStatus::FilesystemFailed);
    }

    #[test]
    fn transport_and_config_status() {
        assert_eq!(
            FetchError::Transport("x".into()).status(),
            FetchStatus::TransportFailed
        );
        assert_eq!(
            FetchError::Config("x".into()).status(),
            FetchStatus::ConfigInvalid
        );
    }
}
