//! Source locator classification.
//!
//! A locator is one of `http(s)://` URL, `file://` URI, `smb://host/share/path`
//! or a bare filesystem path. The scheme prefix alone picks the variant; the
//! remainder is never sniffed.

mod file_uri;
mod share;

pub use file_uri::normalize_file_path;
pub use share::unc_path;

use crate::error::{FetchError, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Path conventions of the platform a locator is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `/`-separated paths, no drive letters, no network-share paths.
    Posix,
    /// `\`-separated paths with drive letters and `\\host\share` paths.
    Windows,
}

impl PathStyle {
    pub fn host() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }
}

/// Where the artifact comes from, derived once from the locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    Network(Url),
    LocalFile(PathBuf),
    Share {
        host: String,
        share: String,
        path: String,
    },
}

impl SourceDescriptor {
    /// Local (or share) path the content can be read from directly.
    /// `None` for network sources.
    pub fn local_path(&self) -> Option<PathBuf> {
        match self {
            SourceDescriptor::Network(_) => None,
            SourceDescriptor::LocalFile(p) => Some(p.clone()),
            SourceDescriptor::Share { host, share, path } => Some(unc_path(host, share, path)),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, SourceDescriptor::Network(_))
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Network(url) => write!(f, "network {}", url),
            SourceDescriptor::LocalFile(p) => write!(f, "file {}", p.display()),
            SourceDescriptor::Share { host, share, path } => {
                write!(f, "share {}", unc_path(host, share, path).display())
            }
        }
    }
}

/// Splits `scheme://rest`. Locators without `://` have no scheme, which also
/// keeps drive-qualified paths like `C:\images\x.iso` out of scheme handling.
fn split_scheme(locator: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = locator.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

/// Resolves `locator` using the conventions of the running platform.
pub fn resolve(locator: &str) -> Result<SourceDescriptor> {
    resolve_with_style(locator, PathStyle::host())
}

pub fn resolve_with_style(locator: &str, style: PathStyle) -> Result<SourceDescriptor> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(FetchError::Config("empty source locator".into()));
    }

    let Some((scheme, rest)) = split_scheme(locator) else {
        return Ok(SourceDescriptor::LocalFile(PathBuf::from(locator)));
    };

    match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" => {
            let url = Url::parse(locator)
                .map_err(|e| FetchError::Config(format!("invalid URL {}: {}", locator, e)))?;
            Ok(SourceDescriptor::Network(url))
        }
        "file" => {
            if rest.is_empty() {
                return Err(FetchError::Config(format!("file URI without a path: {}", locator)));
            }
            let decoded = percent_decode_str(rest).decode_utf8().map_err(|_| {
                FetchError::Config(format!("file URI path is not valid UTF-8: {}", locator))
            })?;
            Ok(SourceDescriptor::LocalFile(normalize_file_path(&decoded, style)))
        }
        "smb" => {
            if style != PathStyle::Windows {
                return Err(FetchError::Config(format!(
                    "smb sources need native network-share paths, unavailable on this platform: {}",
                    locator
                )));
            }
            share::parse_share(rest).ok_or_else(|| {
                FetchError::Config(format!("smb URI needs host and share: {}", locator))
            })
        }
        other => Err(FetchError::Config(format!("unsupported scheme {:?} in {}", other, locator))),
    }
}

/// True when `path` names the same file as `other` once both are made
/// absolute. Falls back to plain comparison when either cannot be resolved.
pub fn same_file(path: &Path, other: &Path) -> bool {
    match (path.canonicalize(), other.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => path == other,
    }
}
