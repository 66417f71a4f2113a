//! `smb://host/share/path` sources and their `\\host\share\path` form.

use super::SourceDescriptor;
use std::path::PathBuf;

/// Parses the part after `smb://`. Host and share must both be present.
pub(super) fn parse_share(rest: &str) -> Option<SourceDescriptor> {
    let mut parts = rest.splitn(3, '/');
    let host = parts.next().filter(|s| !s.is_empty())?;
    let share = parts.next().filter(|s| !s.is_empty())?;
    let path = parts.next().unwrap_or("").trim_start_matches('/');
    Some(SourceDescriptor::Share {
        host: host.to_string(),
        share: share.to_string(),
        path: path.to_string(),
    })
}

/// Native network-share path for a share source.
pub fn unc_path(host: &str, share: &str, path: &str) -> PathBuf {
    let mut s = format!(r"\\{}\{}", host, share);
    if !path.is_empty() {
        s.push('\\');
        s.push_str(&path.replace('/', "\\"));
    }
    PathBuf::from(s)
}
