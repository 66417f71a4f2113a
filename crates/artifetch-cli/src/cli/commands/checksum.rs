//! Checksum command: digest of a file.

use anyhow::Result;
use artifetch_core::checksum;
use artifetch_core::{FetchError, HashKind};
use std::path::Path;

/// Compute and print the digest of the given file.
pub fn run_checksum(path: &Path, algorithm: &str) -> Result<()> {
    let kind = HashKind::from_name(algorithm)
        .ok_or_else(|| FetchError::Config(format!("unsupported hash algorithm {:?}", algorithm)))?;
    let digest = checksum::hex_digest_path(path, kind)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
