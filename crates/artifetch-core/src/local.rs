//! Copying local and network-share sources into the target path.

use crate::error::{FetchError, Result};
use std::fs;
use std::path::Path;

/// Copies `source` to `target`, creating the target's parent directory.
/// Returns the number of bytes copied.
///
/// `source` and `target` must be different files; `fs::copy` onto itself
/// truncates the source.
pub fn copy_into(source: &Path, target: &Path) -> Result<u64> {
    let meta = fs::metadata(source).map_err(|e| FetchError::fs("stat", source, e))?;
    if !meta.is_file() {
        return Err(FetchError::fs(
            "copy",
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FetchError::fs("create directory", parent, e))?;
    }

    let n = fs::copy(source, target).map_err(|e| FetchError::fs("copy to", target, e))?;
    tracing::debug!("copied {} bytes {} -> {}", n, source.display(), target.display());
    Ok(n)
}
