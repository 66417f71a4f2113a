//! Checksum verification of files on disk.
//!
//! Files are streamed through the accumulator in fixed-size chunks so that
//! multi-gigabyte images never have to fit in memory.

use crate::error::{FetchError, Result};
use crate::hash::{HashKind, Hasher};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Feeds the whole file at `path` into `hasher` and returns the digest.
pub fn digest_file(path: &Path, mut hasher: Hasher) -> Result<Vec<u8>> {
    let mut f = File::open(path).map_err(|e| FetchError::fs("open", path, e))?;
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .map_err(|e| FetchError::fs("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Digest of a file as lowercase hex.
pub fn hex_digest_path(path: &Path, kind: HashKind) -> Result<String> {
    digest_file(path, kind.hasher()).map(hex::encode)
}

/// Returns whether the file at `path` hashes to `expected`.
///
/// With no accumulator or no expected digest there is nothing to check and
/// the file counts as verified without being opened.
pub fn verify_checksum(
    path: &Path,
    hasher: Option<Hasher>,
    expected: Option<&[u8]>,
) -> Result<bool> {
    let (hasher, expected) = match (hasher, expected) {
        (Some(h), Some(e)) => (h, e),
        _ => return Ok(true),
    };
    let kind = hasher.kind();
    let actual = digest_file(path, hasher)?;
    let matched = actual == expected;
    if !matched {
        tracing::debug!(
            "{} mismatch for {}: got {}, want {}",
            kind,
            path.display(),
            hex::encode(&actual),
            hex::encode(expected)
        );
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_for_type;
    use std::io::Write;

    fn file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn md5_of_foo_verifies() {
        let f = file_with(b"foo");
        let expected = hex::decode("acbd18db4cc2f85cedef654fccc4a4d8").unwrap();
        let ok = verify_checksum(f.path(), hash_for_type("md5"), Some(expected.as_slice()));
        assert!(ok.unwrap());
    }

    #[test]
    fn wrong_digest_does_not_verify() {
        let f = file_with(b"foo");
        assert!(!verify_checksum(f.path(), hash_for_type("sha256"), Some(&b"nope"[..])).unwrap());
    }

    #[test]
    fn nothing_configured_is_trivially_verified() {
        let missing = Path::new("/definitely/not/here");
        assert!(verify_checksum(missing, None, None).unwrap());
        assert!(verify_checksum(missing, None, Some(&b"abc"[..])).unwrap());
        assert!(verify_checksum(missing, hash_for_type("md5"), None).unwrap());
    }

    #[test]
    fn missing_file_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_checksum(&dir.path().join("gone"), hash_for_type("md5"), Some(&b"x"[..]))
            .unwrap_err();
        assert!(matches!(err, FetchError::Filesystem { .. }));
    }

    #[test]
    fn sha256_hex_of_multi_chunk_file() {
        // Larger than one read buffer.
        let body: Vec<u8> = std::iter::repeat(b'a').take(BUF_SIZE * 3 + 7).collect();
        let f = file_with(&body);
        let mut h = HashKind::Sha256.hasher();
        h.update(&body);
        assert_eq!(
            hex_digest_path(f.path(), HashKind::Sha256).unwrap(),
            hex::encode(h.finalize())
        );
    }

    #[test]
    fn sha256_hex_of_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            hex_digest_path(f.path(), HashKind::Sha256).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
