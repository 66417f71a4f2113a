//! Target file writer for the GET body.
//!
//! The file is opened on the first byte of a 2xx body, not before, so an
//! error response never touches an existing partial download.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub(super) struct FileSink {
    path: PathBuf,
    /// Resume offset requested from the server.
    offset: u64,
    file: Option<File>,
    error: Option<io::Error>,
}

impl FileSink {
    pub(super) fn new(path: &Path, offset: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            offset,
            file: None,
            error: None,
        }
    }

    /// Append only when we asked for a range and got `206` back. Anything
    /// else carries the whole body and replaces the file.
    fn open(&self, status: u32) -> io::Result<File> {
        if self.offset > 0 && status == 206 {
            OpenOptions::new().append(true).open(&self.path)
        } else {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
        }
    }

    /// Write callback body. Returns the number of bytes consumed; anything
    /// short of `data.len()` makes curl abort the transfer.
    pub(super) fn write(&mut self, data: &[u8], status: u32) -> usize {
        if !(200..300).contains(&status) {
            // Error page or redirect body.
            return data.len();
        }
        if self.file.is_none() {
            match self.open(status) {
                Ok(f) => self.file = Some(f),
                Err(e) => {
                    self.error = Some(e);
                    return 0;
                }
            }
        }
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        match file.write_all(data) {
            Ok(()) => data.len(),
            Err(e) => {
                tracing::warn!("write to {} failed: {}", self.path.display(), e);
                self.error = Some(e);
                0
            }
        }
    }

    pub(super) fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Completes a successful transfer: makes sure the file exists even for
    /// an empty body, syncs it, and returns its final size.
    pub(super) fn finish(mut self, status: u32) -> io::Result<u64> {
        let file = match self.file.take() {
            Some(f) => f,
            None => self.open(status)?,
        };
        file.sync_all()?;
        Ok(file.metadata()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_content_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t");
        std::fs::write(&path, b"w").unwrap();
        let mut sink = FileSink::new(&path, 1);
        assert_eq!(sink.write(b"ello\n", 206), 5);
        assert_eq!(sink.finish(206).unwrap(), 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"wello\n");
    }

    #[test]
    fn full_body_on_resume_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t");
        std::fs::write(&path, b"w").unwrap();
        let mut sink = FileSink::new(&path, 1);
        sink.write(b"hello\n", 200);
        assert_eq!(sink.finish(200).unwrap(), 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn error_body_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t");
        std::fs::write(&path, b"partial").unwrap();
        let mut sink = FileSink::new(&path, 7);
        assert_eq!(sink.write(b"<html>not found</html>", 404), 22);
        drop(sink);
        assert_eq!(std::fs::read(&path).unwrap(), b"partial");
    }

    #[test]
    fn empty_body_still_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t");
        let sink = FileSink::new(&path, 0);
        assert_eq!(sink.finish(200).unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn open_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("t");
        let mut sink = FileSink::new(&path, 0);
        assert_eq!(sink.write(b"x", 200), 0);
        assert!(sink.take_error().is_some());
    }
}
