//! Resumable single-stream HTTP fetch.
//!
//! One attempt is: HEAD probe, resume decision, one GET streamed straight
//! into the target. A failed attempt leaves whatever reached the disk in
//! place so the next attempt can pick up from there.

mod sink;

use crate::config::TransportSettings;
use crate::control::CancelToken;
use crate::error::{FetchError, Result};
use crate::fetch_head::{self, HeadResult};
use crate::progress::{ProgressSink, ProgressThrottle};
use crate::transport::{self, TransferFailure};
use sink::FileSink;
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Where the GET starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePlan {
    /// Bytes already on disk that the server will not be asked for again.
    pub offset: u64,
}

impl ResumePlan {
    /// Resume only when the server advertises byte ranges and a non-empty
    /// partial file exists. An empty file gets a plain fresh fetch; a
    /// `bytes=0-` range would gain nothing.
    pub fn decide(head: Option<&HeadResult>, existing_len: Option<u64>) -> Self {
        let ranges = head.map(|h| h.accept_ranges).unwrap_or(false);
        let offset = match existing_len {
            Some(len) if ranges && len > 0 => len,
            _ => 0,
        };
        ResumePlan { offset }
    }

    pub fn is_resume(&self) -> bool {
        self.offset > 0
    }

    /// Value for curl's range option (`<offset>-`, open-ended).
    fn range(&self) -> Option<String> {
        self.is_resume().then(|| format!("{}-", self.offset))
    }
}

/// Everything one network fetch needs.
pub(crate) struct NetworkFetch<'a> {
    pub url: &'a str,
    pub target: &'a Path,
    pub user_agent: &'a str,
    pub settings: &'a TransportSettings,
    pub sink: &'a dyn ProgressSink,
    pub cancel: Option<&'a CancelToken>,
}

impl NetworkFetch<'_> {
    fn cancelled(&self) -> bool {
        self.cancel.map(CancelToken::is_cancelled).unwrap_or(false)
    }

    /// Runs probe + GET. Returns the size of the target afterwards.
    pub(crate) fn run(&self) -> Result<u64> {
        if self.cancelled() {
            return Err(TransferFailure::Cancelled.into());
        }

        let head = match fetch_head::probe(self.url, self.user_agent, self.settings) {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::warn!("HEAD {} failed, fetching without resume: {}", self.url, e);
                None
            }
        };
        let existing_len = fs::metadata(self.target).ok().map(|m| m.len());
        let plan = ResumePlan::decide(head.as_ref(), existing_len);
        tracing::debug!(
            "fetch {} -> {}: head={:?} existing={:?} offset={}",
            self.url,
            self.target.display(),
            head,
            existing_len,
            plan.offset
        );
        if plan.is_resume() {
            self.sink.say(&format!("Resuming download at byte {}", plan.offset));
        }

        if let Some(parent) = self.target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FetchError::fs("create directory", parent, e))?;
        }

        self.get(plan, head.as_ref().and_then(|h| h.content_length))
    }

    fn get(&self, plan: ResumePlan, expected_len: Option<u64>) -> Result<u64> {
        let mut easy = transport::new_easy(self.url, self.user_agent, self.settings)?;
        if let Some(range) = plan.range() {
            easy.range(&range).map_err(transport::curl_failure)?;
        }
        easy.progress(true).map_err(transport::curl_failure)?;

        let status = Cell::new(0u32);
        let cancelled = Cell::new(false);
        let mut out = FileSink::new(self.target, plan.offset);
        let mut throttle = ProgressThrottle::new(
            self.sink,
            Duration::from_millis(self.settings.progress_interval_ms),
            plan.offset,
        );

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    let line = std::str::from_utf8(data).ok();
                    if let Some(code) = line.and_then(fetch_head::status_code) {
                        status.set(code);
                    }
                    true
                })
                .map_err(transport::curl_failure)?;
            transfer
                .write_function(|data| Ok(out.write(data, status.get())))
                .map_err(transport::curl_failure)?;
            transfer
                .progress_function(|dltotal, dlnow, _, _| {
                    if self.cancelled() {
                        cancelled.set(true);
                        return false;
                    }
                    throttle.update(dlnow as u64, dltotal as u64);
                    true
                })
                .map_err(transport::curl_failure)?;
            transfer.perform()
        };

        if cancelled.get() {
            return Err(TransferFailure::Cancelled.into());
        }
        if let Err(e) = performed {
            if e.is_write_error() {
                if let Some(err) = out.take_error() {
                    return Err(TransferFailure::Storage(self.target.to_path_buf(), err).into());
                }
            }
            return Err(transport::curl_failure(e));
        }

        let code = easy.response_code().map_err(transport::curl_failure)?;
        if code == 416 && plan.is_resume() && expected_len == Some(plan.offset) {
            tracing::debug!("{} already complete at {} bytes", self.target.display(), plan.offset);
            return Ok(plan.offset);
        }
        transport::check_status(code)?;
        if plan.is_resume() && code == 200 {
            tracing::info!("{} ignored the range request; refetched from byte 0", self.url);
        }

        out.finish(code).map_err(|e| FetchError::fs("write", self.target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(ranges: bool) -> HeadResult {
        HeadResult {
            content_length: Some(10),
            accept_ranges: ranges,
        }
    }

    #[test]
    fn resume_when_ranges_and_partial_file() {
        let plan = ResumePlan::decide(Some(&head(true)), Some(4));
        assert_eq!(plan.offset, 4);
        assert_eq!(plan.range().as_deref(), Some("4-"));
    }

    #[test]
    fn fresh_when_no_range_support() {
        assert_eq!(ResumePlan::decide(Some(&head(false)), Some(4)).offset, 0);
    }

    #[test]
    fn fresh_when_probe_failed() {
        assert_eq!(ResumePlan::decide(None, Some(4)).offset, 0);
    }

    #[test]
    fn fresh_when_no_file_or_empty_file() {
        assert_eq!(ResumePlan::decide(Some(&head(true)), None).offset, 0);
        let empty = ResumePlan::decide(Some(&head(true)), Some(0));
        assert!(!empty.is_resume());
        assert!(empty.range().is_none());
    }
}
