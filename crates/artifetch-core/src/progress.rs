//! Progress reporting to a caller-supplied sink.
//!
//! The sink only observes; nothing it does feeds back into the fetch. Byte
//! progress is rate-limited before it reaches the sink so a slow sink cannot
//! hold up the transfer for long.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Receiver of human-readable status lines.
pub trait ProgressSink: Send + Sync {
    fn say(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn say(&self, _message: &str) {}
}

/// Forwards messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn say(&self, message: &str) {
        tracing::info!(target: "artifetch::progress", "{}", message);
    }
}

/// Keeps every message; handy for tests and for embedders that render later.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn say(&self, message: &str) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_string());
        }
    }
}

/// Snapshot of transfer progress.
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Bytes present in the target, including any resumed prefix.
    pub bytes_done: u64,
    /// Expected final size, if the server told us.
    pub total_bytes: Option<u64>,
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Fraction complete in [0.0, 1.0], when the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_done as f64 / total as f64).min(1.0)),
            None => None,
        }
    }

    /// Average rate since the transfer started, once any time has passed.
    pub fn bytes_per_sec(&self) -> Option<f64> {
        (self.elapsed_secs > 0.0).then(|| self.bytes_done as f64 / self.elapsed_secs)
    }

    pub fn describe(&self) -> String {
        let amount = match (self.fraction(), self.total_bytes) {
            (Some(f), Some(total)) => {
                format!("{:.1}% ({} of {} bytes)", f * 100.0, self.bytes_done, total)
            }
            _ => format!("{} bytes", self.bytes_done),
        };
        match self.bytes_per_sec() {
            Some(rate) => format!("{} at {:.0} B/s", amount, rate),
            None => amount,
        }
    }
}

/// Rate-limits byte progress on its way to a sink.
pub(crate) struct ProgressThrottle<'a> {
    sink: &'a dyn ProgressSink,
    interval: Duration,
    started: Instant,
    last: Option<Instant>,
    base: u64,
}

impl<'a> ProgressThrottle<'a> {
    /// `base` is the resume offset; curl counts only bytes of this transfer.
    pub(crate) fn new(sink: &'a dyn ProgressSink, interval: Duration, base: u64) -> Self {
        Self {
            sink,
            interval,
            started: Instant::now(),
            last: None,
            base,
        }
    }

    /// Called from the transport's progress callback.
    pub(crate) fn update(&mut self, transfer_done: u64, transfer_total: u64) {
        let now = Instant::now();
        if let Some(last) = self.last {
            if now.duration_since(last) < self.interval {
                return;
            }
        }
        if transfer_done == 0 {
            return;
        }
        self.last = Some(now);
        let stats = ProgressStats {
            bytes_done: self.base + transfer_done,
            total_bytes: (transfer_total > 0).then_some(self.base + transfer_total),
            elapsed_secs: now.duration_since(self.started).as_secs_f64(),
        };
        self.sink.say(&format!("downloaded {}", stats.describe()));
    }
}
