pub mod config;
pub mod logging;

pub mod checksum;
pub mod client;
pub mod control;
pub mod downloader;
pub mod error;
pub mod fetch_head;
pub mod hash;
pub mod local;
pub mod progress;
pub mod source;
mod transport;

pub use client::DownloadClient;
pub use config::{DownloadConfig, TransportSettings};
pub use control::CancelToken;
pub use error::{FetchError, FetchStatus};
pub use hash::{hash_for_type, HashKind, Hasher};
pub use progress::{NoopSink, ProgressSink, RecordingSink, TracingSink};
pub use source::{resolve, SourceDescriptor};
