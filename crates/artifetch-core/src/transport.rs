//! libcurl handle setup and failure classification shared by the HEAD
//! probe and the streamed GET.

use crate::config::TransportSettings;
use crate::error::FetchError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Why a single request failed, before it is folded into [`FetchError`].
#[derive(Debug)]
pub(crate) enum TransferFailure {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the body to disk failed.
    Storage(PathBuf, io::Error),
    /// The caller's cancel token fired.
    Cancelled,
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFailure::Curl(e) => write!(f, "{} ({})", e, curl_kind(e)),
            TransferFailure::Http(code) => write!(f, "HTTP {}", code),
            TransferFailure::Storage(p, e) => write!(f, "write {}: {}", p.display(), e),
            TransferFailure::Cancelled => write!(f, "transfer cancelled"),
        }
    }
}

impl From<curl::Error> for TransferFailure {
    fn from(e: curl::Error) -> Self {
        TransferFailure::Curl(e)
    }
}

impl From<TransferFailure> for FetchError {
    fn from(f: TransferFailure) -> Self {
        match f {
            TransferFailure::Storage(path, source) => FetchError::Filesystem {
                op: "write",
                path,
                source,
            },
            other => FetchError::Transport(other.to_string()),
        }
    }
}

pub(crate) fn curl_failure(e: curl::Error) -> FetchError {
    TransferFailure::Curl(e).into()
}

/// Short label for a curl error, used in messages and logs.
pub(crate) fn curl_kind(e: &curl::Error) -> &'static str {
    if e.is_operation_timedout() {
        return "timeout";
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return "connection";
    }
    if e.is_aborted_by_callback() {
        return "aborted";
    }
    "other"
}

/// New easy handle for `url` with redirect, timeout and User-Agent setup
/// common to every request of a fetch.
pub(crate) fn new_easy(
    url: &str,
    user_agent: &str,
    settings: &TransportSettings,
) -> Result<curl::easy::Easy, TransferFailure> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(user_agent)?;
    easy.follow_location(true)?;
    easy.max_redirections(settings.max_redirects)?;
    easy.connect_timeout(Duration::from_secs(settings.connect_timeout_secs))?;
    // Stall detection instead of a wall-clock limit: images can take hours.
    easy.low_speed_limit(settings.low_speed_limit_bytes)?;
    easy.low_speed_time(Duration::from_secs(settings.low_speed_time_secs))?;
    Ok(easy)
}

pub(crate) fn check_status(code: u32) -> Result<(), TransferFailure> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(TransferFailure::Http(code))
    }
}
