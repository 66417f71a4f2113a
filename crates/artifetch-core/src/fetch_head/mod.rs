//! HEAD probe: does the server accept byte ranges, and how big is the body.

mod parse;

pub(crate) use parse::status_code;

use crate::config::TransportSettings;
use crate::transport::{self, TransferFailure};
use std::str;

/// What the HEAD response told us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

/// Sends a HEAD request carrying `user_agent` and returns the parsed headers.
///
/// Follows redirects; only the headers of the final response are used.
/// Blocks the current thread.
pub(crate) fn probe(
    url: &str,
    user_agent: &str,
    settings: &TransportSettings,
) -> Result<HeadResult, TransferFailure> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = transport::new_easy(url, user_agent, settings)?;
    easy.nobody(true)?;
    easy.timeout(std::time::Duration::from_secs(
        settings.connect_timeout_secs.saturating_mul(2),
    ))?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    transport::check_status(easy.response_code()?)?;
    Ok(parse::parse_headers(&headers))
}
