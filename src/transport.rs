//! libcurl transport configuration.
//!
//! Timeouts, redirect policy, and bandwidth caps live here; the core has no
//! retry or timeout logic of its own.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::DownloadError;
use crate::writer::CHUNK_SIZE;

/// Transport knobs passed through to libcurl.
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Hard wall-clock cap so a completely stuck transfer eventually fails.
    pub timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/sec for
    /// `low_speed_time`. Kinder to slow links than the hard timeout alone.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    /// Receive-speed cap in bytes/sec, unlimited when `None`.
    pub max_recv_speed: Option<u64>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_redirections: 10,
            max_recv_speed: None,
        }
    }
}

/// Build a configured Easy handle for `method url` carrying `headers`.
pub(crate) fn build_easy(
    method: &str,
    url: &str,
    headers: &HashMap<String, String>,
    opts: &TransportOptions,
) -> Result<curl::easy::Easy, DownloadError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    if !method.eq_ignore_ascii_case("GET") {
        easy.custom_request(method)?;
    }
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    if let Some(speed) = opts.max_recv_speed {
        easy.max_recv_speed(speed)?;
    }
    // Body callbacks arrive at most one chunk at a time.
    easy.buffer_size(CHUNK_SIZE)?;

    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !headers.is_empty() {
        easy.http_headers(list)?;
    }
    Ok(easy)
}
