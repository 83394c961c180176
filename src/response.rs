//! Response head: status line and headers parsed from raw header lines.
//!
//! libcurl hands back one header line per callback; this module turns the
//! collected lines into a queryable head and derives the resource's total
//! size from `Content-Range` / `Content-Length`.

use crate::error::DownloadError;
use crate::range::ContentRange;

/// Status and headers of an HTTP response, in received order.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    /// Status code from the status line; 0 when no status line was seen.
    pub status: u32,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// Build from raw header lines (status line included, order preserved).
    pub(crate) fn from_lines(lines: &[String]) -> Self {
        let mut head = ResponseHead::default();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("HTTP/") {
                head.status = line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                head.headers
                    .push((name.trim().to_string(), value.trim().to_string()));
            }
        }
        head
    }

    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }

    pub fn content_range(&self) -> Result<Option<ContentRange>, DownloadError> {
        self.header("Content-Range")
            .map(ContentRange::parse)
            .transpose()
    }

    /// Total size of the remote resource, if determinable.
    ///
    /// A Content-Range, when present, is authoritative even with an unknown
    /// total: a ranged response's Content-Length covers only the delivered
    /// slice, so it is used as a fallback only when no Content-Range exists.
    pub fn resource_size(&self) -> Result<Option<u64>, DownloadError> {
        if let Some(cr) = self.content_range()? {
            return Ok(cr.total);
        }
        Ok(self.content_length())
    }
}
