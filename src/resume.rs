//! Resume-offset resolution and advisory conditions.

use std::fmt;

use crate::error::DownloadError;
use crate::response::ResponseHead;

/// Non-fatal conditions noticed while interpreting a partial-content
/// response. Returned alongside the result and logged at warn level; they
/// never abort the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The server's range does not start where the local file ends. The
    /// server's offset is honored anyway.
    UnexpectedResumePoint { local_size: u64, range_start: u64 },
    /// The range stops short of the resource's last byte; another retrieve
    /// pass will be needed to finish the file.
    ShortRange { range_end: u64, total: u64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::UnexpectedResumePoint {
                local_size,
                range_start,
            } => write!(
                f,
                "download is not resuming exactly where it ended (local size {}, range starts at {})",
                local_size, range_start
            ),
            Advisory::ShortRange { range_end, total } => write!(
                f,
                "response stops at byte {} of {}; run retrieve again to finish",
                range_end, total
            ),
        }
    }
}

/// Byte offset to seek to before writing, given the server's actual response.
///
/// Only a 206 bearing a Content-Range resumes at the server's range start;
/// anything else means a full re-download from offset 0.
pub fn resume_offset(
    resp: &ResponseHead,
    local_size: Option<u64>,
) -> Result<(u64, Vec<Advisory>), DownloadError> {
    let mut advisories = Vec::new();
    if resp.status != 206 {
        return Ok((0, advisories));
    }
    let cr = match resp.content_range()? {
        Some(cr) => cr,
        None => return Ok((0, advisories)),
    };
    if let Some(size) = local_size {
        if size != 0 && size != cr.start {
            let advisory = Advisory::UnexpectedResumePoint {
                local_size: size,
                range_start: cr.start,
            };
            tracing::warn!(local_size = size, range_start = cr.start, "{}", advisory);
            advisories.push(advisory);
        }
    }
    if let Some(total) = cr.total {
        if cr.end != total - 1 {
            let advisory = Advisory::ShortRange {
                range_end: cr.end,
                total,
            };
            tracing::warn!(range_end = cr.end, total, "{}", advisory);
            advisories.push(advisory);
        }
    }
    Ok((cr.start, advisories))
}
