//! Content-Range header parsing.

use crate::error::DownloadError;

/// Byte span a response actually delivers, plus the resource's total size
/// when the server discloses it (`*` means unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    pub total: Option<u64>,
}

impl ContentRange {
    /// Parse the canonical form `bytes <start>-<end>/<total|*>`.
    ///
    /// Strict grammar: ASCII digits for start/end, digits or a literal `*`
    /// for the total. Also rejects spans that violate `start <= end` or a
    /// disclosed total that is not past the end.
    pub fn parse(header: &str) -> Result<Self, DownloadError> {
        let malformed = || DownloadError::MalformedRange(header.to_string());
        let rest = header.strip_prefix("bytes ").ok_or_else(malformed)?;
        let (span, total) = rest.split_once('/').ok_or_else(malformed)?;
        let (start, end) = span.split_once('-').ok_or_else(malformed)?;
        let start = parse_decimal(start).ok_or_else(malformed)?;
        let end = parse_decimal(end).ok_or_else(malformed)?;
        let total = match total {
            "*" => None,
            t => Some(parse_decimal(t).ok_or_else(malformed)?),
        };
        if start > end {
            return Err(malformed());
        }
        if let Some(t) = total {
            if t <= end {
                return Err(malformed());
            }
        }
        Ok(ContentRange { start, end, total })
    }
}

/// Digits only; no sign, no surrounding whitespace.
fn parse_decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
