//! Error taxonomy for a retrieve invocation.
//!
//! Every failure is fatal to the current invocation; there is no internal
//! retry. Re-invoking `retrieve` resumes from the last flushed byte.

use thiserror::Error;

use crate::verify::CompletionState;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Server sent a Content-Range that does not match
    /// `bytes <start>-<end>/<total|*>`. Nothing from that response is written.
    #[error("invalid Content-Range: {0:?}")]
    MalformedRange(String),

    /// Transport-level failure reported by libcurl (connect, timeout,
    /// aborted transfer).
    #[error("transfer failed: {0}")]
    Network(#[from] curl::Error),

    /// Non-success, non-416 HTTP status. The local file is left untouched.
    #[error("transfer failed: HTTP {status}")]
    Transfer { status: u32 },

    /// The file on disk fails the expected hash or size even after a full
    /// transfer attempt. The caller decides whether to discard and restart.
    #[error("verification failed after transfer: {0:?}")]
    Verification(CompletionState),

    /// Local file I/O failed (open, seek, write, read for hashing).
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}
