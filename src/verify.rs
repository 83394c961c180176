//! Completion checking: streaming SHA-256 and size comparison.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::DownloadError;

const HASH_BUF_SIZE: usize = 64 * 1024;

/// Whether the local file satisfies its completion criterion.
///
/// `Partial` covers both "file not there yet" and "no criterion supplied";
/// either way the file may legitimately be resumed. The mismatch variants
/// mean the file exists and fails the supplied criterion, which is an error
/// only after a completed transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Completed,
    Partial,
    ChecksumMismatch,
    SizeMismatch,
}

/// SHA-256 of a file as lowercase hex. Reads in fixed-size chunks so memory
/// stays bounded for arbitrarily large files.
pub fn sha256_path(path: &Path) -> Result<String, DownloadError> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check `path` against the supplied criterion.
///
/// The hash wins over the size when both are given; with neither there is
/// nothing to confirm and the result is `Partial`. A missing file is
/// `Partial` regardless of criterion, never a mismatch.
pub fn completion_state(
    path: &Path,
    sha256sum: Option<&str>,
    filesize: Option<u64>,
) -> Result<CompletionState, DownloadError> {
    if let Some(expected) = sha256sum {
        let actual = match sha256_path(path) {
            Ok(h) => h,
            Err(DownloadError::Storage(e)) if e.kind() == ErrorKind::NotFound => {
                return Ok(CompletionState::Partial)
            }
            Err(e) => return Err(e),
        };
        return Ok(if actual.eq_ignore_ascii_case(expected) {
            CompletionState::Completed
        } else {
            CompletionState::ChecksumMismatch
        });
    }
    if let Some(expected) = filesize {
        let actual = match std::fs::metadata(path) {
            Ok(m) => m.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CompletionState::Partial),
            Err(e) => return Err(e.into()),
        };
        return Ok(if actual == expected {
            CompletionState::Completed
        } else {
            CompletionState::SizeMismatch
        });
    }
    Ok(CompletionState::Partial)
}
