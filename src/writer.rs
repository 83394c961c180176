//! Streamed writes into the local file at a resume offset.
//!
//! Bytes before the offset are never touched; the file is opened read+write
//! when it exists (in-place update) or exclusive-create when it does not.
//! Incoming data is re-buffered to fixed 16 KiB chunks so memory stays
//! bounded and progress reporting is deterministic regardless of how the
//! transport slices delivery.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::DownloadError;

/// Fixed chunk size for buffered writes and progress reporting.
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Progress callback: `(chunk_index, chunk_len, total_size)`. The index
/// continues the numbering from the resume offset, as if the whole file had
/// been streamed in one pass.
pub type ProgressFn<'a> = dyn FnMut(u64, usize, Option<u64>) + 'a;

/// Writes a response body to the local file starting at a byte offset. The
/// file handle is released on every exit path, including mid-stream failure.
pub struct StreamWriter<'a> {
    file: File,
    buf: Vec<u8>,
    chunk_index: u64,
    offset: u64,
    written: u64,
    total: Option<u64>,
    progress: Option<&'a mut ProgressFn<'a>>,
}

impl<'a> StreamWriter<'a> {
    /// Open `path` for in-place update (read+write when it exists,
    /// exclusive-create otherwise) and seek to `offset`.
    pub fn open(
        path: &Path,
        offset: u64,
        total: Option<u64>,
        progress: Option<&'a mut ProgressFn<'a>>,
    ) -> Result<Self, DownloadError> {
        let mut file = if path.exists() {
            File::options().read(true).write(true).open(path)?
        } else {
            File::options().write(true).create_new(true).open(path)?
        };
        file.seek(SeekFrom::Start(offset))?;
        Ok(StreamWriter {
            file,
            buf: Vec::with_capacity(CHUNK_SIZE),
            chunk_index: offset / CHUNK_SIZE as u64,
            offset,
            written: 0,
            total,
            progress,
        })
    }

    /// Buffer `data`, flushing a chunk to disk each time the buffer fills.
    pub fn write(&mut self, mut data: &[u8]) -> Result<(), DownloadError> {
        while !data.is_empty() {
            let room = CHUNK_SIZE - self.buf.len();
            let take = room.min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.buf.len() == CHUNK_SIZE {
                self.flush_chunk()?;
            }
        }
        Ok(())
    }

    fn flush_chunk(&mut self) -> Result<(), DownloadError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.file.write_all(&self.buf)?;
        self.written += self.buf.len() as u64;
        if let Some(cb) = self.progress.as_mut() {
            cb(self.chunk_index, self.buf.len(), self.total);
        }
        self.chunk_index += 1;
        self.buf.clear();
        Ok(())
    }

    /// Flush the trailing partial chunk and, for a full rewrite, drop stale
    /// bytes past the end of the stream. Returns the number of bytes written.
    pub fn finish(mut self, truncate: bool) -> Result<u64, DownloadError> {
        self.flush_chunk()?;
        if truncate {
            let end = self.offset + self.written;
            if self.file.metadata()?.len() > end {
                self.file.set_len(end)?;
            }
        }
        self.file.flush()?;
        Ok(self.written)
    }
}
