//! Resume-aware retrieval: completion pre-check, ranged request, streamed
//! write, post-transfer verification.
//!
//! One invocation is one sequential transfer. Interrupted transfers are not
//! retried here; calling `retrieve` again resumes from the last flushed byte.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::error::DownloadError;
use crate::response::ResponseHead;
use crate::resume::{self, Advisory};
use crate::transport::{self, TransportOptions};
use crate::verify::{completion_state, CompletionState};
use crate::writer::{ProgressFn, StreamWriter};

/// Caller-tunable knobs for one retrieve invocation.
#[derive(Debug, Default)]
pub struct RetrieveOptions {
    /// HTTP method; GET when `None`.
    pub method: Option<String>,
    /// Expected SHA-256 of the complete file, as hex. Wins over `filesize`.
    pub sha256sum: Option<String>,
    /// Expected size of the complete file in bytes.
    pub filesize: Option<u64>,
    /// Extra request headers. Caller values win over the generated `Range`.
    pub headers: HashMap<String, String>,
    pub transport: TransportOptions,
}

/// Result of a successful retrieve.
#[derive(Debug)]
pub struct Retrieved {
    /// Head of the response the transfer used; `None` when the local file
    /// was already complete and no request was made.
    pub response: Option<ResponseHead>,
    /// Non-fatal conditions noticed while interpreting the response.
    pub advisories: Vec<Advisory>,
}

/// Where body bytes go once the response head has been interpreted.
enum Sink<'p> {
    /// No body byte seen yet.
    Pending,
    Writing(StreamWriter<'p>),
    /// Body discarded: error status, or local size already matches remote.
    Discard,
}

/// Per-transfer state shared between the header and body callbacks.
struct TransferState<'a, 'p> {
    path: &'a Path,
    local_size: Option<u64>,
    progress: Option<&'p mut ProgressFn<'p>>,
    lines: Vec<String>,
    sink: Sink<'p>,
    advisories: Vec<Advisory>,
    partial_status: bool,
    failure: Option<DownloadError>,
}

impl<'a, 'p> TransferState<'a, 'p> {
    fn new(
        path: &'a Path,
        local_size: Option<u64>,
        progress: Option<&'p mut ProgressFn<'p>>,
    ) -> Self {
        TransferState {
            path,
            local_size,
            progress,
            lines: Vec::new(),
            sink: Sink::Pending,
            advisories: Vec::new(),
            partial_status: false,
            failure: None,
        }
    }

    fn header_line(&mut self, line: &str) {
        // A new status line means a new hop after a redirect.
        if line.starts_with("HTTP/") {
            self.lines.clear();
        }
        self.lines.push(line.to_string());
    }

    fn body(&mut self, data: &[u8]) -> Result<(), DownloadError> {
        if matches!(self.sink, Sink::Pending) {
            self.interpret_head()?;
        }
        match &mut self.sink {
            Sink::Writing(w) => w.write(data),
            _ => Ok(()),
        }
    }

    /// Decide, on the first body byte, whether and where to write. Headers
    /// are complete by then.
    fn interpret_head(&mut self) -> Result<(), DownloadError> {
        let head = ResponseHead::from_lines(&self.lines);
        if !(200..300).contains(&head.status) {
            // Error-status bodies are never written; the final status is
            // handled after the transfer completes.
            self.sink = Sink::Discard;
            return Ok(());
        }
        let remote_size = head.resource_size()?;
        if self.local_size.is_some() && self.local_size == remote_size {
            tracing::debug!(size = ?self.local_size, "local size matches remote, nothing to write");
            self.sink = Sink::Discard;
            return Ok(());
        }
        let (offset, advisories) = resume::resume_offset(&head, self.local_size)?;
        self.advisories = advisories;
        self.partial_status = head.status == 206;
        tracing::debug!(status = head.status, offset, ?remote_size, "streaming response body");
        let writer = StreamWriter::open(self.path, offset, remote_size, self.progress.take())?;
        self.sink = Sink::Writing(writer);
        Ok(())
    }
}

/// Merge the resume `Range` header into the caller's headers. The caller's
/// own `Range`, if any, wins.
fn merged_headers(
    extra: &HashMap<String, String>,
    local_size: Option<u64>,
) -> HashMap<String, String> {
    let mut headers = extra.clone();
    if let Some(size) = local_size {
        if !headers.keys().any(|k| k.eq_ignore_ascii_case("range")) {
            headers.insert("Range".to_string(), format!("bytes={}-", size));
        }
    }
    headers
}

/// Download `url` into `path`, resuming from the current file size.
///
/// Sequence: completion pre-check (no request when the file already matches
/// the expected hash or size), ranged request, streamed write, post-transfer
/// verification. A 416 response is success without writing. Verification
/// mismatches after the transfer are fatal; `Partial` (no criterion supplied)
/// is a normal terminal state.
pub fn retrieve(
    url: &str,
    path: &Path,
    progress: Option<&mut dyn FnMut(u64, usize, Option<u64>)>,
    opts: &RetrieveOptions,
) -> Result<Retrieved, DownloadError> {
    let sha256sum = opts.sha256sum.as_deref();
    if completion_state(path, sha256sum, opts.filesize)? == CompletionState::Completed {
        tracing::debug!(path = %path.display(), "already complete, skipping request");
        return Ok(Retrieved {
            response: None,
            advisories: Vec::new(),
        });
    }

    let local_size = match std::fs::metadata(path) {
        Ok(m) => Some(m.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let headers = merged_headers(&opts.headers, local_size);
    let method = opts.method.as_deref().unwrap_or("GET");
    let mut easy = transport::build_easy(method, url, &headers, &opts.transport)?;

    let state = Rc::new(RefCell::new(TransferState::new(path, local_size, progress)));
    {
        let mut transfer = easy.transfer();
        let st = Rc::clone(&state);
        transfer.header_function(move |data| {
            if let Ok(s) = std::str::from_utf8(data) {
                st.borrow_mut().header_line(s.trim_end());
            }
            true
        })?;
        let st = Rc::clone(&state);
        transfer.write_function(move |data| {
            let mut st = st.borrow_mut();
            match st.body(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    st.failure = Some(e);
                    Ok(0) // short write aborts the transfer
                }
            }
        })?;
        if let Err(e) = transfer.perform() {
            if let Some(failure) = state.borrow_mut().failure.take() {
                return Err(failure);
            }
            return Err(DownloadError::Network(e));
        }
    }

    let status = easy.response_code()?;
    if status == 416 {
        // Range not satisfiable: already fully downloaded on the server's
        // terms. Success, nothing written.
        tracing::debug!(path = %path.display(), "range not satisfiable, treating as complete");
    } else if !(200..300).contains(&status) {
        return Err(DownloadError::Transfer { status });
    } else {
        let (sink, partial_status) = {
            let mut st = state.borrow_mut();
            (
                std::mem::replace(&mut st.sink, Sink::Discard),
                st.partial_status,
            )
        };
        if let Sink::Writing(writer) = sink {
            // A full rewrite may leave stale bytes past the end; drop them.
            writer.finish(!partial_status)?;
        }
    }

    let check = completion_state(path, sha256sum, opts.filesize)?;
    if !matches!(check, CompletionState::Completed | CompletionState::Partial) {
        return Err(DownloadError::Verification(check));
    }

    let mut st = state.borrow_mut();
    let response = ResponseHead::from_lines(&st.lines);
    Ok(Retrieved {
        response: Some(response),
        advisories: std::mem::take(&mut st.advisories),
    })
}
