//! Resume-aware single-stream HTTP retrieval with integrity verification.
//!
//! [`retrieve`] downloads a URL into a local file, resuming from the bytes
//! already on disk via an HTTP `Range` request and verifying the final
//! artifact against an expected SHA-256 or size. Invoking it on an
//! already-complete file is a no-op: no request is made.
//!
//! The crate emits `tracing` events but installs no subscriber; retries,
//! locking against concurrent invocations on the same path, and cancellation
//! (abort the transport) are the caller's responsibility.

pub mod error;
pub mod range;
pub mod response;
pub mod resume;
pub mod retrieve;
pub mod transport;
pub mod verify;
pub mod writer;

pub use error::DownloadError;
pub use range::ContentRange;
pub use response::ResponseHead;
pub use resume::Advisory;
pub use retrieve::{retrieve, Retrieved, RetrieveOptions};
pub use transport::TransportOptions;
pub use verify::{completion_state, sha256_path, CompletionState};
pub use writer::{StreamWriter, CHUNK_SIZE};
