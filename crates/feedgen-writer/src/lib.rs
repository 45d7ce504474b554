//! Streaming XML feed writer.
//!
//! [`StreamWriter`] writes one item at a time to a temporary file and only
//! replaces the published feed on a clean [`StreamWriter::close`].

pub mod error;
pub mod format;
pub mod writer;

pub use error::WriterError;
pub use format::{ChannelInfo, FeedFormat, ATOM_NS, GOOGLE_NS};
pub use writer::{FeedSummary, StreamWriter, WriterState, WRITE_BUFFER_BYTES};
