use thiserror::Error;

use crate::writer::WriterState;

/// Any writer failure aborts the destination; the previously published
/// file is left in place.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("cannot publish feed to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} is not allowed while the writer is {state}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },

    #[error("feed path {0} has no file name")]
    InvalidPath(String),
}
