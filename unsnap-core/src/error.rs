//! Error types for unsnap operations

use std::io;

/// Errors that can occur while decoding a framed Snappy stream
///
/// Every variant is terminal for the stream it came from: once a reader has
/// produced one of these it keeps returning it. End of stream is not an error
/// and is reported through `ReadOutcome::done` instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsnapError {
    /// Stream identifier chunk missing, mis-sized or carrying the wrong magic
    #[error("Malformed stream header: {0}")]
    MalformedHeader(String),

    /// Chunk kind outside the data, padding and skippable ranges
    #[error("Unsupported chunk type: 0x{0:02x}")]
    UnsupportedChunkType(u8),

    /// Compressed block rejected by the block decompressor
    #[error("Corrupt block: {0}")]
    CorruptBlock(String),

    /// Decoded buffer could not take a whole block
    #[error("Decoded buffer too small: needed {needed} bytes, {available} available")]
    InternalSizingViolation {
        /// Bytes the block needed.
        needed: usize,
        /// Free bytes left in the decoded buffer.
        available: usize,
    },

    /// Data chunk declares more bytes than the encoded buffer can hold
    #[error("Chunk length {length} exceeds maximum {max}")]
    FrameTooLarge {
        /// Total chunk length including its header.
        length: usize,
        /// Largest chunk the decoder accepts.
        max: usize,
    },

    /// Masked CRC32C mismatch (only reported when verification is enabled)
    #[error("Checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// The checksum carried in the chunk.
        expected: u32,
        /// The checksum computed over the decoded block.
        actual: u32,
    },

    /// Source ended in the middle of a chunk
    #[error("Stream truncated: {buffered} bytes of an incomplete chunk left at end of input")]
    TruncatedFrame {
        /// Bytes of the unfinished chunk still buffered.
        buffered: usize,
    },

    /// Underlying byte source failed
    ///
    /// Only the kind and display text of the original `io::Error` are kept,
    /// which keeps the error `Clone + Eq` for the sticky failed state. A
    /// custom inner error is reachable through its text, not by downcasting.
    #[error("Source error ({kind:?}): {message}")]
    Source {
        /// The original I/O error kind.
        kind: io::ErrorKind,
        /// The original I/O error message.
        message: String,
    },

    /// Output sink failed (batch decoding only)
    #[error("Sink error ({kind:?}): {message}")]
    Sink {
        /// The original I/O error kind.
        kind: io::ErrorKind,
        /// The original I/O error message.
        message: String,
    },

    /// Ring buffer asked to consume more than it holds
    #[error("Cannot advance {requested} bytes, only {readable} readable")]
    AdvancePastEnd {
        /// Bytes requested.
        requested: usize,
        /// Bytes available.
        readable: usize,
    },
}

impl UnsnapError {
    /// Wrap a sink-side I/O error
    pub fn sink(err: io::Error) -> Self {
        UnsnapError::Sink {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Flattens the error to `kind` plus its display text; the inner error is dropped
impl From<io::Error> for UnsnapError {
    fn from(err: io::Error) -> Self {
        UnsnapError::Source {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<UnsnapError> for io::Error {
    fn from(err: UnsnapError) -> Self {
        let kind = match &err {
            UnsnapError::Source { kind, .. } | UnsnapError::Sink { kind, .. } => *kind,
            UnsnapError::TruncatedFrame { .. } => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
