//! # Unsnap Core
//!
//! Incremental decoder for the Snappy stream framing format.
//!
//! A framed stream is a sequence of typed, length-prefixed chunks. This
//! crate turns such a stream back into the original bytes while holding at
//! most one chunk of encoded input and one pass worth of decoded output in
//! memory.
//!
//! ## Modules
//!
//! - `constants`: Chunk kinds, wire sizes and buffer capacities
//! - `types`: Chunk headers and decode statistics
//! - `ring`: Fixed-capacity ring buffer with a contiguous unread view
//! - `checksum`: Masked CRC32C
//! - `decoder`: The chunk decode state machine (one bounded pass at a time)
//! - `reader`: Pull-style `StreamReader` over any `Read` source
//! - `batch`: Whole-stream decoding into a `Write` sink
//! - `config`: Decoder options
//!
//! ## Example
//!
//! ```
//! use std::io::Read;
//! use unsnap_core::StreamReader;
//!
//! let framed: &[u8] = b"\xff\x06\x00\x00sNaPpY\x01\x09\x00\x00\x00\x00\x00\x00hello";
//! let mut out = String::new();
//! StreamReader::new(framed).read_to_string(&mut out).unwrap();
//! assert_eq!(out, "hello");
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod ring;
pub mod types;

// Re-export commonly used types
pub use batch::{decode_all, decode_slice};
pub use config::ReaderConfig;
pub use constants::ChunkType;
pub use decoder::{DecodePass, FrameDecoder};
pub use error::UnsnapError;
pub use reader::{ReadOutcome, ReaderState, StreamReader};
pub use ring::RingBuffer;
pub use types::{ChunkHeader, FrameTally, ReadStats};

/// Result type alias for unsnap operations
pub type Result<T> = core::result::Result<T, UnsnapError>;
