//! Fuzz entry points for unsnap-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Call these from fuzz targets, e.g. `fuzz_target!(|data: &[u8]| fuzz_stream_reader(data))`

use std::io::Read;
use unsnap_core::{constants::STREAM_IDENTIFIER_CHUNK, decode_slice, StreamReader};

/// Drive the incremental reader over arbitrary input with small reads
pub fn fuzz_stream_reader(data: &[u8]) {
    let mut reader = StreamReader::new(data);
    let mut buf = [0u8; 97];

    // Every call either yields bytes, consumes input, or ends the stream
    while let Ok(outcome) = reader.read_chunk(&mut buf) {
        if outcome.done {
            break;
        }
    }
}

/// Decode arbitrary input in one shot, with and without a valid identifier
pub fn fuzz_decode_slice(data: &[u8]) {
    let _ = decode_slice(data);

    let mut stream = STREAM_IDENTIFIER_CHUNK.to_vec();
    stream.extend_from_slice(data);
    let mut out = Vec::new();
    let _ = StreamReader::new(stream.as_slice()).read_to_end(&mut out);
}
