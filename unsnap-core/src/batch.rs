//! Whole-stream decoding into a writer
//!
//! Uses the same [`FrameDecoder`] as the incremental reader, draining the
//! decoded buffer into the sink after every pass.

use crate::config::ReaderConfig;
use crate::constants::ENCODED_BUFFER_CAPACITY;
use crate::decoder::FrameDecoder;
use crate::error::UnsnapError;
use crate::ring::RingBuffer;
use crate::types::ReadStats;
use std::io::{Read, Write};

#[cfg(feature = "logging")]
use tracing::debug;

/// Decode an entire framed stream from `source` into `sink`
///
/// Returns statistics for the whole run. Fails on the first fatal decode
/// error; bytes decoded before it have already been written to `sink`.
pub fn decode_all<R: Read, W: Write>(
    mut source: R,
    mut sink: W,
    config: &ReaderConfig,
) -> Result<ReadStats, UnsnapError> {
    let mut encoded = RingBuffer::new(ENCODED_BUFFER_CAPACITY);
    let mut decoded = RingBuffer::new(config.effective_decoded_capacity());
    let mut decoder = FrameDecoder::with_config(config);
    let mut stats = ReadStats::default();

    loop {
        let pass = decoder.decode_pass(&mut source, &mut encoded, &mut decoded)?;

        stats.passes += 1;
        stats.bytes_in += pass.refilled as u64;
        stats.bytes_out += pass.produced as u64;
        stats.skipped_bytes += pass.skipped as u64;
        stats.frames.merge(&pass.frames);

        if !decoded.is_empty() {
            sink.write_all(decoded.view()).map_err(UnsnapError::sink)?;
            decoded.clear();
        }

        if pass.source_exhausted {
            if encoded.is_empty() && decoder.pending_skip() == 0 {
                break;
            }
            if !pass.made_progress() {
                return Err(UnsnapError::TruncatedFrame {
                    buffered: encoded.readable(),
                });
            }
        }
    }

    sink.flush().map_err(UnsnapError::sink)?;

    #[cfg(feature = "logging")]
    debug!(
        "Batch decode complete: {} bytes in, {} bytes out, {} chunks",
        stats.bytes_in,
        stats.bytes_out,
        stats.frames.total()
    );

    Ok(stats)
}

/// Decode an in-memory framed stream
pub fn decode_slice(data: &[u8]) -> Result<Vec<u8>, UnsnapError> {
    let mut out = Vec::with_capacity(data.len() * 2);
    decode_all(data, &mut out, &ReaderConfig::default())?;
    Ok(out)
}
