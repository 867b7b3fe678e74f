//! Chunk decoding, one bounded refill-then-parse pass at a time
//!
//! The decoder never holds stream bytes itself: it reads chunks out of an
//! encoded [`RingBuffer`] and appends decoded blocks to a second one. The
//! same decoder drives both [`StreamReader`](crate::reader::StreamReader)
//! and the batch functions in [`crate::batch`].

use crate::checksum;
use crate::config::ReaderConfig;
use crate::constants::{
    ChunkType, CHECKSUM_SIZE, CHUNK_HEADER_SIZE, MAX_BLOCK_SIZE, MAX_COMPRESSED_CHUNK_LEN,
    MAX_UNCOMPRESSED_CHUNK_LEN, PASS_DECODE_BUDGET, STREAM_IDENTIFIER,
};
use crate::error::UnsnapError;
use crate::ring::RingBuffer;
use crate::types::{ChunkHeader, FrameTally};
use core::fmt;
use std::io::Read;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Outcome of one decode pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodePass {
    /// Bytes pulled from the source into the encoded buffer
    pub refilled: usize,

    /// Bytes consumed from the encoded buffer
    pub consumed: usize,

    /// Bytes appended to the decoded buffer
    pub produced: usize,

    /// Encoded bytes dropped as padding or skippable chunks
    pub skipped: usize,

    /// The source has reported end of input (now or on an earlier pass)
    pub source_exhausted: bool,

    /// Chunks fully handled during this pass
    pub frames: FrameTally,
}

impl DecodePass {
    /// Whether the pass moved the stream forward at all
    pub fn made_progress(&self) -> bool {
        self.consumed > 0 || self.produced > 0
    }
}

/// Frame-decode state machine for the Snappy stream framing format
pub struct FrameDecoder {
    block: snap::raw::Decoder,
    verify_checksums: bool,
    seen_identifier: bool,
    pending_skip: usize,
    source_exhausted: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("verify_checksums", &self.verify_checksums)
            .field("seen_identifier", &self.seen_identifier)
            .field("pending_skip", &self.pending_skip)
            .field("source_exhausted", &self.source_exhausted)
            .finish()
    }
}

impl FrameDecoder {
    /// Create a decoder with checksum verification disabled
    pub fn new() -> Self {
        Self {
            block: snap::raw::Decoder::new(),
            verify_checksums: false,
            seen_identifier: false,
            pending_skip: 0,
            source_exhausted: false,
        }
    }

    /// Create a decoder from a reader configuration
    pub fn with_config(config: &ReaderConfig) -> Self {
        Self {
            verify_checksums: config.verify_checksums,
            ..Self::new()
        }
    }

    /// Whether the source has reported end of input
    pub fn source_exhausted(&self) -> bool {
        self.source_exhausted
    }

    /// Whether a valid stream identifier has been consumed
    pub fn seen_identifier(&self) -> bool {
        self.seen_identifier
    }

    /// Bytes of an oversized skippable chunk still to be dropped
    pub fn pending_skip(&self) -> usize {
        self.pending_skip
    }

    /// Run one pass: refill `encoded` from `source`, then parse it into `decoded`
    pub fn decode_pass<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        encoded: &mut RingBuffer,
        decoded: &mut RingBuffer,
    ) -> Result<DecodePass, UnsnapError> {
        let refilled = self.refill(source, encoded)?;
        let mut pass = self.parse(encoded, decoded)?;
        pass.refilled = refilled;

        #[cfg(feature = "logging")]
        debug!(
            "Decode pass: refilled {} bytes, consumed {}, produced {}, exhausted={}",
            pass.refilled, pass.consumed, pass.produced, pass.source_exhausted
        );

        Ok(pass)
    }

    /// Top up `encoded` from `source`, returning the number of bytes read
    ///
    /// End of input is remembered and the source is not read again.
    pub fn refill<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        encoded: &mut RingBuffer,
    ) -> Result<usize, UnsnapError> {
        if self.source_exhausted {
            return Ok(0);
        }

        let free = encoded.free();
        let (n, eof) = encoded.fill_from(source, free)?;
        if eof {
            self.source_exhausted = true;

            #[cfg(feature = "logging")]
            debug!("Source exhausted with {} encoded bytes buffered", encoded.readable());
        }

        Ok(n)
    }

    /// Decode every complete chunk at the front of `encoded`
    ///
    /// Stops at a partial chunk, which stays buffered, or once the pass has
    /// produced [`PASS_DECODE_BUDGET`] bytes.
    pub fn parse(
        &mut self,
        encoded: &mut RingBuffer,
        decoded: &mut RingBuffer,
    ) -> Result<DecodePass, UnsnapError> {
        let mut pass = DecodePass {
            source_exhausted: self.source_exhausted,
            ..Default::default()
        };

        if self.pending_skip > 0 {
            let n = self.pending_skip.min(encoded.readable());
            encoded.advance(n)?;
            self.pending_skip -= n;
            pass.consumed += n;
            pass.skipped += n;
            if self.pending_skip > 0 {
                return Ok(pass);
            }
        }

        while pass.produced < PASS_DECODE_BUDGET {
            let view = encoded.view();
            let Some(header) = ChunkHeader::parse(view) else {
                break;
            };
            self.check_header(&header, encoded.capacity())?;

            let total = header.total_len();
            if header.chunk_type.is_skippable() && total > encoded.capacity() {
                // Cannot ever be buffered whole; drop it as it streams past
                let n = view.len();
                encoded.advance(n)?;
                self.pending_skip = total - n;
                pass.consumed += n;
                pass.skipped += n;
                pass.frames.record(header.chunk_type);

                #[cfg(feature = "logging")]
                debug!("Skipping oversized chunk 0x{:02x} of {} bytes", header.kind, total);

                break;
            }

            if view.len() < total {
                break;
            }

            let payload = &view[CHUNK_HEADER_SIZE..total];
            match header.chunk_type {
                ChunkType::StreamIdentifier => {
                    if payload != STREAM_IDENTIFIER {
                        return Err(UnsnapError::MalformedHeader(format!(
                            "bad stream identifier magic {:02x?}",
                            payload
                        )));
                    }
                    self.seen_identifier = true;

                    #[cfg(feature = "logging")]
                    debug!("Stream identifier accepted");
                }
                ChunkType::Compressed => {
                    pass.produced += self.decompress_block(payload, decoded)?;
                }
                ChunkType::Uncompressed => {
                    pass.produced += self.copy_block(payload, decoded)?;
                }
                ChunkType::Padding | ChunkType::Skippable => {
                    pass.skipped += total;

                    #[cfg(feature = "logging")]
                    debug!("Skipped chunk 0x{:02x} ({} bytes)", header.kind, total);
                }
                ChunkType::Unsupported => {
                    return Err(UnsnapError::UnsupportedChunkType(header.kind));
                }
            }

            encoded.advance(total)?;
            pass.consumed += total;
            pass.frames.record(header.chunk_type);
        }

        Ok(pass)
    }

    /// Reject chunks whose header alone is enough to make the stream undecodable
    fn check_header(&self, header: &ChunkHeader, capacity: usize) -> Result<(), UnsnapError> {
        if !self.seen_identifier && header.chunk_type != ChunkType::StreamIdentifier {
            return Err(UnsnapError::MalformedHeader(format!(
                "missing stream identifier, first chunk has kind 0x{:02x}",
                header.kind
            )));
        }

        match header.chunk_type {
            ChunkType::Unsupported => Err(UnsnapError::UnsupportedChunkType(header.kind)),
            ChunkType::StreamIdentifier if header.length as usize != STREAM_IDENTIFIER.len() => {
                Err(UnsnapError::MalformedHeader(format!(
                    "stream identifier length {}, expected {}",
                    header.length,
                    STREAM_IDENTIFIER.len()
                )))
            }
            ChunkType::Compressed | ChunkType::Uncompressed => {
                if (header.length as usize) < CHECKSUM_SIZE {
                    return Err(UnsnapError::CorruptBlock(format!(
                        "data chunk of {} bytes cannot hold a checksum",
                        header.length
                    )));
                }
                let limit = if header.chunk_type == ChunkType::Compressed {
                    MAX_COMPRESSED_CHUNK_LEN
                } else {
                    MAX_UNCOMPRESSED_CHUNK_LEN
                };
                let max = limit.min(capacity);
                if header.total_len() > max {
                    return Err(UnsnapError::FrameTooLarge {
                        length: header.total_len(),
                        max,
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn decompress_block(
        &mut self,
        payload: &[u8],
        decoded: &mut RingBuffer,
    ) -> Result<usize, UnsnapError> {
        let (expected, block) = split_checksum(payload);

        let len = snap::raw::decompress_len(block)
            .map_err(|e| UnsnapError::CorruptBlock(e.to_string()))?;
        if len > MAX_BLOCK_SIZE {
            return Err(UnsnapError::CorruptBlock(format!(
                "block expands to {} bytes, limit is {}",
                len, MAX_BLOCK_SIZE
            )));
        }
        if len > decoded.free() {
            return Err(UnsnapError::InternalSizingViolation {
                needed: len,
                available: decoded.free(),
            });
        }

        let spare = decoded.spare_mut();
        let n = self
            .block
            .decompress(block, &mut spare[..len])
            .map_err(|e| UnsnapError::CorruptBlock(e.to_string()))?;

        if self.verify_checksums {
            checksum::verify(expected, &spare[..n]).map_err(|(expected, actual)| {
                UnsnapError::ChecksumMismatch { expected, actual }
            })?;
        }

        decoded.commit(n)?;

        #[cfg(feature = "logging")]
        trace!("Compressed chunk: {} -> {} bytes", block.len(), n);

        Ok(n)
    }

    fn copy_block(&self, payload: &[u8], decoded: &mut RingBuffer) -> Result<usize, UnsnapError> {
        let (expected, block) = split_checksum(payload);

        if block.len() > decoded.free() {
            return Err(UnsnapError::InternalSizingViolation {
                needed: block.len(),
                available: decoded.free(),
            });
        }

        if self.verify_checksums {
            checksum::verify(expected, block).map_err(|(expected, actual)| {
                UnsnapError::ChecksumMismatch { expected, actual }
            })?;
        }

        let n = decoded.write(block);
        if n != block.len() {
            return Err(UnsnapError::InternalSizingViolation {
                needed: block.len(),
                available: n,
            });
        }

        #[cfg(feature = "logging")]
        trace!("Uncompressed chunk: {} bytes", n);

        Ok(n)
    }
}

/// Split a data chunk payload into its checksum and block
///
/// Callers have already checked that the payload holds at least the checksum.
fn split_checksum(payload: &[u8]) -> (u32, &[u8]) {
    let (field, block) = payload.split_at(CHECKSUM_SIZE);
    let expected = u32::from_le_bytes([field[0], field[1], field[2], field[3]]);
    (expected, block)
}
