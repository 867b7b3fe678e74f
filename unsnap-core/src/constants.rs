//! Constants and limits for the Snappy stream framing format

use serde::{Deserialize, Serialize};

/// Payload of the stream identifier chunk
pub const STREAM_IDENTIFIER: &[u8; 6] = b"sNaPpY";

/// Complete stream identifier chunk: kind 0xff, length 6, then the magic bytes
pub const STREAM_IDENTIFIER_CHUNK: &[u8; 10] = b"\xff\x06\x00\x00sNaPpY";

/// Size of a chunk header (1 byte kind + 3 byte little-endian length)
pub const CHUNK_HEADER_SIZE: usize = 4;

/// Size of the masked CRC32C carried at the front of every data chunk
pub const CHECKSUM_SIZE: usize = 4;

/// Maximum number of uncompressed bytes a single data chunk may carry
pub const MAX_BLOCK_SIZE: usize = 65536;

/// Worst-case compressed size of a full block, as `snap::raw::max_compress_len(MAX_BLOCK_SIZE)`
pub const MAX_COMPRESSED_BLOCK_LEN: usize = 32 + MAX_BLOCK_SIZE + MAX_BLOCK_SIZE / 6;

/// Largest uncompressed chunk on the wire: header + checksum + a full raw block
pub const MAX_UNCOMPRESSED_CHUNK_LEN: usize = CHUNK_HEADER_SIZE + CHECKSUM_SIZE + MAX_BLOCK_SIZE;

/// Largest compressed chunk on the wire: header + checksum + a worst-case block
pub const MAX_COMPRESSED_CHUNK_LEN: usize =
    CHUNK_HEADER_SIZE + CHECKSUM_SIZE + MAX_COMPRESSED_BLOCK_LEN;

/// Capacity of the encoded-bytes ring buffer (one maximal data chunk of either kind)
pub const ENCODED_BUFFER_CAPACITY: usize = MAX_COMPRESSED_CHUNK_LEN;

/// Capacity of the decoded-bytes ring buffer (one expanded block plus slack)
pub const DECODED_BUFFER_CAPACITY: usize = 2 * MAX_BLOCK_SIZE;

/// Decoded bytes after which a decode pass stops starting new chunks
pub const PASS_DECODE_BUDGET: usize = MAX_BLOCK_SIZE;

/// Constant added to the rotated CRC32C to form the masked checksum
pub const CHECKSUM_MASK_DELTA: u32 = 0xa282_ead8;

/// Chunk kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkType {
    /// Stream identifier (0xff)
    StreamIdentifier,
    /// Snappy-compressed block (0x00)
    Compressed,
    /// Raw block (0x01)
    Uncompressed,
    /// Padding (0xfe)
    Padding,
    /// Reserved but skippable (0x80..=0xfd)
    Skippable,
    /// Reserved unskippable (0x02..=0x7f); fatal
    Unsupported,
}

impl ChunkType {
    /// Kind byte of a compressed data chunk
    pub const COMPRESSED: u8 = 0x00;

    /// Kind byte of an uncompressed data chunk
    pub const UNCOMPRESSED: u8 = 0x01;

    /// First reserved skippable kind byte
    pub const SKIPPABLE_FIRST: u8 = 0x80;

    /// Last reserved skippable kind byte
    pub const SKIPPABLE_LAST: u8 = 0xfd;

    /// Kind byte of a padding chunk
    pub const PADDING: u8 = 0xfe;

    /// Kind byte of the stream identifier chunk
    pub const STREAM_IDENTIFIER: u8 = 0xff;

    /// Classify a raw kind byte
    pub const fn from_u8(kind: u8) -> Self {
        match kind {
            Self::COMPRESSED => ChunkType::Compressed,
            Self::UNCOMPRESSED => ChunkType::Uncompressed,
            Self::PADDING => ChunkType::Padding,
            Self::STREAM_IDENTIFIER => ChunkType::StreamIdentifier,
            Self::SKIPPABLE_FIRST..=Self::SKIPPABLE_LAST => ChunkType::Skippable,
            _ => ChunkType::Unsupported,
        }
    }

    /// Whether the chunk is dropped without looking at its payload
    pub const fn is_skippable(&self) -> bool {
        matches!(self, ChunkType::Padding | ChunkType::Skippable)
    }
}
