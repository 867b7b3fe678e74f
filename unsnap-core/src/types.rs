//! Core types for framed Snappy streams

use crate::constants::{ChunkType, CHUNK_HEADER_SIZE};
use serde::{Deserialize, Serialize};

/// Parsed 4-byte chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkHeader {
    /// Raw kind byte
    pub kind: u8,

    /// Classified kind
    pub chunk_type: ChunkType,

    /// Payload length in bytes (24-bit on the wire)
    pub length: u32,
}

impl ChunkHeader {
    /// Parse a header from the front of `data`
    ///
    /// Returns `None` when fewer than four bytes are available.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return None;
        }

        let kind = data[0];
        let length = u32::from_le_bytes([data[1], data[2], data[3], 0]);

        Some(Self {
            kind,
            chunk_type: ChunkType::from_u8(kind),
            length,
        })
    }

    /// Header plus payload length
    pub fn total_len(&self) -> usize {
        CHUNK_HEADER_SIZE + self.length as usize
    }

    /// Encode the header back to wire form
    pub fn to_bytes(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let len = self.length.to_le_bytes();
        [self.kind, len[0], len[1], len[2]]
    }
}

/// Number of chunks seen, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTally {
    /// Stream identifier chunks
    pub stream_identifiers: u64,

    /// Compressed data chunks
    pub compressed: u64,

    /// Uncompressed data chunks
    pub uncompressed: u64,

    /// Padding chunks
    pub padding: u64,

    /// Reserved skippable chunks
    pub skippable: u64,
}

impl FrameTally {
    /// Count one chunk of the given kind
    pub fn record(&mut self, chunk_type: ChunkType) {
        match chunk_type {
            ChunkType::StreamIdentifier => self.stream_identifiers += 1,
            ChunkType::Compressed => self.compressed += 1,
            ChunkType::Uncompressed => self.uncompressed += 1,
            ChunkType::Padding => self.padding += 1,
            ChunkType::Skippable => self.skippable += 1,
            ChunkType::Unsupported => {}
        }
    }

    /// Add another tally into this one
    pub fn merge(&mut self, other: &FrameTally) {
        self.stream_identifiers += other.stream_identifiers;
        self.compressed += other.compressed;
        self.uncompressed += other.uncompressed;
        self.padding += other.padding;
        self.skippable += other.skippable;
    }

    /// Total chunks counted
    pub fn total(&self) -> u64 {
        self.stream_identifiers + self.compressed + self.uncompressed + self.padding + self.skippable
    }

    /// Data chunks counted
    pub fn data_chunks(&self) -> u64 {
        self.compressed + self.uncompressed
    }
}

/// Decode statistics for one stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadStats {
    /// Decode passes run
    pub passes: u64,

    /// Encoded bytes pulled from the source
    pub bytes_in: u64,

    /// Decoded bytes produced
    pub bytes_out: u64,

    /// Encoded bytes dropped as padding or skippable chunks (headers included)
    pub skipped_bytes: u64,

    /// Chunks seen, by kind
    pub frames: FrameTally,
}

impl ReadStats {
    /// Decoded bytes per encoded byte
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }
}
