//! Decoder configuration

use crate::constants::DECODED_BUFFER_CAPACITY;
use serde::{Deserialize, Serialize};

/// Options shared by [`StreamReader`](crate::reader::StreamReader) and the
/// batch driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Compare each data chunk's masked CRC32C against its decoded block
    pub verify_checksums: bool,

    /// Keep a [`ReadStats`](crate::types::ReadStats) record on the handle
    pub collect_stats: bool,

    /// Capacity of the decoded-bytes buffer; never below one expanded block
    /// plus a full pass budget
    pub decoded_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            verify_checksums: false,
            collect_stats: false,
            decoded_capacity: DECODED_BUFFER_CAPACITY,
        }
    }
}

impl ReaderConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable checksum enforcement
    pub fn verify_checksums(mut self, enabled: bool) -> Self {
        self.verify_checksums = enabled;
        self
    }

    /// Enable or disable statistics collection
    pub fn collect_stats(mut self, enabled: bool) -> Self {
        self.collect_stats = enabled;
        self
    }

    /// Set the decoded buffer capacity (raised to the minimum if smaller)
    pub fn decoded_capacity(mut self, capacity: usize) -> Self {
        self.decoded_capacity = capacity.max(DECODED_BUFFER_CAPACITY);
        self
    }

    /// Decoded capacity actually used, after clamping
    pub(crate) fn effective_decoded_capacity(&self) -> usize {
        self.decoded_capacity.max(DECODED_BUFFER_CAPACITY)
    }
}
