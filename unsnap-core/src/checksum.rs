//! Masked CRC32C checksums carried by data chunks

use crate::constants::CHECKSUM_MASK_DELTA;

/// Compute the framing format's masked CRC32C of `data`
///
/// The raw Castagnoli CRC is rotated right by 15 bits and offset by
/// `0xa282ead8`, wrapping on overflow.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    mask(crc32c::crc32c(data))
}

/// Apply the rotation and offset to a raw CRC32C value
pub const fn mask(crc: u32) -> u32 {
    crc.rotate_right(15).wrapping_add(CHECKSUM_MASK_DELTA)
}

/// Compare a block against its transmitted checksum
///
/// Returns `(expected, actual)` on mismatch.
pub fn verify(expected: u32, block: &[u8]) -> Result<(), (u32, u32)> {
    let actual = masked_crc32c(block);
    if actual == expected {
        Ok(())
    } else {
        Err((expected, actual))
    }
}
