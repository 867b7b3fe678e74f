//! Fixed wire-format test vectors
//!
//! Every vector is a complete framed stream written out in hex, together
//! with the output or error a conforming decoder must produce.

use std::io::Read;
use unsnap_core::{
    checksum::masked_crc32c, decode_slice, ReadOutcome, ReaderConfig, StreamReader, UnsnapError,
};

const IDENTIFIER: &str = "ff060000734e61507059";

/// Uncompressed "hello" with its real masked checksum
const HELLO_UNCOMPRESSED: &str = "01090000bb1f1c1968656c6c6f";

/// Compressed "hello": varint length 5, one literal
const HELLO_COMPRESSED: &str = "000b0000bb1f1c19051068656c6c6f";

/// Compressed twenty 'a': one literal, then a copy of length 19 at offset 1
const TWENTY_A_COMPRESSED: &str = "000a0000f1ea4dca140061";
const TWENTY_A_COPY: &str = "4a0100";

fn vector(parts: &[&str]) -> Vec<u8> {
    hex::decode(parts.concat()).unwrap()
}

fn decode_stream(data: &[u8], config: ReaderConfig) -> Result<Vec<u8>, UnsnapError> {
    let mut reader = StreamReader::with_config(data, config);
    let mut out = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        let outcome = reader.read_chunk(&mut buf)?;
        if outcome == ReadOutcome::DONE {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..outcome.count]);
    }
}

#[test]
fn test_vector_checksums() {
    assert_eq!(masked_crc32c(b"hello"), 0x191c_1fbb);
    assert_eq!(masked_crc32c(&[b'a'; 20]), 0xca4d_eaf1);
}

#[test]
fn test_identifier_only() {
    let data = vector(&[IDENTIFIER]);
    assert_eq!(decode_slice(&data).unwrap(), b"");
}

#[test]
fn test_uncompressed_hello() {
    let data = vector(&[IDENTIFIER, HELLO_UNCOMPRESSED]);
    let strict = ReaderConfig::new().verify_checksums(true);
    assert_eq!(decode_stream(&data, strict).unwrap(), b"hello");
}

#[test]
fn test_placeholder_checksum_hello() {
    // Checksum bytes are placeholders; accepted because verification is off
    let data = vector(&[IDENTIFIER, "01090000c0c1c2c3", "68656c6c6f"]);
    assert_eq!(decode_stream(&data, ReaderConfig::default()).unwrap(), b"hello");

    let strict = ReaderConfig::new().verify_checksums(true);
    assert_eq!(
        decode_stream(&data, strict),
        Err(UnsnapError::ChecksumMismatch {
            expected: 0xc3c2_c1c0,
            actual: 0x191c_1fbb,
        })
    );
}

#[test]
fn test_compressed_hello() {
    let data = vector(&[IDENTIFIER, HELLO_COMPRESSED]);
    let strict = ReaderConfig::new().verify_checksums(true);
    assert_eq!(decode_stream(&data, strict).unwrap(), b"hello");
}

#[test]
fn test_compressed_back_reference() {
    let data = vector(&[IDENTIFIER, TWENTY_A_COMPRESSED, TWENTY_A_COPY]);
    let strict = ReaderConfig::new().verify_checksums(true);
    assert_eq!(decode_stream(&data, strict).unwrap(), [b'a'; 20]);
}

#[test]
fn test_mixed_with_padding_and_skippable() {
    let data = vector(&[
        IDENTIFIER,
        "fe000000",
        HELLO_UNCOMPRESSED,
        "80030000010203",
        HELLO_COMPRESSED,
        "fd0100007f",
        "fe020000ffff",
    ]);
    assert_eq!(decode_slice(&data).unwrap(), b"hellohello");
}

#[test]
fn test_repeated_identifier() {
    let data = vector(&[IDENTIFIER, HELLO_UNCOMPRESSED, IDENTIFIER, HELLO_COMPRESSED]);
    assert_eq!(decode_slice(&data).unwrap(), b"hellohello");
}

#[test]
fn test_bad_magic() {
    let data = vector(&["ff060000734e61507058", HELLO_UNCOMPRESSED]);
    assert!(matches!(
        decode_slice(&data),
        Err(UnsnapError::MalformedHeader(_))
    ));
}

#[test]
fn test_missing_identifier() {
    let data = vector(&[HELLO_UNCOMPRESSED]);
    assert!(matches!(
        decode_slice(&data),
        Err(UnsnapError::MalformedHeader(_))
    ));
}

#[test]
fn test_padding_before_identifier() {
    let data = vector(&["fe000000", IDENTIFIER, HELLO_UNCOMPRESSED]);
    assert!(matches!(
        decode_slice(&data),
        Err(UnsnapError::MalformedHeader(_))
    ));
}

#[test]
fn test_reserved_unskippable() {
    for kind in ["02", "10", "7f"] {
        let data = vector(&[IDENTIFIER, kind, "000000"]);
        let expected = u8::from_str_radix(kind, 16).unwrap();
        assert_eq!(
            decode_slice(&data),
            Err(UnsnapError::UnsupportedChunkType(expected))
        );
    }
}

#[test]
fn test_corrupt_compressed_block() {
    // Declares 5 bytes but carries a literal of 6
    let data = vector(&[IDENTIFIER, "000c0000bb1f1c1905146868656c6c6f"]);
    assert!(matches!(
        decode_slice(&data),
        Err(UnsnapError::CorruptBlock(_))
    ));
}

#[test]
fn test_hello_with_short_length_field() {
    // Length field of 5 leaves only "h" as the block and misaligns the rest.
    // The failing pass is discarded as a whole, so not even "h" is emitted.
    let data = vector(&[IDENTIFIER, "01050000c0c1c2c3", "68656c6c6f"]);

    let mut reader = StreamReader::new(data.as_slice());
    let mut out = Vec::new();
    let err = reader.read_to_end(&mut out).unwrap_err();

    assert!(out.is_empty());
    assert!(err.to_string().contains("0x65"));
    assert_eq!(
        reader.state(),
        &unsnap_core::ReaderState::Failed(UnsnapError::UnsupportedChunkType(0x65))
    );
}
