//! Integration tests for the complete encode → frame → incremental decode flow

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::io::{self, Read, Write};
use unsnap_core::{
    checksum::masked_crc32c,
    constants::{MAX_BLOCK_SIZE, MAX_UNCOMPRESSED_CHUNK_LEN, STREAM_IDENTIFIER_CHUNK},
    decode_all, decode_slice, ChunkHeader, ChunkType, ReadOutcome, ReaderConfig, StreamReader,
    UnsnapError,
};

/// Source that returns at most `step` bytes per read
struct ChunkedSource<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for ChunkedSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn frame(data: &[u8]) -> Vec<u8> {
    let mut encoder = snap::write::FrameEncoder::new(Vec::new());
    encoder.write_all(data).unwrap();
    encoder.into_inner().unwrap()
}

fn text_corpus(len: usize) -> Vec<u8> {
    let words = ["snappy ", "frame ", "chunk ", "stream ", "ring ", "buffer "];
    let mut rng = StdRng::seed_from_u64(7);
    let mut out = Vec::with_capacity(len + 8);
    while out.len() < len {
        out.extend_from_slice(words[rng.gen_range(0..words.len())].as_bytes());
    }
    out.truncate(len);
    out
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill(out.as_mut_slice());
    out
}

fn header(kind: u8, length: usize) -> [u8; 4] {
    ChunkHeader {
        kind,
        chunk_type: ChunkType::from_u8(kind),
        length: length as u32,
    }
    .to_bytes()
}

/// Split a framed stream into its chunks
fn split_chunks(stream: &[u8]) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut rest = stream;
    while let Some(header) = ChunkHeader::parse(rest) {
        let (chunk, tail) = rest.split_at(header.total_len());
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

fn read_all_chunks<R: Read>(reader: &mut StreamReader<R>, dst_len: usize) -> Result<Vec<u8>, UnsnapError> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; dst_len];
    loop {
        let outcome = reader.read_chunk(&mut buf)?;
        if outcome.done {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..outcome.count]);
    }
}

#[test]
fn test_round_trip_compressible() {
    let original = text_corpus(300_000);
    let framed = frame(&original);
    assert!(framed.len() < original.len());

    let mut decoded = Vec::new();
    StreamReader::new(framed.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn test_round_trip_incompressible_full_blocks() {
    // Random data is stored in maximal uncompressed chunks
    let original = random_bytes(3 * 65536 + 123, 1);
    let framed = frame(&original);

    let mut decoded = Vec::new();
    StreamReader::new(framed.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn test_round_trip_empty() {
    let framed = frame(&[]);
    assert_eq!(decode_slice(&framed).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_read_size_invariance() {
    let mut original = text_corpus(150_000);
    original.extend(random_bytes(70_000, 2));
    let framed = frame(&original);

    let reference = decode_slice(&framed).unwrap();
    assert_eq!(reference, original);

    for (step, dst_len) in [(1, 4096), (3, 1), (7, 13), (4096, 1), (65537, 100_000)] {
        let source = ChunkedSource {
            data: &framed,
            step,
        };
        let mut reader = StreamReader::new(source);
        let decoded = read_all_chunks(&mut reader, dst_len).unwrap();
        assert_eq!(decoded, reference, "step={} dst_len={}", step, dst_len);
    }
}

#[test]
fn test_terminal_state_is_idempotent() {
    let framed = frame(b"done is forever");
    let mut reader = StreamReader::new(framed.as_slice());

    let decoded = read_all_chunks(&mut reader, 64).unwrap();
    assert_eq!(decoded, b"done is forever");

    let mut buf = [0u8; 64];
    for _ in 0..5 {
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), ReadOutcome::DONE);
    }
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_padding_and_skippable_transparency() {
    let original = text_corpus(200_000);
    let framed = frame(&original);
    let chunks = split_chunks(&framed);
    assert!(chunks.len() > 3);

    let mut padded = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        padded.extend_from_slice(chunk);
        let kind = if i % 2 == 0 { 0xfe } else { 0x80 + (i % 0x7e) as u8 };
        let len = i * 37;
        padded.extend_from_slice(&header(kind, len));
        padded.extend(std::iter::repeat(0xa5).take(len));
    }

    let source = ChunkedSource {
        data: &padded,
        step: 999,
    };
    let mut reader = StreamReader::new(source);
    assert_eq!(read_all_chunks(&mut reader, 777).unwrap(), original);
}

#[test]
fn test_concatenated_streams() {
    let mut framed = frame(b"first stream, ");
    framed.extend(frame(b"second stream"));

    assert_eq!(decode_slice(&framed).unwrap(), b"first stream, second stream");
}

#[test]
fn test_truncated_compressed_block_is_corrupt() {
    let original = text_corpus(10_000);
    let framed = frame(&original);
    let chunks = split_chunks(&framed);
    let data = chunks[1];
    assert_eq!(data[0], 0x00, "expected a compressed chunk");

    // Drop the final byte of the block and shrink the length field to match
    let parsed = ChunkHeader::parse(data).unwrap();
    let mut stream = chunks[0].to_vec();
    stream.extend_from_slice(&header(0x00, parsed.length as usize - 1));
    stream.extend_from_slice(&data[4..data.len() - 1]);

    let mut reader = StreamReader::new(stream.as_slice());
    let err = read_all_chunks(&mut reader, 4096).unwrap_err();
    assert!(matches!(err, UnsnapError::CorruptBlock(_)), "got {:?}", err);
}

#[test]
fn test_full_block_compressed_chunk() {
    // Random data expands under compression, so this chunk is longer than any raw chunk
    let original = random_bytes(MAX_BLOCK_SIZE, 5);
    let block = snap::raw::Encoder::new().compress_vec(&original).unwrap();

    let mut stream = STREAM_IDENTIFIER_CHUNK.to_vec();
    stream.extend_from_slice(&header(0x00, 4 + block.len()));
    stream.extend_from_slice(&masked_crc32c(&original).to_le_bytes());
    stream.extend_from_slice(&block);
    assert!(stream.len() - STREAM_IDENTIFIER_CHUNK.len() > MAX_UNCOMPRESSED_CHUNK_LEN);

    let mut reference = Vec::new();
    snap::read::FrameDecoder::new(stream.as_slice())
        .read_to_end(&mut reference)
        .unwrap();
    assert_eq!(reference, original);

    assert_eq!(decode_slice(&stream).unwrap(), original);

    let config = ReaderConfig::new().verify_checksums(true);
    let source = ChunkedSource {
        data: &stream,
        step: 1000,
    };
    let mut reader = StreamReader::with_config(source, config);
    assert_eq!(read_all_chunks(&mut reader, 4096).unwrap(), original);
}

#[test]
fn test_bad_magic_emits_nothing() {
    let mut framed = frame(b"never seen");
    framed[9] = b'y';

    let mut reader = StreamReader::new(framed.as_slice());
    let mut buf = [0u8; 64];
    let err = reader.read_chunk(&mut buf).unwrap_err();

    assert!(matches!(err, UnsnapError::MalformedHeader(_)));
    assert!(reader.buffered_decoded().is_empty());
    assert_eq!(reader.read_chunk(&mut buf).unwrap_err(), err);
}

#[test]
fn test_stream_truncated_mid_chunk() {
    let framed = frame(&text_corpus(5_000));
    let cut = &framed[..framed.len() - 3];

    let mut reader = StreamReader::new(cut);
    let err = read_all_chunks(&mut reader, 512).unwrap_err();
    assert!(matches!(err, UnsnapError::TruncatedFrame { .. }));

    let mut out = Vec::new();
    let io_err = StreamReader::new(cut).read_to_end(&mut out).unwrap_err();
    assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_checksum_verification_against_encoder() {
    let original = random_bytes(20_000, 3);
    let framed = frame(&original);
    let config = ReaderConfig::new().verify_checksums(true);

    let mut decoded = Vec::new();
    StreamReader::with_config(framed.as_slice(), config.clone())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, original);

    // Flip a byte inside the first (uncompressed) block
    let mut damaged = framed.clone();
    assert_eq!(damaged[10], 0x01);
    damaged[10 + 4 + 4 + 100] ^= 0x01;

    let mut reader = StreamReader::with_config(damaged.as_slice(), config);
    let err = read_all_chunks(&mut reader, 4096).unwrap_err();
    assert!(matches!(err, UnsnapError::ChecksumMismatch { .. }));

    // Default configuration does not look at checksums
    let lenient = decode_slice(&damaged).unwrap();
    assert_eq!(lenient.len(), original.len());
    assert_ne!(lenient, original);
}

#[test]
fn test_missing_identifier() {
    let framed = frame(b"headless");
    let headless = &framed[STREAM_IDENTIFIER_CHUNK.len()..];

    let err = decode_slice(headless).unwrap_err();
    assert!(matches!(err, UnsnapError::MalformedHeader(_)));
}

#[test]
fn test_batch_and_stream_agree() {
    let mut original = text_corpus(90_000);
    original.extend(random_bytes(90_000, 4));
    let framed = frame(&original);

    let mut batch_out = Vec::new();
    let stats = decode_all(framed.as_slice(), &mut batch_out, &ReaderConfig::default()).unwrap();

    let config = ReaderConfig::new().collect_stats(true);
    let mut reader = StreamReader::with_config(framed.as_slice(), config);
    let stream_out = read_all_chunks(&mut reader, 10_000).unwrap();

    assert_eq!(batch_out, original);
    assert_eq!(stream_out, original);

    let stream_stats = reader.stats().unwrap();
    assert_eq!(stats.bytes_in, framed.len() as u64);
    assert_eq!(stream_stats.bytes_in, stats.bytes_in);
    assert_eq!(stream_stats.bytes_out, stats.bytes_out);
    assert_eq!(stream_stats.frames, stats.frames);
    assert_eq!(stats.frames.stream_identifiers, 1);
}

#[test]
fn test_open_file() {
    let path = std::env::temp_dir().join(format!("unsnap-open-{}.sz", std::process::id()));
    let original = text_corpus(40_000);
    std::fs::write(&path, frame(&original)).unwrap();

    let mut decoded = Vec::new();
    StreamReader::open(&path)
        .unwrap()
        .read_to_end(&mut decoded)
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn test_open_missing_file() {
    let err = StreamReader::open("/nonexistent/unsnap/input.sz").unwrap_err();
    assert!(matches!(
        err,
        UnsnapError::Source {
            kind: io::ErrorKind::NotFound,
            ..
        }
    ));
}
