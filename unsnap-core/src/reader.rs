//! Incremental pull reader over a framed Snappy source
//!
//! [`StreamReader`] owns the source and both ring buffers. Each call to
//! [`StreamReader::read_chunk`] does a bounded amount of work: drain what is
//! already decoded, otherwise run a single decode pass and drain again.

use crate::config::ReaderConfig;
use crate::constants::ENCODED_BUFFER_CAPACITY;
use crate::decoder::{DecodePass, FrameDecoder};
use crate::error::UnsnapError;
use crate::ring::RingBuffer;
use crate::types::ReadStats;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Lifecycle of a stream handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
    /// Created, nothing read yet
    Opened,
    /// Handing out decoded bytes
    Draining,
    /// Running a decode pass
    Refilling,
    /// Source exhausted and both buffers empty
    Exhausted,
    /// A fatal error occurred; every later read returns it again
    Failed(UnsnapError),
}

impl ReaderState {
    /// Whether no further progress is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReaderState::Exhausted | ReaderState::Failed(_))
    }
}

/// Result of one [`StreamReader::read_chunk`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes written into the caller's buffer
    pub count: usize,

    /// End of stream reached; `count` is zero and will stay zero
    pub done: bool,
}

impl ReadOutcome {
    /// Terminal end-of-stream outcome
    pub const DONE: ReadOutcome = ReadOutcome {
        count: 0,
        done: true,
    };

    fn data(count: usize) -> Self {
        Self { count, done: false }
    }
}

/// Decoding reader for the Snappy stream framing format
///
/// Wraps any [`Read`] source holding a framed stream and yields the
/// original bytes, either through [`StreamReader::read_chunk`] or through
/// its [`Read`] implementation.
#[derive(Debug)]
pub struct StreamReader<R> {
    source: R,
    encoded: RingBuffer,
    decoded: RingBuffer,
    decoder: FrameDecoder,
    state: ReaderState,
    stats: Option<ReadStats>,
}

impl StreamReader<File> {
    /// Open a framed file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, UnsnapError> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open a framed file on disk with explicit options
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: ReaderConfig,
    ) -> Result<Self, UnsnapError> {
        let file = File::open(path)?;
        Ok(Self::with_config(file, config))
    }
}

impl<R: Read> StreamReader<R> {
    /// Wrap `source` with the default configuration
    pub fn new(source: R) -> Self {
        Self::with_config(source, ReaderConfig::default())
    }

    /// Wrap `source` with explicit options
    pub fn with_config(source: R, config: ReaderConfig) -> Self {
        Self {
            source,
            encoded: RingBuffer::new(ENCODED_BUFFER_CAPACITY),
            decoded: RingBuffer::new(config.effective_decoded_capacity()),
            decoder: FrameDecoder::with_config(&config),
            state: ReaderState::Opened,
            stats: config.collect_stats.then(ReadStats::default),
        }
    }

    /// Read decoded bytes into `dst`
    ///
    /// A result of `count == 0` with `done == false` is not end of stream:
    /// the call made progress that produced no output yet (a padding chunk,
    /// a partial chunk) and should simply be retried. Once `done` is
    /// returned it is returned forever; once an error is returned the same
    /// error is returned forever.
    pub fn read_chunk(&mut self, dst: &mut [u8]) -> Result<ReadOutcome, UnsnapError> {
        match &self.state {
            ReaderState::Failed(err) => return Err(err.clone()),
            ReaderState::Exhausted => return Ok(ReadOutcome::DONE),
            _ => {}
        }

        if dst.is_empty() {
            return Ok(ReadOutcome::data(0));
        }

        self.state = ReaderState::Draining;
        let n = self.decoded.read(dst);
        if n > 0 {
            return Ok(ReadOutcome::data(n));
        }

        self.state = ReaderState::Refilling;
        let pass = match self
            .decoder
            .decode_pass(&mut self.source, &mut self.encoded, &mut self.decoded)
        {
            Ok(pass) => pass,
            Err(err) => return Err(self.fail(err)),
        };
        self.record(&pass);

        self.state = ReaderState::Draining;
        let n = self.decoded.read(dst);
        if n > 0 {
            return Ok(ReadOutcome::data(n));
        }

        if pass.source_exhausted {
            if self.encoded.is_empty() && self.decoded.is_empty() && self.decoder.pending_skip() == 0
            {
                #[cfg(feature = "logging")]
                debug!("End of stream");

                self.state = ReaderState::Exhausted;
                return Ok(ReadOutcome::DONE);
            }

            if !pass.made_progress() {
                let buffered = self.encoded.readable();
                return Err(self.fail(UnsnapError::TruncatedFrame { buffered }));
            }
        }

        Ok(ReadOutcome::data(0))
    }

    /// Current lifecycle state
    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    /// Whether end of stream has been reached
    pub fn is_done(&self) -> bool {
        self.state == ReaderState::Exhausted
    }

    /// Statistics, when enabled through [`ReaderConfig::collect_stats`]
    pub fn stats(&self) -> Option<&ReadStats> {
        self.stats.as_ref()
    }

    /// Encoded bytes buffered but not yet decoded
    pub fn buffered_encoded(&self) -> &[u8] {
        self.encoded.view()
    }

    /// Decoded bytes not yet handed to the caller
    pub fn buffered_decoded(&self) -> &[u8] {
        self.decoded.view()
    }

    /// Borrow the underlying source
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Close the handle, discarding buffered state and returning the source
    pub fn into_inner(self) -> R {
        self.source
    }

    fn record(&mut self, pass: &DecodePass) {
        if let Some(stats) = self.stats.as_mut() {
            stats.passes += 1;
            stats.bytes_in += pass.refilled as u64;
            stats.bytes_out += pass.produced as u64;
            stats.skipped_bytes += pass.skipped as u64;
            stats.frames.merge(&pass.frames);
        }
    }

    fn fail(&mut self, err: UnsnapError) -> UnsnapError {
        #[cfg(feature = "logging")]
        warn!("Stream decode failed: {}", err);

        // Output of the failing pass is never handed out
        self.decoded.clear();
        self.state = ReaderState::Failed(err.clone());
        err
    }
}

impl<R: Read> Read for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let outcome = self.read_chunk(buf)?;
            if outcome.count > 0 || outcome.done {
                return Ok(outcome.count);
            }
        }
    }
}
