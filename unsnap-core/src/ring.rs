//! Fixed-capacity ring buffer with a contiguous unread view
//!
//! Unread bytes always occupy one contiguous run of the backing storage, so
//! [`RingBuffer::view`] can hand the frame parser a plain slice. The run is
//! slid back to the front lazily, only when an append needs the room.

use crate::error::UnsnapError;
use core::fmt;
use std::io::{self, ErrorKind, Read, Write};

/// Fixed-capacity byte buffer consumed from the front and appended at the back
pub struct RingBuffer {
    buf: Box<[u8]>,
    start: usize,
    readable: usize,
}

impl RingBuffer {
    /// Create an empty buffer holding at most `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            start: 0,
            readable: 0,
        }
    }

    /// Total number of bytes the buffer can hold
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unread bytes
    pub fn readable(&self) -> usize {
        self.readable
    }

    /// Alias for [`RingBuffer::readable`]
    pub fn len(&self) -> usize {
        self.readable
    }

    /// Whether there is nothing left to read
    pub fn is_empty(&self) -> bool {
        self.readable == 0
    }

    /// Number of bytes that can still be appended
    pub fn free(&self) -> usize {
        self.capacity() - self.readable
    }

    /// Drop all unread bytes
    pub fn clear(&mut self) {
        self.start = 0;
        self.readable = 0;
    }

    /// Contiguous view of every unread byte, without consuming it
    pub fn view(&self) -> &[u8] {
        &self.buf[self.start..self.start + self.readable]
    }

    /// Consume `n` bytes from the front without copying them
    pub fn advance(&mut self, n: usize) -> Result<(), UnsnapError> {
        if n > self.readable {
            return Err(UnsnapError::AdvancePastEnd {
                requested: n,
                readable: self.readable,
            });
        }
        self.start += n;
        self.readable -= n;
        if self.readable == 0 {
            self.start = 0;
        }
        Ok(())
    }

    /// Append as much of `src` as fits, returning the number of bytes taken
    ///
    /// A short count is not an error; callers that need the whole slice
    /// stored must compare the result with `src.len()`.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.free());
        if n == 0 {
            return 0;
        }
        self.spare_mut()[..n].copy_from_slice(&src[..n]);
        self.readable += n;
        n
    }

    /// Copy up to `dst.len()` unread bytes into `dst` and consume them
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.readable);
        if n == 0 {
            return 0;
        }
        dst[..n].copy_from_slice(&self.view()[..n]);
        self.start += n;
        self.readable -= n;
        if self.readable == 0 {
            self.start = 0;
        }
        n
    }

    /// Contiguous free tail, compacting unread bytes to the front first
    ///
    /// Bytes written here stay invisible until [`RingBuffer::commit`].
    pub fn spare_mut(&mut self) -> &mut [u8] {
        self.compact();
        let end = self.readable;
        &mut self.buf[end..]
    }

    /// Publish `n` bytes previously written into [`RingBuffer::spare_mut`]
    pub fn commit(&mut self, n: usize) -> Result<(), UnsnapError> {
        let available = self.capacity() - (self.start + self.readable);
        if n > available {
            return Err(UnsnapError::InternalSizingViolation {
                needed: n,
                available,
            });
        }
        self.readable += n;
        Ok(())
    }

    /// Read from `reader` straight into free space
    ///
    /// Keeps reading until `max` bytes arrived, the buffer is full, or the
    /// reader reports end of input. Returns the byte count and whether end of
    /// input was seen. `Interrupted` reads are retried; any other error is
    /// returned as is, with bytes read before it left in the buffer.
    pub fn fill_from<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
        max: usize,
    ) -> io::Result<(usize, bool)> {
        let want = max.min(self.free());
        let mut total = 0;

        while total < want {
            let spare = self.spare_mut();
            match reader.read(&mut spare[..want - total]) {
                Ok(0) => return Ok((total, true)),
                Ok(n) => {
                    self.readable += n;
                    total += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok((total, false))
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.buf
                .copy_within(self.start..self.start + self.readable, 0);
            self.start = 0;
        }
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("start", &self.start)
            .field("readable", &self.readable)
            .finish()
    }
}

impl bytes::Buf for RingBuffer {
    fn remaining(&self) -> usize {
        self.readable
    }

    fn chunk(&self) -> &[u8] {
        self.view()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.readable,
            "cannot advance past `remaining`: {} <= {}",
            cnt,
            self.readable
        );
        self.start += cnt;
        self.readable -= cnt;
        if self.readable == 0 {
            self.start = 0;
        }
    }
}

impl Read for RingBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(RingBuffer::read(self, buf))
    }
}

impl Write for RingBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RingBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
