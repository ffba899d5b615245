//! The byte-sink endpoint.

use std::io;
use std::sync::Arc;

use crate::error::PipeError;
use crate::park::ParkOutcome;
use crate::pipe::PipeInner;

/// The write half of a pipe. Exactly one exists per pipe.
pub struct Writer {
    inner: Arc<PipeInner>,
}

impl Writer {
    pub(crate) fn new(inner: Arc<PipeInner>) -> Self {
        Self { inner }
    }

    /// Writes a single byte, suspending as needed.
    ///
    /// # Errors
    ///
    /// Returns `PipeClosed` if the pipe closes before the byte is accepted.
    pub fn write(&mut self, byte: u8) -> Result<(), PipeError> {
        self.write_bulk(&[byte], 0, 1)
    }

    /// Writes exactly `len` bytes from `src[off..off+len]`, suspending as
    /// needed. Returns only once every byte has been accepted, or fails with
    /// `PipeClosed` if the pipe closes first with bytes still unwritten.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `off + len` is out of range for `src`.
    /// Returns `PipeClosed` if the pipe is (or becomes) closed before all
    /// bytes are written; no partial write is possible from the caller's
    /// point of view — bytes already accepted before closure stay in the
    /// pipe for the reader to drain.
    pub fn write_bulk(&mut self, src: &[u8], off: usize, len: usize) -> Result<(), PipeError> {
        let end = off.checked_add(len).ok_or(PipeError::InvalidArgument)?;
        if end > src.len() {
            return Err(PipeError::InvalidArgument);
        }
        if len == 0 {
            return Ok(());
        }
        let mut remaining = &src[off..end];
        loop {
            if self.inner.is_closed() {
                return Err(PipeError::PipeClosed);
            }
            let written = self.inner.try_write(remaining);
            remaining = &remaining[written..];
            if remaining.is_empty() {
                return Ok(());
            }
            match self.inner.park_writer() {
                ParkOutcome::Retry => continue,
                ParkOutcome::Closed => {
                    // One last attempt: the reader may have freed room with
                    // its final read just before closing.
                    let written = self.inner.try_write(remaining);
                    remaining = &remaining[written..];
                    if remaining.is_empty() {
                        return Ok(());
                    }
                    return Err(PipeError::PipeClosed);
                }
            }
        }
    }

    /// Idempotent. Wakes a parked reader and causes all future writes (and
    /// the reader's future reads, once drained) to observe closure.
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // std::io::Write permits a short write; we write as much as fits
        // without suspending, falling back to a single suspend-and-retry
        // pass if nothing fit yet, matching Write::write's "may block"
        // contract without violating write_bulk's all-or-closed contract.
        let written = self.inner.try_write(buf);
        if written > 0 {
            return Ok(written);
        }
        loop {
            if self.inner.is_closed() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, PipeError::PipeClosed));
            }
            match self.inner.park_writer() {
                ParkOutcome::Retry => {
                    let written = self.inner.try_write(buf);
                    if written > 0 {
                        return Ok(written);
                    }
                }
                ParkOutcome::Closed => {
                    // One last attempt: the reader may have freed room with
                    // its final read just before closing.
                    let written = self.inner.try_write(buf);
                    if written > 0 {
                        return Ok(written);
                    }
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, PipeError::PipeClosed));
                }
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
