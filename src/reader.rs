//! The byte-source endpoint.

use std::io;
use std::sync::Arc;

use crate::error::PipeError;
use crate::park::ParkOutcome;
use crate::pipe::PipeInner;

/// The read half of a pipe. Exactly one exists per pipe.
pub struct Reader {
    inner: Arc<PipeInner>,
}

impl Reader {
    pub(crate) fn new(inner: Arc<PipeInner>) -> Self {
        Self { inner }
    }

    /// Non-blocking lower bound on bytes currently readable without suspension.
    pub fn available(&self) -> u64 {
        self.inner.available()
    }

    /// Reads up to `len` bytes into `dst[off..off+len]`.
    ///
    /// Returns `Some(n)` with `n` the number of bytes copied (copies at
    /// least 1 whenever it blocks and bytes subsequently arrive; never
    /// blocks for a *full* buffer), or `None` on EOF — no more bytes will
    /// ever arrive because the pipe is closed and already drained.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `off + len` is out of range for `dst`.
    pub fn read(&mut self, dst: &mut [u8], off: usize, len: usize) -> Result<Option<usize>, PipeError> {
        let end = off.checked_add(len).ok_or(PipeError::InvalidArgument)?;
        if end > dst.len() {
            return Err(PipeError::InvalidArgument);
        }
        if len == 0 {
            return Ok(Some(0));
        }
        let target = &mut dst[off..end];
        loop {
            let n = self.inner.try_read(target);
            if n > 0 {
                return Ok(Some(n));
            }
            // No bytes were available on this pass. If the pipe is closed,
            // one last try_read already ran above and returned 0, so there
            // is truly nothing left to flush; signal EOF. Otherwise suspend.
            if self.inner.is_closed() {
                return Ok(None);
            }
            match self.inner.park_reader() {
                ParkOutcome::Retry => continue,
                ParkOutcome::Closed => {
                    // The close may have raced with a final write; re-check
                    // occupancy once more before declaring EOF (§4.2 tie-break:
                    // any bytes committed before close must be delivered).
                    let n = self.inner.try_read(target);
                    if n > 0 {
                        return Ok(Some(n));
                    }
                    return Ok(None);
                }
            }
        }
    }

    /// Advances past up to `n` bytes without copying them. Same suspension
    /// and EOF rules as `read`.
    pub fn skip(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return Some(0);
        }
        loop {
            let skipped = self.inner.try_skip(n);
            if skipped > 0 {
                return Some(skipped);
            }
            if self.inner.is_closed() {
                return None;
            }
            match self.inner.park_reader() {
                ParkOutcome::Retry => continue,
                ParkOutcome::Closed => {
                    let skipped = self.inner.try_skip(n);
                    if skipped > 0 {
                        return Some(skipped);
                    }
                    return None;
                }
            }
        }
    }

    /// Reads a single byte, or `None` on EOF.
    pub fn read_single(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte, 0, 1) {
            Ok(Some(1)) => Some(byte[0]),
            Ok(_) => None,
            Err(_) => unreachable!("a 1-byte slice with off=0, len=1 is always in range"),
        }
    }

    /// Idempotent. Wakes a parked writer and causes future writes to fail
    /// with `PipeClosed`; any bytes already buffered remain readable.
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = buf.len();
        match self.read(buf, 0, len) {
            Ok(Some(n)) => Ok(n),
            Ok(None) => Ok(0),
            Err(_) => unreachable!("off=0, len=buf.len() is always in range"),
        }
    }
}
