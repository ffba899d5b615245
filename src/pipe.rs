//! The shared ring buffer state behind one writer and one reader.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

use crate::config::Config;
use crate::error::PipeError;
use crate::invariants::{debug_assert_bounded_occupancy, debug_assert_monotonic};
use crate::park::{ParkOutcome, ParkSlot};

/// State shared by the `Writer` and `Reader` halves of one pipe. Both
/// endpoints hold an `Arc<PipeInner>`; the last one dropped frees the
/// buffer.
pub(crate) struct PipeInner {
    buffer: UnsafeCell<Box<[u8]>>,
    mask: usize,
    write_pos: CachePadded<AtomicU64>,
    read_pos: CachePadded<AtomicU64>,
    park_slot: ParkSlot,
}

// SAFETY: `buffer` is only ever touched through the disjoint byte ranges
// `[R mod cap, W mod cap)` (reader) and its complement (writer), guarded by
// the acquire/release handshake on `read_pos`/`write_pos` documented on each
// access below. Exactly one writer and one reader ever exist for a given
// `PipeInner`.
unsafe impl Send for PipeInner {}
unsafe impl Sync for PipeInner {}

impl PipeInner {
    pub(crate) fn new(requested_capacity: usize) -> Result<Self, PipeError> {
        let config = Config::new(requested_capacity)?;
        let buffer = vec![0u8; config.capacity()].into_boxed_slice();
        Ok(Self {
            buffer: UnsafeCell::new(buffer),
            mask: config.mask(),
            write_pos: CachePadded::new(AtomicU64::new(0)),
            read_pos: CachePadded::new(AtomicU64::new(0)),
            park_slot: ParkSlot::new(),
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Non-blocking snapshot of occupancy. Advisory only (§4.4: relaxed/opaque).
    pub(crate) fn available(&self) -> u64 {
        let w = self.write_pos.load(Ordering::Relaxed);
        let r = self.read_pos.load(Ordering::Acquire);
        w.saturating_sub(r)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.park_slot.is_closed()
    }

    pub(crate) fn close(&self) {
        self.park_slot.close();
    }

    /// Blocks until the reader has consumed bytes or the pipe closes.
    /// Returns `ParkOutcome::Closed` if the caller should stop retrying.
    pub(crate) fn park_writer(&self) -> ParkOutcome {
        self.park_slot.wait()
    }

    pub(crate) fn park_reader(&self) -> ParkOutcome {
        self.park_slot.wait()
    }

    fn wake_peer(&self) {
        self.park_slot.wake_peer_if_parked();
    }

    /// Copies `src` into the ring starting at buffer index `start`, wrapping
    /// as needed. `src.len()` must not exceed the free space; callers
    /// guarantee this before calling.
    ///
    /// SAFETY: the caller must hold exclusive writer-side access to the
    /// region being written (i.e. this is called only from the writer), and
    /// `src.len()` bytes of free space must already have been established by
    /// an acquire load of `read_pos`.
    unsafe fn copy_in(&self, start: usize, src: &[u8]) {
        let capacity = self.capacity();
        let buffer = &mut *self.buffer.get();
        let first_len = src.len().min(capacity - start);
        buffer[start..start + first_len].copy_from_slice(&src[..first_len]);
        if first_len < src.len() {
            let remainder = &src[first_len..];
            buffer[..remainder.len()].copy_from_slice(remainder);
        }
    }

    /// Copies from the ring starting at buffer index `start` into `dst`,
    /// wrapping as needed. `dst.len()` must not exceed the available bytes.
    ///
    /// SAFETY: the caller must hold exclusive reader-side access to the
    /// region being read, and `dst.len()` bytes of available data must
    /// already have been established by an acquire load of `write_pos`.
    unsafe fn copy_out(&self, start: usize, dst: &mut [u8]) {
        let capacity = self.capacity();
        let buffer = &*self.buffer.get();
        let first_len = dst.len().min(capacity - start);
        dst[..first_len].copy_from_slice(&buffer[start..start + first_len]);
        if first_len < dst.len() {
            let remaining = dst.len() - first_len;
            dst[first_len..].copy_from_slice(&buffer[..remaining]);
        }
    }

    /// Writes as many bytes of `src` as currently fit without suspending.
    /// Returns the number of bytes written (may be 0 if the buffer is full).
    pub(crate) fn try_write(&self, src: &[u8]) -> usize {
        if src.is_empty() {
            return 0;
        }
        let w = self.write_pos.load(Ordering::Relaxed);
        let r = self.read_pos.load(Ordering::Acquire);
        let free = self.capacity() as u64 - (w - r);
        let n = free.min(src.len() as u64) as usize;
        if n == 0 {
            return 0;
        }
        let start = (w as usize) & self.mask;
        // SAFETY: `n` bytes of free space were just established above by an
        // acquire load of `read_pos`, and only the writer ever calls `copy_in`.
        unsafe { self.copy_in(start, &src[..n]) };
        let new_w = w + n as u64;
        debug_assert_bounded_occupancy!(new_w, r, self.capacity());
        debug_assert_monotonic!("write_pos", w, new_w);
        self.write_pos.store(new_w, Ordering::Release);
        self.wake_peer();
        n
    }

    /// Reads as many bytes as currently fit into `dst` without suspending.
    /// Returns the number of bytes read (may be 0 if the buffer is empty).
    pub(crate) fn try_read(&self, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }
        let r = self.read_pos.load(Ordering::Relaxed);
        let w = self.write_pos.load(Ordering::Acquire);
        let available = w - r;
        let n = available.min(dst.len() as u64) as usize;
        if n == 0 {
            return 0;
        }
        let start = (r as usize) & self.mask;
        // SAFETY: `n` bytes of available data were just established above by
        // an acquire load of `write_pos`, and only the reader ever calls
        // `copy_out`.
        unsafe { self.copy_out(start, &mut dst[..n]) };
        let new_r = r + n as u64;
        debug_assert_bounded_occupancy!(w, new_r, self.capacity());
        debug_assert_monotonic!("read_pos", r, new_r);
        self.read_pos.store(new_r, Ordering::Release);
        self.wake_peer();
        n
    }

    /// Advances `read_pos` by up to `n` bytes without copying. Mirrors
    /// `try_read`'s availability computation. `skip`'s load of `write_pos`
    /// stays relaxed/opaque per §4.4 and §9's documented single-reader
    /// assumption: correct only because `read_pos` is touched by this one
    /// reader alone.
    pub(crate) fn try_skip(&self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        let r = self.read_pos.load(Ordering::Relaxed);
        let w = self.write_pos.load(Ordering::Relaxed);
        let available = w - r;
        let skipped = available.min(n);
        if skipped == 0 {
            return 0;
        }
        let new_r = r + skipped;
        debug_assert_monotonic!("read_pos", r, new_r);
        self.read_pos.store(new_r, Ordering::Release);
        self.wake_peer();
        skipped
    }
}
