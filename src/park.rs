//! The park-or-detect-close primitive (`SPEC_FULL.md` §4.3).
//!
//! `ParkSlot` is a single atomic tagged word shared by the writer and reader
//! side of one pipe. It holds exactly one of three things at any instant:
//!
//! - *empty*: no task is parked.
//! - *parked(handle)*: one task's `std::thread::Thread` handle, waiting to be
//!   woken by whichever side makes progress next.
//! - *closed*: a terminal sentinel; once set, never changes again.
//!
//! The representation is a single `AtomicUsize`: `EMPTY` and `CLOSED` are
//! reserved small sentinel values, and any other value is a `Box<Thread>`
//! pointer cast to `usize`. A heap allocation is never placed at address `0`
//! or `1`, so the sentinels can never collide with a live handle. This keeps
//! every transition a single CAS or swap on one word, with no separate lock
//! guarding the handle storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, Thread};

const EMPTY: usize = 0;
const CLOSED: usize = 1;

/// What a caller should do after `ParkSlot::wait` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParkOutcome {
    /// The other side made progress (or the wakeup was spurious). Re-enter
    /// the read/write loop from the top and re-check occupancy.
    Retry,
    /// The pipe is closed; no further progress will ever be made.
    Closed,
}

pub(crate) struct ParkSlot {
    state: AtomicUsize,
}

impl ParkSlot {
    pub(crate) const fn new() -> Self {
        Self {
            state: AtomicUsize::new(EMPTY),
        }
    }

    /// Blocks the current thread until the other endpoint makes progress or
    /// the pipe closes. Implements `SPEC_FULL.md` §4.3's numbered protocol.
    pub(crate) fn wait(&self) -> ParkOutcome {
        let my_handle = Box::into_raw(Box::new(thread::current()));
        let me = my_handle as usize;

        match self
            .state
            .compare_exchange(EMPTY, me, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {
                // We are now the single parked task. `thread::park` may
                // return spuriously; that is fine, because the only thing we
                // do on resumption is re-attempt the CAS below, and a
                // spurious wakeup simply finds the slot unchanged and hands
                // control back to the caller's retry loop, which will park
                // again if there is still truly nothing to do.
                thread::park();
                match self
                    .state
                    .compare_exchange(me, EMPTY, Ordering::SeqCst, Ordering::SeqCst)
                {
                    Ok(_) => {
                        // SAFETY: `me` was published by us and only we or
                        // whoever reclaims the slot away from `me` ever
                        // observes it; we just reclaimed it via a successful
                        // CAS, so we are the exclusive owner.
                        drop(unsafe { Box::from_raw(my_handle) });
                        ParkOutcome::Retry
                    }
                    Err(CLOSED) => {
                        // The slot moved to `Closed` while we slept. The
                        // closer's swap already reconstructed and freed our
                        // box (see `close`), so there is nothing left to do
                        // with `my_handle` here.
                        ParkOutcome::Closed
                    }
                    Err(_) => {
                        // Something other than `Closed` reclaimed the slot
                        // out from under us before we got to: either
                        // `wake_peer_if_parked` (an ordinary progress
                        // wakeup, not a close) already CASed `me` to `Empty`
                        // and freed/unparked our box, or it briefly went
                        // through `Empty` and another waiter has since
                        // parked there. Either way the pipe isn't closed and
                        // our box was already reclaimed by whoever made the
                        // transition, so we must not touch `my_handle` again.
                        ParkOutcome::Retry
                    }
                }
            }
            Err(CLOSED) => {
                // Never published; free our own handle.
                drop(unsafe { Box::from_raw(my_handle) });
                ParkOutcome::Closed
            }
            Err(other) => {
                // The other endpoint already has a parked handle in the
                // slot. Its presence is itself proof that side made
                // progress since it last checked, so we don't park at all —
                // we just wake it (std::thread::unpark is safe to call
                // before the target parks: the permit is simply deposited
                // early) and tell the caller to retry immediately.
                //
                // SAFETY: `other` is a live `Box<Thread>` pointer published
                // by the other endpoint's `wait` call; it remains valid
                // until that endpoint's own CAS reclaims and frees it, which
                // cannot race with this read-only borrow.
                let other_thread = unsafe { &*(other as *const Thread) };
                other_thread.unpark();
                drop(unsafe { Box::from_raw(my_handle) });
                ParkOutcome::Retry
            }
        }
    }

    /// Non-blocking: if a task is currently parked, wake it. Used after every
    /// successful cursor publish so a peer that parked earlier — and is never
    /// revisited by a publisher that always finds room/data and so never
    /// calls `wait` itself — is still woken (`SPEC_FULL.md` §4.2/§4.3, the
    /// resolved "progress notification" ambiguity).
    pub(crate) fn wake_peer_if_parked(&self) {
        loop {
            let current = self.state.load(Ordering::SeqCst);
            if current == EMPTY || current == CLOSED {
                return;
            }
            match self
                .state
                .compare_exchange(current, EMPTY, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => {
                    // SAFETY: our successful CAS is the unique transition
                    // away from `Parked(current)`, so we exclusively own the
                    // box and may reclaim and free it.
                    let parked = unsafe { Box::from_raw(current as *mut Thread) };
                    parked.unpark();
                    return;
                }
                Err(_) => continue, // raced with the peer parking/unparking/closing; retry read
            }
        }
    }

    /// Idempotent: transitions the slot to `Closed` and wakes whoever was
    /// parked, if anyone.
    pub(crate) fn close(&self) {
        let prior = self.state.swap(CLOSED, Ordering::SeqCst);
        if prior != EMPTY && prior != CLOSED {
            // SAFETY: `prior` is a handle published by exactly one `wait`
            // call; our swap is the unique transition away from it, so we
            // exclusively own the box.
            let parked = unsafe { Box::from_raw(prior as *mut Thread) };
            parked.unpark();
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CLOSED
    }
}

// SAFETY: the only non-atomic data reachable through `ParkSlot` is the
// `Box<Thread>` behind the tagged pointer, and the CAS protocol above
// guarantees exactly one side ever dereferences or frees a given pointer.
unsafe impl Send for ParkSlot {}
unsafe impl Sync for ParkSlot {}

impl Drop for ParkSlot {
    fn drop(&mut self) {
        let state = *self.state.get_mut();
        if state != EMPTY && state != CLOSED {
            // SAFETY: nothing else can observe `self` during `drop`, so any
            // still-parked handle (pipe dropped without either side closing
            // first) is ours alone to free.
            drop(unsafe { Box::from_raw(state as *mut Thread) });
        }
    }
}
