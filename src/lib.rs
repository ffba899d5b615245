//! An in-memory, single-producer/single-consumer byte pipe.
//!
//! A [`Pipe`] connects exactly one [`Writer`] to exactly one [`Reader`]
//! through a fixed-capacity ring buffer, with the blocking and EOF semantics
//! of an operating-system pipe but no kernel involvement: `Writer::write`
//! suspends the calling thread when the buffer is full, `Reader::read`
//! suspends it when the buffer is empty, and closing either end propagates
//! to the other.
//!
//! # Key Features
//!
//! - Lock-free: no mutex is ever held across a suspension. Blocking is
//!   implemented with a single atomic "park slot" built on
//!   [`std::thread::park`]/[`std::thread::Thread::unpark`].
//! - Capacity is rounded up to the next power of two so that buffer indices
//!   are computed with a bitmask instead of a modulo.
//! - [`Writer`] and [`Reader`] implement [`std::io::Write`] and
//!   [`std::io::Read`] as thin adapters over their inherent APIs.
//!
//! # Example
//!
//! ```
//! use inmem_pipe::pipe;
//! use std::io::{Read, Write};
//! use std::thread;
//!
//! let (mut writer, mut reader) = pipe(16).unwrap();
//!
//! let producer = thread::spawn(move || {
//!     writer.write_all(b"hello").unwrap();
//!     writer.close();
//! });
//!
//! let mut buf = Vec::new();
//! reader.read_to_end(&mut buf).unwrap();
//! producer.join().unwrap();
//! assert_eq!(buf, b"hello");
//! ```

mod config;
mod error;
mod invariants;
mod park;
mod pipe;
mod reader;
mod writer;

use std::sync::Arc;

pub use error::PipeError;
pub use reader::Reader;
pub use writer::Writer;

use pipe::PipeInner;

/// Creates a new pipe, returning its writer and reader halves.
///
/// `capacity` is rounded up to the next power of two. Mirrors
/// [`std::sync::mpsc::channel`]'s paired-constructor shape.
///
/// # Errors
///
/// Returns `PipeError::InvalidArgument` if `capacity` is `0`.
pub fn pipe(capacity: usize) -> Result<(Writer, Reader), PipeError> {
    let inner = Arc::new(PipeInner::new(capacity)?);
    Ok((Writer::new(Arc::clone(&inner)), Reader::new(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::thread;

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(pipe(0).unwrap_err(), PipeError::InvalidArgument);
    }

    #[test]
    fn end_to_end_small_burst() {
        let (mut w, mut r) = pipe(16).unwrap();
        w.write_bulk(&[0, 1, 2, 3, 4, 5, 6, 7], 0, 8).unwrap();
        w.close();
        let mut buf = [0u8; 16];
        assert_eq!(r.read(&mut buf, 0, 16).unwrap(), Some(8));
        assert_eq!(&buf[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(r.read(&mut buf, 0, 16).unwrap(), None);
    }

    #[test]
    fn io_adapters_round_trip_across_threads() {
        let (mut writer, mut reader) = pipe(4).unwrap();
        let producer = thread::spawn(move || {
            for chunk in b"hello world".chunks(3) {
                writer.write_all(chunk).unwrap();
            }
            writer.close();
        });
        let mut received = Vec::new();
        reader.read_to_end(&mut received).unwrap();
        producer.join().unwrap();
        assert_eq!(received, b"hello world");
    }
}
