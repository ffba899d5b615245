use thiserror::Error;

/// Error returned by pipe endpoint operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipeError {
    /// A buffer/offset/length triple was out of range, or the requested capacity
    /// at construction was zero. Raised synchronously; never mutates state.
    #[error("invalid argument: out-of-range buffer bounds or non-positive capacity")]
    InvalidArgument,
    /// The pipe has been closed. Only ever returned to a writer; readers observe
    /// closure as an eventual EOF once the remaining bytes have drained.
    #[error("pipe is closed")]
    PipeClosed,
}
