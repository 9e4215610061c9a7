//! Error types surfaced by the SPAKE2 protocol layer.
//!
//! Field, scalar, and group arithmetic are total functions over well-formed
//! inputs and never fail; the only fallible primitive is point decompression,
//! which bubbles up as [`SpakeError::InvalidPoint`].

use thiserror::Error;

/// The fixed error set for the SPAKE2 context (see the protocol state machine
/// in [`crate::spake2`]).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SpakeError {
    /// An operation was called in a state that doesn't permit it (including
    /// after [`crate::spake2::Spake2Context::destroy`]).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A caller-supplied argument was malformed, e.g. the peer message was
    /// not exactly 32 bytes.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The peer's 32-byte message did not decode to a point on the curve.
    #[error("invalid point: peer message does not decode to a curve point")]
    InvalidPoint,

    /// A required cryptographic primitive is unavailable in the host
    /// environment (kept for parity with the abstract API; this crate's
    /// SHA-256/SHA-512 dependency is always available wherever it builds).
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}
