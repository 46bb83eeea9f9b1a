//! Decoder error types.

use thiserror::Error;

/// Errors that can occur while decoding a BMS response frame.
///
/// A decode error is local to one frame. The telemetry record is left
/// exactly as it was before the failed call, so the caller can drop the
/// frame and keep polling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is too short for the decoder that owns it.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Request bytes that match no known command.
    #[error("unknown command: 0x{}", hex::encode(.0))]
    UnknownCommand(Vec<u8>),

    /// Version frame whose bytes cannot be rendered.
    ///
    /// Reserved. The firmware pads the hardware revision with
    /// non-printable bytes, which the decoder filters out rather than
    /// rejects, so nothing returns this today.
    #[error("malformed version bytes")]
    MalformedVersionBytes,
}
