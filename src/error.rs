//! Error type shared by every stage of decoding

use std::convert::Infallible;

use thiserror::Error;

/// Errors that abort decoding of a chunk, and with it the whole sequence
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the structure being read requires
    #[error("Input ended at byte {position} before the current structure was complete")]
    TruncatedInput {
        /// Offset into the stream where input ran out
        position: usize,
    },
    /// A chunk did not start with the tag the decoder expected
    #[error("Expected a `{}` chunk, found `{}`", tag(.expected), tag(.found))]
    WrongChunkTag {
        /// The tag the decoder was looking for
        expected: [char; 4],
        /// The tag actually present in the stream
        found: [char; 4],
    },
    /// A data byte showed up where a status byte was needed and none was cached
    #[error("Data byte {byte:#04x} at byte {position} has no running status to reuse")]
    MissingRunningStatus {
        /// The offending data byte
        byte: u8,
        /// Offset of the data byte
        position: usize,
    },
    /// A system common or realtime status byte, which has no meaning inside a track chunk
    #[error("Unsupported status byte {status:#04x} at byte {position}")]
    UnsupportedStatus {
        /// The status byte
        status: u8,
        /// Offset of the status byte
        position: usize,
    },
    /// The header chunk declared a payload length other than 6. Only raised in strict mode
    #[error("Header chunk declares {0} bytes of payload, expected 6")]
    InvalidHeaderLength(u32),
    /// The underlying source could not be opened or read
    #[error("Failed to read MIDI source")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Returns true if the error was caused by running out of input
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }
}

impl From<Infallible> for DecodeError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

/// Renders a chunk tag for error messages
fn tag(chars: &[char; 4]) -> String {
    chars.iter().collect()
}

/// Result alias used throughout the decoder
pub type DecodeResult<T> = Result<T, DecodeError>;
