use thiserror::Error;

/// Errors produced while decoding a frame or a single candidate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Image geometry is inconsistent with the sample buffer
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Both copies of the format (or version) information failed their BCH check
    #[error("format information corrupt: {0}")]
    FormatCorrupt(&'static str),
    /// A Reed-Solomon block held more errors than it can repair
    #[error("uncorrectable errors in block {block}")]
    UncorrectableError {
        /// Index of the failing block in interleave order
        block: usize,
    },
    /// A linear symbol's check character did not match
    #[error("checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch {
        /// Value computed from the data characters
        expected: u32,
        /// Value read from the symbol
        found: u32,
    },
    /// The bit or bar stream could not be parsed
    #[error("invalid data: {0}")]
    InvalidData(&'static str),
}

/// Copyable classification of a [`DecodeError`], handed to result sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`DecodeError::InvalidInput`]
    InvalidInput,
    /// See [`DecodeError::FormatCorrupt`]
    FormatCorrupt,
    /// See [`DecodeError::UncorrectableError`]
    UncorrectableError,
    /// See [`DecodeError::ChecksumMismatch`]
    ChecksumMismatch,
    /// See [`DecodeError::InvalidData`]
    InvalidData,
}

impl DecodeError {
    /// Classification without the payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidInput(_) => ErrorKind::InvalidInput,
            DecodeError::FormatCorrupt(_) => ErrorKind::FormatCorrupt,
            DecodeError::UncorrectableError { .. } => ErrorKind::UncorrectableError,
            DecodeError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            DecodeError::InvalidData(_) => ErrorKind::InvalidData,
        }
    }
}
