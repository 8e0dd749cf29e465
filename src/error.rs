use std::collections::TryReserveError;
use std::io::Error as IoError;

use err_derive::Error;

/// Everything that can fail while reading an archive or decoding an
/// asset.
///
/// Errors are returned to the immediate caller; nothing is retried and
/// nothing is silently recovered. A sector-level failure aborts the
/// whole extraction.
#[derive(Debug, Error)]
pub enum Error {
    /// The input does not follow the declared layout.
    #[error(display = "invalid file format: {}", reason)]
    InvalidFormat { reason: &'static str },
    #[error(display = "read failed: {}", cause)]
    Read { cause: IoError },
    #[error(display = "seek failed: {}", cause)]
    Seek { cause: IoError },
    /// Reserved for file-payload decryption; table decryption is total
    /// and never fails.
    #[error(display = "decryption failed")]
    Decryption,
    /// The external decompressor failed or produced a length other than
    /// the declared one.
    #[error(display = "{} decompression failed", kind)]
    Decompression { kind: &'static str },
    #[error(display = "unknown sector compression tag {:#04x}", tag)]
    InvalidCompressionTag { tag: u8 },
    #[error(display = "file not found")]
    FileNotFound,
    #[error(display = "unsupported feature: {}", feature)]
    Unsupported { feature: &'static str },
    #[error(display = "out of memory")]
    OutOfMemory,
}

impl From<IoError> for Error {
    fn from(other: IoError) -> Self {
        Error::Read { cause: other }
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
