//! Unified error type for message conversion.
//!
//! Every failure a conversion can surface is a variant of [`Error`]. Offset
//! problems are never clamped or repaired, because silently moving a span
//! would corrupt the text around it.
use thiserror::Error;

/// Main error type for formatter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A span reaches past the end of the text it indexes (UTF-16 units).
    #[error("Offset out of bounds: {start}+{length} exceeds text length {len}")]
    OffsetOutOfBounds {
        start: usize,
        length: usize,
        len: usize,
    },

    /// A surrogate code unit without its partner was found while collapsing.
    #[error("Unpaired surrogate 0x{unit:04X} at UTF-16 offset {index}")]
    UnpairedSurrogate { index: usize, unit: u16 },

    /// The HTML body could not be read
    #[error("Markup error: {0}")]
    Markup(String),

    /// The user/puppet directory failed
    #[error("Directory error: {0}")]
    Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a directory failure so it propagates unchanged to the caller.
    pub fn directory<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Directory(err.into())
    }

    /// Whether this error means an offset or surrogate was malformed.
    #[inline]
    pub fn is_malformed_offset(&self) -> bool {
        matches!(
            self,
            Error::OffsetOutOfBounds { .. } | Error::UnpairedSurrogate { .. }
        )
    }
}

/// Result type for formatter operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_offset_family() {
        let oob = Error::OffsetOutOfBounds {
            start: 4,
            length: 2,
            len: 5,
        };
        assert!(oob.is_malformed_offset());
        assert_eq!(
            oob.to_string(),
            "Offset out of bounds: 4+2 exceeds text length 5"
        );

        let lone = Error::UnpairedSurrogate {
            index: 3,
            unit: 0xD83D,
        };
        assert!(lone.is_malformed_offset());
        assert_eq!(
            lone.to_string(),
            "Unpaired surrogate 0xD83D at UTF-16 offset 3"
        );

        assert!(!Error::Markup("x".into()).is_malformed_offset());
    }

    #[test]
    fn test_directory_error_keeps_source() {
        let io = std::io::Error::other("database is locked");
        let err = Error::directory(io);
        assert_eq!(err.to_string(), "Directory error: database is locked");
        assert!(std::error::Error::source(&err).is_some());
    }
}
