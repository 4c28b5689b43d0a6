use font_types::Tag;
use thiserror::Error;

/// Errors produced while converting an SFNT font to WOFF.
///
/// Every variant is terminal for the whole conversion: there is no partial
/// output and no retry path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The input buffer is too short for the structures it declares
    /// (truncated header, table directory, or table data).
    #[error("unexpected end of font data")]
    UnexpectedEof,

    /// A table's recomputed checksum disagrees with the value stored in the
    /// SFNT table directory.
    #[error("checksum mismatch for table '{tag}': stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        tag: Tag,
        stored: u32,
        computed: u32,
    },

    /// The underlying zlib compressor failed.
    #[error("zlib compression failed for table '{tag}'")]
    Compression { tag: Tag },

    /// The assembled WOFF's byte length disagrees with the length recorded
    /// in its header. Indicates a bookkeeping bug, not bad input.
    #[error("assembled WOFF is {actual} bytes but header says {expected}")]
    SizeMismatch { expected: u32, actual: usize },
}

impl From<bytes::TryGetError> for EncodeError {
    fn from(_value: bytes::TryGetError) -> Self {
        Self::UnexpectedEof
    }
}

pub(crate) fn usize_will_overflow(a: usize, b: usize) -> bool {
    a.checked_add(b).is_none()
}

macro_rules! bail_if {
    ($cond: expr, $err: expr) => {
        if $cond {
            return Err($err);
        }
    };
}
pub(crate) use bail_if;
