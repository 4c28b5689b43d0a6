//! Pure Rust SFNT to WOFF encoder
//!
//! Converts an in-memory OpenType/TrueType font into a WOFF (version 1)
//! container: every font table is validated against its stored checksum,
//! zlib-compressed where that actually shrinks it, and re-packed behind a
//! WOFF header and table directory with 4-byte-aligned data blocks.
//!
//! The single entry point is [`compress_woff1`]. Embedders that want to
//! supply their own zlib implementation can use
//! [`compress_woff1_with_custom_z`] instead.

pub mod checksum;
pub mod error;
pub mod table_tags;
pub mod types;

mod compress_woff1;

pub use checksum::compute_checksum;
pub use compress_woff1::compress_woff1_with_custom_z;
pub use error::EncodeError;

#[cfg(feature = "z")]
pub use compress_woff1::compress_woff1;

// Round a value up to the nearest multiple of 4. Don't round the value in the
// case that rounding up overflows.
//
// Implemented as a macro to make it generic over the type without horrible type bounds
macro_rules! Round4 {
    ($value:expr) => {
        match $value.checked_add(3) {
            Some(value_plus_3) => value_plus_3 & !3,
            None => $value,
        }
    };
}
pub(crate) use Round4;
