//! Font table tags

use font_types::Tag;

/// The 'head' font header table.
pub const HEAD: Tag = Tag::new(b"head");

/// The 'bhed' bitmap font header table (legacy Apple bitmap-only fonts).
///
/// Structurally identical to 'head', including the checkSumAdjustment field,
/// so it gets the same checksum treatment.
pub const BHED: Tag = Tag::new(b"bhed");
