//! SFNT table checksums
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums>

use crate::error::{EncodeError, bail_if};
use crate::table_tags::{BHED, HEAD};
use crate::types::SfntTableDirectoryEntry;

/// Sum the big-endian u32 words of `data` with wrapping (modulo 2^32)
/// arithmetic. A trailing partial word is treated as zero-padded.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut checksum: u32 = 0;

    let mut words = data.chunks_exact(4);
    for word in &mut words {
        checksum = checksum.wrapping_add(u32::from_be_bytes(word.try_into().unwrap()));
    }

    let remainder = words.remainder();
    if !remainder.is_empty() {
        let mut word = [0u8; 4];
        word[..remainder.len()].copy_from_slice(remainder);
        checksum = checksum.wrapping_add(u32::from_be_bytes(word));
    }

    checksum
}

/// Recompute `entry`'s checksum from the font data and compare it against
/// the value stored in the table directory.
///
/// The checksum covers the table's data padded out to a 4-byte boundary.
/// For the 'head' table (and its bitmap-only twin 'bhed') the table's own
/// checkSumAdjustment field at offset 8 is excluded by subtracting it from
/// the sum, because that field is written *after* the directory checksum is
/// calculated and would otherwise invalidate it.
pub fn validate_table_checksum(
    entry: &SfntTableDirectoryEntry,
    sfnt_data: &[u8],
) -> Result<(), EncodeError> {
    let table_data = entry.aligned_data_as_slice(sfnt_data)?;
    let mut computed = compute_checksum(table_data);

    if entry.tag == HEAD || entry.tag == BHED {
        bail_if!(entry.length < 12, EncodeError::UnexpectedEof);
        let adjustment = u32::from_be_bytes(table_data[8..12].try_into().unwrap());
        computed = computed.wrapping_sub(adjustment);
    }

    bail_if!(
        computed != entry.orig_checksum,
        EncodeError::ChecksumMismatch {
            tag: entry.tag,
            stored: entry.orig_checksum,
            computed,
        }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use font_types::Tag;

    use super::*;

    #[test]
    fn sums_big_endian_words() {
        let data = [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(compute_checksum(&data), 3);
    }

    #[test]
    fn overflow_wraps() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x05];
        assert_eq!(compute_checksum(&data), 4);
    }

    #[test]
    fn trailing_bytes_are_zero_padded() {
        // 0x01020300 + 0x04000000
        let data = [0x01, 0x02, 0x03, 0x00, 0x04];
        assert_eq!(compute_checksum(&data), 0x05020300);
    }

    fn entry_for(tag: &[u8; 4], data: &[u8], checksum: u32) -> SfntTableDirectoryEntry {
        SfntTableDirectoryEntry {
            tag: Tag::new(tag),
            orig_checksum: checksum,
            offset: 0,
            length: data.len() as u32,
        }
    }

    #[test]
    fn validates_matching_checksum() {
        let data = [0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x08];
        let entry = entry_for(b"glyf", &data, 15);
        assert!(validate_table_checksum(&entry, &data).is_ok());
    }

    #[test]
    fn rejects_mismatched_checksum() {
        let data = [0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x08];
        let entry = entry_for(b"glyf", &data, 16);
        assert_eq!(
            validate_table_checksum(&entry, &data).unwrap_err(),
            EncodeError::ChecksumMismatch {
                tag: Tag::new(b"glyf"),
                stored: 16,
                computed: 15,
            }
        );
    }

    #[test]
    fn head_excludes_checksum_adjustment() {
        // Word at offset 8 is the checkSumAdjustment and must not count
        // towards the stored checksum.
        let mut data = vec![0u8; 16];
        data[8..12].copy_from_slice(&0x1000_u32.to_be_bytes());
        data[12..16].copy_from_slice(&0x0030_u32.to_be_bytes());

        let head = entry_for(b"head", &data, 0x0030);
        assert!(validate_table_checksum(&head, &data).is_ok());

        let bhed = entry_for(b"bhed", &data, 0x0030);
        assert!(validate_table_checksum(&bhed, &data).is_ok());

        // Any other tag keeps the full sum
        let glyf = entry_for(b"glyf", &data, 0x1030);
        assert!(validate_table_checksum(&glyf, &data).is_ok());
    }

    #[test]
    fn table_past_end_of_font_is_an_error() {
        let data = [0u8; 8];
        let mut entry = entry_for(b"glyf", &data, 0);
        entry.length = 12;
        assert_eq!(
            validate_table_checksum(&entry, &data).unwrap_err(),
            EncodeError::UnexpectedEof
        );
    }
}
