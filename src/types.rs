use std::ops::{Deref, DerefMut};

use bytes::{Buf, BufMut};
use font_types::Tag;

use crate::Round4;
use crate::error::EncodeError;

pub const WOFF1_SIG: Tag = Tag::new(b"wOFF");

/// Size of the SFNT header (sfntVersion, numTables, searchRange, entrySelector, rangeShift)
pub const SFNT_HEADER_SIZE: usize = 12;
/// Size of one SFNT table directory record (tag, checkSum, offset, length)
pub const SFNT_TABLE_DIR_ENTRY_SIZE: usize = 16;
/// Size of the WOFF header
pub const WOFF_HEADER_SIZE: usize = 44;
/// Size of one WOFF table directory record (tag, offset, compLength, origLength, origChecksum)
pub const WOFF_TABLE_DIR_ENTRY_SIZE: usize = 20;

/// The fixed-offset fields at the start of an SFNT font
///
/// <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>
#[derive(Debug)]
pub struct SfntHeader {
    /// The "sfnt version" of the font (0x00010000, b"OTTO", b"true", ...).
    /// Opaque to the conversion: it is copied into the WOFF header unchanged.
    pub flavor: Tag,
    /// Number of entries in the table directory.
    pub num_tables: u16,
}

impl SfntHeader {
    pub fn parse(input: &mut impl Buf) -> Result<Self, EncodeError> {
        let flavor = Tag::from_u32(input.try_get_u32()?);
        let num_tables = input.try_get_u16()?;

        // searchRange, entrySelector and rangeShift are derivable from
        // numTables and not needed for conversion. Skip over them so that
        // directory parsing starts at byte 12.
        let _search_range = input.try_get_u16()?;
        let _entry_selector = input.try_get_u16()?;
        let _range_shift = input.try_get_u16()?;

        Ok(Self { flavor, num_tables })
    }
}

/// One 16-byte record from the SFNT table directory
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SfntTableDirectoryEntry {
    /// 4-byte table tag
    pub tag: Tag,
    /// Checksum of the table data as stored in the directory
    pub orig_checksum: u32,
    /// Offset of the table data from the beginning of the file
    pub offset: u32,
    /// Length of the table data, excluding any padding
    pub length: u32,
}

impl SfntTableDirectoryEntry {
    pub fn parse(input: &mut impl Buf) -> Result<Self, EncodeError> {
        Ok(Self {
            tag: Tag::from_u32(input.try_get_u32()?),
            orig_checksum: input.try_get_u32()?,
            offset: input.try_get_u32()?,
            length: input.try_get_u32()?,
        })
    }

    /// The table's raw payload: logical length only, no padding
    pub fn data_as_slice<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], EncodeError> {
        let start = self.offset as usize;
        let end = start
            .checked_add(self.length as usize)
            .ok_or(EncodeError::UnexpectedEof)?;
        data.get(start..end).ok_or(EncodeError::UnexpectedEof)
    }

    /// The table's payload extended to a 4-byte boundary with the padding
    /// bytes that follow it in the file. Table checksums are computed over
    /// this slice.
    pub fn aligned_data_as_slice<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], EncodeError> {
        let start = self.offset as usize;
        let end = start
            .checked_add(Round4!(self.length as usize))
            .ok_or(EncodeError::UnexpectedEof)?;
        data.get(start..end).ok_or(EncodeError::UnexpectedEof)
    }

    pub fn tag_as_u32(&self) -> u32 {
        u32::from_be_bytes(self.tag.to_be_bytes())
    }
}

/// The SFNT table directory: the 16-byte records immediately following the
/// 12-byte header, in file order until [`sort_tables`](Self::sort_tables)
/// is called.
#[derive(Debug)]
pub struct SfntTableDirectory {
    pub tables: Vec<SfntTableDirectoryEntry>,
}

impl Deref for SfntTableDirectory {
    type Target = Vec<SfntTableDirectoryEntry>;
    fn deref(&self) -> &Self::Target {
        &self.tables
    }
}
impl DerefMut for SfntTableDirectory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tables
    }
}

impl SfntTableDirectory {
    pub fn parse(input: &mut impl Buf, num_tables: usize) -> Result<Self, EncodeError> {
        let mut tables = Vec::with_capacity(num_tables);
        for _ in 0..num_tables {
            tables.push(SfntTableDirectoryEntry::parse(input)?);
        }
        Ok(Self { tables })
    }

    /// Sort tables into the order their WOFF directory entries are written in.
    ///
    /// The sort key is the *decimal string* form of the numeric tag rather
    /// than the tag's byte value. For the all-lowercase/uppercase ASCII tags
    /// real fonts carry, the two orderings coincide, but tags whose first
    /// byte is below b';' have a shorter decimal form and order differently.
    /// The reference sfnt2woff converter sorts this way, and we reproduce it
    /// so our directory is byte-identical to its output.
    pub fn sort_tables(&mut self) {
        self.tables
            .sort_by_cached_key(|table| table.tag_as_u32().to_string());
    }
}

/// WOFF (version 1) file header
///
/// This encoder never emits metadata or private-data blocks, so the header
/// fields describing them (and the major/minor version) are always written
/// as zero and not represented here.
///
/// <https://www.w3.org/TR/WOFF/#WOFFHeader>
pub struct WoffHeader {
    /// The "sfnt version" of the input font.
    pub flavor: Tag,
    /// Total size of the WOFF file.
    pub length: u32,
    /// Number of entries in directory of font tables.
    pub num_tables: u16,
    /// Total size needed for the uncompressed font data, including the sfnt
    /// header, directory, and font tables (including padding).
    pub total_sfnt_size: u32,
}

impl WoffHeader {
    pub fn write(&self, out: &mut impl BufMut) {
        out.put_u32(u32::from_be_bytes(WOFF1_SIG.to_be_bytes())); // signature
        out.put_u32(u32::from_be_bytes(self.flavor.to_be_bytes())); // flavor
        out.put_u32(self.length); // length
        out.put_u16(self.num_tables); // numTables
        out.put_u16(0); // reserved
        out.put_u32(self.total_sfnt_size); // totalSfntSize
        out.put_u16(0); // majorVersion
        out.put_u16(0); // minorVersion
        out.put_u32(0); // metaOffset
        out.put_u32(0); // metaLength
        out.put_u32(0); // metaOrigLength
        out.put_u32(0); // privOffset
        out.put_u32(0); // privLength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_font() -> Vec<u8> {
        let mut data: Vec<u8> = Vec::new();
        data.put_u32(0x00010000); // flavor
        data.put_u16(2); // numTables
        data.put_u16(32); // searchRange
        data.put_u16(1); // entrySelector
        data.put_u16(0); // rangeShift
        for (i, tag) in [b"glyf", b"head"].iter().enumerate() {
            data.put_u32(u32::from_be_bytes(**tag));
            data.put_u32(0xDEADBEEF); // checksum
            data.put_u32(44 + 16 * i as u32); // offset
            data.put_u32(16); // length
        }
        data
    }

    #[test]
    fn parsing_is_idempotent() {
        let font = sample_font();

        let mut input_a = font.as_slice();
        let header_a = SfntHeader::parse(&mut input_a).unwrap();
        let dir_a = SfntTableDirectory::parse(&mut input_a, header_a.num_tables as usize).unwrap();

        let mut input_b = font.as_slice();
        let header_b = SfntHeader::parse(&mut input_b).unwrap();
        let dir_b = SfntTableDirectory::parse(&mut input_b, header_b.num_tables as usize).unwrap();

        assert_eq!(header_a.flavor, header_b.flavor);
        assert_eq!(header_a.num_tables, header_b.num_tables);
        assert_eq!(dir_a.tables, dir_b.tables);
    }

    #[test]
    fn short_header_is_an_error() {
        let mut input: &[u8] = &[0x00, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(
            SfntHeader::parse(&mut input).unwrap_err(),
            EncodeError::UnexpectedEof
        );
    }

    #[test]
    fn short_directory_is_an_error() {
        let font = sample_font();
        // Truncate mid-way through the second directory entry
        let truncated = &font[..font.len() - 7];

        let mut input = truncated;
        let header = SfntHeader::parse(&mut input).unwrap();
        assert_eq!(
            SfntTableDirectory::parse(&mut input, header.num_tables as usize).unwrap_err(),
            EncodeError::UnexpectedEof
        );
    }

    #[test]
    fn sort_uses_decimal_string_order() {
        // b"0ABC" = 809517635 and b"head" = 1751474532. A byte comparison
        // would put "0ABC" first; comparing the decimal strings puts "head"
        // first because '1' < '8'.
        let entry = |tag: &[u8; 4]| SfntTableDirectoryEntry {
            tag: Tag::new(tag),
            orig_checksum: 0,
            offset: 0,
            length: 0,
        };
        let mut directory = SfntTableDirectory {
            tables: vec![entry(b"0ABC"), entry(b"head"), entry(b"glyf")],
        };

        directory.sort_tables();

        let tags: Vec<Tag> = directory.iter().map(|table| table.tag).collect();
        assert_eq!(
            tags,
            vec![Tag::new(b"glyf"), Tag::new(b"head"), Tag::new(b"0ABC")]
        );
    }
}
