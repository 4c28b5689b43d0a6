use std::error::Error;

use bytes::BufMut as _;
use font_types::Tag;
use log::{debug, trace};

use crate::{
    Round4,
    checksum::validate_table_checksum,
    error::{EncodeError, bail_if, usize_will_overflow},
    types::{
        SFNT_HEADER_SIZE, SFNT_TABLE_DIR_ENTRY_SIZE, SfntHeader, SfntTableDirectory,
        WOFF_HEADER_SIZE, WOFF_TABLE_DIR_ENTRY_SIZE, WoffHeader,
    },
};

#[cfg(feature = "z")]
fn compress_z(raw_data: &[u8]) -> Result<Vec<u8>, Box<dyn Error>> {
    use flate2::{Compression, write::ZlibEncoder};
    use std::io::Write;
    let mut compressor = ZlibEncoder::new(Vec::with_capacity(raw_data.len()), Compression::default());
    compressor.write_all(raw_data)?;
    Ok(compressor.finish()?)
}

#[cfg(feature = "z")]
/// Convert an SFNT font to a WOFF1 file using the built-in zlib compressor
pub fn compress_woff1(raw_sfnt_data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    compress_woff1_with_custom_z(raw_sfnt_data, &mut compress_z)
}

/// A single font table, ready to be placed in the output file.
///
/// `data` holds whichever representation won (compressed or raw), already
/// zero-padded to a 4-byte boundary. `comp_length` records the pre-padding
/// byte count of that representation. `woff_offset` is zero until the
/// placement pass assigns it.
struct EncodedTable {
    tag: Tag,
    orig_checksum: u32,
    orig_length: u32,
    comp_length: u32,
    woff_offset: u32,
    data: Vec<u8>,
}

#[allow(clippy::type_complexity)]
/// Convert an SFNT font to a WOFF1 file using a custom zlib compressor passed as a closure
pub fn compress_woff1_with_custom_z(
    raw_sfnt_data: &[u8],
    compress_z: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>, Box<dyn Error>>,
) -> Result<Vec<u8>, EncodeError> {
    // Here we create a new view over the `raw_sfnt_data`. Because we pass `&mut input` to parsing
    // functions, they will actually mutate the slice (not the data it points to) such that it only
    // includes unparsed data.
    //
    // However `raw_sfnt_data` will still contain the full data for the font.
    let mut input = raw_sfnt_data;

    // Parse header and table directory
    let sfnt_header = SfntHeader::parse(&mut input)?;
    let num_tables = sfnt_header.num_tables as usize;
    let mut table_directory = SfntTableDirectory::parse(&mut input, num_tables)?;

    // Verify every table's stored checksum before compressing anything.
    // A single mismatch rejects the whole font.
    for table in table_directory.iter() {
        validate_table_checksum(table, raw_sfnt_data)?;
    }

    // WOFF directory entries are stored in sorted-tag order
    table_directory.sort_tables();

    debug!(
        "converting {num_tables} tables, flavor {}",
        sfnt_header.flavor
    );

    // Compress each table, keeping the raw payload whenever compression
    // fails to shrink it. Also accumulate totalSfntSize: the byte size the
    // reassembled original font would have, using aligned original lengths.
    let mut total_sfnt_size: usize = SFNT_HEADER_SIZE + num_tables * SFNT_TABLE_DIR_ENTRY_SIZE;
    let mut encoded_tables: Vec<EncodedTable> = Vec::with_capacity(num_tables);
    for table in table_directory.iter() {
        let raw_table_data = table.data_as_slice(raw_sfnt_data)?;
        let compressed_data = compress_z(raw_table_data)
            .map_err(|_| EncodeError::Compression { tag: table.tag })?;

        // On a tie the raw payload wins: same size, and the client skips inflating it
        let payload: &[u8] = if compressed_data.len() >= raw_table_data.len() {
            raw_table_data
        } else {
            &compressed_data
        };
        trace!(
            "table '{}': {} -> {} bytes{}",
            table.tag,
            raw_table_data.len(),
            payload.len(),
            if payload.len() == raw_table_data.len() { " (stored raw)" } else { "" },
        );

        let comp_length = payload.len();
        let mut data = Vec::with_capacity(Round4!(comp_length));
        data.extend_from_slice(payload);
        data.resize(Round4!(comp_length), 0);

        let aligned_orig_length = Round4!(table.length as usize);
        bail_if!(
            usize_will_overflow(total_sfnt_size, aligned_orig_length),
            EncodeError::UnexpectedEof
        );
        total_sfnt_size += aligned_orig_length;

        encoded_tables.push(EncodedTable {
            tag: table.tag,
            orig_checksum: table.orig_checksum,
            orig_length: table.length,
            comp_length: comp_length as u32,
            woff_offset: 0,
            data,
        });
    }

    // Place each table's padded data block after the header and directory,
    // in sorted order
    let mut running_offset: usize = WOFF_HEADER_SIZE + num_tables * WOFF_TABLE_DIR_ENTRY_SIZE;
    for table in encoded_tables.iter_mut() {
        table.woff_offset = running_offset as u32;
        bail_if!(
            usize_will_overflow(running_offset, table.data.len()),
            EncodeError::UnexpectedEof
        );
        running_offset += table.data.len();
    }
    let woff_length = running_offset;
    bail_if!(woff_length > u32::MAX as usize, EncodeError::UnexpectedEof);
    bail_if!(total_sfnt_size > u32::MAX as usize, EncodeError::UnexpectedEof);

    // Write WOFF header
    let mut out: Vec<u8> = Vec::with_capacity(woff_length);
    let woff_header = WoffHeader {
        flavor: sfnt_header.flavor,
        length: woff_length as u32,
        num_tables: sfnt_header.num_tables,
        total_sfnt_size: total_sfnt_size as u32,
    };
    woff_header.write(&mut out);

    // Write WOFF table directory
    for table in &encoded_tables {
        out.put_u32(u32::from_be_bytes(table.tag.to_be_bytes()));
        out.put_u32(table.woff_offset);
        out.put_u32(table.comp_length);
        out.put_u32(table.orig_length);
        out.put_u32(table.orig_checksum);
    }

    // Write table data
    for table in &encoded_tables {
        out.extend_from_slice(&table.data);
    }

    // The length recorded in the header must describe the output exactly.
    // A mismatch means the offset bookkeeping above is wrong, which must
    // never be papered over.
    bail_if!(
        out.len() != woff_length,
        EncodeError::SizeMismatch {
            expected: woff_length as u32,
            actual: out.len(),
        }
    );

    Ok(out)
}
